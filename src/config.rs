use crate::{logging::LogFormat, services::object_storage::S3Settings};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::env;

const ENV_PREFIX: &str = "USER_BUCKET_API";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub region: String,
    pub s3_endpoint: Option<String>,
    pub s3_force_path_style: bool,
    pub log_format: LogFormat,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "User records and object-storage gateway API")]
pub struct Args {
    /// Host to bind to (overrides USER_BUCKET_API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides USER_BUCKET_API_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Document store URL (overrides USER_BUCKET_API_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Object-storage region (overrides USER_BUCKET_API_REGION and AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint (overrides USER_BUCKET_API_S3_ENDPOINT)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// Use path-style bucket addressing (overrides USER_BUCKET_API_S3_FORCE_PATH_STYLE)
    #[arg(long)]
    pub s3_force_path_style: bool,

    /// Log output: pretty or json (overrides USER_BUCKET_API_LOG_FORMAT)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();
        Self::resolve(args, |name| env::var(name).ok())
    }

    /// Merge `args` over the variables returned by `lookup`, then defaults.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<(Self, bool)> {
        let var = |suffix: &str| lookup(&format!("{}_{}", ENV_PREFIX, suffix));

        // --- Environment fallback ---
        let env_host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match var("PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing {}_PORT value `{}`", ENV_PREFIX, value))?,
            None => 3000,
        };
        let env_db = var("DATABASE_URL").unwrap_or_else(|| "sqlite://./data/users.db".into());
        let env_region = var("REGION")
            .or_else(|| lookup("AWS_REGION"))
            .unwrap_or_else(|| "us-east-1".into());
        let env_endpoint = var("S3_ENDPOINT").filter(|v| !v.is_empty());
        let env_path_style = match var("S3_FORCE_PATH_STYLE") {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("parsing {}_S3_FORCE_PATH_STYLE", ENV_PREFIX))?,
            None => false,
        };
        let env_log_format = match var("LOG_FORMAT") {
            Some(value) => value
                .parse::<LogFormat>()
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("parsing {}_LOG_FORMAT", ENV_PREFIX))?,
            None => LogFormat::default(),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            region: args.region.unwrap_or(env_region),
            s3_endpoint: args.s3_endpoint.or(env_endpoint),
            s3_force_path_style: args.s3_force_path_style || env_path_style,
            log_format: args.log_format.unwrap_or(env_log_format),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn s3_settings(&self) -> S3Settings {
        S3Settings {
            region: self.region.clone(),
            endpoint_url: self.s3_endpoint.clone(),
            force_path_style: self.s3_force_path_style,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("expected a boolean, got `{}`", other)),
    }
}
