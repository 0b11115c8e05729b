//! Structured logging for the API.
//!
//! Handlers report one event per outcome through [`log_info`] / [`log_error`],
//! tagged with the [`RequestContext`] of the request being served.

use axum::{
    extract::FromRequestParts,
    http::{Method, request::Parts},
};
use serde::Serialize;
use std::{convert::Infallible, fmt, str::FromStr};
use tracing_subscriber::EnvFilter;

/// Header carrying the request id, set by the router's request-id layer.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Output format of the log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{}` (expected pretty or json)", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the `info` default.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Where a log event came from.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        Ok(Self {
            request_id,
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
        })
    }
}

fn render<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_else(|err| format!("<unserializable: {}>", err))
}

/// Record a successful outcome, optionally with a snapshot of the affected data.
pub fn log_info<T: Serialize + ?Sized>(ctx: &RequestContext, message: &str, data: Option<&T>) {
    let data = data.map(render);
    tracing::info!(
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
        data = data.as_deref(),
        "{}",
        message
    );
}

/// Record a failed outcome together with the error that caused it.
pub fn log_error(ctx: &RequestContext, message: &str, error: &dyn std::error::Error) {
    tracing::error!(
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
        error = %error,
        "{}",
        message
    );
}
