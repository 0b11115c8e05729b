//! Health, readiness and store connectivity handlers.
//!
//! - GET /healthz                 -> simple liveness ("ok")
//! - GET /readyz                  -> readiness that checks the document store
//! - GET /mongodb/testar-conexao  -> opens a dedicated store connection and reads one record

use crate::{
    errors::AppError,
    handlers::reject,
    logging::{RequestContext, log_info},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

pub const CONNECTION_OK: &str = "connection ok";
pub const CONNECTION_OK_EMPTY: &str = "connection ok, no user found";

/// `GET /healthz`
///
/// Liveness check. Always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Runs a lightweight round trip against the document store. HTTP 200 when it
/// answers, HTTP 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let store_check = match state.users.ping().await {
        Ok(()) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(e) => CheckStatus {
            ok: false,
            error: Some(format!("error: {}", e)),
        },
    };

    let overall_ok = store_check.ok;
    let mut checks = HashMap::new();
    checks.insert("document_store", store_check);

    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

/// `GET /mongodb/testar-conexao`
///
/// Answers in plain text. The shared pool is left untouched; only the
/// dedicated connection opened for the check is closed.
pub async fn test_connection(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> impl IntoResponse {
    match state.users.check_connection().await {
        Ok(Some(user)) => {
            log_info(&ctx, "document store connection ok", Some(&user));
            (StatusCode::OK, CONNECTION_OK.to_string())
        }
        Ok(None) => {
            log_info(&ctx, "document store connection ok, collection empty", None::<&()>);
            (StatusCode::OK, CONNECTION_OK_EMPTY.to_string())
        }
        Err(err) => {
            let err = reject(
                &ctx,
                "document store connection failed",
                AppError::dependency("connection failed", &err),
            );
            (err.status, err.to_string())
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
