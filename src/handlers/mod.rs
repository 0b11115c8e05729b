//! HTTP handlers, one module per route group.

pub mod bucket_handlers;
pub mod health_handlers;
pub mod user_handlers;

use crate::{errors::AppError, logging::RequestContext};

/// Log `err` against the request it belongs to and hand it back.
pub(crate) fn reject(ctx: &RequestContext, event: &str, err: AppError) -> AppError {
    crate::logging::log_error(ctx, event, &err);
    err
}
