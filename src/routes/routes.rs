//! Defines routes for the user collection and the bucket gateway.
//!
//! ## Structure
//! - **Document store**
//!   - `GET    /mongodb/testar-conexao` — connectivity check (plain text)
//!   - `POST   /usuarios` — create user
//!   - `GET    /usuarios` — list users
//!   - `GET    /usuarios/{id}` — fetch one user
//!   - `PUT    /usuarios/{id}` — merge fields into a user
//!   - `DELETE /usuarios/{id}` — delete user
//!
//! - **Bucket gateway**
//!   - `GET    /buckets` — list buckets
//!   - `GET    /buckets/{bucket_name}` — list objects
//!   - `POST   /buckets/{bucket_name}/upload` — multipart upload (`file` field)
//!   - `DELETE /buckets/{bucket_name}/file/{*file_name}` — delete object
//!
//! The wildcard `*file_name` allows nested keys like `photos/2025/img.jpg`.

use crate::{
    handlers::{
        bucket_handlers::{delete_object, list_buckets, list_objects, upload_object},
        health_handlers::{healthz, readyz, test_connection},
        user_handlers::{create_user, delete_user, get_user, list_users, update_user},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Build and return the router for every endpoint.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/mongodb/testar-conexao", get(test_connection))
        // User routes
        .route("/usuarios", get(list_users).post(create_user))
        .route(
            "/usuarios/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Bucket routes
        .route("/buckets", get(list_buckets))
        .route("/buckets/{bucket_name}", get(list_objects))
        .route(
            "/buckets/{bucket_name}/upload",
            post(upload_object).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/buckets/{bucket_name}/file/{*file_name}",
            delete(delete_object),
        )
}

/// Permissive CORS: any origin and header, the four verbs the API serves.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any)
}

/// The complete application: routes, state and the cross-cutting layers.
///
/// Every request gets an `x-request-id` (kept from the client when present),
/// which handlers attach to their log events and which is echoed on the response.
pub fn app(state: AppState) -> Router {
    routes()
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors())
}
