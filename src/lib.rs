//! HTTP service exposing CRUD over user records kept in a document store and
//! passthrough operations over an S3-compatible object-storage service.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::routes::app;
pub use state::AppState;
