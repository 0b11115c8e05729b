//! Clients for the two backing services.

pub mod object_storage;
pub mod user_store;
