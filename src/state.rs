//! Shared handles injected into every handler.

use crate::services::{object_storage::ObjectStorage, user_store::UserStore};
use std::sync::Arc;

/// Router state: the document store and the object-storage client.
///
/// Both handles are safe for concurrent use, so cloning the state per request
/// only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub objects: Arc<dyn ObjectStorage>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, objects: Arc<dyn ObjectStorage>) -> Self {
        Self { users, objects }
    }
}
