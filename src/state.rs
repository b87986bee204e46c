//! Shared application state for all routes.

use crate::store::StudentStore;
use std::sync::Arc;

/// The record store is injected here at startup; handlers never hold their
/// own connections.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StudentStore>,
}
