//! Application state management

use crate::middleware::Handler;
use gatehouse_core::ConfigStore;
use std::sync::Arc;

/// Shared application state
///
/// Holds what the entry point needs for every request: the configuration
/// store snapshots are loaded from, and the middleware chain assembled once
/// at startup.
#[derive(Clone)]
pub struct AppState {
    /// Source of per-request configuration snapshots
    pub config: Arc<ConfigStore>,
    /// The composed middleware chain and terminal handler
    pub handler: Handler,
}

impl AppState {
    /// Create a new AppState with the given components
    pub fn new(config: Arc<ConfigStore>, handler: Handler) -> Self {
        Self { config, handler }
    }
}
