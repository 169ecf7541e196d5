//! Error types shared across the edge layer

use thiserror::Error;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Failure raised by a plugin while transforming a request.
///
/// The interception pipeline logs these and continues with the request state
/// from before the failing plugin; they are never surfaced to clients.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// The plugin declined to transform the request
    #[error("plugin rejected request: {0}")]
    Rejected(String),

    /// The plugin hit an internal failure
    #[error("plugin failed: {0}")]
    Internal(String),
}

impl PluginError {
    /// Create a rejection error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
