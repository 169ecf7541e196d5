//! Core traits and types for the Gatehouse edge layer
//!
//! This crate provides the foundational abstractions shared by the HTTP
//! transport and the host process:
//! - Runtime configuration snapshots and their atomically swapped store
//! - The plugin registry and request interception capability
//! - The embedded UI asset bundle

pub mod assets;
pub mod config;
pub mod error;
pub mod plugin;

// Re-export commonly used types
pub use assets::AssetBundle;
pub use config::{ConfigStore, GatewayConfig, DEFAULT_ADMIN_COOKIE};
pub use error::{PluginError, PluginResult};
pub use plugin::{GatewayPlugin, JsonObject, TransportInterceptor};
