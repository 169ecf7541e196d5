//! Runtime configuration snapshots and the atomically swapped store

use crate::plugin::GatewayPlugin;
use arc_swap::ArcSwap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Admin cookie name used when none is configured
pub const DEFAULT_ADMIN_COOKIE: &str = "bf_admin";

/// Point-in-time runtime configuration for the edge layer.
///
/// Instances are immutable once published. Reconfiguration happens by
/// swapping a fresh snapshot into the [`ConfigStore`]; in-flight requests
/// keep the snapshot they loaded at arrival.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Shared admin credential. Blank after trimming disables the admin
    /// gate entirely.
    pub admin_secret: String,

    /// Name of the cookie carrying the admin credential
    pub admin_cookie_name: String,

    /// Origins accepted by the CORS guard in addition to loopback hosts.
    /// Matched by exact string comparison against the `Origin` header.
    pub allowed_origins: HashSet<String>,

    /// Registered plugins, in registration order
    pub plugins: Vec<Arc<dyn GatewayPlugin>>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            admin_secret: String::new(),
            admin_cookie_name: DEFAULT_ADMIN_COOKIE.to_string(),
            allowed_origins: HashSet::new(),
            plugins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// True when no usable admin secret is configured
    pub fn admin_disabled(&self) -> bool {
        self.admin_secret.trim().is_empty()
    }

    /// Effective admin cookie name, falling back to
    /// [`DEFAULT_ADMIN_COOKIE`] when the configured name is blank
    pub fn cookie_name(&self) -> &str {
        if self.admin_cookie_name.trim().is_empty() {
            DEFAULT_ADMIN_COOKIE
        } else {
            &self.admin_cookie_name
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field(
                "admin_secret",
                if self.admin_secret.is_empty() { &"<unset>" } else { &"<redacted>" },
            )
            .field("admin_cookie_name", &self.admin_cookie_name)
            .field("allowed_origins", &self.allowed_origins)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Shared handle to the current [`GatewayConfig`].
///
/// Readers take lock-free snapshots; publishing a new configuration never
/// blocks readers and readers never observe a partially updated value.
pub struct ConfigStore {
    current: ArcSwap<GatewayConfig>,
}

impl ConfigStore {
    /// Create a store seeded with `config`
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Point-in-time snapshot of the current configuration
    pub fn snapshot(&self) -> Arc<GatewayConfig> {
        self.current.load_full()
    }

    /// Publish a new configuration for subsequent requests
    pub fn publish(&self, config: GatewayConfig) {
        self.current.store(Arc::new(config));
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}
