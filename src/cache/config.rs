//! Cache layer configuration.

use std::time::Duration;

/// Runtime switches for the cache layer, derived from [`crate::config::Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Cache navigation menu fragments.
    pub nav_menu_enabled: bool,
    /// Cache widget fragments.
    pub widgets_enabled: bool,
    /// Lifetime of stored fragments; `None` keeps them until flushed or evicted.
    pub fragment_ttl: Option<Duration>,
    /// Treat every request as administrative.
    pub admin_override: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            nav_menu_enabled: true,
            widgets_enabled: true,
            fragment_ttl: None,
            admin_override: false,
        }
    }
}

impl From<&crate::config::Settings> for CacheConfig {
    fn from(settings: &crate::config::Settings) -> Self {
        Self {
            nav_menu_enabled: settings.fragments.nav_menu,
            widgets_enabled: settings.fragments.widgets,
            fragment_ttl: settings.backend.default_ttl,
            admin_override: settings.request.admin_override,
        }
    }
}
