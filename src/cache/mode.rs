//! Per-request mode selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host state visible when a request starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostContext {
    /// The request targets the host's admin area.
    pub in_admin_area: bool,
    /// The host explicitly forces administrative behavior for this request.
    pub admin_override: bool,
}

impl HostContext {
    pub fn front_end() -> Self {
        Self::default()
    }

    pub fn admin_area() -> Self {
        Self {
            in_admin_area: true,
            admin_override: false,
        }
    }
}

/// Which behavior set a request runs with. Fixed for the request's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Eligible to invalidate; fragment caches are bypassed.
    Administrative,
    /// Eligible to read and write fragment caches.
    FrontEnd,
}

impl RequestMode {
    pub fn is_administrative(self) -> bool {
        matches!(self, RequestMode::Administrative)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestMode::Administrative => "administrative",
            RequestMode::FrontEnd => "front_end",
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides the request mode from host state.
///
/// `force_admin` is the process-wide override from configuration; the host
/// context carries the per-request one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeSelector {
    force_admin: bool,
}

impl ModeSelector {
    pub fn new(force_admin: bool) -> Self {
        Self { force_admin }
    }

    pub fn select(&self, host: &HostContext) -> RequestMode {
        if host.in_admin_area || host.admin_override || self.force_admin {
            RequestMode::Administrative
        } else {
            RequestMode::FrontEnd
        }
    }
}
