//! Object cache layer for content-management runtimes.
//!
//! - [`backend`]: the key-value store interface, built-in stores and startup
//!   selection.
//! - [`cache`]: per-request flush coordination and fragment caching.
//! - [`replay`]: offline replay of recorded host notifications.

pub mod backend;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod replay;
