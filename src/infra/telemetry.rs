use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "objcache_flush_total",
            Unit::Count,
            "Total number of backend flushes, by event class."
        );
        describe_counter!(
            "objcache_flush_suppressed_total",
            Unit::Count,
            "Total number of flushes denied because the class already flushed in the request."
        );
        describe_counter!(
            "objcache_flush_failed_total",
            Unit::Count,
            "Total number of granted flushes the backend rejected."
        );
        describe_counter!(
            "objcache_fragment_hit_total",
            Unit::Count,
            "Total number of fragment cache hits, by group."
        );
        describe_counter!(
            "objcache_fragment_miss_total",
            Unit::Count,
            "Total number of fragment cache misses, by group."
        );
        describe_counter!(
            "objcache_fragment_bypass_total",
            Unit::Count,
            "Total number of fragments rendered live because they opted out of caching."
        );
        describe_counter!(
            "objcache_backend_error_total",
            Unit::Count,
            "Total number of fragment reads and writes the backend failed, by operation."
        );
        describe_counter!(
            "objcache_memory_evict_total",
            Unit::Count,
            "Total number of in-process backend evictions due to capacity."
        );
    });
}
