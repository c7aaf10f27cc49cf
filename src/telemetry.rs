use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};
use crate::error::DataError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), DataError> {
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
        .map_err(|err| DataError::telemetry(format!("failed to install tracing subscriber: {err}")))
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "vitrine_cache_hit_total",
            Unit::Count,
            "Total number of response-cache hits."
        );
        describe_counter!(
            "vitrine_cache_miss_total",
            Unit::Count,
            "Total number of response-cache misses."
        );
        describe_counter!(
            "vitrine_cache_evict_total",
            Unit::Count,
            "Total number of response-cache evictions due to capacity."
        );
        describe_counter!(
            "vitrine_cache_fallback_total",
            Unit::Count,
            "Total number of stale responses served because the network failed."
        );
        describe_counter!(
            "vitrine_cache_revalidate_total",
            Unit::Count,
            "Total number of background stale revalidations started."
        );
        describe_histogram!(
            "vitrine_fetch_ms",
            Unit::Milliseconds,
            "CMS fetch latency in milliseconds."
        );
    });
}
