use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const METRIC_MUTATION_TOTAL: &str = "quire_mutation_total";
pub const METRIC_MUTATION_RETRY_TOTAL: &str = "quire_mutation_retry_total";
pub const METRIC_BATCH_TOTAL: &str = "quire_batch_total";
pub const METRIC_BATCH_MS: &str = "quire_batch_ms";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    // Logs go to stderr so command output on stdout stays machine-readable.
    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
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
            METRIC_MUTATION_TOTAL,
            Unit::Count,
            "Total number of settled mutation requests, by resource, action and outcome."
        );
        describe_counter!(
            METRIC_MUTATION_RETRY_TOTAL,
            Unit::Count,
            "Total number of mutation attempts repeated after a transient failure."
        );
        describe_counter!(
            METRIC_BATCH_TOTAL,
            Unit::Count,
            "Total number of executed batch plans."
        );
        describe_histogram!(
            METRIC_BATCH_MS,
            Unit::Milliseconds,
            "Wall time from first request to last settlement of a batch."
        );
    });
}
