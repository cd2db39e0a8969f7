//! Subscriber installation with optional OTLP span export

use opentelemetry::{trace::TraceError, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::config::TracingConfig;
use crate::infrastructure::logging::{env_filter, fmt_layer, LoggingConfig};

/// Installs the global subscriber.
///
/// An exporter that cannot be built is reported once the subscriber is up and
/// the server keeps running with local logs only.
pub fn init_tracing(logging: &LoggingConfig, tracing: &TracingConfig) {
    let (provider, export_error) = match tracing.enabled.then(|| otlp_provider(tracing)) {
        Some(Ok(provider)) => (Some(provider), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(tracing.service_name.clone())));

    tracing_subscriber::registry()
        .with(env_filter(logging))
        .with(fmt_layer(logging))
        .with(otel_layer)
        .init();

    if let Some(e) = export_error {
        warn!(endpoint = %tracing.otlp_endpoint, error = %e, "OTLP exporter unavailable, spans stay local");
    }

    if let Some(provider) = provider {
        opentelemetry::global::set_tracer_provider(provider);
        info!(endpoint = %tracing.otlp_endpoint, sampling_ratio = tracing.sampling_ratio, "Exporting spans over OTLP");
    }
}

fn otlp_provider(config: &TracingConfig) -> Result<TracerProvider, TraceError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()?;

    Ok(TracerProvider::builder()
        .with_sampler(sampler(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new([KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]))
        .with_batch_exporter(exporter, runtime::Tokio)
        .build())
}

fn sampler(ratio: f64) -> Sampler {
    match ratio {
        r if r >= 1.0 => Sampler::AlwaysOn,
        r if r <= 0.0 => Sampler::AlwaysOff,
        r => Sampler::TraceIdRatioBased(r),
    }
}

/// Flushes buffered spans
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}
