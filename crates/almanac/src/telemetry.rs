//! Logging, plus OTLP export of traces, logs and metrics when an endpoint is
//! configured.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::{BatchLogProcessor, SdkLoggerProvider};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{BatchSpanProcessor, RandomIdGenerator, Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Upper bound on each export, so a dead collector can't stall shutdown.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(5);

const SERVICE_NAME: &str = "almanac";

/// Installed providers, kept so `shutdown` can flush them.
struct Providers {
    tracer: SdkTracerProvider,
    logger: SdkLoggerProvider,
    meter: SdkMeterProvider,
}

static PROVIDERS: OnceLock<Providers> = OnceLock::new();

/// `RUST_LOG` wins over the configured level when set.
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Console-only logging on stderr, for CLI commands whose stdout is data.
pub fn init_cli(log_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")
}

/// Server logging. Adds the OpenTelemetry layers when `otlp_endpoint` is set.
pub fn init(log_level: &str, otlp_endpoint: Option<&str>) -> Result<()> {
    let registry = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer());

    let Some(otlp_endpoint) = otlp_endpoint else {
        return registry.try_init().context("Failed to install tracing subscriber");
    };

    let endpoint = match otlp_endpoint.starts_with("http") {
        true => otlp_endpoint.to_owned(),
        false => format!("http://{}", otlp_endpoint),
    };
    let resource = Resource::builder_empty()
        .with_service_name(SERVICE_NAME)
        .with_attributes([KeyValue::new("service.version", env!("CARGO_PKG_VERSION"))])
        .build();

    let providers = Providers {
        tracer: tracer_provider(&endpoint, resource.clone())?,
        logger: logger_provider(&endpoint, resource.clone())?,
        meter: meter_provider(&endpoint, resource)?,
    };

    global::set_tracer_provider(providers.tracer.clone());
    global::set_meter_provider(providers.meter.clone());

    registry
        .with(tracing_opentelemetry::layer().with_tracer(providers.tracer.tracer(SERVICE_NAME)))
        .with(opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge::new(
            &providers.logger,
        ))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    // A second init would already have failed at try_init above.
    let _ = PROVIDERS.set(providers);

    tracing::info!(endpoint = %endpoint, "🔭 OpenTelemetry export enabled");
    Ok(())
}

fn tracer_provider(endpoint: &str, resource: Resource) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(EXPORT_TIMEOUT)
        .build()
        .context("Failed to build OTLP span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_span_processor(BatchSpanProcessor::builder(exporter).build())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build())
}

fn logger_provider(endpoint: &str, resource: Resource) -> Result<SdkLoggerProvider> {
    let exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(EXPORT_TIMEOUT)
        .build()
        .context("Failed to build OTLP log exporter")?;

    Ok(SdkLoggerProvider::builder()
        .with_log_processor(BatchLogProcessor::builder(exporter).build())
        .with_resource(resource)
        .build())
}

fn meter_provider(endpoint: &str, resource: Resource) -> Result<SdkMeterProvider> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(EXPORT_TIMEOUT)
        .build()
        .context("Failed to build OTLP metric exporter")?;

    Ok(SdkMeterProvider::builder()
        .with_reader(PeriodicReader::builder(exporter).build())
        .with_resource(resource)
        .build())
}

/// Flush and stop the OTLP pipelines. No-op when export was never enabled.
pub fn shutdown() {
    let Some(providers) = PROVIDERS.get() else {
        return;
    };
    tracing::info!("🔭 Flushing telemetry");

    if let Err(e) = providers.tracer.shutdown() {
        eprintln!("trace provider shutdown failed: {}", e);
    }
    if let Err(e) = providers.meter.shutdown() {
        eprintln!("meter provider shutdown failed: {}", e);
    }
    if let Err(e) = providers.logger.shutdown() {
        eprintln!("logger provider shutdown failed: {}", e);
    }
}
