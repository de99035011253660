//! Tracing subscriber wiring.
//!
//! Events go to stdout as text or JSON. The level filter sits behind a reload
//! layer so the configuration file can switch the workspace crates to debug
//! after it has been read. When `OTEL_EXPORTER_OTLP_ENDPOINT` is set, spans
//! are also exported over OTLP.

use anyhow::Context as _;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider as SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::args::LogFormat;

const DEFAULT_DIRECTIVES: &str = "info";
const DEBUG_DIRECTIVES: &str =
    "info,triage=debug,pipeline=debug,github=debug,llm=debug,repository=debug";
const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
const TRACER_NAME: &str = "issue-triage";

/// Keeps the subscriber's reload handle and the span exporter alive.
pub struct Observability {
    filter: reload::Handle<EnvFilter, Registry>,
    filter_from_env: bool,
    tracer_provider: Option<SdkTracerProvider>,
}

impl Observability {
    /// Installs the global subscriber.
    pub fn init(format: LogFormat) -> anyhow::Result<Self> {
        let (filter, filter_from_env) = match EnvFilter::try_from_default_env() {
            Ok(filter) => (filter, true),
            Err(_) => (EnvFilter::new(DEFAULT_DIRECTIVES), false),
        };
        let (filter, handle) = reload::Layer::new(filter);

        let tracer_provider = if std::env::var_os(OTLP_ENDPOINT_ENV).is_some() {
            Some(otlp_tracer_provider()?)
        } else {
            None
        };
        let otel = tracer_provider.as_ref().map(|provider| {
            tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME))
        });

        let (json, text) = match format {
            LogFormat::Json => (Some(fmt::layer().json().with_current_span(true)), None),
            LogFormat::Text => (None, Some(fmt::layer())),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(otel)
            .with(json)
            .with(text)
            .try_init()
            .context("failed to install tracing subscriber")?;

        Ok(Self {
            filter: handle,
            filter_from_env,
            tracer_provider,
        })
    }

    /// Turns on debug events for the workspace crates.
    ///
    /// An explicit `RUST_LOG` always wins over the configuration file.
    pub fn enable_debug(&self) -> anyhow::Result<()> {
        if self.filter_from_env {
            return Ok(());
        }
        self.filter
            .modify(|filter| *filter = EnvFilter::new(DEBUG_DIRECTIVES))
            .context("failed to raise log level")
    }
}

impl Drop for Observability {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to flush spans: {err}");
            }
        }
    }
}

fn otlp_tracer_provider() -> anyhow::Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .context("failed to build OTLP span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build())
}
