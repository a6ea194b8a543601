//! Tracer wiring: the global subscriber and the per-request span middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Tracer settings, mirroring a hosted tracer's configure block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerConfig {
    /// Recorded as the `service` field of every request span.
    pub service_name: String,
    /// Verbose filter and span-close reporting.
    pub debug: bool,
    /// When false, requests are not wrapped in spans.
    pub enabled: bool,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            service_name: "my-app".to_string(),
            debug: true,
            enabled: true,
        }
    }
}

impl TracerConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> &'static str {
        if self.debug {
            "info,kennel=debug,kennel_core=debug,kennel_server=debug"
        } else {
            "info"
        }
    }
}

/// Install the global fmt subscriber. `RUST_LOG` overrides the configured level.
/// Records emitted through the `log` facade are forwarded as well.
pub fn init(config: &TracerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));
    let span_events = if config.debug && config.enabled {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .try_init()
    {
        tracing::debug!(error = %e, "global subscriber already installed");
    }
}

/// Run each request inside an `http.request` span tagged with the service name.
pub async fn trace_requests(
    State(service): State<String>,
    request: Request,
    next: Next,
) -> Response {
    let span = tracing::info_span!(
        "http.request",
        service = %service,
        method = %request.method(),
        path = %request.uri().path(),
        status = tracing::field::Empty,
    );

    let response = next.run(request).instrument(span.clone()).await;
    span.record("status", response.status().as_u16());
    tracing::debug!(parent: &span, status = response.status().as_u16(), "finished request");
    response
}
