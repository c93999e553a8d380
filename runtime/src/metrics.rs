//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for:
//! - Procedure calls (count by outcome, latency)
//! - Session resolution
//! - Transport batches
//!
//! # Example
//!
//! ```rust,no_run
//! use boothmap_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Serve `server.render()` at http://localhost:9090/metrics
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics recorder and renderer.
///
/// Installs the global recorder; the binary serves [`render`](Self::render)
/// on its own listener at `addr`.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server.
    ///
    /// # Arguments
    ///
    /// * `addr` - Socket address the exposition endpoint binds to (e.g., `0.0.0.0:9090`)
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Address the exposition endpoint binds to.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Describe metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a metrics recorder is already installed (e.g., in tests), the call
    /// succeeds without a handle and [`render`](Self::render) returns `None`.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .set_buckets_for_metric(
                Matcher::Full("procedure_batch_size".to_string()),
                &[1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(
                    addr = %self.addr,
                    "Metrics recorder installed - available at http://{}/metrics",
                    self.addr
                );
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the recorder was not installed by this instance.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "procedure_calls_total",
        "Total number of procedure calls by procedure and outcome"
    );
    describe_histogram!(
        "procedure_duration_seconds",
        "Time taken to execute a procedure call"
    );
    describe_counter!(
        "session_resolutions_total",
        "Total number of session resolutions by outcome"
    );
    describe_histogram!(
        "procedure_batch_size",
        "Number of calls carried by one transport request"
    );
}

/// Procedure call metrics recorder.
pub struct ProcedureMetrics;

impl ProcedureMetrics {
    /// Record one call. `outcome` is `"ok"` or the error code.
    pub fn record_call(procedure: &'static str, outcome: &'static str, duration: Duration) {
        counter!("procedure_calls_total", "procedure" => procedure, "outcome" => outcome)
            .increment(1);
        histogram!("procedure_duration_seconds", "procedure" => procedure)
            .record(duration.as_secs_f64());
    }
}

/// Session resolution metrics recorder.
pub struct SessionMetrics;

impl SessionMetrics {
    /// Record a resolution. `outcome` is `"authenticated"`, `"anonymous"` or `"error"`.
    pub fn record_resolution(outcome: &'static str) {
        counter!("session_resolutions_total", "outcome" => outcome).increment(1);
    }
}

/// Transport batch metrics recorder.
pub struct BatchMetrics;

impl BatchMetrics {
    /// Record the number of calls in one request.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_size(size: usize) {
        histogram!("procedure_batch_size").record(size as f64);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_server_creation() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let server = MetricsServer::new(addr);
        assert!(server.handle().is_none());
        assert_eq!(server.addr(), addr);
    }

    #[tokio::test]
    async fn test_metrics_server_start() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let mut server = MetricsServer::new(addr);

        let result = server.start();
        assert!(result.is_ok());
        // handle is None if another test already installed the recorder
    }

    #[tokio::test]
    async fn test_procedure_metrics() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let mut server = MetricsServer::new(addr);
        server.start().unwrap();

        ProcedureMetrics::record_call("event.getAll", "ok", Duration::from_millis(12));
        ProcedureMetrics::record_call("event.update", "FORBIDDEN", Duration::from_millis(3));
        SessionMetrics::record_resolution("anonymous");
        BatchMetrics::record_size(3);

        if let Some(rendered) = server.render() {
            assert!(rendered.contains("procedure_calls_total"));
            assert!(rendered.contains("procedure_duration_seconds"));
            assert!(rendered.contains("session_resolutions_total"));
        }
    }
}
