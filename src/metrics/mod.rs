//! Metrics for the reconcile and sync phases
//!
//! Each phase defines its own metrics in a dedicated submodule. Emission goes
//! through the `metrics` facade, so it is a no-op until a recorder is
//! installed with [`init_metrics`].

pub mod aggregate;
pub mod registry;
pub mod sync;

pub use aggregate::AggregateMetrics;
pub use sync::SyncMetrics;

use crate::error::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register all phase metrics.
///
/// Idempotent. No HTTP listener is started; callers render a snapshot with
/// [`write_snapshot`] once the run is over.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Prometheus handle was already set");
            }
            let registered = registry::register_all_metrics();
            info!("Prometheus recorder installed with {} metrics", registered);
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Render the current metric values in Prometheus text format
pub fn render_snapshot() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// Write a text snapshot for a node-exporter textfile collector
pub fn write_snapshot(path: &Path) -> Result<()> {
    let Some(body) = render_snapshot() else {
        warn!("Metrics recorder not installed; skipping snapshot");
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    info!("Wrote metrics snapshot to {}", path.display());
    Ok(())
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase so they show up before first use
    fn register_metrics();

    fn phase_name() -> &'static str;

    /// Documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Builds metric names following `standings_{phase}_{metric_name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("standings_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("standings_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("standings_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
