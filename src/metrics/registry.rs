//! Registers every phase's metrics and detects naming conflicts early.

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Register all phase metrics, returning how many distinct names were seen
pub fn register_all_metrics() -> usize {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::aggregate::AggregateMetrics>(&mut all_metrics);
    register_phase_metrics::<super::sync::SyncMetrics>(&mut all_metrics);

    all_metrics.len()
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();
    let docs = T::metrics_documentation();
    debug!("Registering {} metrics for phase '{}'", docs.len(), phase_name);

    for doc in docs {
        if phase_of(doc.name) != phase_name {
            warn!("Metric '{}' is outside the '{}' namespace", doc.name, phase_name);
        }
        if let Some(existing) = all_metrics.get(doc.name) {
            warn!(
                "Metric name conflict: '{}' ({}) redefined by phase '{}'",
                doc.name, existing.help, phase_name
            );
        } else {
            all_metrics.insert(doc.name, doc);
        }
    }
}

/// Extract phase name from metric name (e.g. "standings_sync_runs_total" -> "sync")
pub fn phase_of(metric_name: &str) -> &str {
    metric_name
        .strip_prefix("standings_")
        .and_then(|rest| rest.split('_').next())
        .filter(|phase| !phase.is_empty())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_are_derived_from_prefix() {
        assert_eq!(phase_of("standings_sync_runs_total"), "sync");
        assert_eq!(phase_of("standings_aggregate_duplicates_total"), "aggregate");
        assert_eq!(phase_of("invalid_metric_name"), "unknown");
    }

    #[test]
    fn phases_do_not_share_metric_names() {
        // 6 aggregate + 8 sync, all distinct
        assert_eq!(register_all_metrics(), 14);
    }
}
