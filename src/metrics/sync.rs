//! Sync Phase Metrics
//!
//! Per-relation write counts and failure counters for store reconciliation.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};
use crate::storage::SyncReport;

pub struct SyncMetrics;

impl SyncMetrics {
    /// Record the outcome of a committed sync
    pub fn record_report(report: &SyncReport, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "sync", "runs")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "sync", "rows_inserted"))
            .increment((report.drivers_inserted + report.seasons_inserted) as u64);
        ::metrics::counter!(phase_metric!(counter, "sync", "rows_updated"))
            .increment((report.drivers_updated + report.seasons_updated) as u64);
        ::metrics::counter!(phase_metric!(counter, "sync", "rows_deleted"))
            .increment(report.total_deleted() as u64);
        ::metrics::counter!(phase_metric!(counter, "sync", "row_errors"))
            .increment(report.errors as u64);
        ::metrics::histogram!(phase_metric!(histogram, "sync", "duration_seconds"))
            .record(duration_secs);
    }

    /// Record a sync that was rolled back
    pub fn record_rollback() {
        ::metrics::counter!(phase_metric!(counter, "sync", "rollbacks")).increment(1);
    }

    pub fn record_verified_drivers(count: u64) {
        ::metrics::gauge!(phase_metric!(gauge, "sync", "stored_drivers")).set(count as f64);
    }
}

impl PhaseMetrics for SyncMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "sync", "runs"));
        let _ = counter!(phase_metric!(counter, "sync", "rows_inserted"));
        let _ = counter!(phase_metric!(counter, "sync", "rows_updated"));
        let _ = counter!(phase_metric!(counter, "sync", "rows_deleted"));
        let _ = counter!(phase_metric!(counter, "sync", "row_errors"));
        let _ = counter!(phase_metric!(counter, "sync", "rollbacks"));
        let _ = gauge!(phase_metric!(gauge, "sync", "stored_drivers"));
        let _ = histogram!(phase_metric!(histogram, "sync", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "sync"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "sync", "runs"),
                metric_type: MetricType::Counter,
                help: "Committed sync runs",
            },
            MetricDoc {
                name: phase_metric!(counter, "sync", "rows_inserted"),
                metric_type: MetricType::Counter,
                help: "Driver and season rows inserted",
            },
            MetricDoc {
                name: phase_metric!(counter, "sync", "rows_updated"),
                metric_type: MetricType::Counter,
                help: "Driver and season rows restamped in place",
            },
            MetricDoc {
                name: phase_metric!(counter, "sync", "rows_deleted"),
                metric_type: MetricType::Counter,
                help: "Stale driver and season rows pruned",
            },
            MetricDoc {
                name: phase_metric!(counter, "sync", "row_errors"),
                metric_type: MetricType::Counter,
                help: "Per-row write failures absorbed during sync",
            },
            MetricDoc {
                name: phase_metric!(counter, "sync", "rollbacks"),
                metric_type: MetricType::Counter,
                help: "Sync runs rolled back on a transaction-level failure",
            },
            MetricDoc {
                name: phase_metric!(gauge, "sync", "stored_drivers"),
                metric_type: MetricType::Gauge,
                help: "Driver rows present after the last verification",
            },
            MetricDoc {
                name: phase_metric!(histogram, "sync", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent inside a sync transaction",
            },
        ]
    }
}
