//! Aggregate Phase Metrics
//!
//! Row throughput and data-quality counters for folding raw rows into
//! canonical drivers.

use crate::aggregate::AggregateStats;
use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct AggregateMetrics;

impl AggregateMetrics {
    /// Record the counters of one aggregation pass
    pub fn record_pass(stats: &AggregateStats, drivers: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "aggregate", "rows_seen"))
            .increment(stats.rows_seen as u64);
        ::metrics::counter!(phase_metric!(counter, "aggregate", "rows_missing_driver"))
            .increment(stats.rows_missing_driver as u64);
        ::metrics::counter!(phase_metric!(counter, "aggregate", "duplicates"))
            .increment(stats.duplicates as u64);
        ::metrics::counter!(phase_metric!(counter, "aggregate", "coercion_fallbacks"))
            .increment(stats.coercion_fallbacks as u64);
        ::metrics::gauge!(phase_metric!(gauge, "aggregate", "drivers")).set(drivers as f64);
        ::metrics::histogram!(phase_metric!(histogram, "aggregate", "duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for AggregateMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "aggregate", "rows_seen"));
        let _ = counter!(phase_metric!(counter, "aggregate", "rows_missing_driver"));
        let _ = counter!(phase_metric!(counter, "aggregate", "duplicates"));
        let _ = counter!(phase_metric!(counter, "aggregate", "coercion_fallbacks"));
        let _ = gauge!(phase_metric!(gauge, "aggregate", "drivers"));
        let _ = histogram!(phase_metric!(histogram, "aggregate", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "aggregate"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "aggregate", "rows_seen"),
                metric_type: MetricType::Counter,
                help: "Raw rows read by the aggregator",
            },
            MetricDoc {
                name: phase_metric!(counter, "aggregate", "rows_missing_driver"),
                metric_type: MetricType::Counter,
                help: "Raw rows dropped because they carry no driver name",
            },
            MetricDoc {
                name: phase_metric!(counter, "aggregate", "duplicates"),
                metric_type: MetricType::Counter,
                help: "Raw rows dropped as repeats of an earlier (year, driver) pair",
            },
            MetricDoc {
                name: phase_metric!(counter, "aggregate", "coercion_fallbacks"),
                metric_type: MetricType::Counter,
                help: "Year or points fields replaced by their default value",
            },
            MetricDoc {
                name: phase_metric!(gauge, "aggregate", "drivers"),
                metric_type: MetricType::Gauge,
                help: "Canonical drivers produced by the last aggregation",
            },
            MetricDoc {
                name: phase_metric!(histogram, "aggregate", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent folding raw rows",
            },
        ]
    }
}
