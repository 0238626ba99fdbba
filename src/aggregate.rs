//! Folds raw season rows into one canonical record per driver.

use crate::constants::{UNKNOWN_NATIONALITY, UNKNOWN_TEAM};
use crate::metrics::AggregateMetrics;
use crate::normalize::{normalize_field, normalize_text, parse_points, parse_year, value_text};
use crate::types::{CanonicalDriver, CareerSeason, RawRow};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Diagnostic counters from one aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub rows_seen: usize,
    pub rows_missing_driver: usize,
    pub duplicates: usize,
    pub coercion_fallbacks: usize,
}

/// Result of [`Aggregator::fold`]
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub drivers: Vec<CanonicalDriver>,
    pub stats: AggregateStats,
}

/// Insertion-ordered accumulator keyed by normalized driver name.
///
/// Built fresh for every call; nothing is shared between runs.
#[derive(Default)]
pub struct Aggregator {
    index: HashMap<String, usize>,
    drivers: Vec<CanonicalDriver>,
    seen: HashSet<(i32, String)>,
    stats: AggregateStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate `rows` and report the counters alongside the drivers
    #[instrument(skip(rows), fields(rows = rows.len()))]
    pub fn fold(rows: &[RawRow]) -> Aggregation {
        let started = Instant::now();
        let mut aggregator = Self::new();
        for row in rows {
            aggregator.push(row);
        }
        let aggregation = aggregator.finish();

        info!(
            "Folded {} rows into {} drivers ({} duplicates removed, {} without driver)",
            aggregation.stats.rows_seen,
            aggregation.drivers.len(),
            aggregation.stats.duplicates,
            aggregation.stats.rows_missing_driver
        );
        AggregateMetrics::record_pass(
            &aggregation.stats,
            aggregation.drivers.len(),
            started.elapsed().as_secs_f64(),
        );
        aggregation
    }

    /// Fold one raw row. The first row seen for a (year, driver) pair wins.
    pub fn push(&mut self, row: &RawRow) {
        self.stats.rows_seen += 1;

        let driver_name = normalize_text(&value_text(row.driver.as_ref()));
        if driver_name.is_empty() {
            self.stats.rows_missing_driver += 1;
            return;
        }

        let year = parse_year(row.year.as_ref());
        let points = parse_points(row.points.as_ref());
        self.stats.coercion_fallbacks +=
            usize::from(year.is_fallback()) + usize::from(points.is_fallback());
        let year = year.or_default_value(0);
        let points = points.or_default_value(0.0);

        if !self.seen.insert((year, driver_name.clone())) {
            debug!(driver = %driver_name, year, "Dropping duplicate season row");
            self.stats.duplicates += 1;
            return;
        }

        let season = CareerSeason {
            year,
            position: normalize_field(row.position.as_ref(), ""),
            team: normalize_field(row.team.as_ref(), UNKNOWN_TEAM),
            points,
        };

        let slot = match self.index.get(&driver_name).copied() {
            Some(slot) => slot,
            None => {
                let nationality =
                    normalize_field(row.nationality.as_ref(), UNKNOWN_NATIONALITY).to_uppercase();
                self.drivers
                    .push(CanonicalDriver::new(driver_name.clone(), nationality));
                self.index.insert(driver_name, self.drivers.len() - 1);
                self.drivers.len() - 1
            }
        };
        self.drivers[slot].push_season(season);
    }

    /// Order drivers by total points and each history by year, both
    /// descending. Both sorts are stable, so ties keep input order.
    pub fn finish(self) -> Aggregation {
        let mut drivers = self.drivers;
        drivers.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
        for driver in &mut drivers {
            driver.career_history.sort_by(|a, b| b.year.cmp(&a.year));
        }
        Aggregation {
            drivers,
            stats: self.stats,
        }
    }
}

/// Canonical drivers for `rows`; counters are logged, not returned
pub fn aggregate(rows: &[RawRow]) -> Vec<CanonicalDriver> {
    Aggregator::fold(rows).drivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> RawRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn duplicate_season_counts_once() {
        let rows = vec![
            row(json!({"Year": 2023, "Driver": "Max V", "Points": "575"})),
            row(json!({"Year": 2023, "Driver": "Max V", "Points": "575"})),
            row(json!({"Year": 2022, "Driver": "Max V", "Points": "454"})),
        ];
        let result = Aggregator::fold(&rows);

        assert_eq!(result.drivers.len(), 1);
        let max = &result.drivers[0];
        assert_eq!(max.driver_name, "Max V");
        assert_eq!(max.total_points, 1029.0);
        let years: Vec<i32> = max.career_history.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![2023, 2022]);
        assert_eq!(result.stats.duplicates, 1);
    }

    #[test]
    fn first_occurrence_wins() {
        let rows = vec![
            row(json!({"Year": 2021, "Driver": "Lewis Hamilton", "Team": "Mercedes", "Points": "387.5"})),
            row(json!({"Year": "2021", "Driver": " Lewis  Hamilton ", "Team": "Ferrari", "Points": "10"})),
        ];
        let drivers = aggregate(&rows);

        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].total_points, 387.5);
        assert_eq!(drivers[0].career_history[0].team, "Mercedes");
    }

    #[test]
    fn rows_without_driver_are_skipped_not_counted_as_duplicates() {
        let rows = vec![
            row(json!({"Year": 2020, "Points": "10"})),
            row(json!({"Year": 2020, "Driver": "", "Points": "10"})),
            row(json!({"Year": 2020, "Driver": " \n ", "Points": "10"})),
            row(json!({"Year": 2020, "Driver": null})),
        ];
        let result = Aggregator::fold(&rows);

        assert!(result.drivers.is_empty());
        assert_eq!(result.stats.rows_missing_driver, 4);
        assert_eq!(result.stats.duplicates, 0);
    }

    #[test]
    fn malformed_points_fall_back_to_zero() {
        let rows = vec![row(json!({"Year": 2024, "Driver": "Logan Sargeant", "Points": "N/A"}))];
        let result = Aggregator::fold(&rows);

        assert_eq!(result.drivers[0].total_points, 0.0);
        assert_eq!(result.drivers[0].career_history[0].points, 0.0);
        assert_eq!(result.stats.coercion_fallbacks, 1);
    }

    #[test]
    fn normalizes_fields_and_applies_defaults() {
        let rows = vec![row(json!({
            "Year": 2022,
            "Position": 3,
            "Driver": "Charles\nLeclerc",
            "Nationality": " mon "
        }))];
        let drivers = aggregate(&rows);
        let charles = &drivers[0];

        assert_eq!(charles.driver_name, "Charles Leclerc");
        assert_eq!(charles.nationality, "MON");
        assert_eq!(charles.career_history[0].position, "3");
        assert_eq!(charles.career_history[0].team, "Unknown");

        let no_nat = aggregate(&[row(json!({"Year": 2022, "Driver": "X"}))]);
        assert_eq!(no_nat[0].nationality, "UNKNOWN");
    }

    #[test]
    fn null_team_and_nationality_take_the_unknown_default() {
        let rows = vec![row(json!({
            "Year": 2022,
            "Driver": "Nyck de Vries",
            "Nationality": null,
            "Team": null,
            "Position": null
        }))];
        let drivers = aggregate(&rows);

        assert_eq!(drivers[0].nationality, "UNKNOWN");
        assert_eq!(drivers[0].career_history[0].team, "Unknown");
        assert_eq!(drivers[0].career_history[0].position, "");

        // An explicit empty string is kept, not defaulted
        let blank = aggregate(&[row(json!({"Year": 2022, "Driver": "X", "Nationality": "", "Team": ""}))]);
        assert_eq!(blank[0].nationality, "");
        assert_eq!(blank[0].career_history[0].team, "");
    }

    #[test]
    fn orders_drivers_by_points_and_history_by_year() {
        let rows = vec![
            row(json!({"Year": 2019, "Driver": "A", "Points": "10"})),
            row(json!({"Year": 2021, "Driver": "B", "Points": "50"})),
            row(json!({"Year": 2020, "Driver": "C", "Points": "10"})),
            row(json!({"Year": 2021, "Driver": "A", "Points": "5"})),
            row(json!({"Year": 2020, "Driver": "A", "Points": "0"})),
        ];
        let drivers = aggregate(&rows);

        let names: Vec<&str> = drivers.iter().map(|d| d.driver_name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        let a_years: Vec<i32> = drivers[1].career_history.iter().map(|s| s.year).collect();
        assert_eq!(a_years, vec![2021, 2020, 2019]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let rows = vec![
            row(json!({"Year": 2020, "Driver": "Zed", "Points": "8"})),
            row(json!({"Year": 2020, "Driver": "Amy", "Points": "8"})),
            row(json!({"Year": 2020, "Driver": "Bob", "Points": "9"})),
        ];
        let names: Vec<String> = aggregate(&rows).into_iter().map(|d| d.driver_name).collect();
        assert_eq!(names, vec!["Bob", "Zed", "Amy"]);
    }

    #[test]
    fn total_points_matches_history_sum() {
        let rows = vec![
            row(json!({"Year": 2018, "Driver": "Seb", "Points": "320"})),
            row(json!({"Year": 2019, "Driver": "Seb", "Points": "240"})),
            row(json!({"Year": 2019, "Driver": "Seb", "Points": "999"})),
            row(json!({"Year": 2020, "Driver": "Seb", "Points": "33"})),
        ];
        for driver in aggregate(&rows) {
            let sum: f64 = driver.career_history.iter().map(|s| s.points).sum();
            assert!((driver.total_points - sum).abs() < 1e-9);
            assert_eq!(driver.total_points, 593.0);
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = Aggregator::fold(&[]);
        assert!(result.drivers.is_empty());
        assert_eq!(result.stats, AggregateStats::default());
    }
}
