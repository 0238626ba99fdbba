use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One raw standings observation as written by the acquisition stage.
///
/// Nothing here is trusted yet: any field may be absent, null, a string, or
/// a number. The normalizer turns these into typed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Value>,
    #[serde(rename = "Position", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
    #[serde(rename = "Driver", default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Value>,
    #[serde(rename = "Nationality", default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<Value>,
    #[serde(rename = "Team", default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Value>,
    #[serde(rename = "Points", default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Value>,
}

/// A single season of a driver's career after deduplication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerSeason {
    pub year: i32,
    pub position: String,
    pub team: String,
    pub points: f64,
}

/// The canonical record for one driver, rebuilt from raw rows on every run.
///
/// `total_points` is the sum of `points` over `career_history`, and the
/// history holds at most one season per year, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDriver {
    pub driver_name: String,
    pub nationality: String,
    pub total_points: f64,
    pub career_history: Vec<CareerSeason>,
}

impl CanonicalDriver {
    pub fn new(driver_name: String, nationality: String) -> Self {
        Self {
            driver_name,
            nationality,
            total_points: 0.0,
            career_history: Vec::new(),
        }
    }

    /// Record a season and fold its points into the running total
    pub fn push_season(&mut self, season: CareerSeason) {
        self.total_points += season.points;
        self.career_history.push(season);
    }
}
