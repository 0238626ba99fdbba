use crate::aggregate::{AggregateStats, Aggregator};
use crate::config::Config;
use crate::error::Result;
use crate::records::{load_canonical, load_raw_rows, save_canonical};
use crate::storage::{StandingsStore, StoreSummary, SyncReport};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Result of the clean stage (raw rows -> canonical file)
#[derive(Debug, Default, Serialize)]
pub struct CleanReport {
    pub raw_rows: usize,
    pub drivers: usize,
    pub stats: AggregateStats,
    /// `None` when there was nothing to clean and no file was written
    pub output_file: Option<PathBuf>,
}

/// Result of the load stage (canonical file -> store)
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    pub drivers_read: usize,
    pub sync: SyncReport,
    /// `None` when the store was not opened
    pub summary: Option<StoreSummary>,
}

#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub clean: CleanReport,
    pub load: LoadReport,
}

#[instrument(skip(config))]
pub fn run_clean(config: &Config) -> Result<CleanReport> {
    info!("Starting data cleaning");
    let rows = load_raw_rows(&config.raw_path());
    if rows.is_empty() {
        warn!("No raw data found to clean");
        return Ok(CleanReport::default());
    }

    let aggregation = Aggregator::fold(&rows);
    let output = config.clean_path();
    save_canonical(&output, &aggregation.drivers)?;
    info!("Cleaning completed. {} drivers processed", aggregation.drivers.len());

    Ok(CleanReport {
        raw_rows: rows.len(),
        drivers: aggregation.drivers.len(),
        stats: aggregation.stats,
        output_file: Some(output),
    })
}

#[instrument(skip(config))]
pub fn run_load(config: &Config) -> Result<LoadReport> {
    info!("Starting loader");
    let drivers = load_canonical(&config.clean_path());
    if drivers.is_empty() {
        warn!("No cleaned data found to load");
        return Ok(LoadReport::default());
    }

    let mut store = StandingsStore::open(config.db_path())?;
    let sync = store.sync(&drivers)?;
    let summary = store.verify()?;
    info!("Loader finished");

    Ok(LoadReport {
        drivers_read: drivers.len(),
        sync,
        summary: Some(summary),
    })
}

/// Clean then load, stopping at the first stage error
pub fn run_all(config: &Config) -> Result<RunReport> {
    let clean = run_clean(config)?;
    let load = run_load(config)?;
    Ok(RunReport { clean, load })
}

/// Read-only check of the configured store
pub fn run_verify(config: &Config) -> Result<StoreSummary> {
    let path = config.db_path();
    if !path.exists() {
        warn!("No database at {}", path.display());
        return Ok(StoreSummary::default());
    }
    StandingsStore::open(path)?.verify()
}
