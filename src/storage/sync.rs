//! Replace-by-timestamp reconciliation of canonical drivers into the store.
//!
//! One call is one transaction: every driver and season in the input is
//! upserted and stamped with the run stamp, then every row not carrying that
//! stamp is deleted. Row-level failures are counted and skipped; anything
//! that breaks the transaction itself rolls the whole call back.

use super::StandingsStore;
use crate::error::Result;
use crate::metrics::SyncMetrics;
use crate::types::{CanonicalDriver, CareerSeason};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rusqlite::{params, OptionalExtension, Transaction};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Fixed-width UTC stamp; lexical order equals chronological order
pub const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// GLOB matching text written with [`STAMP_FORMAT`]
const STAMP_GLOB: &str = "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]T[0-9][0-9]:[0-9][0-9]:[0-9][0-9].[0-9][0-9][0-9][0-9][0-9][0-9]Z";

/// What happened to a single driver or season row
#[derive(Debug, Clone, PartialEq)]
pub enum EntityOutcome {
    Inserted,
    Updated,
    /// Not attempted because its parent driver row failed
    Skipped,
    Failed(String),
}

/// Counts from one sync call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    /// `None` when the call had no input and touched nothing
    pub run_stamp: Option<String>,
    pub drivers_inserted: usize,
    pub drivers_updated: usize,
    pub drivers_deleted: usize,
    pub seasons_inserted: usize,
    pub seasons_updated: usize,
    pub seasons_deleted: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl SyncReport {
    pub fn total_deleted(&self) -> usize {
        self.drivers_deleted + self.seasons_deleted
    }

    /// Committed, but some rows could not be written
    pub fn is_degraded(&self) -> bool {
        self.errors > 0
    }

    pub fn is_noop(&self) -> bool {
        self.run_stamp.is_none()
    }

    fn record_driver(&mut self, outcome: &EntityOutcome) {
        match outcome {
            EntityOutcome::Inserted => self.drivers_inserted += 1,
            EntityOutcome::Updated => self.drivers_updated += 1,
            EntityOutcome::Skipped => self.skipped += 1,
            EntityOutcome::Failed(_) => self.errors += 1,
        }
    }

    fn record_season(&mut self, outcome: &EntityOutcome) {
        match outcome {
            EntityOutcome::Inserted => self.seasons_inserted += 1,
            EntityOutcome::Updated => self.seasons_updated += 1,
            EntityOutcome::Skipped => self.skipped += 1,
            EntityOutcome::Failed(_) => self.errors += 1,
        }
    }
}

pub struct SyncEngine<'a> {
    store: &'a mut StandingsStore,
}

impl<'a> SyncEngine<'a> {
    pub fn new(store: &'a mut StandingsStore) -> Self {
        Self { store }
    }

    /// Sync using the wall clock for the run stamp
    pub fn sync(self, drivers: &[CanonicalDriver]) -> Result<SyncReport> {
        self.sync_at(drivers, Utc::now())
    }

    /// Sync with an explicit clock reading.
    ///
    /// The stamp actually used is `now` at microsecond precision, moved
    /// forward past the newest stamp already stored if the clock has not
    /// advanced beyond it.
    #[instrument(skip(self, drivers), fields(drivers = drivers.len()))]
    pub fn sync_at(self, drivers: &[CanonicalDriver], now: DateTime<Utc>) -> Result<SyncReport> {
        if drivers.is_empty() {
            warn!("No data to insert");
            return Ok(SyncReport::default());
        }

        let started = Instant::now();
        let tx = self.store.connection_mut().transaction()?;
        let report = match apply(&tx, drivers, now) {
            Ok(report) => report,
            Err(e) => {
                error!("Critical database error, rolling back: {}", e);
                SyncMetrics::record_rollback();
                // SQLite may already have rolled back on its own
                if !tx.is_autocommit() {
                    if let Err(rb) = tx.rollback() {
                        error!("Rollback failed: {}", rb);
                    }
                }
                return Err(e.into());
            }
        };
        if let Err(e) = tx.commit() {
            error!("Commit failed, run discarded: {}", e);
            SyncMetrics::record_rollback();
            return Err(e.into());
        }

        info!(
            "Drivers in db: {} New | {} Updated",
            report.drivers_inserted, report.drivers_updated
        );
        info!(
            "Career history: {} New | {} Updated",
            report.seasons_inserted, report.seasons_updated
        );
        info!("Deleted: {} old records", report.total_deleted());
        if report.is_degraded() {
            warn!("Errors: {} ({} rows skipped)", report.errors, report.skipped);
        }
        SyncMetrics::record_report(&report, started.elapsed().as_secs_f64());
        Ok(report)
    }
}

fn apply(
    tx: &Transaction<'_>,
    drivers: &[CanonicalDriver],
    now: DateTime<Utc>,
) -> rusqlite::Result<SyncReport> {
    let stamp = next_run_stamp(tx, now)?;
    let mut report = SyncReport {
        run_stamp: Some(stamp.clone()),
        ..SyncReport::default()
    };

    for driver in drivers {
        let outcome = settle(tx, upsert_driver(tx, driver, &stamp), &driver.driver_name, None)?;
        report.record_driver(&outcome);
        let driver_failed = matches!(outcome, EntityOutcome::Failed(_));

        for season in &driver.career_history {
            let outcome = if driver_failed {
                EntityOutcome::Skipped
            } else {
                settle(
                    tx,
                    upsert_season(tx, &driver.driver_name, season, &stamp),
                    &driver.driver_name,
                    Some(season.year),
                )?
            };
            report.record_season(&outcome);
        }
    }

    // Every row reaffirmed by this run now carries `stamp`; anything else is
    // stale, including NULL or malformed stamps not written by this engine.
    report.seasons_deleted = tx.execute(
        "DELETE FROM career_path WHERE last_updated IS NOT ?1",
        params![stamp],
    )?;
    report.drivers_deleted = tx.execute(
        "DELETE FROM drivers WHERE last_updated IS NOT ?1",
        params![stamp],
    )?;
    Ok(report)
}

/// Collapse a row-level result into an outcome, logging failures.
///
/// A failure that also ended the transaction is returned as an error: any
/// further write would run in autocommit mode and outlive a rollback.
fn settle(
    tx: &Transaction<'_>,
    result: rusqlite::Result<EntityOutcome>,
    driver_name: &str,
    year: Option<i32>,
) -> rusqlite::Result<EntityOutcome> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(e) if tx.is_autocommit() => Err(e),
        Err(e) => {
            match year {
                Some(year) => error!("SQL error processing {} ({}): {}", driver_name, year, e),
                None => error!("SQL error processing {}: {}", driver_name, e),
            }
            Ok(EntityOutcome::Failed(e.to_string()))
        }
    }
}

fn upsert_driver(
    tx: &Transaction<'_>,
    driver: &CanonicalDriver,
    stamp: &str,
) -> rusqlite::Result<EntityOutcome> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM drivers WHERE name = ?1",
            params![driver.driver_name],
            |row| row.get(0),
        )
        .optional()?;

    if existing.is_some() {
        tx.execute(
            "UPDATE drivers SET nationality = ?1, total_points = ?2, last_updated = ?3 WHERE name = ?4",
            params![driver.nationality, driver.total_points, stamp, driver.driver_name],
        )?;
        Ok(EntityOutcome::Updated)
    } else {
        tx.execute(
            "INSERT INTO drivers (name, nationality, total_points, last_updated) VALUES (?1, ?2, ?3, ?4)",
            params![driver.driver_name, driver.nationality, driver.total_points, stamp],
        )?;
        Ok(EntityOutcome::Inserted)
    }
}

fn upsert_season(
    tx: &Transaction<'_>,
    driver_name: &str,
    season: &CareerSeason,
    stamp: &str,
) -> rusqlite::Result<EntityOutcome> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM career_path WHERE driver_name = ?1 AND year = ?2",
            params![driver_name, season.year],
            |row| row.get(0),
        )
        .optional()?;

    if existing.is_some() {
        tx.execute(
            "UPDATE career_path SET position = ?1, team = ?2, points = ?3, last_updated = ?4
             WHERE driver_name = ?5 AND year = ?6",
            params![season.position, season.team, season.points, stamp, driver_name, season.year],
        )?;
        Ok(EntityOutcome::Updated)
    } else {
        tx.execute(
            "INSERT INTO career_path (driver_name, year, position, team, points, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![driver_name, season.year, season.position, season.team, season.points, stamp],
        )?;
        Ok(EntityOutcome::Inserted)
    }
}

/// A stamp strictly newer than every well-formed stamp already stored.
/// Malformed stamps are ignored here and pruned by the run.
fn next_run_stamp(tx: &Transaction<'_>, now: DateTime<Utc>) -> rusqlite::Result<String> {
    let latest: Option<String> = tx.query_row(
        "SELECT MAX(ts) FROM (
             SELECT MAX(last_updated) AS ts FROM drivers WHERE last_updated GLOB ?1
             UNION ALL
             SELECT MAX(last_updated) FROM career_path WHERE last_updated GLOB ?1
         )",
        params![STAMP_GLOB],
        |row| row.get(0),
    )?;

    let mut stamp = now.trunc_subsecs(6);
    if let Some(latest) = latest {
        match DateTime::parse_from_rfc3339(&latest) {
            Ok(latest) => {
                let latest = latest.with_timezone(&Utc);
                if stamp <= latest {
                    stamp = latest.trunc_subsecs(6) + Duration::microseconds(1);
                }
            }
            Err(_) => warn!("Ignoring unparseable stored stamp '{}'", latest),
        }
    }
    Ok(format_stamp(stamp))
}

pub fn format_stamp(at: DateTime<Utc>) -> String {
    at.format(STAMP_FORMAT).to_string()
}
