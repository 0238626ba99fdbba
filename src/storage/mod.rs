//! SQLite persistence for canonical drivers and their career rows.

pub mod schema;
pub mod sync;

pub use sync::{EntityOutcome, SyncEngine, SyncReport};

use crate::error::Result;
use crate::metrics::SyncMetrics;
use crate::types::CanonicalDriver;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Row counts read back after a sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub drivers: u64,
    pub seasons: u64,
}

pub struct StandingsStore {
    conn: Connection,
}

impl StandingsStore {
    /// Open (creating if needed) the store file and apply the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        schema::ensure_schema(&conn)?;
        info!("Database at {}", path.display());
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Reconcile the store with `drivers`; see [`SyncEngine::sync`]
    pub fn sync(&mut self, drivers: &[CanonicalDriver]) -> Result<SyncReport> {
        SyncEngine::new(self).sync(drivers)
    }

    /// Read-only row counts; zero rows is a valid answer, not an error
    pub fn verify(&self) -> Result<StoreSummary> {
        let drivers: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM drivers", [], |row| row.get(0))?;
        let seasons: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM career_path", [], |row| row.get(0))?;
        let summary = StoreSummary {
            drivers: drivers as u64,
            seasons: seasons as u64,
        };
        info!("Verification: DB contains {} drivers", summary.drivers);
        SyncMetrics::record_verified_drivers(summary.drivers);
        Ok(summary)
    }
}
