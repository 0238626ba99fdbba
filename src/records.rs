//! Reading and writing the intermediate JSON files between stages.

use crate::error::Result;
use crate::types::{CanonicalDriver, RawRow};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Raw rows written by the acquisition stage; empty when the file is
/// missing or unreadable.
pub fn load_raw_rows(path: &Path) -> Vec<RawRow> {
    load_list(path)
}

/// Canonical drivers written by the clean stage; empty when the file is
/// missing or unreadable.
pub fn load_canonical(path: &Path) -> Vec<CanonicalDriver> {
    load_list(path)
}

fn load_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        error!("File not found: {}", path.display());
        return Vec::new();
    }
    match read_list(path) {
        Ok(records) => {
            info!("Loaded {} records from {}", records.len(), path.display());
            records
        }
        Err(e) => {
            error!("Error loading {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write canonical drivers as indented JSON, keeping non-ASCII text as is
pub fn save_canonical(path: &Path, drivers: &[CanonicalDriver]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(drivers)?;
    fs::write(path, json)?;
    info!("Saved {} canonical drivers to {}", drivers.len(), path.display());
    Ok(())
}
