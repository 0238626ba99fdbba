use crate::constants;
use crate::error::{Result, StandingsError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File locations for the three pipeline artifacts plus the log directory.
///
/// Relative file names are resolved against `data_dir`; absolute paths are
/// used as given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub raw_file: PathBuf,
    pub clean_file: PathBuf,
    pub db_file: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(constants::DEFAULT_DATA_DIR),
            raw_file: PathBuf::from(constants::RAW_FILE_NAME),
            clean_file: PathBuf::from(constants::CLEAN_FILE_NAME),
            db_file: PathBuf::from(constants::DB_FILE_NAME),
            log_dir: PathBuf::from(constants::DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// Load configuration from an explicit TOML file, or from
    /// `standings.toml` in the working directory when present, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StandingsError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(constants::ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(db) = std::env::var(constants::ENV_DB_FILE) {
            if !db.trim().is_empty() {
                self.db_file = PathBuf::from(db);
            }
        }
    }

    pub fn raw_path(&self) -> PathBuf {
        self.resolve(&self.raw_file)
    }

    pub fn clean_path(&self) -> PathBuf {
        self.resolve(&self.clean_file)
    }

    pub fn db_path(&self) -> PathBuf {
        self.resolve(&self.db_file)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }
}
