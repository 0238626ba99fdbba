/// Default locations and environment keys shared by the CLI and the stages

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_CONFIG_FILE: &str = "standings.toml";

// Intermediate artifacts, relative to the data directory
pub const RAW_FILE_NAME: &str = "drivers.json";
pub const CLEAN_FILE_NAME: &str = "drivers_clean.json";
pub const DB_FILE_NAME: &str = "output.db";

// Environment overrides (also read from `.env`)
pub const ENV_DATA_DIR: &str = "STANDINGS_DATA_DIR";
pub const ENV_DB_FILE: &str = "STANDINGS_DB_FILE";

// Defaults applied before normalization when a raw field is absent
pub const UNKNOWN_NATIONALITY: &str = "Unknown";
pub const UNKNOWN_TEAM: &str = "Unknown";
