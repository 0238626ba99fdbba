pub mod aggregate;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod storage;
pub mod types;

pub use aggregate::{aggregate, Aggregation, Aggregator};
pub use error::{Result, StandingsError};
pub use storage::{StandingsStore, StoreSummary, SyncEngine, SyncReport};
pub use types::{CanonicalDriver, CareerSeason, RawRow};
