use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use standings_sync::config::Config;
use standings_sync::{logging, metrics, pipeline};

#[derive(Parser)]
#[command(name = "standings_sync")]
#[command(about = "Reconcile season standings into a per-driver career store")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ./standings.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the intermediate files and the database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Database file, relative to the data directory unless absolute
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Write a Prometheus text snapshot here when the command finishes
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold raw season rows into the canonical driver file
    Clean,
    /// Sync the canonical driver file into the database
    Load,
    /// Count rows in the database
    Verify,
    /// Clean then load
    Run,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(db) = cli.db {
        config.db_file = db;
    }

    logging::init_logging(&config.log_dir);
    if cli.metrics_out.is_some() {
        metrics::init_metrics();
    }

    let outcome = match cli.command {
        Commands::Clean => pipeline::run_clean(&config).map(|report| {
            info!(
                "Clean: {} raw rows -> {} drivers ({} duplicates)",
                report.raw_rows, report.drivers, report.stats.duplicates
            );
        }),
        Commands::Load => pipeline::run_load(&config).map(|report| log_sync(&report.sync)),
        Commands::Verify => pipeline::run_verify(&config).map(|summary| {
            info!("Store holds {} drivers, {} seasons", summary.drivers, summary.seasons);
        }),
        Commands::Run => pipeline::run_all(&config).map(|report| {
            info!(
                "Run: {} raw rows, {} duplicates, {} drivers synced",
                report.clean.raw_rows, report.clean.stats.duplicates, report.load.drivers_read
            );
            log_sync(&report.load.sync);
        }),
    };

    if let Some(path) = cli.metrics_out.as_deref() {
        if let Err(e) = metrics::write_snapshot(path) {
            warn!("Failed to write metrics snapshot: {}", e);
        }
    }

    if let Err(e) = &outcome {
        error!("Run failed: {}", e);
    }
    Ok(outcome?)
}

fn log_sync(report: &standings_sync::SyncReport) {
    if report.is_noop() {
        info!("Store left untouched");
    } else if report.is_degraded() {
        warn!(
            "Sync committed with {} row errors; run is degraded",
            report.errors
        );
    } else {
        info!("Sync committed at {}", report.run_stamp.as_deref().unwrap_or("-"));
    }
}
