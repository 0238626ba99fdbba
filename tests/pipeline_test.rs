use serde_json::json;
use standings_sync::config::Config;
use standings_sync::pipeline::{run_all, run_clean, run_load, run_verify};
use standings_sync::records::load_canonical;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config_for(dir: &Path) -> Config {
    Config {
        data_dir: dir.to_path_buf(),
        ..Config::default()
    }
}

fn write_raw(config: &Config, rows: serde_json::Value) {
    fs::write(config.raw_path(), serde_json::to_string_pretty(&rows).unwrap()).unwrap();
}

#[test]
fn clean_folds_duplicates_into_canonical_file() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());
    write_raw(
        &config,
        json!([
            {"Year": 2023, "Position": "1", "Driver": "Max V", "Nationality": "ned", "Team": "Red Bull", "Points": "575"},
            {"Year": 2023, "Position": "1", "Driver": "Max V", "Nationality": "ned", "Team": "Red Bull", "Points": "575"},
            {"Year": 2022, "Position": "1", "Driver": "Max V", "Nationality": "ned", "Team": "Red Bull", "Points": "454"}
        ]),
    );

    let report = run_clean(&config).unwrap();
    assert_eq!(report.raw_rows, 3);
    assert_eq!(report.drivers, 1);
    assert_eq!(report.stats.duplicates, 1);

    let drivers = load_canonical(&config.clean_path());
    assert_eq!(drivers[0].driver_name, "Max V");
    assert_eq!(drivers[0].nationality, "NED");
    assert_eq!(drivers[0].total_points, 1029.0);
    let years: Vec<i32> = drivers[0].career_history.iter().map(|s| s.year).collect();
    assert_eq!(years, vec![2023, 2022]);
}

#[test]
fn missing_raw_file_writes_nothing() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());

    let report = run_clean(&config).unwrap();
    assert!(report.output_file.is_none());
    assert!(!config.clean_path().exists());
}

#[test]
fn load_without_canonical_file_never_creates_the_store() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());

    let report = run_load(&config).unwrap();
    assert!(report.sync.is_noop());
    assert!(report.summary.is_none());
    assert!(!config.db_path().exists());
    assert_eq!(run_verify(&config).unwrap().drivers, 0);
}

#[test]
fn rerun_with_updated_standings_replaces_stale_rows() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());

    write_raw(
        &config,
        json!([
            {"Year": 2021, "Driver": "Kimi Räikkönen", "Nationality": "fin", "Team": "Alfa Romeo", "Points": "10"},
            {"Year": 2021, "Driver": "Sebastian Vettel", "Nationality": "ger", "Team": "Aston Martin", "Points": "43"}
        ]),
    );
    let first = run_all(&config).unwrap();
    assert_eq!(first.load.sync.drivers_inserted, 2);
    assert_eq!(first.load.summary.unwrap().drivers, 2);

    let unchanged = run_all(&config).unwrap();
    assert_eq!(unchanged.load.sync.drivers_updated, 2);
    assert_eq!(unchanged.load.sync.total_deleted(), 0);

    write_raw(
        &config,
        json!([
            {"Year": 2021, "Driver": "Sebastian Vettel", "Nationality": "ger", "Team": "Aston Martin", "Points": "43"},
            {"Year": 2022, "Driver": "Sebastian Vettel", "Nationality": "ger", "Team": "Aston Martin", "Points": "N/A"}
        ]),
    );
    let updated = run_all(&config).unwrap();
    assert_eq!(updated.clean.stats.coercion_fallbacks, 1);
    assert_eq!(updated.load.sync.drivers_deleted, 1);
    assert_eq!(updated.load.sync.seasons_deleted, 1);
    assert_eq!(updated.load.sync.seasons_inserted, 1);

    let summary = run_verify(&config).unwrap();
    assert_eq!(summary.drivers, 1);
    assert_eq!(summary.seasons, 2);
}
