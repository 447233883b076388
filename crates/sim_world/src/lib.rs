//! Configuration loading and session construction shared between sim_cli and sim_bench.

use anyhow::{ensure, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use sim_core::{Constants, SessionConfig, SimulationClock, StationDef};
use std::collections::HashSet;
use std::path::Path;

#[derive(Deserialize)]
struct StationsFile {
    config_version: String,
    stations: Vec<StationDef>,
}

/// Rejects configs no session can be built from: no stations, blank ids, or
/// ids used twice. Numeric problems are left to `SessionConfig::normalize`.
pub fn validate_config(config: &SessionConfig) -> Result<()> {
    ensure!(
        !config.stations.is_empty(),
        "config '{}' defines no stations",
        config.config_version
    );
    let mut seen: HashSet<&str> = HashSet::new();
    for station in &config.stations {
        ensure!(
            !station.id.0.trim().is_empty(),
            "config '{}' has a station with an empty id",
            config.config_version
        );
        ensure!(
            seen.insert(station.id.0.as_str()),
            "station id '{}' is defined more than once",
            station.id
        );
    }
    Ok(())
}

pub fn load_config(content_dir: &str) -> Result<SessionConfig> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let stations_file: StationsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("stations.json")).context("reading stations.json")?,
    )
    .context("parsing stations.json")?;
    let config = SessionConfig {
        config_version: stations_file.config_version,
        constants,
        stations: stations_file.stations,
    };
    validate_config(&config)?;
    Ok(config)
}

/// A fresh clock whose RNG stream is fully determined by `seed`.
pub fn build_clock(config: SessionConfig, seed: u64) -> SimulationClock<ChaCha8Rng> {
    SimulationClock::new(config, seed, ChaCha8Rng::seed_from_u64(seed))
}

/// `YYYYMMDD_HHMMSS_seedN`, UTC.
pub fn generate_run_id(seed: u64) -> String {
    let now = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{now}_seed{seed}")
}

pub fn create_run_dir(root: &Path, run_id: &str) -> Result<std::path::PathBuf> {
    let dir = root.join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

/// Writes `run_info.json` into `dir`. `args` carries runner-specific settings.
pub fn write_run_info(
    dir: &Path,
    run_id: &str,
    seed: u64,
    config_version: &str,
    metrics_every: u64,
    runner: &str,
    args: &serde_json::Value,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": chrono::Utc::now().to_rfc3339(),
        "config_version": config_version,
        "metrics_every": metrics_every,
        "runner": runner,
        "args": args,
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::test_fixtures::base_config;
    use sim_core::StationId;

    fn write_content(dir: &Path, config: &SessionConfig) {
        std::fs::write(
            dir.join("constants.json"),
            serde_json::to_string(&config.constants).unwrap(),
        )
        .unwrap();
        let stations = serde_json::json!({
            "config_version": config.config_version,
            "stations": config.stations,
        });
        std::fs::write(dir.join("stations.json"), stations.to_string()).unwrap();
    }

    #[test]
    fn test_valid_config_passes_validation() {
        validate_config(&base_config()).unwrap();
    }

    #[test]
    fn test_empty_station_list_is_rejected() {
        let mut config = base_config();
        config.stations.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("defines no stations"));
    }

    #[test]
    fn test_duplicate_station_id_is_rejected() {
        let mut config = base_config();
        config.stations[1].id = config.stations[0].id.clone();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_blank_station_id_is_rejected() {
        let mut config = base_config();
        config.stations[2].id = StationId("  ".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_config_round_trips_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = base_config();
        write_content(dir.path(), &config);

        let loaded = load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.config_version, config.config_version);
        assert_eq!(loaded.stations.len(), config.stations.len());
        assert!((loaded.constants.max_work - config.constants.max_work).abs() < 1e-5);
    }

    #[test]
    fn test_missing_file_names_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_config(dir.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("constants.json"));
    }

    #[test]
    fn test_optional_station_fields_default() {
        let dir = tempfile::TempDir::new().unwrap();
        write_content(dir.path(), &base_config());
        std::fs::write(
            dir.path().join("stations.json"),
            r#"{"config_version":"v","stations":[{"id":"desk","min_time_to_break_secs":1.0,
                "max_time_to_break_secs":2.0,"break_weight":1.0,"bait_weight":0.0}]}"#,
        )
        .unwrap();

        let loaded = load_config(dir.path().to_str().unwrap()).unwrap();
        assert!(!loaded.stations[0].requires_proximity);
    }

    #[test]
    fn test_build_clock_is_seed_deterministic() {
        let a = build_clock(base_config(), 9);
        let b = build_clock(base_config(), 9);
        assert_eq!(a.state().meta.session_id, b.state().meta.session_id);
        assert_eq!(a.state().meta.seed, 9);
        let countdowns = |c: &SimulationClock<ChaCha8Rng>| -> Vec<f32> {
            c.state().stations.iter().map(|s| s.countdown_secs).collect()
        };
        assert_eq!(countdowns(&a), countdowns(&b));
    }

    #[test]
    fn test_write_run_info() {
        let dir = tempfile::TempDir::new().unwrap();
        write_run_info(
            dir.path(),
            "run_1",
            7,
            "0.1.0",
            10,
            "sim_cli",
            &serde_json::json!({"seconds": 60.0}),
        )
        .unwrap();

        let text = std::fs::read_to_string(dir.path().join("run_info.json")).unwrap();
        let info: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(info["seed"], 7);
        assert_eq!(info["runner"], "sim_cli");
        assert_eq!(info["args"]["seconds"], 60.0);
    }

    #[test]
    fn test_run_id_carries_seed() {
        assert!(generate_run_id(123).ends_with("_seed123"));
    }
}
