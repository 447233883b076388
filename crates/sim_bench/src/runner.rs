use crate::run_result::{self, RunResult, SummaryMetrics};
use anyhow::{Context, Result};
use sim_control::{AutopilotController, CommandSource};
use sim_core::{MetricsSnapshot, SessionConfig, TerminationReason};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Per-seed knobs taken from the scenario.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub max_ticks: u64,
    pub dt: f32,
    pub metrics_every: u64,
    pub reaction_secs: f32,
}

pub struct SeedResult {
    pub seed: u64,
    pub final_snapshot: MetricsSnapshot,
    pub reason: Option<TerminationReason>,
    #[allow(dead_code)]
    pub wall_time_ms: u64,
    pub run_id: String,
}

pub fn run_seed(
    config: &SessionConfig,
    seed: u64,
    settings: RunSettings,
    seed_dir: &Path,
    scenario_name: &str,
    scenario_params: &serde_json::Value,
) -> Result<SeedResult> {
    let run_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let mut clock = sim_world::build_clock(config.clone(), seed);
    let mut autopilot = AutopilotController::new(settings.reaction_secs);

    std::fs::create_dir_all(seed_dir)
        .with_context(|| format!("creating seed directory: {}", seed_dir.display()))?;

    sim_world::write_run_info(
        seed_dir,
        &format!("seed_{seed}"),
        seed,
        &config.config_version,
        settings.metrics_every,
        "sim_bench",
        &serde_json::json!({
            "max_ticks": settings.max_ticks,
            "dt": settings.dt,
            "reaction_secs": settings.reaction_secs,
        }),
    )?;

    let mut metrics_writer = sim_core::MetricsFileWriter::new(seed_dir.to_path_buf())
        .with_context(|| format!("opening metrics CSV in {}", seed_dir.display()))?;

    for _ in 0..settings.max_ticks {
        for command in autopilot.generate_commands(clock.state(), clock.config()) {
            clock.submit(command);
        }
        clock.tick(settings.dt);

        if clock.state().meta.tick % settings.metrics_every == 0 {
            let snapshot = sim_core::compute_metrics(clock.state());
            metrics_writer
                .write_row(&snapshot)
                .context("writing metrics row")?;
        }
        if clock.is_terminal() {
            break;
        }
    }

    // Always capture final snapshot
    let state = clock.state();
    let final_snapshot = sim_core::compute_metrics(state);
    if state.meta.tick % settings.metrics_every != 0 {
        metrics_writer
            .write_row(&final_snapshot)
            .context("writing final metrics row")?;
    }
    metrics_writer.flush().context("flushing metrics")?;

    #[allow(clippy::cast_possible_truncation)]
    let wall_time_ms = start.elapsed().as_millis() as u64;
    let sim_ticks_per_second = if wall_time_ms > 0 {
        (state.meta.tick as f64) / (wall_time_ms as f64 / 1000.0)
    } else {
        0.0
    };

    let (game_over, game_over_tick, game_over_reason) =
        run_result::describe_outcome(state.result.as_ref());

    let run_result = RunResult {
        run_schema_version: 1,
        run_status: "completed".to_string(),
        run_id: run_id.clone(),
        git_sha: run_result::git_sha(),
        git_dirty: run_result::git_dirty(),
        seed,
        scenario_name: scenario_name.to_string(),
        scenario_params: scenario_params.clone(),
        tick_start: 0,
        tick_end: final_snapshot.tick,
        max_ticks: settings.max_ticks,
        wall_time_ms,
        sim_ticks_per_second,
        summary_metrics: Some(SummaryMetrics::from_snapshot(&final_snapshot)),
        game_over,
        game_over_tick,
        game_over_reason,
        metrics_path: "metrics_000.csv".to_string(),
        error_message: None,
    };

    run_result
        .write_atomic(&seed_dir.join("run_result.json"))
        .context("writing run_result.json")?;

    Ok(SeedResult {
        seed,
        final_snapshot,
        reason: state.result.as_ref().map(|r| r.reason),
        wall_time_ms,
        run_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(max_ticks: u64) -> RunSettings {
        RunSettings {
            max_ticks,
            dt: 0.1,
            metrics_every: 10,
            reaction_secs: 0.5,
        }
    }

    #[test]
    fn test_run_seed_produces_output() {
        let config = sim_world::load_config("../../content").unwrap();
        let temp_dir = TempDir::new().unwrap();
        let seed_dir = temp_dir.path().join("seed_42");
        let params = serde_json::json!({"duration_secs": 12.0});

        let result = run_seed(&config, 42, settings(120), &seed_dir, "test_scenario", &params)
            .unwrap();

        assert_eq!(result.seed, 42);
        assert!(result.final_snapshot.tick <= 120);
        assert!(!result.run_id.is_empty());
        assert!(seed_dir.join("run_info.json").exists());
        assert!(seed_dir.join("metrics_000.csv").exists());
        assert!(seed_dir.join("run_result.json").exists());

        // Verify run_result.json content
        let content_str = std::fs::read_to_string(seed_dir.join("run_result.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content_str).unwrap();
        assert_eq!(parsed["run_schema_version"], 1);
        assert_eq!(parsed["run_status"], "completed");
        assert_eq!(parsed["seed"], 42);
        assert_eq!(parsed["game_over"], result.reason.is_some());
        assert!(parsed["summary_metrics"].is_object());
    }

    #[test]
    fn test_run_seed_stops_at_game_over() {
        let mut config = sim_world::load_config("../../content").unwrap();
        // Boss arrives almost at once and work can never reach the threshold.
        config.constants.work_gain_per_second_per_working_station = 0.0;
        config.constants.boss_min_arrive_interval_secs = 0.5;
        config.constants.boss_max_arrive_interval_secs = 0.5;
        let temp_dir = TempDir::new().unwrap();

        let result = run_seed(
            &config,
            1,
            settings(10_000),
            &temp_dir.path().join("seed_1"),
            "doomed",
            &serde_json::json!({}),
        )
        .unwrap();

        assert_eq!(result.reason, Some(TerminationReason::WorkTooLow));
        assert!(result.final_snapshot.terminal);
        assert!(result.final_snapshot.tick < 100);
    }

    #[test]
    fn test_run_seed_determinism() {
        let config = sim_world::load_config("../../content").unwrap();
        let dir1 = TempDir::new().unwrap();
        let dir2 = TempDir::new().unwrap();
        let params = serde_json::json!({});

        let result1 =
            run_seed(&config, 42, settings(600), &dir1.path().join("seed_42"), "test", &params)
                .unwrap();
        let result2 =
            run_seed(&config, 42, settings(600), &dir2.path().join("seed_42"), "test", &params)
                .unwrap();

        assert_eq!(result1.final_snapshot.tick, result2.final_snapshot.tick);
        assert_eq!(result1.reason, result2.reason);
        assert_eq!(
            result1.final_snapshot.repairs_completed,
            result2.final_snapshot.repairs_completed
        );
        assert!((result1.final_snapshot.work - result2.final_snapshot.work).abs() < 1e-6);
    }
}
