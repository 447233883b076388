use serde::Serialize;
use sim_core::{MetricsSnapshot, SessionResult};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RunResult {
    pub run_schema_version: u32,
    pub run_status: String,
    pub run_id: String,
    pub git_sha: String,
    pub git_dirty: bool,
    pub seed: u64,
    pub scenario_name: String,
    pub scenario_params: serde_json::Value,
    pub tick_start: u64,
    pub tick_end: u64,
    pub max_ticks: u64,
    pub wall_time_ms: u64,
    pub sim_ticks_per_second: f64,
    pub summary_metrics: Option<SummaryMetrics>,
    pub game_over: bool,
    pub game_over_tick: Option<u64>,
    pub game_over_reason: Option<String>,
    pub metrics_path: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryMetrics {
    pub survive_time_secs: f64,
    pub final_work: f64,
    pub stations_broken: u32,
    pub stations_baited: u32,
    pub boss_visits: u64,
    pub repairs_completed: u64,
    pub false_repairs: u64,
    pub bait_repairs: u64,
    pub repairs_out_of_range: u64,
}

impl SummaryMetrics {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            survive_time_secs: f64::from(snapshot.survive_time_secs),
            final_work: f64::from(snapshot.work),
            stations_broken: snapshot.stations_broken,
            stations_baited: snapshot.stations_baited,
            boss_visits: snapshot.boss_visits,
            repairs_completed: snapshot.repairs_completed,
            false_repairs: snapshot.false_repairs,
            bait_repairs: snapshot.bait_repairs,
            repairs_out_of_range: snapshot.repairs_out_of_range,
        }
    }
}

impl RunResult {
    /// Write JSON atomically: write to `.tmp` then rename.
    pub fn write_atomic(&self, path: &Path) -> anyhow::Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// `(game_over, tick, reason)` for the run-result header.
pub fn describe_outcome(result: Option<&SessionResult>) -> (bool, Option<u64>, Option<String>) {
    match result {
        Some(r) => (true, Some(r.tick), Some(r.reason.to_string())),
        None => (false, None, None),
    }
}

pub fn git_sha() -> String {
    env!("GIT_SHA").to_string()
}

pub fn git_dirty() -> bool {
    env!("GIT_DIRTY") == "true"
}
