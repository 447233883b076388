//! Snapshot metrics computed from `SessionState`.
//!
//! A single `compute_metrics(&SessionState) -> MetricsSnapshot` function
//! samples the current state for time-series analysis. No state mutation, no IO.
//! `MetricsFileWriter` is the one IO piece: it appends rows to rotating CSV files.

use serde::Serialize;

use crate::{SessionState, StationStatus};

/// Current schema version. Bump when fields are added/removed/reordered.
pub const METRICS_VERSION: u32 = 1;

/// Rows per CSV file before rotating to the next index.
const MAX_ROWS_PER_FILE: usize = 100_000;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    pub metrics_version: u32,
    pub survive_time_secs: f32,

    // Resource pool
    pub work: f32,
    pub max_work: f32,

    // Stations
    pub stations_total: u32,
    pub stations_working: u32,
    pub stations_broken: u32,
    pub stations_baited: u32,

    // Inspector
    pub boss_phase: String,
    pub boss_visits: u64,
    pub terminal: bool,

    // Operator input
    pub repairs_completed: u64,
    pub false_repairs: u64,
    pub bait_repairs: u64,
    pub repairs_out_of_range: u64,
    pub forced_breaks: u64,

    // Diagnostics
    pub rejected_commands: u64,
    pub ignored_commands: u64,
    pub duplicate_repairs: u64,
}

#[allow(clippy::cast_possible_truncation)]
pub fn compute_metrics(state: &SessionState) -> MetricsSnapshot {
    let (working, broken) = state.status_counts();
    let baited = state
        .stations
        .iter()
        .filter(|s| s.status == StationStatus::Baited)
        .count() as u32;
    let c = &state.counters;

    MetricsSnapshot {
        tick: state.meta.tick,
        metrics_version: METRICS_VERSION,
        survive_time_secs: state.meta.survive_time_secs,
        work: state.pool.value(),
        max_work: state.pool.max(),
        stations_total: state.stations.len() as u32,
        stations_working: working,
        stations_broken: broken,
        stations_baited: baited,
        boss_phase: state.inspector.phase.label().to_string(),
        boss_visits: c.boss_visits,
        terminal: state.is_terminal(),
        repairs_completed: c.repairs_completed,
        false_repairs: c.false_repairs,
        bait_repairs: c.bait_repairs,
        repairs_out_of_range: c.repairs_out_of_range,
        forced_breaks: c.forced_breaks,
        rejected_commands: c.rejected_commands,
        ignored_commands: c.ignored_commands,
        duplicate_repairs: c.duplicate_repairs,
    }
}

/// Rotating CSV writer: `metrics_000.csv`, `metrics_001.csv`, ... in `run_dir`.
pub struct MetricsFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    writer: csv::Writer<std::fs::File>,
}

impl MetricsFileWriter {
    /// Create a new writer, opening the first CSV file.
    pub fn new(run_dir: std::path::PathBuf) -> csv::Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            writer,
        })
    }

    /// Append one snapshot row, rotating to a new file if the current one is full.
    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> csv::Result<()> {
        if self.rows_in_current_file >= MAX_ROWS_PER_FILE {
            self.writer.flush()?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        // The header row is emitted by csv on the first serialize of each file.
        self.writer.serialize(snapshot)?;
        self.writer.flush()?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(run_dir: &std::path::Path, index: u32) -> csv::Result<csv::Writer<std::fs::File>> {
    let path = run_dir.join(format!("metrics_{index:03}.csv"));
    csv::Writer::from_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_config, base_state, make_rng};
    use crate::BossPhase;

    #[test]
    fn fresh_session_metrics() {
        let config = base_config();
        let mut rng = make_rng();
        let state = base_state(&config, &mut rng);
        let snapshot = compute_metrics(&state);

        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.metrics_version, METRICS_VERSION);
        assert_eq!(snapshot.stations_total, 5);
        assert_eq!(snapshot.stations_working, 5);
        assert_eq!(snapshot.stations_broken, 0);
        assert_eq!(snapshot.stations_baited, 0);
        assert_eq!(snapshot.boss_phase, "idle");
        assert!(!snapshot.terminal);
    }

    #[test]
    fn counts_each_status() {
        let config = base_config();
        let mut rng = make_rng();
        let mut state = base_state(&config, &mut rng);
        state.stations[0].status = StationStatus::Broken;
        state.stations[1].status = StationStatus::Baited;
        state.stations[2].status = StationStatus::Baited;
        state.inspector.force_phase(BossPhase::Present, &mut rng);

        let snapshot = compute_metrics(&state);
        assert_eq!(snapshot.stations_broken, 1);
        assert_eq!(snapshot.stations_baited, 2);
        // Baited stations keep producing.
        assert_eq!(snapshot.stations_working, 4);
        assert_eq!(snapshot.boss_phase, "present");
    }

    #[test]
    fn writer_emits_header_and_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = base_config();
        let mut rng = make_rng();
        let state = base_state(&config, &mut rng);

        let mut writer = MetricsFileWriter::new(dir.path().to_path_buf()).unwrap();
        writer.write_row(&compute_metrics(&state)).unwrap();
        writer.write_row(&compute_metrics(&state)).unwrap();
        writer.flush().unwrap();

        let text = std::fs::read_to_string(dir.path().join("metrics_000.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3, "header + 2 rows");
        assert!(lines[0].starts_with("tick,metrics_version,survive_time_secs,work"));
    }
}
