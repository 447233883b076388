//! Shared test fixtures for sim_core and downstream crates.
//!
//! `base_config()` mirrors the shipped content: five stations, 5:1 break/bait
//! odds, boss every 10 to 25 s. `quiet_config()` pushes every random timer far out
//! so scenario tests control all transitions by hand.

use crate::{
    Constants, SessionConfig, SessionState, SimulationClock, StationDef, StationId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const STATION_COUNT: usize = 5;

pub fn station_id(n: usize) -> StationId {
    StationId(format!("station_{n:02}"))
}

pub fn base_constants() -> Constants {
    Constants {
        max_work: 100.0,
        initial_work: 0.0,
        work_gain_per_second_per_working_station: 1.0,
        work_loss_per_second_per_broken_station: 3.0,
        false_repair_penalty: 10.0,
        bait_repair_penalty: 25.0,
        bait_duration_secs: 3.0,
        boss_min_work_threshold: 20.0,
        boss_min_arrive_interval_secs: 10.0,
        boss_max_arrive_interval_secs: 25.0,
        boss_warning_duration_secs: 3.0,
        boss_stay_duration_secs: 6.0,
    }
}

pub fn base_station(n: usize) -> StationDef {
    StationDef {
        id: station_id(n),
        min_time_to_break_secs: 4.0,
        max_time_to_break_secs: 10.0,
        break_weight: 5.0,
        bait_weight: 1.0,
        requires_proximity: false,
        interact_range: 2.0,
    }
}

pub fn base_config() -> SessionConfig {
    SessionConfig {
        config_version: "test".to_string(),
        constants: base_constants(),
        stations: (1..=STATION_COUNT).map(base_station).collect(),
    }
}

/// Nothing happens on its own for 1000 simulated seconds.
pub fn quiet_config() -> SessionConfig {
    let mut config = base_config();
    config.constants.boss_min_arrive_interval_secs = 1000.0;
    config.constants.boss_max_arrive_interval_secs = 1000.0;
    for station in &mut config.stations {
        station.min_time_to_break_secs = 1000.0;
        station.max_time_to_break_secs = 1000.0;
    }
    config
}

pub fn base_state(config: &SessionConfig, rng: &mut ChaCha8Rng) -> SessionState {
    crate::new_session(config, 42, rng)
}

pub fn make_clock(config: SessionConfig) -> SimulationClock<ChaCha8Rng> {
    SimulationClock::new(config, 42, make_rng())
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
