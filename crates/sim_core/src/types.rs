//! Type definitions for `sim_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inspector::InspectorState;
use crate::pool::ResourcePool;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(StationId);
string_id!(CommandId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// A station is in exactly one of these at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StationStatus {
    #[default]
    Idle,
    Broken,
    Baited,
}

impl StationStatus {
    pub fn label(self) -> &'static str {
        match self {
            StationStatus::Idle => "idle",
            StationStatus::Broken => "broken",
            StationStatus::Baited => "baited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BossPhase {
    #[default]
    Idle,
    Warning,
    Present,
}

impl BossPhase {
    pub fn label(self) -> &'static str {
        match self {
            BossPhase::Idle => "idle",
            BossPhase::Warning => "warning",
            BossPhase::Present => "present",
        }
    }

    /// New failures are suppressed from the first warning second until the boss leaves.
    pub fn freezes_failures(self) -> bool {
        matches!(self, BossPhase::Warning | BossPhase::Present)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    BrokenStationSeen,
    WorkTooLow,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::BrokenStationSeen => "boss saw broken items",
            TerminationReason::WorkTooLow => "work is too low",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub meta: MetaState,
    /// Same order as `SessionConfig::stations`; index `i` is driven by def `i`.
    pub stations: Vec<StationState>,
    pub pool: ResourcePool,
    pub inspector: InspectorState,
    /// Set exactly once when the session terminates.
    pub result: Option<SessionResult>,
    pub counters: Counters,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        self.result.is_some()
    }

    /// Returns (working, broken). Baited stations keep producing and count as working.
    #[allow(clippy::cast_possible_truncation)]
    pub fn status_counts(&self) -> (u32, u32) {
        let broken = self
            .stations
            .iter()
            .filter(|s| s.status == StationStatus::Broken)
            .count();
        let working = self.stations.len() - broken;
        (working as u32, broken as u32)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    pub survive_time_secs: f32,
    pub seed: u64,
    pub session_id: Uuid,
    pub schema_version: u32,
    pub config_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationState {
    pub id: StationId,
    pub status: StationStatus,
    /// Seconds until the next failure roll. Only advances while Idle.
    pub countdown_secs: f32,
    /// Seconds until a bait resolves itself. Only advances while Baited.
    pub bait_timer_secs: f32,
    pub time_in_status_secs: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    pub tick: u64,
    pub survive_time_secs: f32,
    pub final_work: f32,
    pub reason: TerminationReason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
    /// Commands naming a station that does not exist.
    pub rejected_commands: u64,
    /// Commands issued after the session terminated.
    pub ignored_commands: u64,
    /// Extra repair requests for a station that already had one this tick.
    pub duplicate_repairs: u64,
    pub false_repairs: u64,
    pub bait_repairs: u64,
    pub repairs_completed: u64,
    pub repairs_out_of_range: u64,
    pub forced_breaks: u64,
    pub boss_visits: u64,
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_tick: u64,
    pub command: Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    RequestRepair {
        station_id: StationId,
        /// Host-evaluated proximity check; ignored unless the station requires it.
        proximity_ok: bool,
    },
    /// Debug hook: break a station regardless of the freeze window.
    ForceBreak { station_id: StationId },
}

impl Command {
    pub fn station_id(&self) -> &StationId {
        match self {
            Command::RequestRepair { station_id, .. } | Command::ForceBreak { station_id } => {
                station_id
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub time_secs: f32,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    StationBroken {
        station_id: StationId,
    },
    StationBaiting {
        station_id: StationId,
    },
    StationFixed {
        station_id: StationId,
    },
    /// A bait ran out without being touched. Always followed by `StationFixed`.
    StationBaitingEnded {
        station_id: StationId,
    },
    BossWarningStarted,
    BossArrived,
    BossLeft,
    GameOver {
        reason: TerminationReason,
        survive_time_secs: f32,
        final_work: f32,
    },
}

impl Event {
    pub fn station_id(&self) -> Option<&StationId> {
        match self {
            Event::StationBroken { station_id }
            | Event::StationBaiting { station_id }
            | Event::StationFixed { station_id }
            | Event::StationBaitingEnded { station_id } => Some(station_id),
            Event::BossWarningStarted
            | Event::BossArrived
            | Event::BossLeft
            | Event::GameOver { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub config_version: String,
    pub constants: Constants,
    pub stations: Vec<StationDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDef {
    pub id: StationId,
    pub min_time_to_break_secs: f32,
    pub max_time_to_break_secs: f32,
    /// Relative odds of a roll producing a real failure.
    pub break_weight: f32,
    /// Relative odds of a roll producing a decoy.
    pub bait_weight: f32,
    #[serde(default)]
    pub requires_proximity: bool,
    /// Carried for hosts that evaluate proximity; the core only sees the verdict.
    #[serde(default)]
    pub interact_range: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub max_work: f32,
    pub initial_work: f32,
    pub work_gain_per_second_per_working_station: f32,
    pub work_loss_per_second_per_broken_station: f32,
    /// Applied when a repair is attempted on a healthy station.
    pub false_repair_penalty: f32,
    /// Applied when a repair is attempted on a baited station.
    pub bait_repair_penalty: f32,
    pub bait_duration_secs: f32,
    pub boss_min_work_threshold: f32,
    pub boss_min_arrive_interval_secs: f32,
    pub boss_max_arrive_interval_secs: f32,
    pub boss_warning_duration_secs: f32,
    pub boss_stay_duration_secs: f32,
}
