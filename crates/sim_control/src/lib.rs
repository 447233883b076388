use sim_core::{Command, SessionConfig, SessionState, StationState, StationStatus};

/// Anything that decides operator input from the current state: a scripted
/// autopilot, a replay, a network peer.
pub trait CommandSource {
    fn generate_commands(&mut self, state: &SessionState, config: &SessionConfig)
        -> Vec<Command>;
}

/// Plays the operator:
/// 1. Repair a broken station once it has been broken for `reaction_secs`.
/// 2. Leave baited stations alone; they fix themselves for free.
/// 3. Never touch an idle station.
#[derive(Debug, Clone)]
pub struct AutopilotController {
    pub reaction_secs: f32,
}

pub const DEFAULT_REACTION_SECS: f32 = 0.5;

impl Default for AutopilotController {
    fn default() -> Self {
        Self {
            reaction_secs: DEFAULT_REACTION_SECS,
        }
    }
}

impl AutopilotController {
    pub fn new(reaction_secs: f32) -> Self {
        Self {
            reaction_secs: reaction_secs.max(0.0),
        }
    }

    fn wants_repair(&self, station: &StationState) -> bool {
        station.status == StationStatus::Broken && station.time_in_status_secs >= self.reaction_secs
    }
}

// ---------------------------------------------------------------------------
// AutopilotController
// ---------------------------------------------------------------------------

impl CommandSource for AutopilotController {
    fn generate_commands(
        &mut self,
        state: &SessionState,
        _config: &SessionConfig,
    ) -> Vec<Command> {
        if state.is_terminal() {
            return Vec::new();
        }
        state
            .stations
            .iter()
            .filter(|station| self.wants_repair(station))
            .map(|station| Command::RequestRepair {
                station_id: station.id.clone(),
                // The autopilot always walks over before pressing the button.
                proximity_ok: true,
            })
            .collect()
    }
}

/// Issues nothing. Stands in for an absent operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleOperator;

impl CommandSource for IdleOperator {
    fn generate_commands(&mut self, _state: &SessionState, _config: &SessionConfig) -> Vec<Command> {
        Vec::new()
    }
}
