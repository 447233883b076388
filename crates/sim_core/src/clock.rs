//! Host-facing session driver.
//!
//! `SimulationClock` owns the config, the state, the RNG and the event bus.
//! External inputs are queued and flushed at the start of the next `tick`, so
//! a host may call `request_repair` at any point between ticks.

use rand::Rng;

use crate::bus::{EventBus, SubscriberId, Subscription};
use crate::{
    engine, BossPhase, Command, CommandEnvelope, CommandId, EventEnvelope, SessionConfig,
    SessionResult, SessionSnapshot, SessionState, StationId,
};

pub struct SimulationClock<R: Rng> {
    config: SessionConfig,
    state: SessionState,
    rng: R,
    pending: Vec<CommandEnvelope>,
    bus: EventBus,
    config_notes: Vec<String>,
}

impl<R: Rng> SimulationClock<R> {
    /// `config` is normalized here; the adjustments made are kept in
    /// [`SimulationClock::config_notes`] for the host to report.
    pub fn new(mut config: SessionConfig, seed: u64, mut rng: R) -> Self {
        let config_notes = config.normalize();
        let state = engine::new_session(&config, seed, &mut rng);
        Self {
            config,
            state,
            rng,
            pending: Vec::new(),
            bus: EventBus::new(),
            config_notes,
        }
    }

    /// Adjustments `SessionConfig::normalize` made at construction. Empty for clean content.
    pub fn config_notes(&self) -> &[String] {
        &self.config_notes
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Direct state access for debug tooling and tests.
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.state.result.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        crate::snapshot(&self.state)
    }

    /// Advance by `dt` seconds, flushing queued inputs first. Events are also
    /// published to every subscriber.
    pub fn tick(&mut self, dt: f32) -> Vec<EventEnvelope> {
        let commands = std::mem::take(&mut self.pending);
        let events = engine::tick(&mut self.state, &commands, &self.config, &mut self.rng, dt);
        self.bus.publish(&events);
        events
    }

    pub fn request_repair(&mut self, station_id: &StationId, proximity_ok: bool) {
        self.enqueue(Command::RequestRepair {
            station_id: station_id.clone(),
            proximity_ok,
        });
    }

    pub fn force_break(&mut self, station_id: &StationId) {
        self.enqueue(Command::ForceBreak {
            station_id: station_id.clone(),
        });
    }

    /// Queue an already-built command, e.g. one produced by a `CommandSource`.
    pub fn submit(&mut self, command: Command) {
        self.enqueue(command);
    }

    /// Debug hook: put the inspector straight into `phase`. Ignored once terminal.
    pub fn force_boss_phase(&mut self, phase: BossPhase) {
        if self.state.is_terminal() {
            self.state.counters.ignored_commands += 1;
            return;
        }
        self.state.inspector.force_phase(phase, &mut self.rng);
    }

    /// Rebuild every entity from the initial config. Subscribers stay attached,
    /// so event and command ids keep counting up from the previous session.
    pub fn restart(&mut self) {
        let seed = self.state.meta.seed;
        let next_event_id = self.state.counters.next_event_id;
        let next_command_id = self.state.counters.next_command_id;
        self.pending.clear();
        self.state = engine::new_session(&self.config, seed, &mut self.rng);
        self.state.counters.next_event_id = next_event_id;
        self.state.counters.next_command_id = next_command_id;
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    fn enqueue(&mut self, command: Command) {
        if self.state.is_terminal() {
            self.state.counters.ignored_commands += 1;
            return;
        }
        let id = CommandId(format!("cmd_{:06}", self.state.counters.next_command_id));
        self.state.counters.next_command_id += 1;
        self.pending.push(CommandEnvelope {
            id,
            issued_tick: self.state.meta.tick,
            command,
        });
    }
}
