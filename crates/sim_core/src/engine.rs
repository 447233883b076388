use ahash::AHashSet;
use rand::Rng;

use crate::inspector::{tick_inspector, InspectorState};
use crate::pool::ResourcePool;
use crate::station::{force_break, request_repair, tick_station, RepairOutcome};
use crate::{
    Command, CommandEnvelope, Counters, Event, EventEnvelope, MetaState, SessionConfig,
    SessionResult, SessionState, StationState, StationStatus,
};

pub const SCHEMA_VERSION: u32 = 1;

/// Build a fresh session from config. Stations draw their first countdown and
/// the inspector draws its first arrival delay from `rng`.
///
/// Never panics, but an un-normalized config may leave timers that never
/// expire; `SimulationClock::new` normalizes before calling this.
pub fn new_session(config: &SessionConfig, seed: u64, rng: &mut impl Rng) -> SessionState {
    let session_id = crate::generate_session_id(rng);
    let stations = config
        .stations
        .iter()
        .map(|def| StationState::new(def, rng))
        .collect();
    SessionState {
        meta: MetaState {
            tick: 0,
            survive_time_secs: 0.0,
            seed,
            session_id,
            schema_version: SCHEMA_VERSION,
            config_version: config.config_version.clone(),
        },
        stations,
        pool: ResourcePool::new(&config.constants),
        inspector: InspectorState::new(&config.constants, rng),
        result: None,
        counters: Counters::default(),
    }
}

/// Advance the simulation by `dt` seconds.
///
/// Order of operations:
/// 1. Apply queued commands (repairs, forced breaks).
/// 2. Advance every station machine.
/// 3. Feed the settled working/broken counts to the resource pool.
/// 4. Advance the inspector, which may end the session.
/// 5. Increment tick counter.
///
/// Once the session has a result this is a no-op. Returns all events produced this tick.
pub fn tick(
    state: &mut SessionState,
    commands: &[CommandEnvelope],
    config: &SessionConfig,
    rng: &mut impl Rng,
    dt: f32,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    if state.is_terminal() {
        state.counters.ignored_commands += commands.len() as u64;
        return events;
    }
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    apply_commands(state, commands, config, rng, &mut events);
    tick_stations(state, config, dt, rng, &mut events);

    let (working, broken) = state.status_counts();
    state.pool.tick(dt, working, broken);
    state.meta.survive_time_secs += dt;

    advance_inspector(state, dt, rng, &mut events);

    state.meta.tick += 1;
    events
}

fn apply_commands(
    state: &mut SessionState,
    commands: &[CommandEnvelope],
    config: &SessionConfig,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    // One repair outcome per station per tick.
    let mut repaired: AHashSet<usize> = AHashSet::new();

    for envelope in commands {
        let Some(idx) = state
            .stations
            .iter()
            .position(|s| &s.id == envelope.command.station_id())
        else {
            state.counters.rejected_commands += 1;
            continue;
        };

        let event = match &envelope.command {
            Command::RequestRepair { proximity_ok, .. } => {
                if !repaired.insert(idx) {
                    state.counters.duplicate_repairs += 1;
                    continue;
                }
                let was_baited = state.stations[idx].status == StationStatus::Baited;
                let (outcome, event) = request_repair(
                    &config.stations[idx],
                    &mut state.stations[idx],
                    *proximity_ok,
                    &mut state.pool,
                    &config.constants,
                    rng,
                );
                record_repair(&mut state.counters, outcome, was_baited);
                event
            }
            Command::ForceBreak { .. } => {
                let event = force_break(&mut state.stations[idx]);
                if event.is_some() {
                    state.counters.forced_breaks += 1;
                }
                event
            }
        };

        if let Some(event) = event {
            push_event(state, event, events);
        }
    }
}

fn record_repair(counters: &mut Counters, outcome: RepairOutcome, was_baited: bool) {
    match outcome {
        RepairOutcome::FalseRepair => counters.false_repairs += 1,
        RepairOutcome::OutOfRange => counters.repairs_out_of_range += 1,
        RepairOutcome::Fixed => counters.repairs_completed += 1,
    }
    if was_baited {
        counters.bait_repairs += 1;
    }
}

fn tick_stations(
    state: &mut SessionState,
    config: &SessionConfig,
    dt: f32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    // Read once so every station in this tick sees the same freeze flag.
    let frozen = state.inspector.freeze_failures;

    for idx in 0..state.stations.len() {
        let station_events = tick_station(
            &config.stations[idx],
            &mut state.stations[idx],
            dt,
            frozen,
            &config.constants,
            rng,
        );
        for event in station_events {
            push_event(state, event, events);
        }
    }
}

fn advance_inspector(
    state: &mut SessionState,
    dt: f32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let mut inspector_events = Vec::new();
    let termination = tick_inspector(
        &mut state.inspector,
        &state.stations,
        state.pool.value(),
        dt,
        rng,
        &mut inspector_events,
    );

    for event in inspector_events {
        if event == Event::BossArrived {
            state.counters.boss_visits += 1;
        }
        push_event(state, event, events);
    }

    if let Some(reason) = termination {
        let result = SessionResult {
            tick: state.meta.tick,
            survive_time_secs: state.meta.survive_time_secs,
            final_work: state.pool.value(),
            reason,
        };
        let event = Event::GameOver {
            reason,
            survive_time_secs: result.survive_time_secs,
            final_work: result.final_work,
        };
        state.result = Some(result);
        push_event(state, event, events);
    }
}

fn push_event(state: &mut SessionState, event: Event, events: &mut Vec<EventEnvelope>) {
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        state.meta.survive_time_secs,
        event,
    ));
}
