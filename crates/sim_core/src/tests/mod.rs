use super::*;
use crate::test_fixtures::{base_config, base_state, make_rng, quiet_config, station_id};
use rand_chacha::ChaCha8Rng;

mod restart;

// --- Shared test helpers ------------------------------------------------

fn quiet_state(config: &SessionConfig) -> (SessionState, ChaCha8Rng) {
    let mut rng = make_rng();
    let state = base_state(config, &mut rng);
    (state, rng)
}

fn repair_command(state: &SessionState, n: usize, proximity_ok: bool) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{n:06}")),
        issued_tick: state.meta.tick,
        command: Command::RequestRepair {
            station_id: station_id(n),
            proximity_ok,
        },
    }
}

fn force_break_command(state: &SessionState, n: usize) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{n:06}")),
        issued_tick: state.meta.tick,
        command: Command::ForceBreak {
            station_id: station_id(n),
        },
    }
}

/// Run `ticks` empty ticks of `dt`, collecting the bare events.
fn run_ticks(
    state: &mut SessionState,
    config: &SessionConfig,
    rng: &mut ChaCha8Rng,
    dt: f32,
    ticks: usize,
) -> Vec<Event> {
    let mut log = Vec::new();
    for _ in 0..ticks {
        log.extend(tick(state, &[], config, rng, dt).into_iter().map(|e| e.event));
    }
    log
}

/// Config where work neither grows nor drains, so penalties are exact.
fn flat_pool_config() -> SessionConfig {
    let mut config = quiet_config();
    config.constants.work_gain_per_second_per_working_station = 0.0;
    config.constants.work_loss_per_second_per_broken_station = 0.0;
    config
}

#[test]
fn test_event_ids_are_sequential_across_ticks() {
    let config = quiet_config();
    let (mut state, mut rng) = quiet_state(&config);

    let cmds = [force_break_command(&state, 1)];
    let first = tick(&mut state, &cmds, &config, &mut rng, 0.1);
    let cmds = [repair_command(&state, 1, true)];
    let second = tick(&mut state, &cmds, &config, &mut rng, 0.1);

    assert_eq!(first[0].id, EventId("evt_000000".to_string()));
    assert_eq!(first[0].tick, 0);
    assert_eq!(second[0].id, EventId("evt_000001".to_string()));
    assert_eq!(second[0].tick, 1);
}

#[test]
fn test_non_finite_dt_is_treated_as_zero() {
    let config = base_config();
    let (mut state, mut rng) = quiet_state(&config);
    let countdown = state.stations[0].countdown_secs;

    tick(&mut state, &[], &config, &mut rng, f32::NAN);
    tick(&mut state, &[], &config, &mut rng, f32::INFINITY);
    tick(&mut state, &[], &config, &mut rng, -5.0);

    assert_eq!(state.meta.tick, 3);
    assert!(state.meta.survive_time_secs.abs() < 1e-6);
    assert!((state.stations[0].countdown_secs - countdown).abs() < 1e-6);
}

#[test]
fn test_work_follows_working_and_broken_counts() {
    let mut config = quiet_config();
    config.constants.initial_work = 50.0;
    let (mut state, mut rng) = quiet_state(&config);

    tick(&mut state, &[], &config, &mut rng, 1.0);
    assert!((state.pool.value() - 55.0).abs() < 1e-4, "5 working stations, +1/s each");

    let cmds = [force_break_command(&state, 1)];
    tick(&mut state, &cmds, &config, &mut rng, 1.0);
    // 4 working (+4) and 1 broken (-3).
    assert!((state.pool.value() - 56.0).abs() < 1e-4);
}
