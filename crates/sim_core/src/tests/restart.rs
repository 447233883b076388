use super::*;
use crate::test_fixtures::make_clock;

#[test]
fn test_restart_rebuilds_initial_state() {
    let mut config = quiet_config();
    config.constants.initial_work = 30.0;
    let mut clock = make_clock(config);
    let first_session = clock.state().meta.session_id;

    clock.force_boss_phase(BossPhase::Present);
    clock.force_break(&station_id(1));
    clock.tick(0.1);
    assert!(clock.is_terminal());

    clock.restart();

    let state = clock.state();
    assert!(!clock.is_terminal());
    assert_eq!(state.meta.tick, 0);
    assert!(state.meta.survive_time_secs.abs() < 1e-6);
    assert!((state.pool.value() - 30.0).abs() < 1e-6);
    assert_eq!(state.inspector.phase, BossPhase::Idle);
    assert!(!state.inspector.freeze_failures);
    assert!(state
        .stations
        .iter()
        .all(|s| s.status == StationStatus::Idle));
    assert_ne!(state.meta.session_id, first_session);
}

#[test]
fn test_restart_keeps_subscribers() {
    let mut clock = make_clock(quiet_config());
    let sub = clock.subscribe();
    clock.force_break(&station_id(1));
    clock.tick(0.1);
    assert_eq!(sub.drain().len(), 1);

    clock.restart();
    clock.force_break(&station_id(2));
    clock.tick(0.1);

    let events: Vec<Event> = sub.drain().into_iter().map(|e| e.event).collect();
    assert_eq!(
        events,
        vec![Event::StationBroken {
            station_id: station_id(2)
        }]
    );
}

#[test]
fn test_restart_keeps_event_ids_unique() {
    let mut clock = make_clock(quiet_config());
    let sub = clock.subscribe();
    clock.force_break(&station_id(1));
    clock.tick(0.1);

    clock.restart();
    clock.force_break(&station_id(2));
    clock.tick(0.1);

    let ids: Vec<EventId> = sub.drain().into_iter().map(|e| e.id).collect();
    assert_eq!(
        ids,
        vec![
            EventId("evt_000000".to_string()),
            EventId("evt_000001".to_string())
        ]
    );
    assert_eq!(clock.state().counters.next_command_id, 2);
}

#[test]
fn test_restart_drops_queued_commands() {
    let mut clock = make_clock(quiet_config());
    clock.force_break(&station_id(1));
    clock.restart();

    assert!(clock.tick(0.1).is_empty());
}

#[test]
fn test_clock_ignores_inputs_after_game_over() {
    let mut clock = make_clock(quiet_config());
    clock.force_boss_phase(BossPhase::Present);
    clock.tick(0.1);
    assert!(clock.is_terminal(), "initial work 0 is below the threshold");
    let phase = clock.state().inspector.phase;

    clock.request_repair(&station_id(1), true);
    clock.force_boss_phase(BossPhase::Idle);

    assert!(clock.tick(0.1).is_empty());
    assert_eq!(clock.state().inspector.phase, phase);
    assert_eq!(clock.state().counters.ignored_commands, 2);
    assert_eq!(clock.result().map(|r| r.reason), Some(TerminationReason::WorkTooLow));
}

#[test]
fn test_queued_inputs_apply_on_next_tick() {
    let mut clock = make_clock(quiet_config());
    clock.force_break(&station_id(1));
    assert_eq!(
        clock.state().stations[0].status,
        StationStatus::Idle,
        "nothing changes until the tick"
    );

    clock.tick(0.0);
    assert_eq!(clock.snapshot().stations[0].status, StationStatus::Broken);
}

#[test]
fn test_clock_normalizes_broken_config() {
    let mut config = quiet_config();
    config.constants.max_work = -5.0;
    config.constants.boss_min_arrive_interval_secs = 30.0;
    config.constants.boss_max_arrive_interval_secs = 10.0;
    config.stations[0].break_weight = -1.0;
    config.stations[1].min_time_to_break_secs = 9.0;
    config.stations[1].max_time_to_break_secs = 2.0;

    let mut clock = make_clock(config);

    assert_eq!(clock.config_notes().len(), 4);
    assert!(clock.config().constants.max_work.abs() < 1e-6);
    assert!(clock.config().stations[0].break_weight.abs() < 1e-6);
    let arrival = clock.state().inspector.time_left_in_phase_secs;
    assert!((10.0..=30.0).contains(&arrival));
    let countdown = clock.state().stations[1].countdown_secs;
    assert!((2.0..=9.0).contains(&countdown));

    clock.tick(0.1);
    assert!(clock.snapshot().work.abs() < 1e-6);
}

#[test]
fn test_clean_config_has_no_notes() {
    let clock = make_clock(base_config());
    assert!(clock.config_notes().is_empty());
}
