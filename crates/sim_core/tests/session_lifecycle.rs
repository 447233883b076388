//! Integration test: host drives a clock, collaborators listen on the bus,
//! the boss catches a broken station, and the host restarts.

use sim_core::test_fixtures::{make_clock, quiet_config, station_id};
use sim_core::*;

#[test]
fn full_session_lifecycle() {
    let mut config = quiet_config();
    config.constants.initial_work = 60.0;
    config.constants.boss_min_arrive_interval_secs = 2.0;
    config.constants.boss_max_arrive_interval_secs = 2.0;
    let mut clock = make_clock(config);

    let audio = clock.subscribe();
    let ui = clock.subscribe();

    // 2 s idle, 3 s warning. Break a station during the warning.
    for _ in 0..30 {
        clock.tick(0.1);
    }
    assert_eq!(clock.snapshot().boss_phase, BossPhase::Warning);
    assert!(clock.snapshot().freeze_failures);
    clock.force_break(&station_id(3));

    for _ in 0..30 {
        clock.tick(0.1);
        if clock.is_terminal() {
            break;
        }
    }

    let result = clock.result().expect("boss should have caught the broken station");
    assert_eq!(result.reason, TerminationReason::BrokenStationSeen);

    let heard: Vec<Event> = audio.drain().into_iter().map(|e| e.event).collect();
    assert_eq!(
        heard,
        vec![
            Event::BossWarningStarted,
            Event::StationBroken {
                station_id: station_id(3)
            },
            Event::BossArrived,
            Event::GameOver {
                reason: TerminationReason::BrokenStationSeen,
                survive_time_secs: result.survive_time_secs,
                final_work: result.final_work,
            },
        ]
    );
    assert_eq!(ui.drain().len(), 4);

    // UI tears down; audio keeps listening across the restart.
    assert!(clock.unsubscribe(ui.id()));
    clock.restart();
    assert!(!clock.is_terminal());
    assert!((clock.snapshot().work - 60.0).abs() < 1e-6);

    clock.request_repair(&station_id(1), true);
    clock.tick(0.1);
    assert!(audio.drain().is_empty(), "a false repair is silent");
    assert!(ui.drain().is_empty());
    assert_eq!(clock.state().counters.false_repairs, 1);
}
