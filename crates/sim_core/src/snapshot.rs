//! Read-only per-tick view for presentation layers (meters, tints, audio cues).

use serde::Serialize;

use crate::{BossPhase, SessionState, StationId, StationStatus, TerminationReason};

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub tick: u64,
    /// Always within `[0, max_work]`.
    pub work: f32,
    pub max_work: f32,
    pub survive_time_secs: f32,
    pub stations: Vec<StationSnapshot>,
    pub boss_phase: BossPhase,
    pub boss_time_left_secs: f32,
    pub freeze_failures: bool,
    pub terminal: bool,
    pub reason: Option<TerminationReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationSnapshot {
    pub id: StationId,
    pub status: StationStatus,
    pub countdown_secs: f32,
    pub bait_timer_secs: f32,
}

pub fn snapshot(state: &SessionState) -> SessionSnapshot {
    SessionSnapshot {
        tick: state.meta.tick,
        work: state.pool.value(),
        max_work: state.pool.max(),
        survive_time_secs: state.meta.survive_time_secs,
        stations: state
            .stations
            .iter()
            .map(|s| StationSnapshot {
                id: s.id.clone(),
                status: s.status,
                countdown_secs: s.countdown_secs,
                bait_timer_secs: s.bait_timer_secs,
            })
            .collect(),
        boss_phase: state.inspector.phase,
        boss_time_left_secs: state.inspector.time_left_in_phase_secs.max(0.0),
        freeze_failures: state.inspector.freeze_failures,
        terminal: state.is_terminal(),
        reason: state.result.as_ref().map(|r| r.reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_config, make_clock, station_id};
    use crate::{Event, EventEnvelope};

    #[test]
    fn snapshot_serializes_for_presentation() {
        let mut clock = make_clock(base_config());
        clock.force_break(&station_id(2));
        clock.tick(0.1);

        let json = serde_json::to_value(clock.snapshot()).unwrap();
        assert_eq!(json["tick"], 1);
        assert_eq!(json["boss_phase"], "Idle");
        assert_eq!(json["stations"][1]["id"], "station_02");
        assert_eq!(json["stations"][1]["status"], "Broken");
        assert!(json["reason"].is_null());
    }

    #[test]
    fn event_envelopes_survive_json() {
        let mut clock = make_clock(base_config());
        clock.force_break(&station_id(1));
        let events = clock.tick(0.1);

        let text = serde_json::to_string(&events).unwrap();
        let parsed: Vec<EventEnvelope> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), events.len());
        assert_eq!(parsed[0].id, events[0].id);
        assert_eq!(
            parsed[0].event,
            Event::StationBroken {
                station_id: station_id(1)
            }
        );
    }
}
