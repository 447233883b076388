//! The boss inspection cycle: Idle → Warning → Present → Idle.
//!
//! The inspector owns the freeze flag (set for the whole Warning + Present
//! window) and is the only component that can end a session.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    BossPhase, Constants, Event, StationState, StationStatus, TerminationReason, TIMER_EPSILON,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorState {
    pub phase: BossPhase,
    /// Idle: seconds until the warning starts. Warning: until arrival. Present: until departure.
    pub time_left_in_phase_secs: f32,
    /// True iff `phase` is Warning or Present.
    pub freeze_failures: bool,
    warning_duration_secs: f32,
    stay_duration_secs: f32,
    min_work_threshold: f32,
    min_arrive_interval_secs: f32,
    max_arrive_interval_secs: f32,
}

impl InspectorState {
    pub fn new(constants: &Constants, rng: &mut impl Rng) -> Self {
        let mut inspector = Self {
            phase: BossPhase::Idle,
            time_left_in_phase_secs: 0.0,
            freeze_failures: false,
            warning_duration_secs: constants.boss_warning_duration_secs,
            stay_duration_secs: constants.boss_stay_duration_secs,
            min_work_threshold: constants.boss_min_work_threshold,
            min_arrive_interval_secs: constants.boss_min_arrive_interval_secs,
            max_arrive_interval_secs: constants.boss_max_arrive_interval_secs,
        };
        inspector.enter(BossPhase::Idle, rng);
        inspector
    }

    /// Debug/test hook: jump straight into `phase` without emitting events.
    pub fn force_phase(&mut self, phase: BossPhase, rng: &mut impl Rng) {
        self.enter(phase, rng);
    }

    fn enter(&mut self, phase: BossPhase, rng: &mut impl Rng) {
        self.phase = phase;
        self.freeze_failures = phase.freezes_failures();
        self.time_left_in_phase_secs = match phase {
            BossPhase::Idle => self.sample_arrival_delay(rng),
            BossPhase::Warning => self.warning_duration_secs,
            BossPhase::Present => self.stay_duration_secs,
        };
    }

    fn sample_arrival_delay(&self, rng: &mut impl Rng) -> f32 {
        crate::sample_window(self.min_arrive_interval_secs, self.max_arrive_interval_secs, rng)
    }
}

/// Fixed-priority termination check: any broken station first, then low work.
/// Baited stations never count as broken here.
pub fn evaluate_termination(
    stations: &[StationState],
    work: f32,
    min_work_threshold: f32,
) -> Option<TerminationReason> {
    if stations.iter().any(|s| s.status == StationStatus::Broken) {
        Some(TerminationReason::BrokenStationSeen)
    } else if work < min_work_threshold {
        Some(TerminationReason::WorkTooLow)
    } else {
        None
    }
}

/// Advance the inspector by `dt`, after stations and the pool have settled.
///
/// The termination check runs first and only if the boss is already present
/// at the start of this step. On termination the phase is left untouched.
pub(crate) fn tick_inspector(
    inspector: &mut InspectorState,
    stations: &[StationState],
    work: f32,
    dt: f32,
    rng: &mut impl Rng,
    events: &mut Vec<Event>,
) -> Option<TerminationReason> {
    if inspector.phase == BossPhase::Present {
        if let Some(reason) = evaluate_termination(stations, work, inspector.min_work_threshold) {
            return Some(reason);
        }
    }

    inspector.time_left_in_phase_secs -= dt;
    if inspector.time_left_in_phase_secs > TIMER_EPSILON {
        return None;
    }

    match inspector.phase {
        BossPhase::Idle => {
            inspector.enter(BossPhase::Warning, rng);
            events.push(Event::BossWarningStarted);
        }
        BossPhase::Warning => {
            inspector.enter(BossPhase::Present, rng);
            events.push(Event::BossArrived);
        }
        BossPhase::Present => {
            inspector.enter(BossPhase::Idle, rng);
            events.push(Event::BossLeft);
        }
    }
    None
}
