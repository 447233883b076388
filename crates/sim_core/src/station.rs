//! Per-station failure machine.
//!
//! Each station cycles Idle → (Broken | Baited) → Idle. The idle countdown and
//! the bait timer are plain fields advanced by the shared tick, so a whole
//! session replays identically from the same RNG seed.

use rand::Rng;
use smallvec::{smallvec, SmallVec};

use crate::pool::ResourcePool;
use crate::{Constants, Event, StationDef, StationState, StationStatus, TIMER_EPSILON};

/// A station tick emits at most two events (bait expiry + fix).
pub(crate) type StationEvents = SmallVec<[Event; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    Break,
    Bait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// Repair attempted on a healthy station; penalized, nothing changes.
    FalseRepair,
    /// Station returned to Idle.
    Fixed,
    /// Station needs the operator nearby and they were not.
    OutOfRange,
}

impl StationState {
    pub fn new(def: &StationDef, rng: &mut impl Rng) -> Self {
        Self {
            id: def.id.clone(),
            status: StationStatus::Idle,
            countdown_secs: sample_countdown(def, rng),
            bait_timer_secs: 0.0,
            time_in_status_secs: 0.0,
        }
    }

    fn transition(&mut self, status: StationStatus) {
        self.status = status;
        self.time_in_status_secs = 0.0;
    }

    fn return_to_idle(&mut self, def: &StationDef, rng: &mut impl Rng) {
        self.transition(StationStatus::Idle);
        self.bait_timer_secs = 0.0;
        self.countdown_secs = sample_countdown(def, rng);
    }
}

/// Draw a fresh time-to-failure from `[min, max]`.
pub fn sample_countdown(def: &StationDef, rng: &mut impl Rng) -> f32 {
    crate::sample_window(def.min_time_to_break_secs, def.max_time_to_break_secs, rng)
}

/// Pick a failure kind by weight. Degenerate weights (both zero) fall back to a coin flip.
///
/// Weights are summed in `f64` so two `f32::MAX` weights still form a finite range.
/// An infinite weight always wins against a finite one.
pub fn roll_outcome(break_weight: f32, bait_weight: f32, rng: &mut impl Rng) -> FailureOutcome {
    // `max` also maps NaN to zero.
    let brk = f64::from(break_weight.max(0.0));
    let bait = f64::from(bait_weight.max(0.0));
    match (brk.is_finite(), bait.is_finite()) {
        (false, true) => FailureOutcome::Break,
        (true, false) => FailureOutcome::Bait,
        (false, false) => coin_flip(rng),
        (true, true) => {
            let total = brk + bait;
            if total <= 0.0 {
                return coin_flip(rng);
            }
            if rng.gen_range(0.0..total) < brk {
                FailureOutcome::Break
            } else {
                FailureOutcome::Bait
            }
        }
    }
}

fn coin_flip(rng: &mut impl Rng) -> FailureOutcome {
    if rng.gen_bool(0.5) {
        FailureOutcome::Break
    } else {
        FailureOutcome::Bait
    }
}

/// Advance one station by `dt`.
///
/// `frozen` suppresses new failures: an expired idle countdown is simply
/// retried on every following tick until the freeze lifts.
pub(crate) fn tick_station(
    def: &StationDef,
    station: &mut StationState,
    dt: f32,
    frozen: bool,
    constants: &Constants,
    rng: &mut impl Rng,
) -> StationEvents {
    station.time_in_status_secs += dt;
    match station.status {
        StationStatus::Idle => {
            station.countdown_secs = (station.countdown_secs - dt).max(0.0);
            if station.countdown_secs > TIMER_EPSILON || frozen {
                return SmallVec::new();
            }
            let outcome = roll_outcome(def.break_weight, def.bait_weight, rng);
            smallvec![fail(station, outcome, constants)]
        }
        StationStatus::Baited => {
            station.bait_timer_secs -= dt;
            if station.bait_timer_secs > TIMER_EPSILON {
                return SmallVec::new();
            }
            station.return_to_idle(def, rng);
            smallvec![
                Event::StationBaitingEnded {
                    station_id: station.id.clone(),
                },
                Event::StationFixed {
                    station_id: station.id.clone(),
                },
            ]
        }
        StationStatus::Broken => SmallVec::new(),
    }
}

fn fail(station: &mut StationState, outcome: FailureOutcome, constants: &Constants) -> Event {
    let station_id = station.id.clone();
    match outcome {
        FailureOutcome::Break => {
            station.transition(StationStatus::Broken);
            Event::StationBroken { station_id }
        }
        FailureOutcome::Bait => {
            station.transition(StationStatus::Baited);
            station.bait_timer_secs = constants.bait_duration_secs;
            Event::StationBaiting { station_id }
        }
    }
}

/// Apply one operator repair attempt.
///
/// Idle stations cost the standard penalty. Baited stations cost the bait
/// penalty and then repair like a broken one. Nothing here ever fails loudly;
/// a rejected repair is visible only as the missing `StationFixed`.
pub(crate) fn request_repair(
    def: &StationDef,
    station: &mut StationState,
    proximity_ok: bool,
    pool: &mut ResourcePool,
    constants: &Constants,
    rng: &mut impl Rng,
) -> (RepairOutcome, Option<Event>) {
    match station.status {
        StationStatus::Idle => {
            pool.apply_penalty(constants.false_repair_penalty);
            return (RepairOutcome::FalseRepair, None);
        }
        StationStatus::Baited => pool.apply_penalty(constants.bait_repair_penalty),
        StationStatus::Broken => {}
    }

    if def.requires_proximity && !proximity_ok {
        return (RepairOutcome::OutOfRange, None);
    }

    station.return_to_idle(def, rng);
    (
        RepairOutcome::Fixed,
        Some(Event::StationFixed {
            station_id: station.id.clone(),
        }),
    )
}

/// Debug hook. Idle and Baited stations become Broken; Broken stays put.
pub(crate) fn force_break(station: &mut StationState) -> Option<Event> {
    if station.status == StationStatus::Broken {
        return None;
    }
    station.transition(StationStatus::Broken);
    station.bait_timer_secs = 0.0;
    Some(Event::StationBroken {
        station_id: station.id.clone(),
    })
}
