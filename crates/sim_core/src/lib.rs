//! `sim_core`: deterministic simulation tick.
//!
//! No IO (beyond the metrics CSV writer), no network, no globals. All
//! randomness via the passed-in Rng.

mod bus;
mod clock;
mod config;
mod engine;
mod id;
mod inspector;
pub mod metrics;
mod pool;
mod snapshot;
mod station;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use bus::{EventBus, SubscriberId, Subscription};
pub use clock::SimulationClock;
pub use engine::{new_session, tick, SCHEMA_VERSION};
pub use id::generate_session_id;
pub use inspector::{evaluate_termination, InspectorState};
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use pool::ResourcePool;
pub use snapshot::{snapshot, SessionSnapshot, StationSnapshot};
pub use station::{roll_outcome, sample_countdown, FailureOutcome, RepairOutcome};
pub use types::*;

/// Timers at or below this many seconds count as expired. Absorbs the drift
/// from summing inexact `dt` values such as 0.1.
pub const TIMER_EPSILON: f32 = 1e-4;

/// Uniform draw from `[lo, hi]`. Returns `lo` when the window is empty or
/// cannot be sampled (inverted, non-finite or wider than `f32` can span).
pub(crate) fn sample_window(lo: f32, hi: f32, rng: &mut impl rand::Rng) -> f32 {
    if hi > lo && (hi - lo).is_finite() {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

pub(crate) fn emit(
    counters: &mut Counters,
    tick: u64,
    time_secs: f32,
    event: Event,
) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope {
        id,
        tick,
        time_secs,
        event,
    }
}

#[cfg(test)]
mod tests;
