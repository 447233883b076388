//! The shared "work" resource.
//!
//! Working stations fill it while it is below the cap; broken stations always
//! drain it. Penalties subtract immediately but are floored only by the next
//! tick, so every public read goes through [`ResourcePool::value`], which clamps.

use serde::{Deserialize, Serialize};

use crate::Constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePool {
    value: f32,
    max: f32,
    gain_per_working_station: f32,
    loss_per_broken_station: f32,
}

impl ResourcePool {
    /// A negative or NaN `max_work` yields an empty pool rather than an inverted range.
    pub fn new(constants: &Constants) -> Self {
        let max = constants.max_work.max(0.0);
        Self {
            value: constants.initial_work.max(0.0).min(max),
            max,
            gain_per_working_station: constants.work_gain_per_second_per_working_station,
            loss_per_broken_station: constants.work_loss_per_second_per_broken_station,
        }
    }

    /// Clamped view of the pool, always within `[0, max]`.
    pub fn value(&self) -> f32 {
        self.value.clamp(0.0, self.max)
    }

    /// Unclamped internal value. May dip below zero between a penalty and the next tick.
    pub fn raw_value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Debug/test hook: overwrite the current value (clamped).
    pub fn set_value(&mut self, value: f32) {
        self.value = value.clamp(0.0, self.max);
    }

    /// Gain is gated on being under the cap; loss always applies.
    pub fn tick(&mut self, dt: f32, working: u32, broken: u32) {
        if self.value < self.max {
            self.value += working as f32 * self.gain_per_working_station * dt;
            self.value = self.value.min(self.max);
        }
        self.value -= broken as f32 * self.loss_per_broken_station * dt;
        self.value = self.value.max(0.0);
    }

    pub fn apply_penalty(&mut self, amount: f32) {
        self.value -= amount;
    }
}
