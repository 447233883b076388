//! Config normalization.
//!
//! Numeric authoring mistakes are repaired, never rejected: negative or
//! non-finite values clamp to zero and inverted bounds are swapped. Each fix is
//! reported as a human-readable note so hosts can log it.

use crate::{Constants, SessionConfig, StationDef};

impl SessionConfig {
    /// Repair numeric fields in place. Returns one note per adjustment made.
    pub fn normalize(&mut self) -> Vec<String> {
        let mut notes = Vec::new();
        self.constants.normalize(&mut notes);
        for station in &mut self.stations {
            station.normalize(&mut notes);
        }
        notes
    }
}

impl Constants {
    fn normalize(&mut self, notes: &mut Vec<String>) {
        non_negative("max_work", &mut self.max_work, notes);
        non_negative("initial_work", &mut self.initial_work, notes);
        non_negative(
            "work_gain_per_second_per_working_station",
            &mut self.work_gain_per_second_per_working_station,
            notes,
        );
        non_negative(
            "work_loss_per_second_per_broken_station",
            &mut self.work_loss_per_second_per_broken_station,
            notes,
        );
        non_negative("false_repair_penalty", &mut self.false_repair_penalty, notes);
        non_negative("bait_repair_penalty", &mut self.bait_repair_penalty, notes);
        non_negative("bait_duration_secs", &mut self.bait_duration_secs, notes);
        non_negative("boss_min_work_threshold", &mut self.boss_min_work_threshold, notes);
        non_negative(
            "boss_min_arrive_interval_secs",
            &mut self.boss_min_arrive_interval_secs,
            notes,
        );
        non_negative(
            "boss_max_arrive_interval_secs",
            &mut self.boss_max_arrive_interval_secs,
            notes,
        );
        non_negative(
            "boss_warning_duration_secs",
            &mut self.boss_warning_duration_secs,
            notes,
        );
        non_negative("boss_stay_duration_secs", &mut self.boss_stay_duration_secs, notes);
        ordered_bounds(
            "boss arrive interval",
            &mut self.boss_min_arrive_interval_secs,
            &mut self.boss_max_arrive_interval_secs,
            notes,
        );
        if self.initial_work > self.max_work {
            notes.push(format!(
                "initial_work {} exceeds max_work {}; clamped",
                self.initial_work, self.max_work
            ));
            self.initial_work = self.max_work;
        }
    }
}

impl StationDef {
    fn normalize(&mut self, notes: &mut Vec<String>) {
        let id = self.id.0.clone();
        non_negative(&format!("{id}.break_weight"), &mut self.break_weight, notes);
        non_negative(&format!("{id}.bait_weight"), &mut self.bait_weight, notes);
        non_negative(
            &format!("{id}.min_time_to_break_secs"),
            &mut self.min_time_to_break_secs,
            notes,
        );
        non_negative(
            &format!("{id}.max_time_to_break_secs"),
            &mut self.max_time_to_break_secs,
            notes,
        );
        non_negative(&format!("{id}.interact_range"), &mut self.interact_range, notes);
        ordered_bounds(
            &format!("{id} time to break"),
            &mut self.min_time_to_break_secs,
            &mut self.max_time_to_break_secs,
            notes,
        );
    }
}

fn non_negative(field: &str, value: &mut f32, notes: &mut Vec<String>) {
    // Written so NaN also lands here.
    if !(*value >= 0.0) || value.is_infinite() {
        notes.push(format!("{field} was {value}; clamped to 0"));
        *value = 0.0;
    }
}

fn ordered_bounds(label: &str, min: &mut f32, max: &mut f32, notes: &mut Vec<String>) {
    if *min > *max {
        notes.push(format!("{label} bounds inverted ({min} > {max}); swapped"));
        std::mem::swap(min, max);
    }
}
