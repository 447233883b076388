use anyhow::{bail, Result};
use sim_core::SessionConfig;
use std::collections::HashMap;

const CONSTANT_KEYS: &[&str] = &[
    "max_work",
    "initial_work",
    "work_gain_per_second_per_working_station",
    "work_loss_per_second_per_broken_station",
    "false_repair_penalty",
    "bait_repair_penalty",
    "bait_duration_secs",
    "boss_min_work_threshold",
    "boss_min_arrive_interval_secs",
    "boss_max_arrive_interval_secs",
    "boss_warning_duration_secs",
    "boss_stay_duration_secs",
];

/// These apply to every station in the config.
const STATION_KEYS: &[&str] = &[
    "break_weight",
    "bait_weight",
    "min_time_to_break_secs",
    "max_time_to_break_secs",
];

pub fn apply_overrides(
    config: &mut SessionConfig,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    let constants = &mut config.constants;
    for (key, value) in overrides {
        match key.as_str() {
            "max_work" => constants.max_work = as_f32(key, value)?,
            "initial_work" => constants.initial_work = as_f32(key, value)?,
            "work_gain_per_second_per_working_station" => {
                constants.work_gain_per_second_per_working_station = as_f32(key, value)?;
            }
            "work_loss_per_second_per_broken_station" => {
                constants.work_loss_per_second_per_broken_station = as_f32(key, value)?;
            }
            "false_repair_penalty" => constants.false_repair_penalty = as_f32(key, value)?,
            "bait_repair_penalty" => constants.bait_repair_penalty = as_f32(key, value)?,
            "bait_duration_secs" => constants.bait_duration_secs = as_f32(key, value)?,
            "boss_min_work_threshold" => {
                constants.boss_min_work_threshold = as_f32(key, value)?;
            }
            "boss_min_arrive_interval_secs" => {
                constants.boss_min_arrive_interval_secs = as_f32(key, value)?;
            }
            "boss_max_arrive_interval_secs" => {
                constants.boss_max_arrive_interval_secs = as_f32(key, value)?;
            }
            "boss_warning_duration_secs" => {
                constants.boss_warning_duration_secs = as_f32(key, value)?;
            }
            "boss_stay_duration_secs" => {
                constants.boss_stay_duration_secs = as_f32(key, value)?;
            }
            "break_weight" | "bait_weight" | "min_time_to_break_secs"
            | "max_time_to_break_secs" => {
                let v = as_f32(key, value)?;
                for station in &mut config.stations {
                    match key.as_str() {
                        "break_weight" => station.break_weight = v,
                        "bait_weight" => station.bait_weight = v,
                        "min_time_to_break_secs" => station.min_time_to_break_secs = v,
                        _ => station.max_time_to_break_secs = v,
                    }
                }
            }
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}, {}",
                CONSTANT_KEYS.join(", "),
                STATION_KEYS.join(", ")
            ),
        }
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)] // JSON f64→f32 is intentional
fn as_f32(key: &str, value: &serde_json::Value) -> Result<f32> {
    value
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected a number, got {value}"))
}
