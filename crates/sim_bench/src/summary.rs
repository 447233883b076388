use serde::Serialize;
use sim_core::{MetricsSnapshot, TerminationReason};
use std::collections::BTreeMap;

type Extractor = (&'static str, Box<dyn Fn(&MetricsSnapshot) -> f64>);

/// One finished seed as seen by the aggregator.
pub type SeedOutcome<'a> = (u64, &'a MetricsSnapshot, Option<TerminationReason>);

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub seed_count: usize,
    pub game_over_count: usize,
    pub game_over_by_reason: BTreeMap<String, usize>,
    pub metrics: Vec<MetricSummary>,
}

#[derive(Debug, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

/// Every summarized metric, in report order.
fn extractors() -> Vec<Extractor> {
    vec![
        (
            "survive_time_secs",
            Box::new(|s| f64::from(s.survive_time_secs)),
        ),
        ("final_work", Box::new(|s| f64::from(s.work))),
        ("repairs_completed", Box::new(|s| s.repairs_completed as f64)),
        (
            "penalties",
            Box::new(|s| (s.false_repairs + s.bait_repairs) as f64),
        ),
        ("false_repairs", Box::new(|s| s.false_repairs as f64)),
        ("bait_repairs", Box::new(|s| s.bait_repairs as f64)),
        ("boss_visits", Box::new(|s| s.boss_visits as f64)),
        (
            "stations_broken",
            Box::new(|s| f64::from(s.stations_broken)),
        ),
    ]
}

pub fn compute_summary(outcomes: &[SeedOutcome<'_>]) -> SummaryStats {
    let seed_count = outcomes.len();

    let mut game_over_by_reason = BTreeMap::new();
    for reason in outcomes.iter().filter_map(|(_, _, reason)| *reason) {
        *game_over_by_reason
            .entry(reason.as_str().to_string())
            .or_insert(0) += 1;
    }
    let game_over_count = game_over_by_reason.values().sum();

    let metrics = extractors()
        .iter()
        .map(|(name, extract)| {
            let values: Vec<f64> = outcomes.iter().map(|(_, s, _)| extract(s)).collect();
            compute_metric_summary(name, &values)
        })
        .collect();

    SummaryStats {
        seed_count,
        game_over_count,
        game_over_by_reason,
        metrics,
    }
}

fn compute_metric_summary(name: &str, values: &[f64]) -> MetricSummary {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let stddev = variance.sqrt();

    MetricSummary {
        name: name.to_string(),
        mean,
        min,
        max,
        stddev,
    }
}

/// Build aggregated metrics in the contract format:
/// `{ "key": { "mean": ..., "min": ..., "max": ..., "stddev": ... }, ... }`
pub fn build_aggregated_metrics(stats: &SummaryStats) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for summary in &stats.metrics {
        map.insert(
            summary.name.clone(),
            serde_json::json!({
                "mean": summary.mean,
                "min": summary.min,
                "max": summary.max,
                "stddev": summary.stddev,
            }),
        );
    }
    serde_json::Value::Object(map)
}

pub fn print_summary(scenario_name: &str, duration_secs: f32, stats: &SummaryStats) {
    println!(
        "\n=== {} ({} seeds, up to {:.0}s each) ===\n",
        scenario_name, stats.seed_count, duration_secs
    );
    println!(
        "{:<30} {:>8} {:>8} {:>8} {:>8}",
        "Metric", "Mean", "Min", "Max", "StdDev"
    );
    println!("{}", "-".repeat(70));
    for metric in &stats.metrics {
        println!(
            "{:<30} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            metric.name, metric.mean, metric.min, metric.max, metric.stddev
        );
    }
    println!(
        "{:<30} {}/{}",
        "game_over_rate", stats.game_over_count, stats.seed_count
    );
    for (reason, count) in &stats.game_over_by_reason {
        println!("  {reason:<28} {count}");
    }
}
