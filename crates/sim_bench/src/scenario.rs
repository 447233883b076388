use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Simulated seconds each seed may survive before the run stops.
    pub duration_secs: f32,
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default = "default_metrics_every")]
    pub metrics_every: u64,
    pub seeds: SeedSpec,
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
    #[serde(default)]
    pub overrides: HashMap<String, serde_json::Value>,
    #[serde(default = "default_reaction_secs")]
    pub autopilot_reaction_secs: f32,
}

fn default_dt() -> f32 {
    0.1
}

fn default_metrics_every() -> u64 {
    10
}

fn default_content_dir() -> String {
    "./content".to_string()
}

fn default_reaction_secs() -> f32 {
    sim_control::DEFAULT_REACTION_SECS
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SeedSpec {
    List(Vec<u64>),
    Range { range: [u64; 2] },
}

impl SeedSpec {
    pub fn expand(&self) -> Vec<u64> {
        match self {
            SeedSpec::List(seeds) => seeds.clone(),
            SeedSpec::Range { range } => (range[0]..=range[1]).collect(),
        }
    }
}

impl Scenario {
    /// Tick budget per seed, rounded up.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn max_ticks(&self) -> u64 {
        (self.duration_secs / self.dt).ceil() as u64
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file: {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&json)
        .with_context(|| format!("parsing scenario file: {}", path.display()))?;
    if scenario.name.is_empty() {
        bail!("scenario 'name' must not be empty");
    }
    if !(scenario.duration_secs.is_finite() && scenario.duration_secs > 0.0) {
        bail!("scenario 'duration_secs' must be > 0");
    }
    if !(scenario.dt.is_finite() && scenario.dt > 0.0) {
        bail!("scenario 'dt' must be > 0");
    }
    if scenario.metrics_every == 0 {
        bail!("scenario 'metrics_every' must be > 0");
    }
    let seeds = scenario.seeds.expand();
    if seeds.is_empty() {
        bail!("scenario 'seeds' must produce at least one seed");
    }
    Ok(scenario)
}
