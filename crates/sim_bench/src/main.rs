use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod overrides;
mod run_result;
mod runner;
mod scenario;
mod summary;

#[derive(Parser)]
#[command(
    name = "sim_bench",
    about = "Automated scenario runner for sim benchmarking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file across multiple seeds.
    Run {
        /// Path to the scenario JSON file.
        #[arg(long)]
        scenario: String,
        /// Output directory (default: runs/).
        #[arg(long, default_value = "runs")]
        output_dir: String,
    },
}

fn run(scenario_path: &str, output_dir: &str) -> Result<()> {
    let scenario = scenario::load_scenario(Path::new(scenario_path))?;
    let seeds = scenario.seeds.expand();
    let settings = runner::RunSettings {
        max_ticks: scenario.max_ticks(),
        dt: scenario.dt,
        metrics_every: scenario.metrics_every,
        reaction_secs: scenario.autopilot_reaction_secs,
    };

    info!(
        "loading scenario '{}': {} seeds × up to {}s",
        scenario.name,
        seeds.len(),
        scenario.duration_secs
    );

    // Load config, apply overrides, then repair whatever the overrides broke.
    let mut config = sim_world::load_config(&scenario.content_dir)?;
    overrides::apply_overrides(&mut config, &scenario.overrides)?;
    for note in config.normalize() {
        warn!("config adjusted: {note}");
    }

    // Build scenario_params for run_result metadata.
    let scenario_params = serde_json::json!({
        "duration_secs": scenario.duration_secs,
        "dt": scenario.dt,
        "metrics_every": scenario.metrics_every,
        "content_dir": scenario.content_dir,
        "overrides": scenario.overrides,
        "autopilot_reaction_secs": scenario.autopilot_reaction_secs,
    });

    // Create timestamped output directory.
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_dir = PathBuf::from(output_dir).join(format!("{}_{}", scenario.name, timestamp));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating output directory: {}", run_dir.display()))?;

    // Copy scenario file into output dir.
    std::fs::copy(scenario_path, run_dir.join("scenario.json")).context("copying scenario file")?;

    info!("output: {}", run_dir.display());
    info!("running {} seeds in parallel", seeds.len());

    let results: Vec<Result<runner::SeedResult>> = seeds
        .par_iter()
        .map(|&seed| {
            let seed_dir = run_dir.join(format!("seed_{seed}"));
            runner::run_seed(
                &config,
                seed,
                settings,
                &seed_dir,
                &scenario.name,
                &scenario_params,
            )
        })
        .collect();

    // Collect results, reporting any failures.
    let mut seed_results = Vec::new();
    for result in results {
        match result {
            Ok(seed_result) => seed_results.push(seed_result),
            Err(err) => error!("seed failed: {err:#}"),
        }
    }

    if seed_results.is_empty() {
        anyhow::bail!("all seeds failed");
    }

    let outcomes: Vec<summary::SeedOutcome> = seed_results
        .iter()
        .map(|r| (r.seed, &r.final_snapshot, r.reason))
        .collect();

    let stats = summary::compute_summary(&outcomes);
    summary::print_summary(&scenario.name, scenario.duration_secs, &stats);

    let summary_path = run_dir.join("summary.json");
    let summary_json = serde_json::to_string_pretty(&stats).context("serializing summary")?;
    std::fs::write(&summary_path, summary_json)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    let batch_id = Uuid::new_v4().to_string();
    let run_ids: Vec<&str> = seed_results.iter().map(|r| r.run_id.as_str()).collect();

    let batch_summary = serde_json::json!({
        "batch_schema_version": 1,
        "batch_id": batch_id,
        "scenario_name": scenario.name,
        "scenario_params": scenario_params,
        "seed_count": seed_results.len(),
        "run_ids": run_ids,
        "game_over_count": stats.game_over_count,
        "game_over_by_reason": stats.game_over_by_reason,
        "aggregated_metrics": summary::build_aggregated_metrics(&stats),
    });

    let batch_path = run_dir.join("batch_summary.json");
    let batch_tmp = batch_path.with_extension("json.tmp");
    let batch_json =
        serde_json::to_string_pretty(&batch_summary).context("serializing batch summary")?;
    let mut batch_file = std::fs::File::create(&batch_tmp)
        .with_context(|| format!("creating {}", batch_tmp.display()))?;
    batch_file
        .write_all(batch_json.as_bytes())
        .context("writing batch summary")?;
    batch_file.sync_all()?;
    std::fs::rename(&batch_tmp, &batch_path).context("renaming batch summary")?;

    info!("summary written to {}", summary_path.display());
    info!("batch summary written to {}", batch_path.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            scenario,
            output_dir,
        } => run(&scenario, &output_dir)?,
    }
    Ok(())
}
