use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand_chacha::ChaCha8Rng;
use sim_control::{AutopilotController, CommandSource, IdleOperator};
use sim_core::{Event, EventEnvelope, SimulationClock};
use sim_world::{build_clock, create_run_dir, generate_run_id, load_config, write_run_info};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "sim_cli", about = "Office inspection sim CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one session until game over or the time limit.
    Run {
        /// Simulated seconds before the run stops on its own.
        #[arg(long, default_value_t = 300.0)]
        seconds: f32,
        /// Seconds advanced per tick.
        #[arg(long, default_value_t = 0.1)]
        dt: f32,
        /// RNG seed. A random one is drawn when omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Log a status line every N ticks.
        #[arg(long, default_value_t = 50)]
        print_every: u64,
        /// Sample metrics every N ticks.
        #[arg(long, default_value_t = 10)]
        metrics_every: u64,
        /// Disable automatic metrics collection to runs/ directory.
        #[arg(long)]
        no_metrics: bool,
        /// Do not attach the autopilot; nothing repairs the stations.
        #[arg(long)]
        manual: bool,
        /// Autopilot delay before repairing a broken station.
        #[arg(long, default_value_t = sim_control::DEFAULT_REACTION_SECS)]
        reaction_secs: f32,
    },
}

struct RunArgs {
    seconds: f32,
    dt: f32,
    seed: Option<u64>,
    content_dir: String,
    print_every: u64,
    metrics_every: u64,
    no_metrics: bool,
    manual: bool,
    reaction_secs: f32,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args.content_dir)?;
    let config_version = config.config_version.clone();

    anyhow::ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "--dt must be a positive number of seconds, got {}",
        args.dt
    );
    let dt = args.dt;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut clock = build_clock(config, seed);
    for note in clock.config_notes() {
        warn!("config adjusted: {note}");
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_ticks = (args.seconds.max(0.0) / dt).ceil() as u64;
    let print_every = args.print_every.max(1);
    let metrics_every = args.metrics_every.max(1);

    // Set up per-run metrics directory.
    let mut metrics_writer: Option<sim_core::MetricsFileWriter> = None;
    if !args.no_metrics {
        let run_id = generate_run_id(seed);
        let run_dir = create_run_dir(std::path::Path::new("runs"), &run_id)?;
        write_run_info(
            &run_dir,
            &run_id,
            seed,
            &config_version,
            metrics_every,
            "sim_cli",
            &serde_json::json!({
                "seconds": args.seconds,
                "dt": dt,
                "print_every": print_every,
                "manual": args.manual,
                "reaction_secs": args.reaction_secs,
            }),
        )?;
        let writer = sim_core::MetricsFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        metrics_writer = Some(writer);
        info!("run directory: {}", run_dir.display());
    }

    let mut operator: Box<dyn CommandSource> = if args.manual {
        Box::new(IdleOperator)
    } else {
        Box::new(AutopilotController::new(args.reaction_secs))
    };

    info!(
        seed,
        stations = clock.config().stations.len(),
        config_version = %config_version,
        max_ticks,
        "starting session"
    );

    for _ in 0..max_ticks {
        for command in operator.generate_commands(clock.state(), clock.config()) {
            clock.submit(command);
        }
        let events = clock.tick(dt);
        for envelope in &events {
            log_event(envelope);
        }

        let tick = clock.state().meta.tick;
        if tick % print_every == 0 {
            log_status(&clock);
        }
        if let Some(ref mut writer) = metrics_writer {
            if tick % metrics_every == 0 || clock.is_terminal() {
                let snapshot = sim_core::compute_metrics(clock.state());
                writer.write_row(&snapshot).context("writing metrics row")?;
            }
        }
        if clock.is_terminal() {
            break;
        }
    }

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
    }

    print_summary(&clock);
    Ok(())
}

fn log_event(envelope: &EventEnvelope) {
    let t = envelope.time_secs;
    match &envelope.event {
        Event::BossWarningStarted => info!(t, "boss is coming"),
        Event::BossArrived => info!(t, "boss arrived"),
        Event::BossLeft => info!(t, "boss left"),
        Event::GameOver {
            reason,
            survive_time_secs,
            final_work,
        } => info!(t, %reason, survive_time_secs, final_work, "game over"),
        other => {
            if let Some(station_id) = other.station_id() {
                debug!(t, station = %station_id, event = ?other, "station event");
            }
        }
    }
}

fn log_status(clock: &SimulationClock<ChaCha8Rng>) {
    let snapshot = clock.snapshot();
    let (working, broken) = clock.state().status_counts();
    info!(
        tick = snapshot.tick,
        t = snapshot.survive_time_secs,
        work = format_args!("{:.1}/{:.0}", snapshot.work, snapshot.max_work),
        working,
        broken,
        boss = snapshot.boss_phase.label(),
        "status"
    );
}

fn print_summary(clock: &SimulationClock<ChaCha8Rng>) {
    let state = clock.state();
    println!("{}", "-".repeat(80));
    match clock.result() {
        Some(result) => println!(
            "GAME OVER: {}  survived={:.1}s  final_work={:.1}",
            result.reason, result.survive_time_secs, result.final_work
        ),
        None => println!(
            "Time limit reached  survived={:.1}s  work={:.1}",
            state.meta.survive_time_secs,
            state.pool.value()
        ),
    }
    let c = &state.counters;
    println!(
        "repairs={}  false_repairs={}  bait_repairs={}  boss_visits={}",
        c.repairs_completed, c.false_repairs, c.bait_repairs, c.boss_visits
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            seconds,
            dt,
            seed,
            content_dir,
            print_every,
            metrics_every,
            no_metrics,
            manual,
            reaction_secs,
        } => run(RunArgs {
            seconds,
            dt,
            seed,
            content_dir,
            print_every,
            metrics_every,
            no_metrics,
            manual,
            reaction_secs,
        })?,
    }
    Ok(())
}
