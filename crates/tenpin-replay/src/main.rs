use std::path::PathBuf;

use clap::Parser;

use tenpin_replay::config::{ReplayConfig, ResolvedOutputs, SimulationConfig};
use tenpin_replay::logging::init_logging;
use tenpin_replay::runner::ReplayRunner;

/// Replays scripted and simulated bowling games through the scoring engine.
#[derive(Debug, Parser)]
#[command(
    name = "tenpin-replay",
    author,
    version,
    about = "Deterministic ten-pin scoring replay harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "replay/league.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the simulation RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of simulated games.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ReplayConfig::from_path(&cli.config).map_err(|err| {
        let path = err.path().display().to_string();
        anyhow::Error::new(err).context(format!("loading replay config {path}"))
    })?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if cli.seed.is_some() || cli.games.is_some() {
        let simulation = config
            .simulation
            .get_or_insert_with(SimulationConfig::default);
        if let Some(seed) = cli.seed {
            simulation.seed = Some(seed);
        }
        if let Some(games) = cli.games {
            simulation.games = games;
        }
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let session_count = config.sessions.len();
    let simulated = config.simulation.as_ref().map_or(0, |sim| sim.games);
    let run_id = config.run_id.clone();

    println!(
        "Loaded configuration '{run_id}' with {session_count} scripted session{} and {simulated} simulated game{}",
        if session_count == 1 { "" } else { "s" },
        if simulated == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: replay skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = ReplayRunner::new(config, outputs)?;
    let summary = runner.run()?;
    println!(
        "Replay complete for '{run_id}': {} games ({} complete, {} ignored actions) → {} rows at {}",
        summary.games_played,
        summary.games_completed,
        summary.ignored_actions,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    println!("Game store: {}", summary.store_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Score plot: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        println!(
            "Telemetry summary (Markdown): {}",
            outputs.markdown_path.display()
        );
        println!(
            "  Turn events: {} ({} ignored kinds)",
            outputs.summary.turns.count,
            outputs.summary.turns.ignored.len()
        );
    }

    Ok(())
}
