use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tenpin_core::model::game::{Game, GameId, SessionSetup};
use tenpin_core::stats::Stats;
use tenpin_core::store::{GameStore, StoreError};
use tenpin_core::symbols::frame_symbols;
use tenpin_core::turn::{ScoringSession, Transition};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{ReplayConfig, ResolvedOutputs};
use crate::logging::TELEMETRY_FILE;
use crate::script::{self, ScriptError};
use crate::simulate::Bowler;
use crate::store::{FileStoreError, JsonFileStore};
use crate::telemetry::{
    GAME_TARGET, TelemetryError, TelemetryOutputs, append_highlights_to_markdown,
    write_summary_outputs,
};

/// Primary entry point for replaying scripted and simulated games.
pub struct ReplayRunner {
    config: ReplayConfig,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub games_completed: usize,
    pub ignored_actions: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub store_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

/// Outcome of driving one game through a session.
struct PlayedGame {
    session: String,
    game: Game,
    actions: usize,
    ignored: usize,
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    session: &'a str,
    game_id: &'a str,
    complete: bool,
    total: u32,
    cumulative: [Option<u32>; 10],
    marks: Vec<String>,
    split_frames: Vec<u8>,
    actions: usize,
    ignored_actions: usize,
    stats: &'a Stats,
}

impl ReplayRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: ReplayConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        for session in &config.sessions {
            script::parse(&session.script).map_err(|source| RunnerError::Script {
                session: session.name.clone(),
                source,
            })?;
        }
        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        })
    }

    /// Play every game, streaming JSONL rows and persisting completed games.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut store = JsonFileStore::open(&self.outputs.store)?;
        let mut analytics = AnalyticsCollector::new();
        let mut summary_counts = (0usize, 0usize, 0usize);

        let mut record = |played: PlayedGame| -> Result<(), RunnerError> {
            if played.game.is_complete() {
                store.save(&played.game)?;
                summary_counts.1 += 1;
            }
            let report = analytics.record_game(&played.session, &played.game);
            let stats = report.stats;
            write_game_row(&mut writer, &self.config.run_id, &played, &stats)?;
            self.log_game(&played);
            summary_counts.0 += 1;
            summary_counts.2 += played.ignored;
            Ok(())
        };

        for session in &self.config.sessions {
            let played = self.play_script(&session.name, &session.setup, &session.script)?;
            record(played)?;
        }

        if let Some(simulation) = &self.config.simulation {
            let mut seeds = StdRng::seed_from_u64(simulation.seed.unwrap_or(0));
            for index in 0..simulation.games {
                let mut bowler = Bowler::new(seeds.next_u64(), simulation);
                let name = format!("sim-{index:04}");
                let mut session = ScoringSession::from_game(self.new_game(&name, &simulation.setup));
                let bowled = bowler.play(&mut session);
                record(PlayedGame {
                    session: name,
                    game: session.into_game(),
                    actions: bowled.actions.len(),
                    ignored: bowled.ignored,
                })?;
            }
        }
        drop(record);

        writer.flush()?;
        let (games_played, games_completed, ignored_actions) = summary_counts;

        let summary = analytics.finalize(&self.config.run_id)?;
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(
                    target: "tenpin_replay::runner",
                    reason = "plot_failed",
                    message = %err,
                );
                None
            }
        };

        let telemetry_dir = self.outputs.report_dir();
        let telemetry_path = if self.logging_enabled {
            Some(telemetry_dir.join(TELEMETRY_FILE))
        } else {
            None
        };

        let telemetry_outputs = if let Some(path) = telemetry_path.as_ref() {
            write_summary_outputs(path, &telemetry_dir)?
        } else {
            None
        };

        if let Some(outputs) = telemetry_outputs.as_ref() {
            append_highlights_to_markdown(&self.outputs.summary_md, outputs)?;
        }

        Ok(RunSummary {
            games_played,
            games_completed,
            ignored_actions,
            rows_written: games_played,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            store_path: store.path().to_path_buf(),
            plot_path,
            telemetry_path,
            telemetry_outputs,
        })
    }

    fn new_game(&self, name: &str, setup: &SessionSetup) -> Game {
        Game::with_identity(
            GameId::new(format!("{}-{}", self.config.run_id, name)),
            OffsetDateTime::now_utc(),
            setup.clone(),
        )
    }

    fn play_script(
        &self,
        name: &str,
        setup: &SessionSetup,
        source: &str,
    ) -> Result<PlayedGame, RunnerError> {
        let steps = script::parse(source).map_err(|source| RunnerError::Script {
            session: name.to_string(),
            source,
        })?;
        let mut session = ScoringSession::from_game(self.new_game(name, setup));
        let mut ignored = 0usize;
        for step in &steps {
            let action = step.action(session.standing_pins());
            if let Transition::Ignored(_) = session.apply(action) {
                ignored += 1;
            }
        }
        if !session.is_complete() {
            tracing::warn!(
                target: "tenpin_replay::runner",
                session = name,
                reason = "script_incomplete",
                message = "script ended before the tenth frame finished",
            );
        }
        Ok(PlayedGame {
            session: name.to_string(),
            game: session.into_game(),
            actions: steps.len(),
            ignored,
        })
    }

    fn log_game(&self, played: &PlayedGame) {
        if !self.logging_enabled || !tracing::enabled!(target: GAME_TARGET, Level::INFO) {
            return;
        }
        event!(
            target: GAME_TARGET,
            Level::INFO,
            run_id = %self.config.run_id,
            session = %played.session,
            game_id = %played.game.id(),
            complete = played.game.is_complete(),
            total = played.game.total_score(),
            actions = played.actions as u64,
            ignored = played.ignored as u64,
        );
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    played: &PlayedGame,
    stats: &Stats,
) -> Result<(), RunnerError> {
    let game = &played.game;
    let frames = game.frames();
    let row = GameLogRow {
        run_id,
        session: &played.session,
        game_id: game.id().as_str(),
        complete: game.is_complete(),
        total: game.total_score(),
        cumulative: game.cumulative_scores(),
        marks: frames
            .iter()
            .map(|frame| frame_symbols(frame).to_string())
            .collect(),
        split_frames: frames
            .iter()
            .filter(|frame| !frame_symbols(frame).split_indexes.is_empty())
            .map(|frame| frame.number())
            .collect(),
        actions: played.actions,
        ignored_actions: played.ignored,
        stats,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("session '{session}' has an unreadable script: {source}")]
    Script {
        session: String,
        #[source]
        source: ScriptError,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("store file error: {0}")]
    FileStore(#[from] FileStoreError),
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}
