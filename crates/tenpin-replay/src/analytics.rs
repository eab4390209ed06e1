use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use tenpin_core::model::game::Game;
use tenpin_core::stats::{CareerStats, Stats, calculate_career_stats, calculate_stats};
use thiserror::Error;

const CONFIDENCE: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("statistics failed: {0}")]
    Stats(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Per-game line of the summary table.
#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub session: String,
    pub game_id: String,
    pub complete: bool,
    pub total: u32,
    pub stats: Stats,
}

#[derive(Default)]
pub struct AnalyticsCollector {
    reports: Vec<GameReport>,
    games: Vec<Game>,
}

impl AnalyticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, session: &str, game: &Game) -> &GameReport {
        let report = GameReport {
            session: session.to_string(),
            game_id: game.id().to_string(),
            complete: game.is_complete(),
            total: game.total_score(),
            stats: calculate_stats(game.frames()),
        };
        self.games.push(game.clone());
        self.reports.push(report);
        &self.reports[self.reports.len() - 1]
    }

    pub fn finalize(self, run_id: &str) -> Result<AnalyticsSummary, AnalyticsError> {
        let completed: Vec<Game> = self
            .games
            .into_iter()
            .filter(Game::is_complete)
            .collect();
        let career = calculate_career_stats(&completed);
        let scores: Vec<f64> = completed
            .iter()
            .map(|game| f64::from(game.total_score()))
            .collect();
        let score = ScoreDistribution::from_scores(&scores)?;

        Ok(AnalyticsSummary {
            run_id: run_id.to_string(),
            games: self.reports,
            career,
            score,
        })
    }
}

/// Spread of completed-game totals.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScoreDistribution {
    pub samples: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub ci95: (f64, f64),
}

impl ScoreDistribution {
    fn from_scores(scores: &[f64]) -> Result<Self, AnalyticsError> {
        if scores.is_empty() {
            return Ok(Self::default());
        }
        let mean = scores.iter().mean();
        if scores.len() == 1 {
            return Ok(Self {
                samples: 1,
                mean,
                std_dev: 0.0,
                ci95: (mean, mean),
            });
        }

        let std_dev = scores.iter().std_dev();
        let normal = Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::Stats(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + CONFIDENCE / 2.0);
        let margin = z * std_dev / (scores.len() as f64).sqrt();
        Ok(Self {
            samples: scores.len(),
            mean,
            std_dev,
            ci95: (mean - margin, mean + margin),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub games: Vec<GameReport>,
    pub career: CareerStats,
    pub score: ScoreDistribution,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str(&format!("# Replay Summary: {}\n\n", self.run_id));
        rows.push_str(&format!(
            "Completed games: {} | Average: {:.1} | High game: {} | Perfect games: {}\n\n",
            self.career.games, self.career.average_score, self.career.high_game, self.career.perfect_games
        ));
        rows.push_str(&format!(
            "Score mean {:.2}, std dev {:.2}, 95% CI [{:.2}, {:.2}] over {} games\n\n",
            self.score.mean, self.score.std_dev, self.score.ci95.0, self.score.ci95.1, self.score.samples
        ));
        rows.push_str("| Session | Game | Complete | Total | Strike % | Spare % | Splits | Split conv. % | Open | Avg 1st ball | Pocket % |\n");
        rows.push_str("|---------|------|----------|-------|----------|---------|--------|---------------|------|--------------|----------|\n");

        for game in &self.games {
            let stats = &game.stats;
            rows.push_str(&format!(
                "| {session} | {id} | {complete} | {total} | {strike:.1}% | {spare:.1}% | {splits} | {conversion:.1}% | {open} | {first:.1} | {pocket:.1}% |\n",
                session = game.session,
                id = game.game_id,
                complete = if game.complete { "Yes" } else { "No" },
                total = game.total,
                strike = stats.strike_percentage(),
                spare = stats.spare_percentage(),
                splits = stats.splits,
                conversion = stats.split_conversion_rate(),
                open = stats.open_frames,
                first = stats.average_first_ball_pins,
                pocket = stats.pocket_hit_rate(),
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("scores.png");
        let games = self.games.clone();
        let mean = self.score.mean;

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Score per game", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(0..games.len().max(1), 0u32..300u32)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Total")
                .x_desc("Game")
                .x_label_formatter(&|idx| {
                    games
                        .get(*idx)
                        .map(|game| game.session.clone())
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(games.iter().enumerate().map(|(idx, game)| {
                    let color = if !game.complete {
                        &RED
                    } else if f64::from(game.total) >= mean {
                        &GREEN
                    } else {
                        &BLUE
                    };
                    Rectangle::new([(idx, 0), (idx + 1, game.total)], color.filled())
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}
