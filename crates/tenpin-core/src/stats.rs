//! Per-game and career aggregates.

use crate::model::frame::{FRAME_COUNT, Frame};
use crate::model::game::Game;
use crate::score::PERFECT_GAME;
use crate::split::is_split_leave;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub strikes: u32,
    pub spares: u32,
    pub splits: u32,
    pub split_conversions: u32,
    pub open_frames: u32,
    pub completed_frames: u32,
    pub average_first_ball_pins: f64,
    pub pocket_hits: u32,
    pub total_pocket_opportunities: u32,
    /// Balls rolled at a full rack, including fresh racks in the tenth.
    pub strike_opportunities: u32,
    /// Completed frames whose first ball was not a strike.
    pub spare_opportunities: u32,
}

impl Stats {
    pub fn strike_percentage(&self) -> f64 {
        percentage(self.strikes, self.strike_opportunities)
    }

    pub fn spare_percentage(&self) -> f64 {
        percentage(self.spares, self.spare_opportunities)
    }

    pub fn split_conversion_rate(&self) -> f64 {
        percentage(self.split_conversions, self.splits)
    }

    pub fn pocket_hit_rate(&self) -> f64 {
        percentage(self.pocket_hits, self.total_pocket_opportunities)
    }
}

/// Tallies one game's frames in a single pass.
pub fn calculate_stats(frames: &[Frame; FRAME_COUNT]) -> Stats {
    let mut stats = Stats::default();
    let mut first_ball_pins = 0u32;

    for frame in frames {
        let Some(first) = frame.throws().first() else {
            continue;
        };
        let strike = !first.is_foul() && first.pin_count() == 10;
        let split = is_split_leave(frame, 0);
        if strike {
            stats.strikes += 1;
        }
        if split {
            stats.splits += 1;
        }
        if !strike && frame.is_spare() {
            stats.spares += 1;
            if split {
                stats.split_conversions += 1;
            }
        }
        if !frame.is_tenth() && frame.is_open() {
            stats.open_frames += 1;
        }

        for (index, throw) in frame.throws().iter().enumerate() {
            if !frame.is_fresh_rack(index) {
                continue;
            }
            stats.strike_opportunities += 1;
            if index > 0 && !throw.is_foul() && throw.pin_count() == 10 {
                stats.strikes += 1;
            }
        }

        if frame.is_finished() {
            stats.completed_frames += 1;
            first_ball_pins += u32::from(first.pin_count());
            if !strike {
                stats.spare_opportunities += 1;
            }
            stats.total_pocket_opportunities += 1;
            if frame.is_pocket_hit() {
                stats.pocket_hits += 1;
            }
        }
    }

    if stats.completed_frames > 0 {
        stats.average_first_ball_pins =
            round_tenth(f64::from(first_ball_pins) / f64::from(stats.completed_frames));
    }
    stats
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerStats {
    pub games: u32,
    pub average_score: f64,
    pub high_game: u32,
    pub total_strikes: u32,
    pub total_spares: u32,
    pub perfect_games: u32,
}

pub fn calculate_career_stats(games: &[Game]) -> CareerStats {
    if games.is_empty() {
        return CareerStats::default();
    }

    let mut career = CareerStats::default();
    let mut total_score = 0u64;
    for game in games {
        let score = game.total_score();
        let stats = calculate_stats(game.frames());
        career.games += 1;
        total_score += u64::from(score);
        career.high_game = career.high_game.max(score);
        career.total_strikes += stats.strikes;
        career.total_spares += stats.spares;
        if score == PERFECT_GAME {
            career.perfect_games += 1;
        }
    }
    career.average_score = round_tenth(total_score as f64 / f64::from(career.games));
    career
}

fn percentage(hits: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        f64::from(hits) * 100.0 / f64::from(attempts)
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
