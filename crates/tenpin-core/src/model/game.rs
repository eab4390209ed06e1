use crate::model::frame::{FRAME_COUNT, Frame, FrameError};
use crate::score;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::array;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random 64-bit identifier rendered as lowercase hex.
    pub fn generate() -> Self {
        let value: u64 = rand::random();
        Self(format!("{value:016x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPreference {
    Left,
    #[default]
    Right,
}

impl HandPreference {
    pub const fn as_str(self) -> &'static str {
        match self {
            HandPreference::Left => "left",
            HandPreference::Right => "right",
        }
    }
}

impl fmt::Display for HandPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session attributes recorded on the game verbatim; scoring never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSetup {
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub oil_pattern: String,
    #[serde(default)]
    pub lane_condition: String,
    #[serde(default)]
    pub lane_number: Option<u32>,
    #[serde(default)]
    pub hand_preference: HandPreference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    FrameNumber { index: usize, found: u8 },
    Frame { number: u8, source: FrameError },
    CompletionMismatch { flagged: bool, frames_complete: bool },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::FrameNumber { index, found } => {
                write!(f, "frame slot {index} carries number {found}")
            }
            GameError::Frame { number, source } => write!(f, "frame {number}: {source}"),
            GameError::CompletionMismatch {
                flagged,
                frames_complete,
            } => write!(
                f,
                "completion flag is {flagged} but frames complete is {frames_complete}"
            ),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Frame { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    setup: SessionSetup,
    frames: [Frame; FRAME_COUNT],
}

impl Game {
    pub fn new(setup: SessionSetup) -> Self {
        Self::with_identity(GameId::generate(), OffsetDateTime::now_utc(), setup)
    }

    pub fn with_identity(id: GameId, created_at: OffsetDateTime, setup: SessionSetup) -> Self {
        Self {
            id,
            created_at,
            completed: false,
            setup,
            frames: array::from_fn(|index| Frame::new(index as u8 + 1)),
        }
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn setup(&self) -> &SessionSetup {
        &self.setup
    }

    pub fn frames(&self) -> &[Frame; FRAME_COUNT] {
        &self.frames
    }

    /// Frame by 1-based number.
    pub fn frame(&self, number: u8) -> &Frame {
        &self.frames[usize::from(number) - 1]
    }

    pub(crate) fn frame_mut(&mut self, number: u8) -> &mut Frame {
        &mut self.frames[usize::from(number) - 1]
    }

    pub(crate) fn mark_complete(&mut self) {
        self.completed = true;
    }

    pub fn cumulative_scores(&self) -> [Option<u32>; FRAME_COUNT] {
        score::cumulative_scores(&self.frames)
    }

    pub fn total_score(&self) -> u32 {
        score::total_score(&self.frames)
    }

    /// Checks structural invariants of a game loaded from outside the engine.
    pub fn validate(&self) -> Result<(), GameError> {
        for (index, frame) in self.frames.iter().enumerate() {
            if usize::from(frame.number()) != index + 1 {
                return Err(GameError::FrameNumber {
                    index,
                    found: frame.number(),
                });
            }
            frame.validate().map_err(|source| GameError::Frame {
                number: frame.number(),
                source,
            })?;
        }
        let frames_complete = score::is_game_complete(&self.frames);
        if self.completed && !frames_complete {
            return Err(GameError::CompletionMismatch {
                flagged: self.completed,
                frames_complete,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Game, GameError, GameId, HandPreference, SessionSetup};
    use time::macros::datetime;

    #[test]
    fn new_game_has_ten_empty_frames() {
        let game = Game::new(SessionSetup::default());
        assert_eq!(game.frames().len(), 10);
        for (index, frame) in game.frames().iter().enumerate() {
            assert_eq!(usize::from(frame.number()), index + 1);
            assert!(frame.is_empty());
        }
        assert!(!game.is_complete());
        assert_eq!(game.total_score(), 0);
        assert_eq!(game.id().as_str().len(), 16);
    }

    #[test]
    fn setup_is_kept_verbatim() {
        let setup = SessionSetup {
            game_type: "league".into(),
            oil_pattern: "shark 44".into(),
            lane_condition: "transitioned".into(),
            lane_number: Some(17),
            hand_preference: HandPreference::Left,
        };
        let game = Game::new(setup.clone());
        assert_eq!(game.setup(), &setup);
    }

    #[test]
    fn completion_flag_must_match_frames() {
        let mut game = Game::with_identity(
            GameId::new("abc"),
            datetime!(2026-01-02 03:04:05 UTC),
            SessionSetup::default(),
        );
        assert!(game.validate().is_ok());
        game.mark_complete();
        assert!(matches!(
            game.validate(),
            Err(GameError::CompletionMismatch { .. })
        ));
    }

    #[test]
    fn hand_preference_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HandPreference::Left).unwrap(),
            "\"left\""
        );
    }
}
