use crate::model::game::{Game, GameError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned JSON envelope around a single game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub version: u32,
    pub game: Game,
}

#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    UnsupportedVersion(u32),
    Invalid(GameError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Json(err) => write!(f, "snapshot is not valid JSON: {err}"),
            SnapshotError::UnsupportedVersion(version) => {
                write!(f, "snapshot version {version} is not supported")
            }
            SnapshotError::Invalid(err) => write!(f, "snapshot holds an invalid game: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Json(err) => Some(err),
            SnapshotError::Invalid(err) => Some(err),
            SnapshotError::UnsupportedVersion(_) => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Json(err)
    }
}

impl GameSnapshot {
    pub fn capture(game: &Game) -> Self {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            game: game.clone(),
        }
    }

    pub fn restore(self) -> Result<Game, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        self.game.validate().map_err(SnapshotError::Invalid)?;
        Ok(self.game)
    }

    pub fn to_json(game: &Game) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(game))
    }

    pub fn from_json(json: &str) -> Result<Game, SnapshotError> {
        let snapshot: GameSnapshot = serde_json::from_str(json)?;
        snapshot.restore()
    }
}
