//! Persistence boundary for finished and in-progress games.

use crate::model::game::{Game, GameId, HandPreference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub default_hand_preference: HandPreference,
    #[serde(default)]
    pub has_set_hand_preference: bool,
}

#[derive(Debug)]
pub enum StoreError {
    NotFound(GameId),
    Rejected { id: GameId, reason: String },
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "no stored game with id {id}"),
            StoreError::Rejected { id, reason } => write!(f, "game {id} rejected: {reason}"),
            StoreError::Backend(err) => write!(f, "store backend failed: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Backend(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

/// Where games and user settings live between sessions.
///
/// Saving a game whose id is already stored replaces the stored copy.
pub trait GameStore {
    fn save(&mut self, game: &Game) -> Result<(), StoreError>;
    /// Stored games, oldest first.
    fn list(&self) -> Result<Vec<Game>, StoreError>;
    fn delete(&mut self, id: &GameId) -> Result<(), StoreError>;
    fn settings(&self) -> Result<StoreSettings, StoreError>;
    fn set_default_hand_preference(&mut self, preference: HandPreference)
    -> Result<(), StoreError>;
}

/// Validates a game before it is handed to a backend.
pub fn check_storable(game: &Game) -> Result<(), StoreError> {
    game.validate().map_err(|err| StoreError::Rejected {
        id: game.id().clone(),
        reason: err.to_string(),
    })
}

/// Orders games by creation time, then id.
pub fn sort_games(games: &mut [Game]) {
    games.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    games: BTreeMap<GameId, Game>,
    settings: StoreSettings,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl GameStore for MemoryStore {
    fn save(&mut self, game: &Game) -> Result<(), StoreError> {
        check_storable(game)?;
        self.games.insert(game.id().clone(), game.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Game>, StoreError> {
        let mut games: Vec<Game> = self.games.values().cloned().collect();
        sort_games(&mut games);
        Ok(games)
    }

    fn delete(&mut self, id: &GameId) -> Result<(), StoreError> {
        match self.games.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    fn settings(&self) -> Result<StoreSettings, StoreError> {
        Ok(self.settings)
    }

    fn set_default_hand_preference(
        &mut self,
        preference: HandPreference,
    ) -> Result<(), StoreError> {
        self.settings = StoreSettings {
            default_hand_preference: preference,
            has_set_hand_preference: true,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{GameStore, MemoryStore, StoreError};
    use crate::model::game::{Game, GameId, HandPreference, SessionSetup};
    use crate::turn::ScoringSession;
    use time::macros::datetime;

    fn game(id: &str) -> Game {
        Game::with_identity(
            GameId::new(id),
            datetime!(2026-05-01 18:00:00 UTC),
            SessionSetup::default(),
        )
    }

    #[test]
    fn save_replaces_same_id() {
        let mut store = MemoryStore::new();
        store.save(&game("a")).unwrap();

        let mut session = ScoringSession::from_game(game("a"));
        session.declare_strike_or_spare();
        store.save(session.game()).unwrap();

        let games = store.list().unwrap();
        assert_eq!(games.len(), 1);
        assert!(games[0].frame(1).is_strike());
    }

    #[test]
    fn list_orders_by_creation() {
        let mut store = MemoryStore::new();
        let later = Game::with_identity(
            GameId::new("0"),
            datetime!(2026-05-02 18:00:00 UTC),
            SessionSetup::default(),
        );
        store.save(&later).unwrap();
        store.save(&game("z")).unwrap();
        let ids: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|g| g.id().to_string())
            .collect();
        assert_eq!(ids, ["z", "0"]);
    }

    #[test]
    fn delete_missing_reports_not_found() {
        let mut store = MemoryStore::new();
        store.save(&game("a")).unwrap();
        store.delete(&GameId::new("a")).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.delete(&GameId::new("a")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn hand_preference_setting() {
        let mut store = MemoryStore::new();
        let defaults = store.settings().unwrap();
        assert_eq!(defaults.default_hand_preference, HandPreference::Right);
        assert!(!defaults.has_set_hand_preference);

        store
            .set_default_hand_preference(HandPreference::Left)
            .unwrap();
        let settings = store.settings().unwrap();
        assert_eq!(settings.default_hand_preference, HandPreference::Left);
        assert!(settings.has_set_hand_preference);
    }
}
