//! `GameStore` backed by a single pretty-printed JSON document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tenpin_core::model::game::{Game, GameError, GameId, HandPreference};
use tenpin_core::store::{GameStore, StoreError, StoreSettings, check_storable, sort_games};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store document {path:?} is malformed: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store document {path:?} holds invalid game {id}: {source}")]
    Invalid {
        path: PathBuf,
        id: GameId,
        #[source]
        source: GameError,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    settings: StoreSettings,
    #[serde(default)]
    games: Vec<Game>,
}

pub struct JsonFileStore {
    path: PathBuf,
    document: StoreDocument,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileStoreError> {
        let path = path.as_ref().to_path_buf();
        let document: StoreDocument = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| FileStoreError::Io {
                context: "reading store",
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| FileStoreError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            StoreDocument::default()
        };
        for game in &document.games {
            game.validate().map_err(|source| FileStoreError::Invalid {
                path: path.clone(),
                id: game.id().clone(),
                source,
            })?;
        }
        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the document beside the target and renames it into place.
    fn persist(&self) -> Result<(), FileStoreError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| FileStoreError::Io {
                context: "creating store directory",
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let body =
            serde_json::to_vec_pretty(&self.document).map_err(|source| FileStoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body).map_err(|source| FileStoreError::Io {
            context: "writing store",
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| FileStoreError::Io {
            context: "replacing store",
            path: self.path.clone(),
            source,
        })
    }
}

impl GameStore for JsonFileStore {
    fn save(&mut self, game: &Game) -> Result<(), StoreError> {
        check_storable(game)?;
        match self
            .document
            .games
            .iter_mut()
            .find(|stored| stored.id() == game.id())
        {
            Some(stored) => *stored = game.clone(),
            None => self.document.games.push(game.clone()),
        }
        self.persist().map_err(StoreError::backend)
    }

    fn list(&self) -> Result<Vec<Game>, StoreError> {
        let mut games = self.document.games.clone();
        sort_games(&mut games);
        Ok(games)
    }

    fn delete(&mut self, id: &GameId) -> Result<(), StoreError> {
        let before = self.document.games.len();
        self.document.games.retain(|game| game.id() != id);
        if self.document.games.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.persist().map_err(StoreError::backend)
    }

    fn settings(&self) -> Result<StoreSettings, StoreError> {
        Ok(self.document.settings)
    }

    fn set_default_hand_preference(
        &mut self,
        preference: HandPreference,
    ) -> Result<(), StoreError> {
        self.document.settings = StoreSettings {
            default_hand_preference: preference,
            has_set_hand_preference: true,
        };
        self.persist().map_err(StoreError::backend)
    }
}
