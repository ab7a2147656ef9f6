//! Persisted game collection store.
//!
//! [`GameLibrary`] is the single owner of the collection and the single
//! writer of its file. Every mutation funnels through it and ends in a
//! full-file rewrite of the pretty-printed `{"games": [...]}` document; no
//! caller writes around it.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{FetchedMetadata, GameRecord};

/// Failure loading, mutating or persisting the collection.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// No record with the requested name exists.
    #[error("no game named {0:?} in the library")]
    NotFound(String),
    /// A record with the same name already exists.
    #[error("a game named {0:?} already exists")]
    Duplicate(String),
    /// The collection failed to encode; the file on disk is left as-is.
    #[error("failed to encode the game library: {0}")]
    Encode(#[from] serde_json::Error),
    /// The collection file exists but is not a valid collection document.
    #[error("invalid library document {path}: {source}")]
    Malformed {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// Filesystem failure reading or writing the collection file.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Path that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Whether a metadata merge may insert a record that is missing by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Merge only into an existing record; a missing name is an error.
    UpdateOnly,
    /// Insert a fresh record when the name is unknown.
    Upsert,
}

/// On-disk shape of the collection file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    #[serde(default)]
    games: Vec<GameRecord>,
}

struct Inner {
    path: PathBuf,
    games: Vec<GameRecord>,
}

/// Thread-safe owning store for the game collection.
#[derive(Clone)]
pub struct GameLibrary {
    inner: Arc<RwLock<Inner>>,
}

impl GameLibrary {
    /// Open the collection at `path`, starting empty when the file is
    /// missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();
        let mut games = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| LibraryError::Io {
                path: path.clone(),
                source,
            })?;
            let collection: Collection =
                serde_json::from_str(&contents).map_err(|source| LibraryError::Malformed {
                    path: path.clone(),
                    source,
                })?;
            collection.games
        } else {
            Vec::new()
        };
        sort_by_name(&mut games);

        Ok(Self {
            inner: Arc::new(RwLock::new(Inner { path, games })),
        })
    }

    /// Path of the collection file.
    pub fn path(&self) -> PathBuf {
        self.inner.read().path.clone()
    }

    /// All records, hidden ones included, in name order.
    pub fn all(&self) -> Vec<GameRecord> {
        self.inner.read().games.clone()
    }

    /// Records not soft-deleted, in name order.
    pub fn visible(&self) -> Vec<GameRecord> {
        self.inner
            .read()
            .games
            .iter()
            .filter(|game| !game.is_hidden)
            .cloned()
            .collect()
    }

    /// Look up a record by its unique name.
    pub fn find(&self, name: &str) -> Option<GameRecord> {
        self.inner
            .read()
            .games
            .iter()
            .find(|game| game.name == name)
            .cloned()
    }

    /// Insert a new record, refusing duplicates by name, and save.
    pub fn add(&self, record: GameRecord) -> Result<(), LibraryError> {
        {
            let mut inner = self.inner.write();
            if inner.games.iter().any(|game| game.name == record.name) {
                return Err(LibraryError::Duplicate(record.name));
            }
            info!("adding {} to the library", record.name);
            inner.games.push(record);
            sort_by_name(&mut inner.games);
        }
        self.save()
    }

    /// Replace the record with the same name, or insert it, and save.
    pub fn upsert(&self, record: GameRecord) -> Result<(), LibraryError> {
        {
            let mut inner = self.inner.write();
            match inner.games.iter_mut().find(|game| game.name == record.name) {
                Some(existing) => *existing = record,
                None => {
                    inner.games.push(record);
                    sort_by_name(&mut inner.games);
                }
            }
        }
        self.save()
    }

    /// Merge fetched metadata into the record named `name`, then save.
    ///
    /// Only the `Some` fields of `fetched` are applied; user-owned fields
    /// stay untouched. A missing name is [`LibraryError::NotFound`] under
    /// [`FetchMode::UpdateOnly`] — with the collection unchanged — and an
    /// insert under [`FetchMode::Upsert`].
    pub fn merge_fetched(
        &self,
        name: &str,
        fetched: &FetchedMetadata,
        mode: FetchMode,
    ) -> Result<(), LibraryError> {
        {
            let mut inner = self.inner.write();
            match inner.games.iter_mut().find(|game| game.name == name) {
                Some(record) => fetched.apply_to(record),
                None => match mode {
                    FetchMode::UpdateOnly => {
                        return Err(LibraryError::NotFound(name.to_string()));
                    }
                    FetchMode::Upsert => {
                        let mut record = GameRecord::new(name);
                        fetched.apply_to(&mut record);
                        inner.games.push(record);
                        sort_by_name(&mut inner.games);
                    }
                },
            }
        }
        self.save()
    }

    /// Stamp the named game as played at `now` and save.
    pub fn record_played(&self, name: &str, now: DateTime<Utc>) -> Result<(), LibraryError> {
        self.update_with(name, |record| record.mark_played(now))
    }

    /// Toggle the soft-delete flag and save.
    pub fn set_hidden(&self, name: &str, hidden: bool) -> Result<(), LibraryError> {
        self.update_with(name, |record| record.is_hidden = hidden)
    }

    /// Toggle the favorite flag and save.
    pub fn set_favorite(&self, name: &str, favorite: bool) -> Result<(), LibraryError> {
        self.update_with(name, |record| record.is_favorite = favorite)
    }

    /// Rewrite the whole collection file from the in-memory state.
    ///
    /// Encoding happens before any byte reaches disk, so an encode failure
    /// leaves the previous file intact.
    pub fn save(&self) -> Result<(), LibraryError> {
        let (path, serialized) = {
            let inner = self.inner.read();
            let collection = Collection {
                games: inner.games.clone(),
            };
            (inner.path.clone(), serde_json::to_vec_pretty(&collection)?)
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| LibraryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, serialized).map_err(|source| LibraryError::Io { path, source })
    }

    fn update_with(
        &self,
        name: &str,
        apply: impl FnOnce(&mut GameRecord),
    ) -> Result<(), LibraryError> {
        {
            let mut inner = self.inner.write();
            let record = inner
                .games
                .iter_mut()
                .find(|game| game.name == name)
                .ok_or_else(|| LibraryError::NotFound(name.to_string()))?;
            apply(record);
        }
        self.save()
    }
}

fn sort_by_name(games: &mut [GameRecord]) {
    games.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}
