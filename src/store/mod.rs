//! File-backed persistence for chats, prompts, and function definitions.
//!
//! Artifacts are JSON blobs under `<base>/<Category>/<name>.json`. Chats are
//! structurally decoded into a conversation; Prompts and Functions are opaque
//! payloads to this store.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use thiserror::Error;

use crate::agent::Message;

/// Persistence namespace for a saved artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Serialized conversations.
    Chats,
    /// System-prompt templates, stored opaquely.
    Prompts,
    /// Function definitions, stored opaquely.
    Functions,
}

impl Category {
    /// Directory name under the store's base directory.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Chats => "Chats",
            Self::Prompts => "Prompts",
            Self::Functions => "Functions",
        }
    }
}

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named artifact (or category directory) does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Filesystem failure other than a missing path.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact's JSON is invalid for the expected structure (or the
    /// value could not be serialized on save).
    #[error("invalid artifact JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// JSON artifact store rooted at a per-install base directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_dir`. Nothing is created on disk until
    /// the first save.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The store's base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the on-disk path for an artifact name.
    ///
    /// Spaces become underscores and a `.json` suffix is appended when
    /// missing, so `"my chat"` and `"my_chat.json"` name the same file.
    fn resolve(&self, category: Category, name: &str) -> PathBuf {
        let mut filename = name.replace(' ', "_");
        if !filename.ends_with(".json") {
            filename.push_str(".json");
        }
        self.base_dir.join(category.dir_name()).join(filename)
    }

    /// Serialize `data` and write it under `category`.
    ///
    /// Without a name, one is derived from the current timestamp
    /// (`YYYYMMDDHHMMSS`); two unnamed saves in the same second therefore
    /// target the same file. Any existing file at the resolved path is
    /// truncated. Returns the path written.
    ///
    /// # Errors
    /// Fails on directory creation, serialization, or write errors.
    pub fn save<T: Serialize>(
        &self,
        category: Category,
        data: &T,
        name: Option<&str>,
    ) -> Result<PathBuf, StoreError> {
        let name = match name {
            Some(n) => n.to_string(),
            None => Local::now().format("%Y%m%d%H%M%S").to_string(),
        };
        let path = self.resolve(category, &name);

        fs::create_dir_all(self.base_dir.join(category.dir_name()))?;
        let json = serde_json::to_vec(data)?;
        fs::write(&path, json)?;

        tracing::info!(path = %path.display(), "saved artifact");
        Ok(path)
    }

    /// Load a saved chat as a conversation.
    ///
    /// Callers replacing an agent's history must reset the agent first so the
    /// load starts from a clean token/model state.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the file is missing, [`StoreError::Decode`]
    /// if its bytes are not a valid conversation.
    pub fn load_chat(&self, name: &str) -> Result<Vec<Message>, StoreError> {
        let bytes = self.load_raw(Category::Chats, name)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Load an artifact's raw bytes without interpretation.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the file is missing.
    pub fn load_raw(&self, category: Category, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(category, name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound { path })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List saved artifact names in a category, `.json` suffix stripped.
    ///
    /// Order is whatever the filesystem yields.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the category directory does not exist.
    pub fn list(&self, category: Category) -> Result<Vec<String>, StoreError> {
        let dir = self.base_dir.join(category.dir_name());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { path: dir });
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let filename = entry?.file_name().to_string_lossy().into_owned();
            names.push(filename.trim_end_matches(".json").to_string());
        }
        Ok(names)
    }

    /// Remove a saved artifact.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the file does not exist.
    pub fn delete(&self, category: Category, name: &str) -> Result<(), StoreError> {
        let path = self.resolve(category, name);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "deleted artifact");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound { path })
            }
            Err(e) => Err(e.into()),
        }
    }
}
