//! Local registry persistence.
//!
//! The core operations take and return in-memory snapshots; this module is
//! the collaborator that loads and stores them:
//! - `registry/players.jsonl`: the flat player record registry
//! - `registry/tournaments.jsonl`: the tournament catalog

mod jsonl;
mod registry;

pub use jsonl::*;
pub use registry::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn registry_dir(&self) -> PathBuf {
        self.data_dir.join("registry")
    }

    pub fn players_path(&self) -> PathBuf {
        self.registry_dir().join(RegistryFile::Players.filename())
    }

    pub fn tournaments_path(&self) -> PathBuf {
        self.registry_dir().join(RegistryFile::Tournaments.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Files making up the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFile {
    Players,
    Tournaments,
}

impl RegistryFile {
    pub fn filename(&self) -> &'static str {
        match self {
            RegistryFile::Players => "players.jsonl",
            RegistryFile::Tournaments => "tournaments.jsonl",
        }
    }
}
