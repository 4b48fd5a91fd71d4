//! File-backed registry store.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{info, warn};

use super::{JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::ingest::{merge_batch, ImportContext, ImportReport};
use crate::models::{PlayerRecord, ScopeKey, Tournament};

/// Read/replace access to the player registry and tournament catalog.
///
/// Writers are serialised: every read-modify-write runs under one lock, so an
/// import is either fully applied or not at all.
pub struct RegistryStore {
    config: StorageConfig,
    write_lock: Mutex<()>,
}

impl RegistryStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    fn players_reader(&self) -> JsonlReader<PlayerRecord> {
        JsonlReader::new(self.config.players_path())
    }

    fn players_writer(&self) -> JsonlWriter<PlayerRecord> {
        JsonlWriter::new(self.config.players_path())
    }

    fn tournaments_reader(&self) -> JsonlReader<Tournament> {
        JsonlReader::new(self.config.tournaments_path())
    }

    fn tournaments_writer(&self) -> JsonlWriter<Tournament> {
        JsonlWriter::new(self.config.tournaments_path())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current registry contents.
    pub fn snapshot(&self) -> Result<Vec<PlayerRecord>, StorageError> {
        self.players_reader().read_all()
    }

    /// Replace the whole registry.
    pub fn replace(&self, records: &[PlayerRecord]) -> Result<usize, StorageError> {
        let _guard = self.lock();
        self.players_writer().write_all(records)
    }

    /// Merge a scoped batch into the registry, replacing records with the
    /// same scoped id.
    pub fn import(
        &self,
        ctx: &ImportContext,
        batch: Vec<PlayerRecord>,
    ) -> Result<ImportReport, StorageError> {
        let _guard = self.lock();

        let registry = self.players_reader().read_all()?;
        let existing: HashSet<&ScopeKey> = registry.iter().map(|r| &r.id).collect();

        // Counted per scoped id: a key repeated in the batch lands once.
        let incoming: HashSet<&ScopeKey> = batch.iter().map(|r| &r.id).collect();

        let mut report = ImportReport::new(ctx);
        report.imported = incoming.len();
        report.replaced = incoming.iter().filter(|id| existing.contains(*id)).count();
        drop(incoming);
        drop(existing);

        let merged = merge_batch(registry, batch);
        report.registry_size = self.players_writer().write_all(&merged)?;
        report.log();

        Ok(report)
    }

    /// Tournament catalog.
    pub fn tournaments(&self) -> Result<Vec<Tournament>, StorageError> {
        self.tournaments_reader().read_all()
    }

    /// Insert a tournament or replace the one with the same id.
    pub fn upsert_tournament(&self, tournament: Tournament) -> Result<(), StorageError> {
        let _guard = self.lock();

        let mut catalog = self.tournaments_reader().read_all()?;
        if tournament.end_date().is_none() {
            warn!(
                "Tournament {} date range '{}' has no readable end date; it will rank as oldest",
                tournament.id, tournament.date_range
            );
        }

        match catalog.iter_mut().find(|t| t.id == tournament.id) {
            Some(existing) => {
                info!("Updating tournament {}", tournament.id);
                *existing = tournament;
            }
            None => {
                info!("Adding tournament {}", tournament.id);
                catalog.push(tournament);
            }
        }

        self.tournaments_writer().write_all(&catalog)?;
        Ok(())
    }
}
