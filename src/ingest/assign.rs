//! Scope assignment and batch import.
//!
//! A batch is only scoped once both a tournament and a stage selection are
//! known. Missing context rejects the batch before any record is built.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{NormalizedRow, PlayerRecord, ScopeKey, Tournament, ALL_STAGES};

/// Errors that reject an import batch.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import context missing: no {0} selected")]
    ContextMissing(&'static str),

    #[error("Unknown tournament: {0}")]
    UnknownTournament(String),

    #[error("Tournament {tournament} has no stage {stage}")]
    UnknownStage { tournament: String, stage: String },

    #[error(transparent)]
    Parse(#[from] super::ParseFailure),
}

/// Which part of a tournament a sheet covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageSelection {
    /// Whole-event statistics
    All,
    /// One concrete stage
    Stage(String),
}

impl StageSelection {
    /// Parse a stage argument. Empty input means nothing was selected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw.eq_ignore_ascii_case(ALL_STAGES) {
            Some(StageSelection::All)
        } else {
            Some(StageSelection::Stage(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StageSelection::All => ALL_STAGES,
            StageSelection::Stage(id) => id,
        }
    }
}

/// Validated target scope for one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportContext {
    pub tournament_id: String,
    pub stage: StageSelection,
}

impl ImportContext {
    /// Build a context, rejecting an empty tournament or stage.
    pub fn new(tournament_id: &str, stage_id: &str) -> Result<Self, ImportError> {
        let tournament_id = tournament_id.trim();
        if tournament_id.is_empty() {
            return Err(ImportError::ContextMissing("tournament"));
        }
        let stage = StageSelection::parse(stage_id).ok_or(ImportError::ContextMissing("stage"))?;

        Ok(Self {
            tournament_id: tournament_id.to_string(),
            stage,
        })
    }

    /// Check the scope against the tournament catalog.
    pub fn validate_against(&self, tournaments: &[Tournament]) -> Result<(), ImportError> {
        let tournament = tournaments
            .iter()
            .find(|t| t.id == self.tournament_id)
            .ok_or_else(|| ImportError::UnknownTournament(self.tournament_id.clone()))?;

        if !tournament.has_stage(self.stage.as_str()) {
            return Err(ImportError::UnknownStage {
                tournament: self.tournament_id.clone(),
                stage: self.stage.as_str().to_string(),
            });
        }
        Ok(())
    }

    pub fn stage_id(&self) -> &str {
        self.stage.as_str()
    }
}

/// Attach a scope to a normalized row.
pub fn assign_scope(row: NormalizedRow, ctx: &ImportContext) -> PlayerRecord {
    let id = ScopeKey::new(&row.raw_id, &ctx.tournament_id, ctx.stage_id());

    PlayerRecord {
        id,
        raw_id: Some(row.raw_id),
        steam_id: None,
        name: row.name,
        team: row.team,
        maps: row.maps,
        rating: row.rating,
        adr: row.adr,
        rws: row.rws,
        hs: row.hs,
        hs_val: row.hs_val,
        kd: row.kd,
        fk: row.fk,
        tournament_id: ctx.tournament_id.clone(),
        stage_id: ctx.stage_id().to_string(),
    }
}

/// Scope a whole batch. All-or-nothing: a missing tournament or stage
/// returns an error and no records.
pub fn import_batch(
    rows: Vec<NormalizedRow>,
    tournament_id: &str,
    stage_id: &str,
) -> Result<Vec<PlayerRecord>, ImportError> {
    let ctx = ImportContext::new(tournament_id, stage_id)?;
    Ok(rows.into_iter().map(|r| assign_scope(r, &ctx)).collect())
}

/// Merge an imported batch into a registry snapshot.
///
/// Records whose scoped id already exists replace the stored record in place;
/// new ids are appended in batch order.
pub fn merge_batch(registry: Vec<PlayerRecord>, batch: Vec<PlayerRecord>) -> Vec<PlayerRecord> {
    let mut merged = registry;
    let mut positions: HashMap<ScopeKey, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.clone(), i))
        .collect();

    let mut replaced = 0;
    for record in batch {
        match positions.get(&record.id) {
            Some(&i) => {
                merged[i] = record;
                replaced += 1;
            }
            None => {
                positions.insert(record.id.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    debug!("Merged batch: {} replaced, registry now {}", replaced, merged.len());
    merged
}

/// Summary of one accepted import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub batch_id: Uuid,
    pub tournament_id: String,
    pub stage_id: String,
    pub imported: usize,
    pub replaced: usize,
    pub registry_size: usize,
    pub imported_at: DateTime<Utc>,
}

impl ImportReport {
    pub fn new(ctx: &ImportContext) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            tournament_id: ctx.tournament_id.clone(),
            stage_id: ctx.stage_id().to_string(),
            imported: 0,
            replaced: 0,
            registry_size: 0,
            imported_at: Utc::now(),
        }
    }

    pub fn log(&self) {
        info!(
            batch = %self.batch_id,
            "Imported {} records into {}/{} ({} replaced, registry size {})",
            self.imported,
            self.tournament_id,
            self.stage_id,
            self.replaced,
            self.registry_size
        );
    }
}
