//! Identity reconciliation.
//!
//! Older registries grouped players by whatever identifier happened to be
//! stored, so one player's records could end up split across several
//! profiles. This pass rewrites every record's identity fields from its
//! imported raw id (or a name-derived pseudo id when none exists) and fills
//! missing scope fields. Running it on reconciled data changes nothing.

use serde::Serialize;
use tracing::{debug, info};

use crate::models::{
    name_pseudo_id, scope_pseudo_id, PlayerRecord, ScopeKey, ALL_STAGES, DEFAULT_TEAM,
};

/// Tournament id given to records that were stored without one.
pub const UNKNOWN_TOURNAMENT: &str = "unknown";

/// Counts of repairs made by one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub total: usize,
    pub changed: usize,
    pub steam_id_forced: usize,
    pub raw_id_backfilled: usize,
    pub pseudo_ids_generated: usize,
    pub scope_backfilled: usize,
    pub team_backfilled: usize,
    pub scope_key_rebuilt: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.changed == 0
    }
}

/// Reconciled registry plus what was changed.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub records: Vec<PlayerRecord>,
    pub report: ReconcileReport,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Repair one record in place. Returns whether anything changed.
fn reconcile_record(record: &mut PlayerRecord, report: &mut ReconcileReport) -> bool {
    let before = record.clone();

    let raw = non_empty(&record.raw_id).map(str::to_string);
    let steam = non_empty(&record.steam_id).map(str::to_string);

    match (raw, steam) {
        (Some(raw), _) => {
            if record.steam_id.as_deref() != Some(raw.as_str()) {
                record.steam_id = Some(raw.clone());
                report.steam_id_forced += 1;
            }
            record.raw_id = Some(raw);
        }
        (None, Some(steam)) => {
            record.raw_id = Some(steam.clone());
            record.steam_id = Some(steam);
            report.raw_id_backfilled += 1;
        }
        (None, None) => {
            let pseudo = if record.name.trim().is_empty() && !record.id.is_empty() {
                scope_pseudo_id(&record.id)
            } else {
                name_pseudo_id(&record.name)
            };
            debug!("Generated pseudo id {} for '{}'", pseudo, record.name);
            record.raw_id = Some(pseudo.clone());
            record.steam_id = Some(pseudo);
            report.pseudo_ids_generated += 1;
        }
    }

    let mut scope_filled = false;
    if record.tournament_id.trim().is_empty() {
        record.tournament_id = UNKNOWN_TOURNAMENT.to_string();
        scope_filled = true;
    }
    if record.stage_id.trim().is_empty() {
        record.stage_id = ALL_STAGES.to_string();
        scope_filled = true;
    }
    if scope_filled {
        report.scope_backfilled += 1;
    }

    if record.team.trim().is_empty() {
        record.team = DEFAULT_TEAM.to_string();
        report.team_backfilled += 1;
    }

    if record.id.is_empty() {
        let raw = record.raw_id.as_deref().unwrap_or_default();
        record.id = ScopeKey::new(raw, &record.tournament_id, &record.stage_id);
        report.scope_key_rebuilt += 1;
    }

    *record != before
}

/// Reconcile a whole registry snapshot. The caller persists the result.
pub fn reconcile(records: Vec<PlayerRecord>) -> ReconcileOutcome {
    let mut report = ReconcileReport {
        total: records.len(),
        ..Default::default()
    };

    let records: Vec<PlayerRecord> = records
        .into_iter()
        .map(|mut r| {
            if reconcile_record(&mut r, &mut report) {
                report.changed += 1;
            }
            r
        })
        .collect();

    info!(
        "Reconciled {} records: {} changed ({} steam ids forced, {} raw ids backfilled, {} pseudo ids)",
        report.total,
        report.changed,
        report.steam_id_forced,
        report.raw_id_backfilled,
        report.pseudo_ids_generated
    );

    ReconcileOutcome { records, report }
}
