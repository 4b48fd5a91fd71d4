//! Aggregated player profile (derived on read, never stored).

use serde::Serialize;

use super::{coerce_number, IdentityKey, PlayerRecord};

/// One player's view across all of their scoped records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedProfile {
    /// Grouping key shared by every contributing record
    pub key: IdentityKey,

    /// Name from the most recent tournament
    pub name: String,

    /// Team from the most recent tournament
    pub team: String,

    /// Mean rating, 2 decimals
    pub avg_rating: String,

    /// Mean ADR, 1 decimal
    pub avg_adr: String,

    /// Mean K/D, 2 decimals
    pub avg_kd: String,

    pub total_maps: u32,

    pub record_count: usize,

    /// Distinct tournament ids, most recent first
    pub tournaments: Vec<String>,

    /// Contributing records, most recent tournament first
    pub records: Vec<PlayerRecord>,
}

impl AggregatedProfile {
    pub fn avg_rating_value(&self) -> f64 {
        coerce_number(&self.avg_rating)
    }

    pub fn avg_adr_value(&self) -> f64 {
        coerce_number(&self.avg_adr)
    }

    pub fn avg_kd_value(&self) -> f64 {
        coerce_number(&self.avg_kd)
    }

    /// The record that supplied `name` and `team`.
    pub fn latest(&self) -> Option<&PlayerRecord> {
        self.records.first()
    }
}
