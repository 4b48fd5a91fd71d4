//! Profile aggregation.
//!
//! Groups the flat record registry into one profile per player:
//! - Grouping by identity key (raw id, steam id, name, scoped id)
//! - Recency ordering by tournament end date
//! - Current name/team from the most recent tournament
//! - Averaged rating, ADR and K/D
//!
//! Profiles are rebuilt from the full registry on every call.

pub mod leaderboard;

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{epoch, AggregatedProfile, IdentityKey, PlayerRecord, Tournament};

pub use leaderboard::{filter_scope, find_profile, rank_profiles, RankBy, RankedProfile};

/// Arithmetic mean; zero for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Group records by identity key, keeping first-appearance order.
pub fn group_by_identity(records: &[PlayerRecord]) -> Vec<(IdentityKey, Vec<PlayerRecord>)> {
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();
    let mut groups: Vec<(IdentityKey, Vec<PlayerRecord>)> = Vec::new();

    for record in records {
        let key = record.identity_key();
        match index.get(&key) {
            Some(&i) => groups[i].1.push(record.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record.clone()]));
            }
        }
    }

    groups
}

/// Sort records newest tournament first. Stable, so ties keep registry order.
pub fn sort_by_recency(records: &mut [PlayerRecord], end_dates: &HashMap<&str, NaiveDate>) {
    let floor = epoch();
    records.sort_by_key(|r| {
        std::cmp::Reverse(
            end_dates
                .get(r.tournament_id.as_str())
                .copied()
                .unwrap_or(floor),
        )
    });
}

/// Build one profile from an identity group.
fn build_profile(
    key: IdentityKey,
    mut records: Vec<PlayerRecord>,
    end_dates: &HashMap<&str, NaiveDate>,
) -> AggregatedProfile {
    sort_by_recency(&mut records, end_dates);

    let (name, team) = records
        .first()
        .map(|r| (r.name.clone(), r.team.clone()))
        .unwrap_or_default();

    let mut tournaments: Vec<String> = Vec::new();
    for r in &records {
        if !tournaments.contains(&r.tournament_id) {
            tournaments.push(r.tournament_id.clone());
        }
    }

    AggregatedProfile {
        key,
        name,
        team,
        avg_rating: format!("{:.2}", mean(records.iter().map(PlayerRecord::rating_value))),
        avg_adr: format!("{:.1}", mean(records.iter().map(PlayerRecord::adr_value))),
        avg_kd: format!("{:.2}", mean(records.iter().map(PlayerRecord::kd_value))),
        total_maps: records.iter().map(|r| r.maps).sum(),
        record_count: records.len(),
        tournaments,
        records,
    }
}

/// Aggregate the registry into one profile per player.
///
/// Output order follows the first appearance of each player in `records`;
/// use [`rank_profiles`] for leaderboards.
pub fn aggregate(records: &[PlayerRecord], tournaments: &[Tournament]) -> Vec<AggregatedProfile> {
    let end_dates: HashMap<&str, NaiveDate> = tournaments
        .iter()
        .map(|t| (t.id.as_str(), t.end_date_or_epoch()))
        .collect();

    let profiles: Vec<AggregatedProfile> = group_by_identity(records)
        .into_iter()
        .map(|(key, group)| build_profile(key, group, &end_dates))
        .collect();

    debug!(
        "Aggregated {} records into {} profiles",
        records.len(),
        profiles.len()
    );
    profiles
}
