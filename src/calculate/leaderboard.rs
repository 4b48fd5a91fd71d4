//! Ranking and lookup over aggregated profiles.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{AggregatedProfile, PlayerRecord};

/// Metric used to order a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    #[default]
    AvgRating,
    AvgAdr,
    AvgKd,
    RecordCount,
}

impl RankBy {
    fn score(self, profile: &AggregatedProfile) -> f64 {
        match self {
            RankBy::AvgRating => profile.avg_rating_value(),
            RankBy::AvgAdr => profile.avg_adr_value(),
            RankBy::AvgKd => profile.avg_kd_value(),
            RankBy::RecordCount => profile.record_count as f64,
        }
    }
}

impl FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "avg_rating" | "rating" => Ok(RankBy::AvgRating),
            "avg_adr" | "adr" => Ok(RankBy::AvgAdr),
            "avg_kd" | "kd" => Ok(RankBy::AvgKd),
            "record_count" | "records" => Ok(RankBy::RecordCount),
            other => Err(format!("unknown ranking metric: {}", other)),
        }
    }
}

impl std::fmt::Display for RankBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankBy::AvgRating => write!(f, "avg_rating"),
            RankBy::AvgAdr => write!(f, "avg_adr"),
            RankBy::AvgKd => write!(f, "avg_kd"),
            RankBy::RecordCount => write!(f, "record_count"),
        }
    }
}

/// A profile with its 1-based leaderboard position.
#[derive(Debug, Clone, Serialize)]
pub struct RankedProfile {
    pub rank: usize,
    #[serde(flatten)]
    pub profile: AggregatedProfile,
}

/// Order profiles by `by`, best first. Ties keep their input order.
pub fn rank_profiles(mut profiles: Vec<AggregatedProfile>, by: RankBy) -> Vec<RankedProfile> {
    profiles.sort_by(|a, b| by.score(b).total_cmp(&by.score(a)));
    profiles
        .into_iter()
        .enumerate()
        .map(|(i, profile)| RankedProfile {
            rank: i + 1,
            profile,
        })
        .collect()
}

/// Find a profile by exact identity key, falling back to a case-insensitive
/// name match.
pub fn find_profile<'a>(
    profiles: &'a [AggregatedProfile],
    query: &str,
) -> Option<&'a AggregatedProfile> {
    let query = query.trim();
    profiles
        .iter()
        .find(|p| p.key.as_str() == query)
        .or_else(|| profiles.iter().find(|p| p.name.eq_ignore_ascii_case(query)))
}

/// Records belonging to one tournament, optionally one stage of it.
pub fn filter_scope(
    records: &[PlayerRecord],
    tournament_id: &str,
    stage_id: Option<&str>,
) -> Vec<PlayerRecord> {
    records
        .iter()
        .filter(|r| r.in_scope(tournament_id, stage_id))
        .cloned()
        .collect()
}
