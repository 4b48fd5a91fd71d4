//! Tournament catalog model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ALL_STAGES;

/// A competition stage within a tournament (groups, playoffs, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
}

impl Stage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A tournament entry in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,

    pub name: String,

    /// Free text `start-end`, e.g. `2024/1/1-2024/2/1`
    #[serde(default, alias = "dateRange")]
    pub date_range: String,

    /// Ordered stages
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Tournament {
    pub fn new(id: impl Into<String>, name: impl Into<String>, date_range: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date_range: date_range.into(),
            stages: Vec::new(),
        }
    }

    /// Builder method to append a stage.
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// End date of the tournament.
    ///
    /// The range is split on `-` and the second part is read as a date, with
    /// `/` separators normalised. Ranges that use any other layout (including
    /// ISO dates, whose own hyphens break the split) yield `None`.
    pub fn end_date(&self) -> Option<NaiveDate> {
        let end = self.date_range.split('-').nth(1)?;
        let normalized = end.trim().replace('/', "-");
        NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
    }

    /// End date used for recency ordering; unresolvable ranges sort as the epoch.
    pub fn end_date_or_epoch(&self) -> NaiveDate {
        self.end_date().unwrap_or_else(epoch)
    }

    /// Whether `stage_id` names one of this tournament's stages or the whole event.
    pub fn has_stage(&self, stage_id: &str) -> bool {
        stage_id.eq_ignore_ascii_case(ALL_STAGES) || self.stages.iter().any(|s| s.id == stage_id)
    }
}

/// 1970-01-01, the ordering floor for tournaments without a usable end date.
pub fn epoch() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_date_slash_format() {
        let t = Tournament::new("cup1", "Cup 1", "2024/1/1-2024/2/1");
        assert_eq!(t.end_date(), NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_end_date_with_spaces() {
        let t = Tournament::new("cup1", "Cup 1", "2025/03/10 - 2025/03/24");
        assert_eq!(t.end_date(), NaiveDate::from_ymd_opt(2025, 3, 24));
    }

    #[test]
    fn test_end_date_single_date_is_unresolved() {
        let t = Tournament::new("cup1", "Cup 1", "2024/1/1");
        assert_eq!(t.end_date(), None);
        assert_eq!(t.end_date_or_epoch(), epoch());
    }

    #[test]
    fn test_end_date_iso_range_degrades_to_epoch() {
        // Hyphenated dates collide with the range separator.
        let t = Tournament::new("cup1", "Cup 1", "2024-01-01 - 2024-02-01");
        assert_eq!(t.end_date(), None);
        assert_eq!(t.end_date_or_epoch(), epoch());
    }

    #[test]
    fn test_end_date_alternate_separator_degrades_to_epoch() {
        let t = Tournament::new("cup1", "Cup 1", "2024/1/1 ~ 2024/2/1");
        assert_eq!(t.end_date(), None);
    }

    #[test]
    fn test_end_date_empty() {
        let t = Tournament::new("cup1", "Cup 1", "");
        assert_eq!(t.end_date(), None);
    }

    #[test]
    fn test_epoch_value() {
        assert_eq!(epoch(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    }

    #[test]
    fn test_has_stage() {
        let t = Tournament::new("cup1", "Cup 1", "")
            .with_stage(Stage::new("groups", "Group Stage"))
            .with_stage(Stage::new("playoffs", "Playoffs"));
        assert!(t.has_stage("groups"));
        assert!(t.has_stage("all"));
        assert!(t.has_stage("ALL"));
        assert!(!t.has_stage("finals"));
    }

    #[test]
    fn test_tournament_camel_case_alias() {
        let json = r#"{"id":"cup1","name":"Cup","dateRange":"2024/1/1-2024/2/1","stages":[{"id":"g","name":"Groups"}]}"#;
        let t: Tournament = serde_json::from_str(json).unwrap();
        assert_eq!(t.date_range, "2024/1/1-2024/2/1");
        assert_eq!(t.stages.len(), 1);
    }
}
