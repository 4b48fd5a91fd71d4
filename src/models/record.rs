//! Player statistic records.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{IdentityKey, ScopeKey, ALL_STAGES};

/// Team assigned when a sheet has no team value.
pub const DEFAULT_TEAM: &str = "Free Agent";

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("static regex is valid")
});

/// Coerce a cell to a number by reading its leading numeric prefix.
///
/// `"1.20 "` -> 1.2, `"55%"` -> 55.0, `""` / `"n/a"` -> None.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    LEADING_NUMBER
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Same as [`parse_leading_number`] but unparseable values count as zero.
pub fn coerce_number(raw: &str) -> f64 {
    parse_leading_number(raw).unwrap_or(0.0)
}

/// One data row after column mapping and type coercion, not yet scoped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Identifier as found in the sheet, or a generated content id
    pub raw_id: String,

    pub name: String,
    pub team: String,
    pub maps: u32,

    /// Fixed-point display strings
    pub rating: String,
    pub adr: String,
    pub rws: String,

    /// Headshot display string ("55%" or "55.0%")
    pub hs: String,

    /// Headshot percentage, 0-100
    pub hs_val: f64,

    /// Kills / max(deaths, 1), 2 decimals
    pub kd: String,

    /// First kills per map, 2 decimals
    pub fk: String,
}

impl NormalizedRow {
    pub fn rating_value(&self) -> f64 {
        coerce_number(&self.rating)
    }
}

fn default_team() -> String {
    DEFAULT_TEAM.to_string()
}

fn default_maps() -> u32 {
    1
}

fn default_zero() -> String {
    "0.00".to_string()
}

fn default_hs() -> String {
    "0%".to_string()
}

/// One imported row scoped to a tournament and stage.
///
/// Field aliases accept registries written by older camelCase exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Scoped id, unique within the registry
    #[serde(default)]
    pub id: ScopeKey,

    /// Identifier as it appeared in the source sheet
    #[serde(default, alias = "rawId", alias = "originalId")]
    pub raw_id: Option<String>,

    /// Embedded external identifier from older records
    #[serde(default, alias = "steamId", skip_serializing_if = "Option::is_none")]
    pub steam_id: Option<String>,

    pub name: String,

    #[serde(default = "default_team")]
    pub team: String,

    #[serde(default = "default_maps")]
    pub maps: u32,

    #[serde(default = "default_zero")]
    pub rating: String,

    #[serde(default = "default_zero")]
    pub adr: String,

    #[serde(default = "default_zero")]
    pub rws: String,

    #[serde(default = "default_hs")]
    pub hs: String,

    #[serde(default, alias = "hsVal")]
    pub hs_val: f64,

    #[serde(default = "default_zero")]
    pub kd: String,

    #[serde(default = "default_zero")]
    pub fk: String,

    #[serde(default, alias = "tournamentId")]
    pub tournament_id: String,

    #[serde(default, alias = "stageId")]
    pub stage_id: String,
}

impl PlayerRecord {
    /// Identity key: raw id, then steam id, then name, then scoped id.
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::first_non_empty([
            self.raw_id.as_deref(),
            self.steam_id.as_deref(),
            Some(self.name.as_str()),
            Some(self.id.as_str()),
        ])
        .unwrap_or_else(|| IdentityKey::from(""))
    }

    pub fn rating_value(&self) -> f64 {
        coerce_number(&self.rating)
    }

    pub fn adr_value(&self) -> f64 {
        coerce_number(&self.adr)
    }

    pub fn kd_value(&self) -> f64 {
        coerce_number(&self.kd)
    }

    /// Whether this record belongs to the given scope.
    /// A `None` stage matches every stage of the tournament; `all` matches
    /// whole-event records in any letter case.
    pub fn in_scope(&self, tournament_id: &str, stage_id: Option<&str>) -> bool {
        if self.tournament_id != tournament_id.trim() {
            return false;
        }
        match stage_id.map(str::trim) {
            None => true,
            Some(s) if s.eq_ignore_ascii_case(ALL_STAGES) => self.stage_id == ALL_STAGES,
            Some(s) => self.stage_id == s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw_id: Option<&str>, steam_id: Option<&str>, name: &str) -> PlayerRecord {
        PlayerRecord {
            id: ScopeKey::from("scoped"),
            raw_id: raw_id.map(String::from),
            steam_id: steam_id.map(String::from),
            name: name.to_string(),
            team: DEFAULT_TEAM.to_string(),
            maps: 1,
            rating: "1.00".to_string(),
            adr: "80.0".to_string(),
            rws: "10.00".to_string(),
            hs: "50%".to_string(),
            hs_val: 50.0,
            kd: "1.00".to_string(),
            fk: "0.00".to_string(),
            tournament_id: "cup1".to_string(),
            stage_id: "all".to_string(),
        }
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("1.20"), Some(1.2));
        assert_eq!(parse_leading_number(" 55% "), Some(55.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("-3"), Some(-3.0));
        assert_eq!(parse_leading_number("1e2x"), Some(100.0));
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn test_coerce_number_defaults_to_zero() {
        assert_eq!(coerce_number("n/a"), 0.0);
        assert_eq!(coerce_number("0.87"), 0.87);
    }

    #[test]
    fn test_identity_key_prefers_raw_id() {
        let r = record(Some("raw"), Some("steam"), "name");
        assert_eq!(r.identity_key(), IdentityKey::from("raw"));
    }

    #[test]
    fn test_identity_key_falls_back_to_steam_then_name() {
        assert_eq!(
            record(None, Some("steam"), "name").identity_key(),
            IdentityKey::from("steam")
        );
        assert_eq!(
            record(Some(""), None, "name").identity_key(),
            IdentityKey::from("name")
        );
    }

    #[test]
    fn test_identity_key_falls_back_to_scoped_id() {
        let r = record(None, None, "");
        assert_eq!(r.identity_key(), IdentityKey::from("scoped"));
    }

    #[test]
    fn test_in_scope() {
        let r = record(Some("raw"), None, "n");
        assert!(r.in_scope("cup1", None));
        assert!(r.in_scope("cup1", Some("all")));
        assert!(!r.in_scope("cup1", Some("groups")));
        assert!(!r.in_scope("cup2", None));
    }

    #[test]
    fn test_in_scope_all_stage_ignores_case() {
        let r = record(Some("1"), None, "a");
        assert!(r.in_scope("cup1", Some("ALL")));
        assert!(r.in_scope(" cup1 ", Some(" All ")));
    }

    #[test]
    fn test_legacy_camel_case_fields() {
        let json = r#"{"id":"x_cup1_all","originalId":"x","steamId":"x","name":"Legacy","hsVal":40.5,"tournamentId":"cup1","stageId":"all"}"#;
        let r: PlayerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.raw_id.as_deref(), Some("x"));
        assert_eq!(r.steam_id.as_deref(), Some("x"));
        assert_eq!(r.hs_val, 40.5);
        assert_eq!(r.team, DEFAULT_TEAM);
        assert_eq!(r.maps, 1);
        assert_eq!(r.tournament_id, "cup1");
    }

    #[test]
    fn test_record_serialization() {
        let r = record(Some("raw"), None, "player");
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("steam_id"));
        let parsed: PlayerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
    }
}
