//! Heuristic header-to-column mapping.
//!
//! Exports from different stat tools name the same column differently
//! (`Rating` / `评分`, `HS` / `爆头率`, ...). Every known variant lives in
//! [`FIELD_KEYWORDS`]; [`ColumnMap::from_headers`] is the only place that
//! reads it.

use std::fmt;

/// Statistic columns the normalizer knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    Id,
    Name,
    Team,
    Maps,
    Rating,
    Adr,
    Rws,
    Hs,
    Kills,
    Deaths,
    FirstKills,
}

impl StatField {
    pub const ALL: [StatField; 11] = [
        StatField::Id,
        StatField::Name,
        StatField::Team,
        StatField::Maps,
        StatField::Rating,
        StatField::Adr,
        StatField::Rws,
        StatField::Hs,
        StatField::Kills,
        StatField::Deaths,
        StatField::FirstKills,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatField::Id => "id",
            StatField::Name => "name",
            StatField::Team => "team",
            StatField::Maps => "maps",
            StatField::Rating => "rating",
            StatField::Adr => "adr",
            StatField::Rws => "rws",
            StatField::Hs => "hs",
            StatField::Kills => "kills",
            StatField::Deaths => "deaths",
            StatField::FirstKills => "first_kills",
        };
        write!(f, "{}", s)
    }
}

/// Match rules for one field.
pub struct FieldKeywords {
    pub field: StatField,
    /// Tried in order; earlier keywords win over later ones.
    pub keywords: &'static [&'static str],
    /// Headers containing any of these are never matched for this field.
    pub exclude: &'static [&'static str],
}

/// Keyword table, matched case-sensitively as substrings of trimmed headers.
pub const FIELD_KEYWORDS: &[FieldKeywords] = &[
    FieldKeywords {
        field: StatField::Id,
        keywords: &["SteamID", "SteamId", "steamid", "Steam ID", "ID", "编号"],
        exclude: &[],
    },
    FieldKeywords {
        field: StatField::Name,
        keywords: &["Name", "name", "Nickname", "Player", "player", "昵称", "选手", "玩家", "姓名"],
        exclude: &["Team", "team", "战队", "队伍", "ID", "编号"],
    },
    FieldKeywords {
        field: StatField::Team,
        keywords: &["Team", "team", "战队", "队伍"],
        exclude: &[],
    },
    FieldKeywords {
        field: StatField::Maps,
        keywords: &["Maps", "maps", "Map", "地图数", "地图", "场次"],
        exclude: &[],
    },
    FieldKeywords {
        field: StatField::Rating,
        keywords: &["Rating", "rating", "RATING", "评分", "Rt"],
        exclude: &[],
    },
    FieldKeywords {
        field: StatField::Adr,
        keywords: &["ADR", "Adr", "adr", "场均伤害"],
        exclude: &[],
    },
    FieldKeywords {
        field: StatField::Rws,
        keywords: &["RWS", "Rws", "rws"],
        exclude: &[],
    },
    FieldKeywords {
        field: StatField::Hs,
        keywords: &["HS", "Headshot", "headshot", "爆头率", "爆头"],
        exclude: &[],
    },
    FieldKeywords {
        field: StatField::Kills,
        keywords: &["Kills", "kills", "Kill", "击杀"],
        exclude: &["First", "first", "首杀"],
    },
    FieldKeywords {
        field: StatField::Deaths,
        keywords: &["Deaths", "deaths", "Death", "死亡"],
        exclude: &["First", "first", "首死"],
    },
    FieldKeywords {
        field: StatField::FirstKills,
        keywords: &["First Kills", "FirstKills", "First Kill", "first_kills", "FK", "首杀"],
        exclude: &[],
    },
];

/// Column index per field, `None` where the sheet has no matching header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    slots: [Option<usize>; 11],
}

impl ColumnMap {
    /// Locate every known field in a header row.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = ColumnMap::default();
        for rule in FIELD_KEYWORDS {
            map.slots[rule.field.slot()] = find_column(headers, rule);
        }
        map
    }

    /// Index of the column holding `field`.
    pub fn index(&self, field: StatField) -> Option<usize> {
        self.slots[field.slot()]
    }

    /// Cell for `field` in `row`, trimmed. Missing column or cell gives `""`.
    pub fn cell<'r, S: AsRef<str>>(&self, row: &'r [S], field: StatField) -> &'r str {
        self.index(field)
            .and_then(|i| row.get(i))
            .map(|c| c.as_ref().trim())
            .unwrap_or("")
    }

    /// A sheet is only usable when a name column was found.
    pub fn has_name(&self) -> bool {
        self.index(StatField::Name).is_some()
    }

    /// Fields that could not be located.
    pub fn missing(&self) -> Vec<StatField> {
        StatField::ALL
            .into_iter()
            .filter(|f| self.index(*f).is_none())
            .collect()
    }
}

fn find_column<S: AsRef<str>>(headers: &[S], rule: &FieldKeywords) -> Option<usize> {
    rule.keywords.iter().find_map(|keyword| {
        headers.iter().position(|h| {
            let h = h.as_ref().trim();
            h.contains(keyword) && !rule.exclude.iter().any(|x| h.contains(x))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_english_headers() {
        let headers = ["Name", "Team", "Rating", "Kills", "Deaths", "HS"];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.index(StatField::Name), Some(0));
        assert_eq!(map.index(StatField::Team), Some(1));
        assert_eq!(map.index(StatField::Rating), Some(2));
        assert_eq!(map.index(StatField::Kills), Some(3));
        assert_eq!(map.index(StatField::Deaths), Some(4));
        assert_eq!(map.index(StatField::Hs), Some(5));
        assert_eq!(map.index(StatField::Id), None);
        assert_eq!(map.index(StatField::Adr), None);
    }

    #[test]
    fn test_chinese_headers() {
        let headers = ["选手", "战队", "地图数", "评分", "ADR", "RWS", "爆头率", "击杀", "死亡", "首杀"];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.index(StatField::Name), Some(0));
        assert_eq!(map.index(StatField::Team), Some(1));
        assert_eq!(map.index(StatField::Maps), Some(2));
        assert_eq!(map.index(StatField::Rating), Some(3));
        assert_eq!(map.index(StatField::Adr), Some(4));
        assert_eq!(map.index(StatField::Rws), Some(5));
        assert_eq!(map.index(StatField::Hs), Some(6));
        assert_eq!(map.index(StatField::Kills), Some(7));
        assert_eq!(map.index(StatField::Deaths), Some(8));
        assert_eq!(map.index(StatField::FirstKills), Some(9));
    }

    #[test]
    fn test_first_kills_not_taken_as_kills() {
        let headers = ["Player", "First Kills", "Kills"];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.index(StatField::FirstKills), Some(1));
        assert_eq!(map.index(StatField::Kills), Some(2));
    }

    #[test]
    fn test_first_deaths_not_taken_as_deaths() {
        let headers = ["Name", "First Kills", "First Deaths", "Kills", "Deaths"];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.index(StatField::Kills), Some(3));
        assert_eq!(map.index(StatField::Deaths), Some(4));

        let map = ColumnMap::from_headers(&["选手", "首死", "死亡"]);
        assert_eq!(map.index(StatField::Deaths), Some(2));
    }

    #[test]
    fn test_player_id_not_taken_as_name() {
        let headers = ["Player ID", "Player"];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.index(StatField::Id), Some(0));
        assert_eq!(map.index(StatField::Name), Some(1));
    }

    #[test]
    fn test_team_name_not_taken_as_name() {
        let headers = ["Team Name", "Player Name"];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.index(StatField::Name), Some(1));
        assert_eq!(map.index(StatField::Team), Some(0));
    }

    #[test]
    fn test_keyword_priority_beats_column_order() {
        // "SteamID" outranks the generic "ID" even though it appears later.
        let headers = ["Match ID", "Name", "SteamID"];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.index(StatField::Id), Some(2));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let headers = ["NAME", "HEADSHOTS"];
        let map = ColumnMap::from_headers(&headers);

        assert!(!map.has_name());
        assert_eq!(map.index(StatField::Hs), None);
    }

    #[test]
    fn test_headers_are_trimmed() {
        let headers = ["  Name ", " Rating"];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.index(StatField::Name), Some(0));
        assert_eq!(map.index(StatField::Rating), Some(1));
    }

    #[test]
    fn test_cell_lookup() {
        let map = ColumnMap::from_headers(&["Name", "Team"]);
        let row = vec![" s1mple ".to_string()];

        assert_eq!(map.cell(&row, StatField::Name), "s1mple");
        assert_eq!(map.cell(&row, StatField::Team), "");
        assert_eq!(map.cell(&row, StatField::Rating), "");
    }

    #[test]
    fn test_missing_fields() {
        let map = ColumnMap::from_headers(&["Name"]);
        let missing = map.missing();

        assert_eq!(missing.len(), 10);
        assert!(!missing.contains(&StatField::Name));
    }

    #[test]
    fn test_every_field_has_keywords() {
        for field in StatField::ALL {
            assert!(
                FIELD_KEYWORDS.iter().any(|r| r.field == field && !r.keywords.is_empty()),
                "no keywords for {}",
                field
            );
        }
    }
}
