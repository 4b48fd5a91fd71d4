//! Row normalization: raw cells to typed, formatted statistics.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::columns::{ColumnMap, StatField};
use crate::models::{content_id, parse_leading_number, NormalizedRow, DEFAULT_TEAM};

/// Headshot rate as a 0-100 percentage plus its display form.
///
/// Some tools export `55%`, others the fraction `0.55`. A value with a percent
/// sign is taken literally; anything else is scaled by 100. Both forms are
/// rounded to hundredths of a percent so equivalent inputs compare equal.
pub fn parse_headshot(raw: &str) -> (f64, String) {
    let raw = raw.trim();
    if raw.contains('%') {
        let percent = parse_leading_number(raw).unwrap_or(0.0);
        (round_hundredths(percent), raw.to_string())
    } else {
        let fraction = parse_leading_number(raw).unwrap_or(0.0);
        let value = round_hundredths(fraction * 100.0);
        (value, format!("{:.1}%", value))
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Kills per death with a floor of one death.
pub fn kill_death_ratio(kills: f64, deaths: f64) -> f64 {
    kills / deaths.max(1.0)
}

/// Normalize one data row. `None` means the row is skipped.
pub fn normalize_row<S: AsRef<str>>(
    map: &ColumnMap,
    row: &[S],
    row_index: usize,
) -> Option<NormalizedRow> {
    let name = map.cell(row, StatField::Name);
    if name.is_empty() {
        debug!("Skipping row {}: empty name", row_index);
        return None;
    }

    let team = match map.cell(row, StatField::Team) {
        "" => DEFAULT_TEAM,
        t => t,
    };

    let maps = parse_leading_number(map.cell(row, StatField::Maps))
        .map(|m| m.trunc())
        .filter(|m| *m >= 1.0)
        .map(|m| m as u32)
        .unwrap_or(1);

    let number = |field| parse_leading_number(map.cell(row, field)).unwrap_or(0.0);

    let rating = format!("{:.2}", number(StatField::Rating));
    let adr = format!("{:.1}", number(StatField::Adr));
    let rws = format!("{:.2}", number(StatField::Rws));
    let (hs_val, hs) = parse_headshot(map.cell(row, StatField::Hs));
    let kd = format!(
        "{:.2}",
        kill_death_ratio(number(StatField::Kills), number(StatField::Deaths))
    );
    let fk = format!("{:.2}", number(StatField::FirstKills) / maps as f64);

    let raw_id = match map.cell(row, StatField::Id) {
        "" => content_id(name, team, &rating),
        id => id.to_string(),
    };

    Some(NormalizedRow {
        raw_id,
        name: name.to_string(),
        team: team.to_string(),
        maps,
        rating,
        adr,
        rws,
        hs,
        hs_val,
        kd,
        fk,
    })
}

/// Normalize every data row of a sheet, dropping malformed ones.
///
/// Generated ids that collide within the batch get `-2`, `-3`, ... suffixes.
/// A source id repeated within the sheet keeps only its first row.
/// The result is sorted by rating, highest first.
pub fn normalize_rows<S: AsRef<str>>(map: &ColumnMap, rows: &[Vec<S>]) -> Vec<NormalizedRow> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let Some(mut normalized) = normalize_row(map, row, i) else {
            continue;
        };

        let count = seen.entry(normalized.raw_id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            if !normalized.raw_id.starts_with("gen-") {
                warn!(
                    "Skipping row {}: player id {} already used by an earlier row",
                    i, normalized.raw_id
                );
                continue;
            }
            normalized.raw_id = format!("{}-{}", normalized.raw_id, count);
        }

        out.push(normalized);
    }

    debug!(
        "Normalized {} of {} rows ({} skipped)",
        out.len(),
        rows.len(),
        rows.len() - out.len()
    );

    out.sort_by(|a, b| b.rating_value().total_cmp(&a.rating_value()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn standard_map() -> ColumnMap {
        ColumnMap::from_headers(&[
            "SteamID", "Name", "Team", "Maps", "Rating", "ADR", "RWS", "HS", "Kills", "Deaths",
            "First Kills",
        ])
    }

    #[test]
    fn test_headshot_percent_form() {
        let (value, display) = parse_headshot("55%");
        assert_eq!(value, 55.0);
        assert_eq!(display, "55%");
    }

    #[test]
    fn test_headshot_fraction_form() {
        let (value, display) = parse_headshot("0.55");
        assert_eq!(value, 55.0);
        assert_eq!(display, "55.0%");
    }

    #[test]
    fn test_headshot_forms_agree() {
        assert_eq!(parse_headshot("60%").0, parse_headshot("0.6").0);
        assert_eq!(parse_headshot("47.5%").0, parse_headshot("0.475").0);
    }

    #[test]
    fn test_headshot_forms_agree_past_one_decimal() {
        let (percent, _) = parse_headshot("55.55%");
        let (fraction, _) = parse_headshot("0.5555");

        assert_eq!(percent, 55.55);
        assert_eq!(fraction, 55.55);
    }

    #[test]
    fn test_headshot_empty() {
        let (value, display) = parse_headshot("");
        assert_eq!(value, 0.0);
        assert_eq!(display, "0.0%");
    }

    #[test]
    fn test_kd_zero_deaths_is_finite() {
        assert_eq!(kill_death_ratio(12.0, 0.0), 12.0);
        assert_eq!(kill_death_ratio(0.0, 0.0), 0.0);
        assert_eq!(kill_death_ratio(20.0, 10.0), 2.0);
    }

    #[test]
    fn test_normalize_full_row() {
        let map = standard_map();
        let r = row(&[
            "7656119", "s1mple", "NAVI", "4", "1.334", "88.26", "12.5", "0.41", "90", "60", "10",
        ]);

        let n = normalize_row(&map, &r, 0).unwrap();

        assert_eq!(n.raw_id, "7656119");
        assert_eq!(n.name, "s1mple");
        assert_eq!(n.team, "NAVI");
        assert_eq!(n.maps, 4);
        assert_eq!(n.rating, "1.33");
        assert_eq!(n.adr, "88.3");
        assert_eq!(n.rws, "12.50");
        assert_eq!(n.hs, "41.0%");
        assert_eq!(n.hs_val, 41.0);
        assert_eq!(n.kd, "1.50");
        assert_eq!(n.fk, "2.50");
    }

    #[test]
    fn test_normalize_skips_empty_name() {
        let map = standard_map();
        let r = row(&["1", "  ", "NAVI"]);
        assert!(normalize_row(&map, &r, 0).is_none());
    }

    #[test]
    fn test_normalize_defaults() {
        let map = ColumnMap::from_headers(&["Name"]);
        let n = normalize_row(&map, &row(&["solo"]), 0).unwrap();

        assert_eq!(n.team, DEFAULT_TEAM);
        assert_eq!(n.maps, 1);
        assert_eq!(n.rating, "0.00");
        assert_eq!(n.adr, "0.0");
        assert_eq!(n.kd, "0.00");
        assert_eq!(n.fk, "0.00");
        assert!(n.raw_id.starts_with("gen-"));
    }

    #[test]
    fn test_normalize_short_row() {
        let map = standard_map();
        let n = normalize_row(&map, &row(&["", "short"]), 0).unwrap();

        assert_eq!(n.name, "short");
        assert_eq!(n.kd, "0.00");
    }

    #[test]
    fn test_maps_below_one_become_one() {
        let map = ColumnMap::from_headers(&["Name", "Maps", "FK"]);
        let n = normalize_row(&map, &row(&["p", "0", "3"]), 0).unwrap();

        assert_eq!(n.maps, 1);
        assert_eq!(n.fk, "3.00");
    }

    #[test]
    fn test_generated_id_is_deterministic() {
        let map = ColumnMap::from_headers(&["Name", "Team", "Rating"]);
        let r = row(&["p", "T", "1.1"]);

        let a = normalize_row(&map, &r, 0).unwrap();
        let b = normalize_row(&map, &r, 7).unwrap();
        assert_eq!(a.raw_id, b.raw_id);
    }

    #[test]
    fn test_duplicate_generated_ids_are_suffixed() {
        let map = ColumnMap::from_headers(&["Name", "Team", "Rating"]);
        let rows = vec![row(&["p", "T", "1.1"]), row(&["p", "T", "1.1"])];

        let out = normalize_rows(&map, &rows);
        assert_eq!(out.len(), 2);
        assert_ne!(out[0].raw_id, out[1].raw_id);
        assert!(out[1].raw_id.ends_with("-2"));
    }

    #[test]
    fn test_repeated_source_id_keeps_first_row() {
        let map = ColumnMap::from_headers(&["SteamID", "Name", "Rating"]);
        let rows = vec![row(&["765", "a", "1.0"]), row(&["765", "b", "0.9"]), row(&["766", "c", "1.2"])];

        let out = normalize_rows(&map, &rows);
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_rows_sorted_by_rating_desc() {
        let map = ColumnMap::from_headers(&["Name", "Rating"]);
        let rows = vec![
            row(&["low", "0.80"]),
            row(&["", "9.99"]),
            row(&["high", "1.40"]),
            row(&["mid", "1.05"]),
        ];

        let out = normalize_rows(&map, &rows);
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }
}
