use std::collections::HashMap;

use serde::Serialize;

/// One parsed CSV cell. Numeric inference happens at parse time; strings
/// that fail inference (including percentage-formatted values) stay `Text`
/// until the normalizer runs.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) => Some(*v),
            RawValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Number(_) => None,
            RawValue::Text(s) => Some(s.as_str()),
        }
    }
}

/// One raw CSV row: column name to parsed cell. Empty cells are absent.
pub type RawRow = HashMap<String, RawValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Position {
    Forward,
    Midfielder,
    Defender,
    Goalkeeper,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Forward,
        Position::Midfielder,
        Position::Defender,
        Position::Goalkeeper,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Position::Forward => "Forward",
            Position::Midfielder => "Midfielder",
            Position::Defender => "Defender",
            Position::Goalkeeper => "Goalkeeper",
        }
    }

    /// Dataset position labels vary ("Forward", "Striker", "Centre-Back",
    /// "GK"); match by substring the same way squad roles are bucketed.
    pub fn parse(raw: &str) -> Option<Position> {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }
        if s.contains("goalkeeper") || s.contains("keeper") || s == "gk" {
            return Some(Position::Goalkeeper);
        }
        if s.contains("defender") || s.contains("back") {
            return Some(Position::Defender);
        }
        if s.contains("midfield") {
            return Some(Position::Midfielder);
        }
        if s.contains("forward") || s.contains("striker") || s.contains("wing") || s.contains("attacker") {
            return Some(Position::Forward);
        }
        None
    }
}

/// Fixed age bracket used for comparative grouping. Brackets are
/// contiguous and cover the full observed age range; the first bracket
/// whose bounds contain the age wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeBracket {
    pub label: &'static str,
    pub min: u32,
    pub max: u32,
}

pub const AGE_BRACKETS: [AgeBracket; 5] = [
    AgeBracket { label: "Young (Under 23)", min: 17, max: 22 },
    AgeBracket { label: "Early Prime (23-26)", min: 23, max: 26 },
    AgeBracket { label: "Prime (27-29)", min: 27, max: 29 },
    AgeBracket { label: "Late Prime (30-32)", min: 30, max: 32 },
    AgeBracket { label: "Veteran (33+)", min: 33, max: 40 },
];

pub fn bracket_for_age(age: u32) -> Option<&'static AgeBracket> {
    AGE_BRACKETS.iter().find(|b| age >= b.min && age <= b.max)
}

/// One player-season entry. Constructed once per load and immutable
/// afterwards; derived values (`age_group`) are separate fields, source
/// columns are never overwritten.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub name: String,
    pub club: String,
    pub position: Position,
    pub age: Option<u32>,
    pub appearances: Option<u32>,
    pub age_group: Option<&'static AgeBracket>,
    /// Open set of numeric columns, addressable by source column name.
    pub metrics: HashMap<String, f64>,
    /// Non-numeric columns other than the identity fields, retained as-is.
    pub extras: HashMap<String, String>,
}

impl PlayerRecord {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Minimal-validity predicate applied while normalizing. Different views
/// need different completeness, so this is configuration, not a constant.
/// A parseable `Position` is always required; everything else is opt-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidityRule {
    pub require_name: bool,
    pub require_club: bool,
    pub require_age: bool,
    pub require_appearances: bool,
}

impl ValidityRule {
    /// `Name && Position` — the common case for per-player views.
    pub fn identity() -> Self {
        Self {
            require_name: true,
            ..Self::default()
        }
    }

    /// `Age && Position && Appearances` — age-curve views.
    pub fn age_profile() -> Self {
        Self {
            require_age: true,
            require_appearances: true,
            ..Self::default()
        }
    }

    /// `Club && Position` — club aggregation views.
    pub fn club_profile() -> Self {
        Self {
            require_club: true,
            ..Self::default()
        }
    }
}

/// Convert every percentage-formatted string field to its numeric value
/// with the `%` stripped. Idempotent: numbers pass through untouched, so
/// re-coercing coerced data is a no-op. Unparseable text stays text and is
/// treated as absent by numeric consumers.
pub fn coerce_percent_fields(row: &mut RawRow) {
    for value in row.values_mut() {
        let RawValue::Text(s) = value else { continue };
        if !s.contains('%') {
            continue;
        }
        if let Some(v) = parse_percent(s) {
            *value = RawValue::Number(v);
        }
    }
}

/// Build typed player records from raw rows: percentage coercion first,
/// then the validity predicate, then derived-field attachment. Never
/// fails on a malformed row; invalid rows are simply dropped.
pub fn normalize_rows(raw_rows: &[RawRow], rule: &ValidityRule) -> Vec<PlayerRecord> {
    raw_rows
        .iter()
        .filter_map(|raw| {
            let mut row = raw.clone();
            coerce_percent_fields(&mut row);
            build_record(&row, rule)
        })
        .collect()
}

fn build_record(row: &RawRow, rule: &ValidityRule) -> Option<PlayerRecord> {
    let position = row
        .get("Position")
        .and_then(RawValue::as_text)
        .and_then(Position::parse)?;

    let name = text_field(row, "Name");
    let club = text_field(row, "Club");
    let age = count_field(row, "Age");
    let appearances = count_field(row, "Appearances");

    if rule.require_name && name.is_empty() {
        return None;
    }
    if rule.require_club && club.is_empty() {
        return None;
    }
    if rule.require_age && age.is_none() {
        return None;
    }
    if rule.require_appearances && appearances.is_none() {
        return None;
    }

    let mut metrics = HashMap::new();
    let mut extras = HashMap::new();
    for (column, value) in row {
        match value {
            RawValue::Number(v) if v.is_finite() => {
                metrics.insert(column.clone(), *v);
            }
            RawValue::Number(_) => {}
            RawValue::Text(s) => {
                if !matches!(column.as_str(), "Name" | "Club" | "Position") {
                    extras.insert(column.clone(), s.clone());
                }
            }
        }
    }

    Some(PlayerRecord {
        name,
        club,
        position,
        age,
        appearances,
        age_group: age.and_then(bracket_for_age),
        metrics,
        extras,
    })
}

fn text_field(row: &RawRow, column: &str) -> String {
    match row.get(column) {
        Some(RawValue::Text(s)) => s.trim().to_string(),
        Some(RawValue::Number(v)) => v.to_string(),
        None => String::new(),
    }
}

fn count_field(row: &RawRow, column: &str) -> Option<u32> {
    let v = row.get(column)?.as_number()?;
    if v.is_finite() && v >= 0.0 {
        Some(v.round() as u32)
    } else {
        None
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == ',')
        .collect();
    let cleaned = cleaned.replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

pub fn parse_percent(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    parse_number(s.trim_end_matches('%'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, RawValue)]) -> RawRow {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn position_parse_variants() {
        assert_eq!(Position::parse("Forward"), Some(Position::Forward));
        assert_eq!(Position::parse("striker"), Some(Position::Forward));
        assert_eq!(Position::parse("Centre-Back"), Some(Position::Defender));
        assert_eq!(Position::parse("GK"), Some(Position::Goalkeeper));
        assert_eq!(Position::parse("Midfielder"), Some(Position::Midfielder));
        assert_eq!(Position::parse(""), None);
        assert_eq!(Position::parse("Coach"), None);
    }

    #[test]
    fn brackets_partition_observed_age_range() {
        for age in 17..=40u32 {
            let hits = AGE_BRACKETS
                .iter()
                .filter(|b| age >= b.min && age <= b.max)
                .count();
            assert_eq!(hits, 1, "age {age} should land in exactly one bracket");
        }
        assert_eq!(bracket_for_age(29).unwrap().label, "Prime (27-29)");
        assert_eq!(bracket_for_age(30).unwrap().label, "Late Prime (30-32)");
    }

    #[test]
    fn percent_coercion_strips_suffix() {
        let mut r = row(&[
            ("Tackle success %", RawValue::Text("45.2%".to_string())),
            ("Name", RawValue::Text("A".to_string())),
        ]);
        coerce_percent_fields(&mut r);
        assert_eq!(
            r.get("Tackle success %"),
            Some(&RawValue::Number(45.2))
        );
        assert_eq!(r.get("Name"), Some(&RawValue::Text("A".to_string())));
    }

    #[test]
    fn percent_coercion_is_idempotent() {
        let mut once = row(&[
            ("Shooting accuracy %", RawValue::Text("61%".to_string())),
            ("Goals", RawValue::Number(7.0)),
            ("Notes", RawValue::Text("n/a %garbage".to_string())),
        ]);
        coerce_percent_fields(&mut once);
        let mut twice = once.clone();
        coerce_percent_fields(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn validity_rules_drop_incomplete_rows() {
        let rows = vec![
            row(&[
                ("Name", RawValue::Text("A".to_string())),
                ("Position", RawValue::Text("Forward".to_string())),
                ("Goals", RawValue::Number(5.0)),
            ]),
            row(&[
                ("Name", RawValue::Text("B".to_string())),
                ("Position", RawValue::Text("Forward".to_string())),
                ("Age", RawValue::Number(25.0)),
                ("Appearances", RawValue::Number(12.0)),
            ]),
            // No parseable position: always dropped.
            row(&[("Name", RawValue::Text("C".to_string()))]),
        ];

        assert_eq!(normalize_rows(&rows, &ValidityRule::identity()).len(), 2);
        let aged = normalize_rows(&rows, &ValidityRule::age_profile());
        assert_eq!(aged.len(), 1);
        assert_eq!(aged[0].name, "B");
        assert_eq!(aged[0].age_group.unwrap().label, "Early Prime (23-26)");
    }

    #[test]
    fn unparseable_numeric_text_stays_absent() {
        let rows = vec![row(&[
            ("Name", RawValue::Text("A".to_string())),
            ("Position", RawValue::Text("Midfielder".to_string())),
            ("Goals", RawValue::Text("-".to_string())),
        ])];
        let records = normalize_rows(&rows, &ValidityRule::identity());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metric("Goals"), None);
        assert_eq!(records[0].extras.get("Goals").map(String::as_str), Some("-"));
    }
}
