use std::fs;
use std::path::PathBuf;

use plstats::dataset::parse_csv_rows;
use plstats::record::{
    RawValue, ValidityRule, coerce_percent_fields, normalize_rows,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_season_csv_fixture() {
    let raw = read_fixture("players.csv");
    let (rows, summary) = parse_csv_rows(&raw).expect("fixture should parse");
    assert_eq!(summary.rows_total, 12);
    assert_eq!(summary.rows_kept, 12);
    assert_eq!(summary.columns.len(), 13);
    assert!(summary.errors.is_empty());

    let kane = &rows[0];
    assert_eq!(kane.get("Age"), Some(&RawValue::Number(27.0)));
    assert_eq!(kane.get("Goals"), Some(&RawValue::Number(21.0)));
    // Percentage cells stay text until normalization.
    assert_eq!(
        kane.get("Shooting accuracy %"),
        Some(&RawValue::Text("48%".to_string()))
    );
    // Empty cells are absent fields, not empty strings.
    assert_eq!(kane.get("Tackle success %"), None);
    assert_eq!(kane.get("Saves"), None);
}

#[test]
fn percentage_strings_normalize_to_floats() {
    let raw = read_fixture("players.csv");
    let (rows, _) = parse_csv_rows(&raw).unwrap();
    let records = normalize_rows(&rows, &ValidityRule::identity());

    let bruno = records
        .iter()
        .find(|r| r.name == "Bruno Fernandes")
        .unwrap();
    assert_eq!(bruno.metric("Tackle success %"), Some(62.5));
    assert_eq!(bruno.metric("Shooting accuracy %"), Some(41.0));
}

#[test]
fn percent_coercion_is_idempotent_over_the_fixture() {
    let raw = read_fixture("players.csv");
    let (rows, _) = parse_csv_rows(&raw).unwrap();

    for row in &rows {
        let mut once = row.clone();
        coerce_percent_fields(&mut once);
        let mut twice = once.clone();
        coerce_percent_fields(&mut twice);
        assert_eq!(once, twice);
    }
}

#[test]
fn validity_rules_vary_by_consumer() {
    let raw = read_fixture("players.csv");
    let (rows, _) = parse_csv_rows(&raw).unwrap();

    // Name + Position keeps rows missing club or age.
    let identity = normalize_rows(&rows, &ValidityRule::identity());
    assert_eq!(identity.len(), 12);

    // Age + Appearances drops the ageless row.
    let aged = normalize_rows(&rows, &ValidityRule::age_profile());
    assert_eq!(aged.len(), 11);
    assert!(aged.iter().all(|r| r.age.is_some()));

    // Club rule drops the clubless row.
    let clubbed = normalize_rows(&rows, &ValidityRule::club_profile());
    assert_eq!(clubbed.len(), 11);
    assert!(clubbed.iter().all(|r| !r.club.is_empty()));
}

#[test]
fn unparseable_cells_read_as_absent_metrics() {
    let raw = read_fixture("players.csv");
    let (rows, _) = parse_csv_rows(&raw).unwrap();
    let records = normalize_rows(&rows, &ValidityRule::identity());

    let bad = records.iter().find(|r| r.name == "Bad Number").unwrap();
    assert_eq!(bad.metric("Goals"), None);
    assert_eq!(bad.metric("Tackle success %"), None);
    // The rest of the row still aggregates normally.
    assert_eq!(bad.metric("Assists"), Some(1.0));
    assert_eq!(bad.metric("Shooting accuracy %"), Some(40.0));
}

#[test]
fn derived_age_groups_attach_without_touching_source_fields() {
    let raw = read_fixture("players.csv");
    let (rows, _) = parse_csv_rows(&raw).unwrap();
    let records = normalize_rows(&rows, &ValidityRule::identity());

    let kdb = records
        .iter()
        .find(|r| r.name == "Kevin De Bruyne")
        .unwrap();
    assert_eq!(kdb.age, Some(29));
    assert_eq!(kdb.age_group.unwrap().label, "Prime (27-29)");
    assert_eq!(kdb.metric("Age"), Some(29.0));

    let ageless = records
        .iter()
        .find(|r| r.name == "Incomplete Row")
        .unwrap();
    assert_eq!(ageless.age_group, None);
}
