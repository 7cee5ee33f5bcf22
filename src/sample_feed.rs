use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::record::{Position, RawRow, RawValue};

const CLUBS: &[&str] = &[
    "Arsenal",
    "Aston Villa",
    "Brighton & Hove Albion",
    "Burnley",
    "Chelsea",
    "Crystal Palace",
    "Everton",
    "Fulham",
    "Leeds United",
    "Leicester City",
    "Liverpool",
    "Manchester City",
    "Manchester United",
    "Newcastle United",
    "Sheffield United",
    "Southampton",
    "Tottenham Hotspur",
    "West Bromwich Albion",
    "West Ham United",
    "Wolverhampton Wanderers",
];

pub fn default_size() -> usize {
    std::env::var("PLSTATS_SAMPLE_SIZE")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(240)
        .clamp(40, 5_000)
}

pub fn default_seed() -> u64 {
    std::env::var("PLSTATS_SAMPLE_SEED")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(2020)
}

/// Generate plausible raw season rows for demos, tests, and benches.
/// Percentage columns are emitted as `"57.3%"` strings and a small share
/// of cells is missing or malformed, so the generated feed exercises the
/// same cleaning paths as the real CSV.
pub fn sample_rows(count: usize, seed: u64) -> Vec<RawRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|idx| sample_row(idx, &mut rng)).collect()
}

fn sample_row(idx: usize, rng: &mut StdRng) -> RawRow {
    let position = match rng.gen_range(0..12) {
        0 => Position::Goalkeeper,
        1..=4 => Position::Defender,
        5..=8 => Position::Midfielder,
        _ => Position::Forward,
    };
    let age = rng.gen_range(17..=39u32);
    let appearances = rng.gen_range(0..=38u32);
    let apps = appearances as f64;

    let mut row = RawRow::new();
    row.insert(
        "Name".to_string(),
        RawValue::Text(format!("Player {}", idx + 1)),
    );
    row.insert(
        "Club".to_string(),
        RawValue::Text(CLUBS[rng.gen_range(0..CLUBS.len())].to_string()),
    );
    row.insert(
        "Position".to_string(),
        RawValue::Text(position.label().to_string()),
    );
    row.insert("Age".to_string(), RawValue::Number(age as f64));
    row.insert(
        "Appearances".to_string(),
        RawValue::Number(appearances as f64),
    );

    let goal_rate = match position {
        Position::Forward => 0.55,
        Position::Midfielder => 0.25,
        Position::Defender => 0.06,
        Position::Goalkeeper => 0.0,
    };
    put_count(&mut row, rng, "Goals", apps * goal_rate);
    put_count(&mut row, rng, "Assists", apps * goal_rate * 0.6);
    put_count(
        &mut row,
        rng,
        "Tackles",
        apps * if position == Position::Defender { 2.2 } else { 0.9 },
    );
    put_count(&mut row, rng, "Interceptions", apps * 1.1);
    if position == Position::Goalkeeper {
        put_count(&mut row, rng, "Saves", apps * 2.8);
        put_count(&mut row, rng, "Clean sheets", apps * 0.35);
    }
    if !matches!(position, Position::Goalkeeper) {
        let passes_per_match = 12.0 + rng.gen_range(0.0..45.0);
        put_metric(&mut row, rng, "Passes per match", passes_per_match);
    }
    put_percent(&mut row, rng, "Shooting accuracy %", 20.0..=65.0);
    put_percent(&mut row, rng, "Tackle success %", 40.0..=85.0);

    row
}

fn put_count(row: &mut RawRow, rng: &mut StdRng, column: &str, expected: f64) {
    if rng.gen_bool(0.04) {
        return; // missing cell
    }
    let spread = (expected * 0.5).max(1.0);
    let v = (expected + rng.gen_range(-spread..spread)).max(0.0).round();
    row.insert(column.to_string(), RawValue::Number(v));
}

fn put_metric(row: &mut RawRow, rng: &mut StdRng, column: &str, value: f64) {
    if rng.gen_bool(0.04) {
        return;
    }
    row.insert(
        column.to_string(),
        RawValue::Number((value * 10.0).round() / 10.0),
    );
}

fn put_percent(
    row: &mut RawRow,
    rng: &mut StdRng,
    column: &str,
    range: std::ops::RangeInclusive<f64>,
) {
    if rng.gen_bool(0.03) {
        // The real export occasionally carries a dash for "no attempts".
        row.insert(column.to_string(), RawValue::Text("-".to_string()));
        return;
    }
    let v = rng.gen_range(range);
    row.insert(
        column.to_string(),
        RawValue::Text(format!("{v:.1}%")),
    );
}
