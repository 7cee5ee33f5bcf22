use std::collections::BTreeMap;

use serde::Serialize;

use crate::metrics::{self, Normalization};
use crate::record::{AGE_BRACKETS, PlayerRecord, Position};

/// Grouping dimension for aggregation. `Age` groups on the raw age value
/// (one group per observed age); `AgeBracket` uses the fixed bracket table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupBy {
    Position,
    AgeBracket,
    Club,
    Age,
}

impl GroupBy {
    pub fn label(&self) -> &'static str {
        match self {
            GroupBy::Position => "Position",
            GroupBy::AgeBracket => "Age Group",
            GroupBy::Club => "Club",
            GroupBy::Age => "Age",
        }
    }
}

/// Box-plot summary: quartiles plus Tukey 1.5×IQR fences. The low fence
/// is clamped at zero; no metric in this domain is negative. Values
/// outside the fences are flagged, never excluded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuartileSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    pub fence_low: f64,
    pub fence_high: f64,
}

impl QuartileSummary {
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.fence_low || value > self.fence_high
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopMember {
    pub name: String,
    pub club: String,
    pub value: f64,
    pub outlier: bool,
}

/// Statistical summary of all resolved members sharing a grouping key.
/// Groups that end up empty after metric resolution are never emitted.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationGroup {
    pub key: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sum of member values, except for percentage metrics where it is
    /// the member mean (percentages do not sum across players).
    pub total: f64,
    pub quartiles: QuartileSummary,
    pub top_members: Vec<TopMember>,
    pub outlier_count: usize,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile with linear interpolation between order statistics over a
/// sorted slice; p = 0.25/0.5/0.75 yields Q1/median/Q3. For an even count
/// the median is the average of the two middle values.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * p;
    let i = h.floor() as usize;
    let frac = h - i as f64;
    match sorted.get(i + 1) {
        Some(next) if frac > 0.0 => Some(sorted[i] + (next - sorted[i]) * frac),
        _ => Some(sorted[i]),
    }
}

pub fn median(sorted: &[f64]) -> Option<f64> {
    quantile(sorted, 0.5)
}

pub fn quartile_summary(sorted: &[f64]) -> Option<QuartileSummary> {
    let q1 = quantile(sorted, 0.25)?;
    let median = quantile(sorted, 0.5)?;
    let q3 = quantile(sorted, 0.75)?;
    let iqr = q3 - q1;
    Some(QuartileSummary {
        q1,
        median,
        q3,
        iqr,
        fence_low: (q1 - 1.5 * iqr).max(0.0),
        fence_high: q3 + 1.5 * iqr,
    })
}

/// Default smoothing parameters for distribution-shape views.
pub const DENSITY_BANDWIDTH: f64 = 7.0;
pub const DENSITY_TICKS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityPoint {
    pub x: f64,
    pub density: f64,
}

/// Epanechnikov kernel with the given bandwidth:
/// `K(v) = 0.75 (1 - (v/k)^2) / k` for |v/k| <= 1, else 0.
pub fn epanechnikov(bandwidth: f64) -> impl Fn(f64) -> f64 {
    move |v: f64| {
        let u = v / bandwidth;
        if u.abs() <= 1.0 {
            0.75 * (1.0 - u * u) / bandwidth
        } else {
            0.0
        }
    }
}

/// Smoothed distribution shape: density at each evaluation point is the
/// mean kernel weight over the sample. Relative shape only, not a
/// calibrated probability density.
pub fn kernel_density(values: &[f64], bandwidth: f64, ticks: &[f64]) -> Vec<DensityPoint> {
    if values.is_empty() || bandwidth <= 0.0 {
        return Vec::new();
    }
    let kernel = epanechnikov(bandwidth);
    ticks
        .iter()
        .map(|&x| {
            let sum: f64 = values.iter().map(|&v| kernel(x - v)).sum();
            DensityPoint {
                x,
                density: sum / values.len() as f64,
            }
        })
        .collect()
}

/// Evenly spaced inclusive tick sequence over [min, max].
pub fn even_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count < 2 || !(max > min) {
        return vec![min];
    }
    let step = (max - min) / (count - 1) as f64;
    (0..count).map(|i| min + step * i as f64).collect()
}

pub const TREND_SLOPE_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    Neutral,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Neutral => "neutral",
        }
    }
}

/// Ordinary-least-squares slope `b = (nΣxy − ΣxΣy) / (nΣx² − (Σx)²)`.
/// `None` for fewer than two points or a degenerate x spread.
pub fn ols_slope(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let sx: f64 = points.iter().map(|(x, _)| x).sum();
    let sy: f64 = points.iter().map(|(_, y)| y).sum();
    let sxy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sx2: f64 = points.iter().map(|(x, _)| x * x).sum();
    let denom = n * sx2 - sx * sx;
    if denom.abs() < 1e-12 {
        return None;
    }
    let slope = (n * sxy - sx * sy) / denom;
    slope.is_finite().then_some(slope)
}

/// Fixed-threshold classification; the ±0.05 cut is a documented policy
/// constant, not derived from the data.
pub fn classify_trend(slope: f64) -> Trend {
    if slope > TREND_SLOPE_THRESHOLD {
        Trend::Increasing
    } else if slope < -TREND_SLOPE_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Neutral
    }
}

/// Mean resolved value per observed age, ascending — the (x, y) input for
/// trend fitting and age-curve lines.
pub fn mean_by_age(
    records: &[&PlayerRecord],
    metric: &str,
    mode: Normalization,
) -> Vec<(f64, f64)> {
    let mut by_age: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for record in records {
        let Some(age) = record.age else { continue };
        let Some(value) = metrics::resolve(record, metric, mode) else {
            continue;
        };
        by_age.entry(age).or_default().push(value);
    }
    by_age
        .into_iter()
        .filter_map(|(age, values)| mean(&values).map(|m| (age as f64, m)))
        .collect()
}

/// Partition records by the grouping key and summarize the resolved
/// values of each partition. Members whose value does not resolve are
/// excluded from this metric's aggregation only; groups left empty are
/// omitted. Output order is deterministic: position enum order, bracket
/// table order, clubs alphabetically, ages ascending.
pub fn aggregate(
    records: &[&PlayerRecord],
    group_by: GroupBy,
    metric: &str,
    mode: Normalization,
    top_n: usize,
) -> Vec<AggregationGroup> {
    let mut partitions: BTreeMap<(u32, String), Vec<(&PlayerRecord, f64)>> = BTreeMap::new();
    for &record in records {
        let Some(key) = partition_key(record, group_by) else {
            continue;
        };
        let Some(value) = metrics::resolve(record, metric, mode) else {
            continue;
        };
        partitions.entry(key).or_default().push((record, value));
    }

    partitions
        .into_iter()
        .filter_map(|((_, key), members)| summarize(key, &members, metric, top_n))
        .collect()
}

fn partition_key(record: &PlayerRecord, group_by: GroupBy) -> Option<(u32, String)> {
    match group_by {
        GroupBy::Position => {
            let ord = Position::ALL
                .iter()
                .position(|p| *p == record.position)
                .unwrap_or(0) as u32;
            Some((ord, record.position.label().to_string()))
        }
        GroupBy::AgeBracket => {
            let bracket = record.age_group?;
            let ord = AGE_BRACKETS
                .iter()
                .position(|b| b.label == bracket.label)
                .unwrap_or(0) as u32;
            Some((ord, bracket.label.to_string()))
        }
        GroupBy::Club => {
            if record.club.is_empty() {
                return None;
            }
            Some((0, record.club.clone()))
        }
        GroupBy::Age => record.age.map(|age| (age, age.to_string())),
    }
}

fn summarize(
    key: String,
    members: &[(&PlayerRecord, f64)],
    metric: &str,
    top_n: usize,
) -> Option<AggregationGroup> {
    if members.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = members.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let quartiles = quartile_summary(&sorted)?;
    let mean = mean(&sorted)?;
    let sum: f64 = sorted.iter().sum();
    let total = if metrics::is_percentage_metric(metric) {
        mean
    } else {
        sum
    };
    let outlier_count = sorted.iter().filter(|v| quartiles.is_outlier(**v)).count();

    // Top members by value descending; ties broken by name ascending so
    // the ranking is stable across runs regardless of input order.
    let mut ranked: Vec<&(&PlayerRecord, f64)> = members.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));
    let top_members = ranked
        .into_iter()
        .take(top_n)
        .map(|&(record, value)| TopMember {
            name: record.name.clone(),
            club: record.club.clone(),
            value,
            outlier: quartiles.is_outlier(value),
        })
        .collect();

    Some(AggregationGroup {
        key,
        count: members.len(),
        mean,
        median: quartiles.median,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        total,
        quartiles,
        top_members,
        outlier_count,
    })
}
