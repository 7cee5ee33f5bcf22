use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{self, AggregationGroup, Trend};
use crate::metrics::{self, Normalization};
use crate::record::PlayerRecord;

/// Ages holding less than this share of the filtered population are too
/// thin to name as a performance peak.
pub const PEAK_AGE_MIN_SHARE: f64 = 0.03;

#[derive(Debug, Clone, Serialize)]
pub struct GroupRank {
    pub key: String,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPerformer {
    pub name: String,
    pub club: String,
    pub position: String,
    pub value: f64,
    pub appearances: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeakAge {
    pub age: u32,
    pub mean: f64,
    /// Share of the filtered population at this age.
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub slope: f64,
    pub direction: Trend,
}

/// Ranked comparisons derived from aggregated groups — nothing here adds
/// a data source; it only reorders and names what the aggregator found.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub metric: String,
    /// Groups by mean, descending.
    pub ranked: Vec<GroupRank>,
    pub highest: Option<GroupRank>,
    pub lowest: Option<GroupRank>,
    /// Highest mean over lowest mean; `None` when the lowest mean is
    /// zero (rendered as "N/A", never an infinity).
    pub high_to_low_ratio: Option<f64>,
    pub top_performer: Option<TopPerformer>,
    pub peak_age: Option<PeakAge>,
    pub trend: Option<TrendSummary>,
}

pub fn synthesize(
    groups: &[AggregationGroup],
    records: &[&PlayerRecord],
    metric: &str,
    mode: Normalization,
) -> Insight {
    let mut ranked: Vec<GroupRank> = groups
        .iter()
        .map(|g| GroupRank {
            key: g.key.clone(),
            mean: g.mean,
            count: g.count,
        })
        .collect();
    ranked.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.key.cmp(&b.key)));

    let highest = ranked.first().cloned();
    let lowest = ranked.last().cloned();
    let high_to_low_ratio = match (&highest, &lowest) {
        (Some(high), Some(low)) if low.mean != 0.0 => {
            let ratio = high.mean / low.mean;
            ratio.is_finite().then_some(ratio)
        }
        _ => None,
    };

    Insight {
        metric: metric.to_string(),
        highest,
        lowest,
        high_to_low_ratio,
        top_performer: top_performer(records, metric, mode),
        peak_age: peak_age(records, metric, mode),
        trend: trend(records, metric, mode),
        ranked,
    }
}

/// Single best record by resolved value. Ties break by name ascending —
/// a deterministic rule rather than whatever order the source file had.
pub fn top_performer(
    records: &[&PlayerRecord],
    metric: &str,
    mode: Normalization,
) -> Option<TopPerformer> {
    let mut scored: Vec<(&PlayerRecord, f64)> = records
        .iter()
        .filter_map(|r| metrics::resolve(r, metric, mode).map(|v| (*r, v)))
        .collect();
    scored.sort_by(|(ra, va), (rb, vb)| vb.total_cmp(va).then_with(|| ra.name.cmp(&rb.name)));
    scored.first().map(|(record, value)| TopPerformer {
        name: record.name.clone(),
        club: record.club.clone(),
        position: record.position.label().to_string(),
        value: *value,
        appearances: record.appearances,
    })
}

/// Age with the highest mean resolved value, considering only ages that
/// carry at least `PEAK_AGE_MIN_SHARE` of the resolved population. Ties
/// keep the younger age.
pub fn peak_age(records: &[&PlayerRecord], metric: &str, mode: Normalization) -> Option<PeakAge> {
    let mut by_age: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut population = 0usize;
    for record in records {
        let Some(age) = record.age else { continue };
        let Some(value) = metrics::resolve(record, metric, mode) else {
            continue;
        };
        by_age.entry(age).or_default().push(value);
        population += 1;
    }
    if population == 0 {
        return None;
    }

    let mut best: Option<PeakAge> = None;
    for (age, values) in by_age {
        let share = values.len() as f64 / population as f64;
        if share < PEAK_AGE_MIN_SHARE {
            continue;
        }
        let Some(mean) = aggregate::mean(&values) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| mean > b.mean) {
            best = Some(PeakAge { age, mean, share });
        }
    }
    best
}

fn trend(records: &[&PlayerRecord], metric: &str, mode: Normalization) -> Option<TrendSummary> {
    let points = aggregate::mean_by_age(records, metric, mode);
    let slope = aggregate::ols_slope(&points)?;
    Some(TrendSummary {
        slope,
        direction: aggregate::classify_trend(slope),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawValue, ValidityRule, normalize_rows};

    fn records(rows: &[(&str, &str, u32, u32, f64)]) -> Vec<PlayerRecord> {
        let raw: Vec<crate::record::RawRow> = rows
            .iter()
            .map(|(name, club, age, apps, goals)| {
                [
                    ("Name", RawValue::Text(name.to_string())),
                    ("Club", RawValue::Text(club.to_string())),
                    ("Position", RawValue::Text("Forward".to_string())),
                    ("Age", RawValue::Number(*age as f64)),
                    ("Appearances", RawValue::Number(*apps as f64)),
                    ("Goals", RawValue::Number(*goals)),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect()
            })
            .collect();
        normalize_rows(&raw, &ValidityRule::identity())
    }

    #[test]
    fn top_performer_ties_break_by_name() {
        let rs = records(&[
            ("Zed", "A", 25, 10, 9.0),
            ("Abe", "B", 26, 12, 9.0),
            ("Mid", "C", 27, 14, 4.0),
        ]);
        let refs: Vec<&PlayerRecord> = rs.iter().collect();
        let top = top_performer(&refs, "Goals", Normalization::None).unwrap();
        assert_eq!(top.name, "Abe");
        assert_eq!(top.value, 9.0);
    }

    #[test]
    fn peak_age_respects_population_floor() {
        // One spectacular 40-year-old in a population of 40 is a 2.5%
        // share, below the noise floor; the crowd at 25 wins instead.
        let mut rows: Vec<(&str, &str, u32, u32, f64)> = Vec::new();
        let names: Vec<String> = (0..39).map(|i| format!("P{i}")).collect();
        for name in &names {
            rows.push((name.as_str(), "A", 25, 10, 2.0));
        }
        rows.push(("Old", "B", 40, 10, 99.0));
        let rs = records(&rows);
        let refs: Vec<&PlayerRecord> = rs.iter().collect();
        let peak = peak_age(&refs, "Goals", Normalization::None).unwrap();
        assert_eq!(peak.age, 25);
    }

    #[test]
    fn ratio_is_none_when_lowest_mean_is_zero() {
        let rs = records(&[("A", "X", 25, 10, 5.0), ("B", "Y", 25, 10, 0.0)]);
        let refs: Vec<&PlayerRecord> = rs.iter().collect();
        let groups = aggregate::aggregate(
            &refs,
            aggregate::GroupBy::Club,
            "Goals",
            Normalization::None,
            5,
        );
        let insight = synthesize(&groups, &refs, "Goals", Normalization::None);
        assert_eq!(insight.high_to_low_ratio, None);
        assert_eq!(insight.highest.unwrap().key, "X");
        assert_eq!(insight.lowest.unwrap().key, "Y");
    }
}
