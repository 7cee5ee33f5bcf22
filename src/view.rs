use std::collections::HashSet;

use crate::aggregate::{self, AggregationGroup, DensityPoint, GroupBy};
use crate::filters::{ClubFilter, FilterSpec, filter};
use crate::insights::{self, Insight};
use crate::metrics::{self, Normalization};
use crate::record::{PlayerRecord, Position};

/// Display cap: keep the N records with the most appearances so dense
/// multi-axis views stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCap {
    All,
    Top(usize),
}

/// The whole configuration surface one view hands the pipeline. The UI
/// boundary translates widget state into this struct; the pipeline never
/// reads control state from anywhere else.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub metric: String,
    pub mode: Normalization,
    pub min_appearances: Option<u32>,
    pub positions: HashSet<Position>,
    pub club: ClubFilter,
    pub group_by: GroupBy,
    pub sample_cap: SampleCap,
    /// Top-N members reported per aggregation group.
    pub top_members: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            metric: "Goals".to_string(),
            mode: Normalization::None,
            min_appearances: Some(10),
            positions: Position::ALL.into_iter().collect(),
            club: ClubFilter::All,
            group_by: GroupBy::Position,
            sample_cap: SampleCap::All,
            top_members: 5,
        }
    }
}

/// A record together with its resolved value for the view's metric.
/// The source record is untouched; the value rides alongside.
#[derive(Debug, Clone)]
pub struct ScoredRecord<'a> {
    pub record: &'a PlayerRecord,
    pub normalized_value: f64,
}

#[derive(Debug, Clone)]
pub struct ViewData<'a> {
    pub records: Vec<ScoredRecord<'a>>,
    pub groups: Vec<AggregationGroup>,
    pub insight: Insight,
}

impl ViewData<'_> {
    /// Distribution shape per position over a shared tick domain — the
    /// input for violin-style rendering.
    pub fn density_by_position(
        &self,
        bandwidth: f64,
        tick_count: usize,
    ) -> Vec<(Position, Vec<DensityPoint>)> {
        let max = self
            .records
            .iter()
            .map(|s| s.normalized_value)
            .fold(0.0_f64, f64::max);
        let ticks = aggregate::even_ticks(0.0, max * 1.1, tick_count);
        Position::ALL
            .iter()
            .filter_map(|position| {
                let values: Vec<f64> = self
                    .records
                    .iter()
                    .filter(|s| s.record.position == *position)
                    .map(|s| s.normalized_value)
                    .collect();
                if values.is_empty() {
                    return None;
                }
                Some((*position, aggregate::kernel_density(&values, bandwidth, &ticks)))
            })
            .collect()
    }
}

/// Run the full synchronous recomputation for one view configuration:
/// filter, resolve, cap, aggregate, synthesize. Pure with respect to the
/// dataset; every control change recomputes from scratch.
pub fn run_view<'a>(records: &'a [PlayerRecord], cfg: &ViewConfig) -> ViewData<'a> {
    let spec = FilterSpec {
        positions: cfg.positions.clone(),
        min_appearances: cfg.min_appearances,
        require_metrics: vec![cfg.metric.clone()],
        club: cfg.club.clone(),
    };
    let filtered = filter(records, &spec);

    let mut scored: Vec<ScoredRecord<'a>> = filtered
        .into_iter()
        .filter_map(|record| {
            metrics::resolve(record, &cfg.metric, cfg.mode).map(|normalized_value| ScoredRecord {
                record,
                normalized_value,
            })
        })
        .collect();

    if let SampleCap::Top(cap) = cfg.sample_cap
        && scored.len() > cap
    {
        scored.sort_by(|a, b| {
            b.record
                .appearances
                .cmp(&a.record.appearances)
                .then_with(|| a.record.name.cmp(&b.record.name))
        });
        scored.truncate(cap);
    }

    let refs: Vec<&PlayerRecord> = scored.iter().map(|s| s.record).collect();
    let groups = aggregate::aggregate(&refs, cfg.group_by, &cfg.metric, cfg.mode, cfg.top_members);
    let insight = insights::synthesize(&groups, &refs, &cfg.metric, cfg.mode);

    ViewData {
        records: scored,
        groups,
        insight,
    }
}
