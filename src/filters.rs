use std::collections::HashSet;

use crate::record::{PlayerRecord, Position};

/// Club selector; `All` is the wildcard the club dropdown exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClubFilter {
    #[default]
    All,
    Only(String),
}

impl ClubFilter {
    fn matches(&self, record: &PlayerRecord) -> bool {
        match self {
            ClubFilter::All => true,
            ClubFilter::Only(club) => record.club == *club,
        }
    }
}

/// AND-composed predicate set. Every predicate is pure, so application
/// order never changes the result. An empty position set selects nothing
/// (every checkbox unticked), which is a valid, empty query.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub positions: HashSet<Position>,
    pub min_appearances: Option<u32>,
    /// Metrics that must be present and numeric on the record. Multi-axis
    /// views list every displayed dimension here.
    pub require_metrics: Vec<String>,
    pub club: ClubFilter,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            positions: Position::ALL.into_iter().collect(),
            min_appearances: None,
            require_metrics: Vec::new(),
            club: ClubFilter::All,
        }
    }
}

impl FilterSpec {
    pub fn matches(&self, record: &PlayerRecord) -> bool {
        if !self.positions.contains(&record.position) {
            return false;
        }
        if let Some(threshold) = self.min_appearances {
            // A record without an appearance count never clears a
            // threshold, including zero.
            if !record.appearances.is_some_and(|a| a >= threshold) {
                return false;
            }
        }
        if !self
            .require_metrics
            .iter()
            .all(|metric| record.metric(metric).is_some())
        {
            return false;
        }
        self.club.matches(record)
    }
}

pub fn filter<'a>(records: &'a [PlayerRecord], spec: &FilterSpec) -> Vec<&'a PlayerRecord> {
    records.iter().filter(|r| spec.matches(r)).collect()
}

/// Same predicate set applied to an already-filtered borrow list.
pub fn refine<'a>(records: &[&'a PlayerRecord], spec: &FilterSpec) -> Vec<&'a PlayerRecord> {
    records
        .iter()
        .copied()
        .filter(|r| spec.matches(r))
        .collect()
}
