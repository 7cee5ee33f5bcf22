use serde::Serialize;

use crate::record::PlayerRecord;

/// Rescaling rule for a raw metric value.
///
/// `Per90` divides by estimated minutes (appearances at 90 minutes each),
/// which today is arithmetically the same as `PerAppearance`. The variants
/// stay distinct so real minutes-played data can slot in without touching
/// call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Normalization {
    #[default]
    None,
    PerAppearance,
    Per90,
}

impl Normalization {
    pub fn label(&self) -> &'static str {
        match self {
            Normalization::None => "Raw Values",
            Normalization::PerAppearance => "Per Appearance",
            Normalization::Per90 => "Per 90 Minutes",
        }
    }

    /// Axis/legend label for a metric under this mode.
    pub fn metric_label(&self, metric: &str) -> String {
        match self {
            Normalization::None => metric.to_string(),
            Normalization::PerAppearance => format!("{metric} per Appearance"),
            Normalization::Per90 => format!("{metric} per 90"),
        }
    }
}

/// Resolve a record's observed value for a metric under a normalization
/// mode. Total over its domain: the result is a finite number or `None`,
/// never NaN or an infinity. `Some(0.0)` is a real observation; absence of
/// the metric is `None`.
pub fn resolve(record: &PlayerRecord, metric: &str, mode: Normalization) -> Option<f64> {
    let value = record.metric(metric)?;
    let resolved = match mode {
        Normalization::None => value,
        Normalization::PerAppearance => {
            let apps = record.appearances.unwrap_or(0);
            if apps == 0 {
                return None;
            }
            value / apps as f64
        }
        Normalization::Per90 => {
            let apps = record.appearances.unwrap_or(0);
            if apps == 0 {
                return None;
            }
            // Estimated minutes: every appearance counted as a full match.
            let minutes = apps as f64 * 90.0;
            value / minutes * 90.0
        }
    };
    resolved.is_finite().then_some(resolved)
}

/// Percentage-typed metrics aggregate by mean-of-members; summing
/// percentages across players is meaningless.
pub fn is_percentage_metric(name: &str) -> bool {
    name.contains('%')
}
