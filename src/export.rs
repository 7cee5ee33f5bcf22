use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::view::ViewData;

pub struct ExportReport {
    pub groups: usize,
    pub members: usize,
}

/// Write one view's aggregates and insight to an `.xlsx` workbook. A
/// one-shot sink for sharing results; nothing is ever read back.
pub fn export_view(path: &Path, view: &ViewData, metric_label: &str) -> Result<ExportReport> {
    let mut group_rows = vec![vec![
        "Group".to_string(),
        "Players".to_string(),
        "Mean".to_string(),
        "Median".to_string(),
        "Q1".to_string(),
        "Q3".to_string(),
        "Max".to_string(),
        "Total".to_string(),
        "Outliers".to_string(),
    ]];
    for group in &view.groups {
        group_rows.push(vec![
            group.key.clone(),
            group.count.to_string(),
            format!("{:.2}", group.mean),
            format!("{:.2}", group.median),
            format!("{:.2}", group.quartiles.q1),
            format!("{:.2}", group.quartiles.q3),
            format!("{:.2}", group.max),
            format!("{:.2}", group.total),
            group.outlier_count.to_string(),
        ]);
    }

    let mut member_rows = vec![vec![
        "Group".to_string(),
        "Player".to_string(),
        "Club".to_string(),
        metric_label.to_string(),
        "Outlier".to_string(),
    ]];
    for group in &view.groups {
        for member in &group.top_members {
            member_rows.push(vec![
                group.key.clone(),
                member.name.clone(),
                member.club.clone(),
                format!("{:.2}", member.value),
                (if member.outlier { "yes" } else { "" }).to_string(),
            ]);
        }
    }

    let insight = &view.insight;
    let mut insight_rows = vec![vec!["Metric".to_string(), insight.metric.clone()]];
    if let Some(high) = &insight.highest {
        insight_rows.push(vec![
            "Highest group".to_string(),
            format!("{} ({:.2})", high.key, high.mean),
        ]);
    }
    if let Some(low) = &insight.lowest {
        insight_rows.push(vec![
            "Lowest group".to_string(),
            format!("{} ({:.2})", low.key, low.mean),
        ]);
    }
    insight_rows.push(vec![
        "High/low ratio".to_string(),
        insight
            .high_to_low_ratio
            .map(|r| format!("{r:.1}x"))
            .unwrap_or_else(|| "N/A".to_string()),
    ]);
    if let Some(top) = &insight.top_performer {
        insight_rows.push(vec![
            "Top performer".to_string(),
            format!("{} ({}, {:.2})", top.name, top.club, top.value),
        ]);
    }
    if let Some(peak) = &insight.peak_age {
        insight_rows.push(vec![
            "Peak age".to_string(),
            format!("{} (mean {:.2})", peak.age, peak.mean),
        ]);
    }
    if let Some(trend) = &insight.trend {
        insight_rows.push(vec![
            "Age trend".to_string(),
            format!("{} (slope {:.3})", trend.direction.label(), trend.slope),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Groups")?;
        write_rows(sheet, &group_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TopPlayers")?;
        write_rows(sheet, &member_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Insight")?;
        write_rows(sheet, &insight_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        groups: group_rows.len().saturating_sub(1),
        members: member_rows.len().saturating_sub(1),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
