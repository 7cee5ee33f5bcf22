use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use plstats::aggregate::GroupBy;
use plstats::dataset::{self, DatasetSource};
use plstats::export;
use plstats::filters::ClubFilter;
use plstats::metrics::Normalization;
use plstats::record::Position;
use plstats::view::{self, SampleCap, ViewConfig};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse()?;

    let source = DatasetSource::from_env();
    let dataset = dataset::load_dataset(&source)?;
    let summary = &dataset.summary;

    println!("Dataset: {}", summary.source);
    println!(
        "Rows: {} parsed, {} kept, {} normalized records",
        summary.rows_total,
        summary.rows_kept,
        dataset.records.len()
    );
    if !summary.errors.is_empty() {
        eprintln!("Parse problems: {}", summary.errors.len());
        for err in summary.errors.iter().take(6) {
            eprintln!(" - {err}");
        }
    }

    let cfg = args.view_config();
    let data = view::run_view(&dataset.records, &cfg);

    println!();
    println!(
        "{} by {} ({})",
        cfg.metric,
        cfg.group_by.label(),
        cfg.mode.label()
    );
    println!(
        "{:<24} {:>7} {:>9} {:>9} {:>9} {:>9}",
        "Group", "Players", "Mean", "Median", "Max", "Total"
    );
    for group in &data.groups {
        println!(
            "{:<24} {:>7} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
            group.key, group.count, group.mean, group.median, group.max, group.total
        );
    }

    let insight = &data.insight;
    println!();
    if let (Some(high), Some(low)) = (&insight.highest, &insight.lowest) {
        println!(
            "Highest average: {} ({:.2}); lowest: {} ({:.2})",
            high.key, high.mean, low.key, low.mean
        );
        match insight.high_to_low_ratio {
            Some(ratio) => println!("Ratio highest/lowest: {ratio:.1}x"),
            None => println!("Ratio highest/lowest: N/A"),
        }
    }
    if let Some(top) = &insight.top_performer {
        println!(
            "Top performer: {} ({}, {}) with {:.2}",
            top.name, top.club, top.position, top.value
        );
    }
    if let Some(peak) = &insight.peak_age {
        println!(
            "Peak age: {} (mean {:.2}, {:.0}% of sample)",
            peak.age,
            peak.mean,
            peak.share * 100.0
        );
    }
    if let Some(trend) = &insight.trend {
        println!(
            "Age trend: {} (slope {:.3})",
            trend.direction.label(),
            trend.slope
        );
    }

    if args.json {
        println!();
        println!("{}", serde_json::to_string_pretty(&insight)?);
    }

    if let Some(path) = &args.export {
        let report = export::export_view(path, &data, &cfg.mode.metric_label(&cfg.metric))?;
        println!();
        println!(
            "Exported {} groups / {} ranked players to {}",
            report.groups,
            report.members,
            path.display()
        );
    }

    Ok(())
}

struct Args {
    metric: String,
    group: GroupBy,
    mode: Normalization,
    min_apps: Option<u32>,
    positions: HashSet<Position>,
    club: ClubFilter,
    cap: SampleCap,
    export: Option<PathBuf>,
    json: bool,
}

impl Args {
    fn parse() -> Result<Args> {
        let mut out = Args {
            metric: "Goals".to_string(),
            group: GroupBy::Position,
            mode: Normalization::None,
            min_apps: Some(10),
            positions: Position::ALL.into_iter().collect(),
            club: ClubFilter::All,
            cap: SampleCap::All,
            export: None,
            json: false,
        };

        for arg in std::env::args().skip(1) {
            if let Some(v) = arg.strip_prefix("--metric=") {
                out.metric = v.to_string();
            } else if let Some(v) = arg.strip_prefix("--group=") {
                out.group = match v {
                    "position" => GroupBy::Position,
                    "age-group" => GroupBy::AgeBracket,
                    "club" => GroupBy::Club,
                    "age" => GroupBy::Age,
                    other => return Err(anyhow!("unknown group dimension: {other}")),
                };
            } else if let Some(v) = arg.strip_prefix("--mode=") {
                out.mode = match v {
                    "raw" => Normalization::None,
                    "per-appearance" => Normalization::PerAppearance,
                    "per-90" => Normalization::Per90,
                    other => return Err(anyhow!("unknown normalization mode: {other}")),
                };
            } else if let Some(v) = arg.strip_prefix("--min-apps=") {
                out.min_apps = Some(v.parse()?);
            } else if let Some(v) = arg.strip_prefix("--club=") {
                out.club = if v == "All" {
                    ClubFilter::All
                } else {
                    ClubFilter::Only(v.to_string())
                };
            } else if let Some(v) = arg.strip_prefix("--cap=") {
                out.cap = if v == "all" {
                    SampleCap::All
                } else {
                    SampleCap::Top(v.parse()?)
                };
            } else if let Some(v) = arg.strip_prefix("--positions=") {
                let mut set = HashSet::new();
                for part in v.split(',') {
                    let Some(position) = Position::parse(part) else {
                        return Err(anyhow!("unknown position: {part}"));
                    };
                    set.insert(position);
                }
                out.positions = set;
            } else if let Some(v) = arg.strip_prefix("--export=") {
                out.export = Some(PathBuf::from(v));
            } else if arg == "--json" {
                out.json = true;
            } else {
                return Err(anyhow!("unknown argument: {arg}"));
            }
        }

        Ok(out)
    }

    fn view_config(&self) -> ViewConfig {
        ViewConfig {
            metric: self.metric.clone(),
            mode: self.mode,
            min_appearances: self.min_apps,
            positions: self.positions.clone(),
            club: self.club.clone(),
            group_by: self.group,
            sample_cap: self.cap,
            top_members: 5,
        }
    }
}
