use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, Trim};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::record::{PlayerRecord, RawRow, RawValue, ValidityRule, normalize_rows};
use crate::sample_feed;

/// Where the season CSV comes from. Resolved once from the environment;
/// with nothing configured the synthetic sample feed stands in so the
/// pipeline still runs offline.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Path(PathBuf),
    Url(String),
    Sample,
}

impl DatasetSource {
    pub fn from_env() -> Self {
        match std::env::var("PLSTATS_DATASET") {
            Ok(raw) if raw.starts_with("http://") || raw.starts_with("https://") => {
                DatasetSource::Url(raw)
            }
            Ok(raw) if !raw.trim().is_empty() => DatasetSource::Path(PathBuf::from(raw)),
            _ => DatasetSource::Sample,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Path(p) => p.display().to_string(),
            DatasetSource::Url(u) => u.clone(),
            DatasetSource::Sample => "synthetic sample feed".to_string(),
        }
    }
}

/// Outcome of one raw load. Per-row parse problems are collected here as
/// strings and never abort the load; only an unreachable/unreadable source
/// is an error.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub source: String,
    pub rows_total: usize,
    pub rows_kept: usize,
    pub columns: Vec<String>,
    pub errors: Vec<String>,
}

/// The one immutable in-memory dataset per process. Raw rows are kept so
/// views with stricter validity rules can re-normalize without refetching.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub raw: Vec<RawRow>,
    pub records: Vec<PlayerRecord>,
    pub summary: LoadSummary,
}

/// Parse CSV text into raw rows with scalar type inference: cells that
/// parse as finite numbers become `Number`, everything else stays `Text`,
/// empty cells are absent. Percentage strings are left for the normalizer.
pub fn parse_csv_rows(text: &str) -> Result<(Vec<RawRow>, LoadSummary)> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .context("failed reading csv headers")?
        .clone();

    let mut summary = LoadSummary {
        columns: headers.iter().map(|h| h.to_string()).collect(),
        ..LoadSummary::default()
    };

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        summary.rows_total += 1;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                summary.errors.push(format!("row {}: {err}", idx + 1));
                continue;
            }
        };

        let mut row = RawRow::new();
        for (column, cell) in headers.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            let value = match cell.parse::<f64>() {
                Ok(v) if v.is_finite() => RawValue::Number(v),
                _ => RawValue::Text(cell.to_string()),
            };
            row.insert(column.to_string(), value);
        }
        if row.is_empty() {
            continue;
        }
        summary.rows_kept += 1;
        rows.push(row);
    }

    Ok((rows, summary))
}

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

pub fn fetch_dataset_text(url: &str) -> Result<String> {
    let resp = http_client()?
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}: {body}"));
    }
    Ok(body)
}

pub fn load_raw_rows(source: &DatasetSource) -> Result<(Vec<RawRow>, LoadSummary)> {
    let (rows, mut summary) = match source {
        DatasetSource::Path(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed reading dataset at {}", path.display()))?;
            parse_csv_rows(&text)?
        }
        DatasetSource::Url(url) => {
            let text =
                fetch_dataset_text(url).with_context(|| format!("failed fetching {url}"))?;
            parse_csv_rows(&text)?
        }
        DatasetSource::Sample => {
            let rows = sample_feed::sample_rows(sample_feed::default_size(), sample_feed::default_seed());
            let summary = LoadSummary {
                rows_total: rows.len(),
                rows_kept: rows.len(),
                ..LoadSummary::default()
            };
            (rows, summary)
        }
    };
    summary.source = source.describe();
    Ok((rows, summary))
}

pub fn load_dataset(source: &DatasetSource) -> Result<Dataset> {
    let (raw, summary) = load_raw_rows(source)?;
    let records = normalize_rows(&raw, &ValidityRule::identity());
    Ok(Dataset {
        raw,
        records,
        summary,
    })
}

pub fn load_dataset_from_path(path: &Path) -> Result<Dataset> {
    load_dataset(&DatasetSource::Path(path.to_path_buf()))
}

/// Shared, lazily initialized dataset: the first caller triggers the load,
/// everyone after reuses the cached immutable result. A failed load leaves
/// the pipeline uninitialized (`None`) — no retry.
pub fn shared() -> Option<&'static Dataset> {
    static DATASET: OnceLock<Option<Dataset>> = OnceLock::new();
    DATASET
        .get_or_init(|| load_dataset(&DatasetSource::from_env()).ok())
        .as_ref()
}
