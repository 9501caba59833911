use crate::mapping::{auto_detect, ColumnMapping, MappingOverride};
use crate::metrics::{aggregate, derive_campaign};
use crate::parser::parse_csv_text;
use crate::types::{CampaignFields, Dataset, Field, RawRow};
use crate::util::{parse_count, parse_money, parse_percent, parse_plain};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

pub const IMPORTED_PERIOD: &str = "CSV importado";

/// Data rows kept on the load report for a quick look at the mapping.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub headers: Vec<String>,
    pub preview: Vec<RawRow>,
    pub mapping: ColumnMapping,
    pub missing_required: Vec<Field>,
}

/// Normalize one row through the mapping.
pub fn read_fields(row: &[String], mapping: &ColumnMapping) -> CampaignFields {
    let cell = |f: Field| mapping.read(row, f);
    CampaignFields {
        name: cell(Field::CampaignName).map(str::to_string),
        spend: parse_money(cell(Field::AmountSpent)),
        cpc: parse_money(cell(Field::CpcAll)),
        ctr: parse_percent(cell(Field::CtrLink)),
        lpv: parse_count(cell(Field::LandingPageViews)),
        freq: parse_plain(cell(Field::Frequency)),
        cpm: parse_money(cell(Field::Cpm)),
        impressions: parse_count(cell(Field::Impressions)),
        reach: parse_count(cell(Field::Reach)),
        link_clicks: parse_count(cell(Field::LinkClicks)),
    }
}

/// Client label from an upload name: the first `.csv` is dropped.
pub fn client_name_from(filename: &str) -> String {
    filename.replacen(".csv", "", 1)
}

pub fn build_dataset(rows: &[RawRow], mapping: &ColumnMapping, filename: &str) -> Dataset {
    let campaigns: Vec<_> = rows
        .iter()
        .map(|row| derive_campaign(read_fields(row, mapping)))
        .collect();
    let metrics = aggregate(&campaigns);
    Dataset {
        client_name: client_name_from(filename),
        period: IMPORTED_PERIOD.to_string(),
        metrics,
        campaigns,
    }
}

/// Whole in-memory pipeline: parse, auto-detect, apply overrides, derive.
pub fn transform(text: &str, overrides: &[MappingOverride], filename: &str) -> (Dataset, LoadReport) {
    let table = parse_csv_text(text);
    let mut mapping = auto_detect(&table.headers);
    mapping.apply(overrides);

    let missing_required: Vec<Field> = Field::ALL
        .iter()
        .copied()
        .filter(|f| f.required() && mapping.get(*f).is_none())
        .collect();

    let dataset = build_dataset(&table.rows, &mapping, filename);
    let report = LoadReport {
        total_rows: table.rows.len(),
        preview: table.rows.iter().take(PREVIEW_ROWS).cloned().collect(),
        headers: table.headers,
        mapping,
        missing_required,
    };
    (dataset, report)
}

pub fn load_file(path: &Path, overrides: &[MappingOverride], client: Option<&str>) -> Result<(Dataset, LoadReport)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    // Ads Manager exports often start with a UTF-8 BOM.
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let filename = match client {
        Some(c) => c.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let (dataset, report) = transform(text, overrides, &filename);
    info!(
        path = %path.display(),
        rows = report.total_rows,
        campaigns = dataset.campaigns.len(),
        "loaded export"
    );
    for field in Field::ALL {
        if let Some(idx) = report.mapping.get(field) {
            debug!(field = field.key(), column = idx, "mapped");
        }
    }
    let unmapped: Vec<&str> = report.mapping.unmapped().iter().map(|f| f.key()).collect();
    if !unmapped.is_empty() {
        info!(fields = %unmapped.join(", "), "columns not mapped");
    }
    for field in &report.missing_required {
        warn!(field = field.key(), "required column not found; values will be defaulted");
    }
    if report.headers.is_empty() {
        warn!(path = %path.display(), "export has no data rows");
    }
    Ok((dataset, report))
}
