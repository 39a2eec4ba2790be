//! CSV export of the filtered variance table.
//!
//! Commas inside descriptions are replaced with semicolons so the column layout survives
//! naive consumers. Anything else that would break a record (quotes, line breaks) is
//! quoted by the writer.

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::variance::DerivedRow;

pub const EXPORT_FILE_NAME: &str = "variance_export.csv";
pub const EXPORT_MIME_TYPE: &str = "text/csv;charset=utf-8;";

pub const EXPORT_HEADER: [&str; 11] = [
    "entity",
    "gl",
    "description",
    "prior",
    "current",
    "absVariance",
    "pctVariance",
    "thresholdPct",
    "status",
    "owner",
    "lastUpdated",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer could not be flushed: {0}")]
    Flush(String),
    #[error("could not write export file `{path}`: {source}")]
    WriteFile { path: PathBuf, source: std::io::Error },
}

pub fn to_csv(rows: &[DerivedRow<'_>]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for item in rows {
        writer.write_record(record(item))?;
    }

    let buffer = writer.into_inner().map_err(|error| ExportError::Flush(error.to_string()))?;
    let mut text =
        String::from_utf8(buffer).map_err(|error| ExportError::Flush(error.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

pub fn write_csv_file(path: &Path, rows: &[DerivedRow<'_>]) -> Result<usize, ExportError> {
    let text = to_csv(rows)?;
    fs::write(path, &text)
        .map_err(|source| ExportError::WriteFile { path: path.to_path_buf(), source })?;
    Ok(rows.len())
}

pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}%")
}

fn record(item: &DerivedRow<'_>) -> [String; 11] {
    let row = item.row;
    [
        row.entity.clone(),
        row.gl.clone(),
        row.description.replace(',', ";"),
        row.prior.normalize().to_string(),
        row.current.normalize().to_string(),
        item.absolute_variance().normalize().to_string(),
        format_percent(item.percent_variance()),
        row.threshold_pct.normalize().to_string(),
        row.status.as_str().to_string(),
        row.owner.clone(),
        row.last_updated.to_string(),
    ]
}
