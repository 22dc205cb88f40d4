//! CSV persistence of the reconciled tables.
//!
//! Missing values are written as empty cells. Non-finite variations are
//! written as `NaN`, `inf`, or `-inf`, which [`parse_value`] reads back,
//! so an undefined variation never turns into a zero.

use std::path::Path;

use delitos_crime_models::{
    CrimeKey, CrimeWideRow, KEY_COLUMNS, Quarter, QuarterObservation, ReportYears,
};
use delitos_source::SourceError;

use crate::ReconcileError;

/// Renders a value for output.
#[must_use]
pub fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Reads a value written by [`format_value`]. Blank cells are `None`.
#[must_use]
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse().ok()
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, ReconcileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(csv::Writer::from_path(path)?)
}

fn key_fields(key: &CrimeKey) -> [String; 4] {
    [
        key.comunidad.clone(),
        key.provincia_str().to_string(),
        key.municipio_str().to_string(),
        key.tipo_delito.clone(),
    ]
}

/// Writes the long table.
///
/// # Errors
///
/// Returns [`ReconcileError`] if the file cannot be created or written.
pub fn write_long(
    path: &Path,
    rows: &[QuarterObservation],
    years: ReportYears,
) -> Result<(), ReconcileError> {
    let mut writer = writer(path)?;
    writer.write_record(years.long_headers())?;

    for row in rows {
        let mut record: Vec<String> = key_fields(&row.key).into();
        record.push(row.quarter.label().to_string());
        record.push(format_value(Some(row.current)));
        record.push(format_value(Some(row.prior)));
        record.push(format_value(Some(row.variation)));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    log::debug!("Wrote {} long rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes the wide table with the dashboard's column layout.
///
/// # Errors
///
/// Returns [`ReconcileError`] if the file cannot be created or written.
pub fn write_wide(
    path: &Path,
    rows: &[CrimeWideRow],
    years: ReportYears,
) -> Result<(), ReconcileError> {
    let mut writer = writer(path)?;
    writer.write_record(years.wide_headers())?;

    for row in rows {
        let mut record: Vec<String> = key_fields(&row.key).into();
        record.extend(row.current.iter().map(|v| format_value(*v)));
        record.extend(row.prior.iter().map(|v| format_value(*v)));
        record.extend(row.variation.iter().map(|v| format_value(*v)));
        record.push(format_value(Some(row.total_current)));
        record.push(format_value(Some(row.total_prior)));
        record.push(format_value(Some(row.total_variation)));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    log::debug!("Wrote {} wide rows to {}", rows.len(), path.display());
    Ok(())
}

/// Reads a wide table written by [`write_wide`]. Columns are located by
/// name, so extra columns and reordering are tolerated.
///
/// # Errors
///
/// Returns [`SourceError::MissingSourceFile`] if the file does not exist
/// and [`SourceError::MissingColumn`] if a wide column is absent.
pub fn read_wide(path: &Path, years: ReportYears) -> Result<Vec<CrimeWideRow>, ReconcileError> {
    if !path.exists() {
        return Err(SourceError::MissingSourceFile {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let positions = years
        .wide_headers()
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name.as_str())
                .ok_or_else(|| SourceError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |i: usize| record.get(positions[i]).unwrap_or("");
        let value = |i: usize| parse_value(field(i));
        let quarters = |offset: usize| Quarter::ALL.map(|q| value(offset + q.index()));

        let totals = KEY_COLUMNS.len() + 3 * Quarter::ALL.len();
        rows.push(CrimeWideRow {
            key: CrimeKey::new(field(0), Some(field(1)), Some(field(2)), field(3)),
            current: quarters(KEY_COLUMNS.len()),
            prior: quarters(KEY_COLUMNS.len() + Quarter::ALL.len()),
            variation: quarters(KEY_COLUMNS.len() + 2 * Quarter::ALL.len()),
            total_current: value(totals).unwrap_or(0.0),
            total_prior: value(totals + 1).unwrap_or(0.0),
            total_variation: value(totals + 2).unwrap_or(f64::NAN),
        });
    }

    log::debug!("Read {} wide rows from {}", rows.len(), path.display());
    Ok(rows)
}
