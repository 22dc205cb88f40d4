//! Loader for the per-province municipal income tables.
//!
//! Each file lists one municipality per row, labelled `"28001 Madrid"`
//! style, followed by income indicators for both report years. Rows are
//! tagged with the five-digit code from the label and the region derived
//! from its two-digit prefix. Rows whose label has no code are dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use delitos_geography_models::postal::{postal_code, region_for_code};
use serde::{Deserialize, Serialize};

use crate::SourceError;
use crate::parsing::NumberFormat;
use crate::progress::ProgressCallback;
use crate::spreadsheet::{RawTable, cell_at, read_table};

/// Header of the municipality label column.
pub const LABEL_COLUMN: &str = "Municipios";

/// Income indicators published per municipality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncomeIndicator {
    /// Net mean income per person.
    NetPerPerson,
    /// Net mean income per household.
    NetPerHousehold,
    /// Mean income per consumption unit.
    MeanPerConsumptionUnit,
    /// Median income per consumption unit.
    MedianPerConsumptionUnit,
    /// Gross mean income per person.
    GrossPerPerson,
    /// Gross mean income per household.
    GrossPerHousehold,
}

impl IncomeIndicator {
    /// All indicators in publication order.
    pub const ALL: [Self; 6] = [
        Self::NetPerPerson,
        Self::NetPerHousehold,
        Self::MeanPerConsumptionUnit,
        Self::MedianPerConsumptionUnit,
        Self::GrossPerPerson,
        Self::GrossPerHousehold,
    ];

    /// Column label without the year.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NetPerPerson => "Renta neta media por persona",
            Self::NetPerHousehold => "Renta neta media por hogar",
            Self::MeanPerConsumptionUnit => "Media de la renta por unidad de consumo",
            Self::MedianPerConsumptionUnit => "Mediana de la renta por unidad de consumo",
            Self::GrossPerPerson => "Renta bruta media por persona",
            Self::GrossPerHousehold => "Renta bruta media por hogar",
        }
    }

    /// Column header for `year` (`"Renta neta media por persona 2023"`).
    #[must_use]
    pub fn column(self, year: u16) -> String {
        format!("{} {year}", self.label())
    }
}

/// Whether a header names an income metric rather than an index or
/// label column.
#[must_use]
pub fn is_metric_column(header: &str) -> bool {
    ["Renta", "Media", "Mediana"]
        .iter()
        .any(|word| header.contains(word))
}

/// One municipality of an income table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRow {
    /// Label as published (`"28001 Madrid"`).
    pub municipality: String,
    /// Leading five digits of the label.
    pub codigo_postal: String,
    /// Region for the code prefix, when the prefix is known.
    pub comunidad_autonoma: Option<String>,
    /// Metric header → value. Unparseable values are `None`.
    pub metrics: BTreeMap<String, Option<f64>>,
    /// File the row was read from.
    pub source_file: PathBuf,
}

impl IncomeRow {
    /// Value of a metric column, `None` if absent or missing.
    #[must_use]
    pub fn metric(&self, column: &str) -> Option<f64> {
        self.metrics.get(column).copied().flatten()
    }
}

/// Converts one income table into rows.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if the table has no
/// `Municipios` column.
pub fn parse_income_table(
    table: &RawTable,
    format: NumberFormat,
) -> Result<Vec<IncomeRow>, SourceError> {
    let label_index = table.require_column(LABEL_COLUMN)?;
    let metric_columns: Vec<(usize, &str)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != label_index && is_metric_column(h))
        .map(|(i, h)| (i, h.as_str()))
        .collect();

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut dropped = 0_usize;

    for row in &table.rows {
        let label = cell_at(row, label_index).text().unwrap_or_default();
        let Some(code) = postal_code(&label) else {
            dropped += 1;
            continue;
        };

        let metrics = metric_columns
            .iter()
            .map(|(i, header)| ((*header).to_string(), format.coerce(cell_at(row, *i))))
            .collect();

        rows.push(IncomeRow {
            codigo_postal: code.to_string(),
            comunidad_autonoma: region_for_code(code).map(ToString::to_string),
            municipality: label,
            metrics,
            source_file: table.path.clone(),
        });
    }

    if dropped > 0 {
        log::debug!(
            "{}: dropped {dropped} rows without a postal code",
            table.path.display()
        );
    }

    Ok(rows)
}

/// Reads one income file.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or lacks the label
/// column.
pub fn load_income_file(path: &Path, format: NumberFormat) -> Result<Vec<IncomeRow>, SourceError> {
    let table = read_table(path)?;
    parse_income_table(&table, format)
}

/// Loads every available income file and concatenates the rows in file
/// order. Missing files are skipped with a warning.
///
/// # Errors
///
/// Returns [`SourceError::EmptyResultSet`] if no file could be loaded, or
/// the first read error of a file that exists but cannot be parsed.
pub fn load_income_files(
    paths: &[PathBuf],
    format: NumberFormat,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<IncomeRow>, SourceError> {
    progress.set_total(paths.len() as u64);

    let mut rows = Vec::new();
    let mut loaded = 0_usize;

    for path in paths {
        progress.set_message(path.display().to_string());

        match load_income_file(path, format) {
            Ok(file_rows) => {
                log::debug!("{}: {} municipalities", path.display(), file_rows.len());
                rows.extend(file_rows);
                loaded += 1;
            }
            Err(SourceError::MissingSourceFile { path }) => {
                log::warn!("Income file not found, skipping: {}", path.display());
            }
            Err(e) => return Err(e),
        }

        progress.inc(1);
    }

    if loaded == 0 {
        return Err(SourceError::EmptyResultSet);
    }

    log::info!(
        "Loaded {} municipalities from {loaded}/{} income files",
        rows.len(),
        paths.len()
    );
    progress.finish(format!("{loaded} income files loaded"));

    Ok(rows)
}
