//! Hierarchy recovery for the ministry's cumulative crime exports.
//!
//! An export is a single label column followed by the period's
//! current-year and prior-year figures and a variation column. The
//! community → province → municipality hierarchy is not stored in any
//! column; it is implied by the order of header-like rows. Each label is
//! classified into a [`RowKind`] and a [`HierarchyContext`] is folded over
//! the rows so every data row picks up the most recent ancestors.

use std::path::Path;
use std::str::FromStr as _;

use delitos_crime_models::{CrimeKey, CrimeObservation, ReportYears, ReservedCategory};

use crate::SourceError;
use crate::parsing::NumberFormat;
use crate::spreadsheet::{RawTable, cell_at, read_table};

/// Label prefix of a province header row.
const PROVINCE_PREFIX: &str = "Provincia de";

/// Label prefixes of a municipality header row. `Municipo` is a misspelling
/// that appears in the published exports.
const MUNICIPALITY_PREFIXES: &[&str] = &[
    "Municipio de",
    "Municipo de",
    "-Municipio de",
    "-Municipo de",
    "Isla de",
    "CIUDAD AUTÓNOMA",
];

/// What a label row represents.
///
/// Classification is ordered: community, then province, then
/// municipality, and anything else is a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind<'a> {
    /// Starts a new community and clears province and municipality.
    Community(&'a str),
    /// Starts a new province and clears the municipality.
    Province(&'a str),
    /// Starts a new municipality. A leading `-` is already stripped.
    Municipality(&'a str),
    /// A crime-type row carrying figures.
    Data(&'a str),
}

impl<'a> RowKind<'a> {
    /// Classifies a trimmed label.
    #[must_use]
    pub fn classify(label: &'a str) -> Self {
        if is_upper_case(label) && ReservedCategory::from_str(label).is_err() {
            Self::Community(label)
        } else if label.starts_with(PROVINCE_PREFIX) {
            Self::Province(label)
        } else if MUNICIPALITY_PREFIXES.iter().any(|p| label.starts_with(p)) {
            Self::Municipality(label.trim_start_matches('-'))
        } else {
            Self::Data(label)
        }
    }
}

/// Whether `label` contains letters and none of them are lower case.
fn is_upper_case(label: &str) -> bool {
    label.chars().any(char::is_uppercase) && !label.chars().any(char::is_lowercase)
}

/// The ancestors in effect at a given row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyContext {
    /// Most recent community label.
    pub community: Option<String>,
    /// Most recent province label within the community.
    pub province: Option<String>,
    /// Most recent municipality label within the province.
    pub municipality: Option<String>,
}

impl HierarchyContext {
    /// Returns the context after a header row. Data rows leave the context
    /// unchanged.
    #[must_use]
    pub fn enter(self, kind: RowKind<'_>) -> Self {
        match kind {
            RowKind::Community(name) => Self {
                community: Some(name.to_string()),
                province: None,
                municipality: None,
            },
            RowKind::Province(name) => Self {
                province: Some(name.to_string()),
                municipality: None,
                ..self
            },
            RowKind::Municipality(name) => Self {
                municipality: Some(name.to_string()),
                ..self
            },
            RowKind::Data(_) => self,
        }
    }

    /// Key for a crime type observed under this context. Rows seen before
    /// any community header get an empty community.
    #[must_use]
    pub fn key(&self, crime_type: &str) -> CrimeKey {
        CrimeKey::new(
            self.community.as_deref().unwrap_or(""),
            self.province.as_deref(),
            self.municipality.as_deref(),
            crime_type,
        )
    }
}

/// Column positions of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportLayout {
    /// Free-text label column.
    pub label: usize,
    /// `"{period} {current}"`.
    pub current: usize,
    /// `"{period} {prior}"`.
    pub prior: usize,
    /// First column whose header starts with `Variación`.
    pub variation: usize,
}

impl ExportLayout {
    /// Resolves the columns of an export for `period`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingColumn`] if any figure column is absent.
    pub fn resolve(
        table: &RawTable,
        period: &str,
        years: ReportYears,
    ) -> Result<Self, SourceError> {
        let current = table.require_column(&ReportYears::export_column(period, years.current))?;
        let prior = table.require_column(&ReportYears::export_column(period, years.prior))?;
        let variation = table
            .column_where(|h| h.to_lowercase().starts_with("variación"))
            .ok_or_else(|| SourceError::MissingColumn {
                path: table.path.clone(),
                column: "Variación".to_string(),
            })?;

        Ok(Self {
            label: 0,
            current,
            prior,
            variation,
        })
    }
}

/// Recovers the hierarchy of one export and returns its data rows sorted
/// by key.
///
/// A data row is kept only when its prior-year cell is present. Figures
/// that fail to parse become `None`.
///
/// # Errors
///
/// Returns [`SourceError::EmptyTable`] if the table has no rows and
/// [`SourceError::MissingColumn`] if a figure column is absent.
pub fn parse_export(
    table: &RawTable,
    period: &str,
    years: ReportYears,
    format: NumberFormat,
) -> Result<Vec<CrimeObservation>, SourceError> {
    if table.rows.is_empty() {
        return Err(SourceError::EmptyTable {
            path: table.path.clone(),
        });
    }

    let layout = ExportLayout::resolve(table, period, years)?;

    let (_, mut observations) = table.rows.iter().fold(
        (HierarchyContext::default(), Vec::new()),
        |(context, mut observations), row| {
            let Some(label) = cell_at(row, layout.label).text() else {
                return (context, observations);
            };
            if label.is_empty() {
                return (context, observations);
            }

            match RowKind::classify(&label) {
                RowKind::Data(crime_type) => {
                    if cell_at(row, layout.prior).is_present() {
                        observations.push(CrimeObservation {
                            key: context.key(crime_type),
                            period: period.to_string(),
                            current: format.coerce(cell_at(row, layout.current)),
                            prior: format.coerce(cell_at(row, layout.prior)),
                            variation: format.coerce(cell_at(row, layout.variation)),
                        });
                    } else {
                        log::trace!("Skipping {label:?}: no {period} figures");
                    }
                    (context, observations)
                }
                kind => {
                    log::trace!("{kind:?}");
                    (context.enter(kind), observations)
                }
            }
        },
    );

    observations.sort_by(|a, b| a.key.cmp(&b.key));

    log::debug!(
        "{}: {} observations for {period}",
        table.path.display(),
        observations.len()
    );

    Ok(observations)
}

/// Reads and parses one export file.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or parsed.
pub fn load_export(
    path: &Path,
    period: &str,
    years: ReportYears,
    format: NumberFormat,
) -> Result<Vec<CrimeObservation>, SourceError> {
    let table = read_table(path)?;
    parse_export(&table, period, years, format)
}
