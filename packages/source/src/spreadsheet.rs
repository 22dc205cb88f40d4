//! Uniform reader for workbook and CSV exports.
//!
//! Workbooks (`.xlsx`, `.xls`, `.xlsb`, `.ods`) are read with `calamine`
//! from their first worksheet; `.csv` files with the `csv` crate. Either
//! way the first row is the header and the rest become rows of [`Cell`]s.

use std::path::{Path, PathBuf};

use calamine::{Data, Reader as _, open_workbook_auto};

use crate::SourceError;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value.
    Empty,
    /// Text, untrimmed.
    Text(String),
    /// A numeric cell.
    Number(f64),
}

impl Cell {
    /// Builds a cell from text, treating whitespace-only input as empty.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(text.to_string())
        }
    }

    /// Whether the cell holds a value.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// The trimmed text of the cell, rendering numbers without a trailing
    /// `.0`. Empty cells yield `None`.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(text) => Some(text.trim().to_string()),
            Self::Number(value) => Some(value.to_string()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Empty,
            #[allow(clippy::cast_precision_loss)]
            Data::Int(i) => Self::Number(*i as f64),
            Data::Float(f) => Self::Number(*f),
            Data::String(s) => Self::from_text(s),
            other => Self::from_text(&other.to_string()),
        }
    }
}

/// An in-memory table: a header row plus data rows.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// File the table was read from, for error messages.
    pub path: PathBuf,
    /// Trimmed header labels.
    pub headers: Vec<String>,
    /// Data rows. Rows may be shorter than the header.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Position of the first header equal to `name`, ignoring case.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase() == wanted)
    }

    /// Position of the first header matching `predicate`.
    #[must_use]
    pub fn column_where(&self, predicate: impl Fn(&str) -> bool) -> Option<usize> {
        self.headers.iter().position(|h| predicate(h))
    }

    /// Like [`Self::column`] but fails with [`SourceError::MissingColumn`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingColumn`] if no header matches.
    pub fn require_column(&self, name: &str) -> Result<usize, SourceError> {
        self.column(name).ok_or_else(|| SourceError::MissingColumn {
            path: self.path.clone(),
            column: name.to_string(),
        })
    }
}

/// Returns the cell at `index`, or [`Cell::Empty`] past the end of a
/// short row.
#[must_use]
pub fn cell_at(row: &[Cell], index: usize) -> &Cell {
    const EMPTY: &Cell = &Cell::Empty;
    row.get(index).unwrap_or(EMPTY)
}

/// Reads a spreadsheet from disk, choosing the reader by file extension.
///
/// # Errors
///
/// Returns [`SourceError::MissingSourceFile`] if the path does not exist,
/// [`SourceError::Unsupported`] for unknown extensions or workbooks with
/// no worksheet, and the underlying reader error otherwise.
pub fn read_table(path: &Path) -> Result<RawTable, SourceError> {
    if !path.exists() {
        return Err(SourceError::MissingSourceFile {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(path)?,
        _ => {
            return Err(SourceError::Unsupported {
                path: path.to_path_buf(),
                message: format!("unknown extension {extension:?}"),
            });
        }
    };

    log::debug!(
        "Read {} rows x {} columns from {}",
        table.rows.len(),
        table.headers.len(),
        path.display()
    );

    Ok(table)
}

/// Reads the first worksheet of a workbook.
fn read_workbook(path: &Path) -> Result<RawTable, SourceError> {
    let mut workbook = open_workbook_auto(path)?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(SourceError::Unsupported {
            path: path.to_path_buf(),
            message: "workbook has no sheets".to_string(),
        });
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|cell| Cell::from(cell).text().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(Cell::from).collect::<Vec<_>>())
        .collect();

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

/// Reads a comma-separated file with a header row.
fn read_csv(path: &Path) -> Result<RawTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
        .collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}
