#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Readers for the raw spreadsheets produced by the scrapers.
//!
//! The crime exports from the interior ministry fold a
//! community → province → municipality hierarchy into a single indented
//! label column; [`raw_table`] recovers that hierarchy. The income
//! exports from the statistics institute are flat per-province tables;
//! [`income`] loads and tags them with a postal prefix region.

pub mod income;
pub mod manifest;
pub mod parsing;
pub mod progress;
pub mod raw_table;
pub mod spreadsheet;

use std::path::PathBuf;

/// Errors that can occur while reading source spreadsheets.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook parsing failed.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An expected input file does not exist.
    #[error("Missing source file: {}", path.display())]
    MissingSourceFile {
        /// The path that was expected.
        path: PathBuf,
    },

    /// The file has no readable worksheet or an extension we cannot read.
    #[error("Unsupported spreadsheet {}: {message}", path.display())]
    Unsupported {
        /// The offending file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// A column the parser depends on is not in the header row.
    #[error("{} has no column {column:?}", path.display())]
    MissingColumn {
        /// The file that was parsed.
        path: PathBuf,
        /// The header that was looked for.
        column: String,
    },

    /// The table has a header but no rows.
    #[error("{} contains no data rows", path.display())]
    EmptyTable {
        /// The empty file.
        path: PathBuf,
    },

    /// The scraper enumerated a different set of provinces than it
    /// downloaded.
    #[error(
        "Province count mismatch: expected {expected}, got {actual} (missing: {})",
        missing.join(", ")
    )]
    KeyMisalignment {
        /// Number of provinces the portal listed.
        expected: usize,
        /// Number of files actually downloaded.
        actual: usize,
        /// Listed provinces without a downloaded file.
        missing: Vec<String>,
    },

    /// None of the configured income files could be loaded.
    #[error("No income file could be loaded")]
    EmptyResultSet,
}
