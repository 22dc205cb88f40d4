#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reconciliation of the four cumulative crime exports into the long and
//! wide tables the dashboard reads.
//!
//! The stages run in order, each consuming the previous stage's complete
//! output:
//!
//! 1. [`normalize`] canonical community, province, and municipality names
//!    for every quarter's observations.
//! 2. [`difference`] aligns the quarters over the union of their keys and
//!    turns cumulative figures into per-quarter deltas.
//! 3. [`reshape`] pivots the deltas into one row per key with annual
//!    totals.
//! 4. Single-province communities get their province backfilled on both
//!    tables, which are then written by [`output`].
//!
//! Income tables are loaded independently by [`run_income`].

pub mod config;
pub mod difference;
pub mod normalize;
pub mod output;
pub mod reshape;
pub mod views;

use std::sync::Arc;

use delitos_crime_models::{CrimeObservation, CrimeWideRow, Quarter, QuarterObservation};
use delitos_source::SourceError;
use delitos_source::income::{IncomeRow, load_income_files};
use delitos_source::manifest::read_manifest;
use delitos_source::progress::ProgressCallback;
use delitos_source::raw_table::load_export;

use crate::config::PipelineConfig;

/// Errors that can occur while reconciling the crime tables.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Reading a source spreadsheet failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The pipeline configuration is invalid.
    #[error("Invalid configuration: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },

    /// A quarter's export produced no observations.
    #[error("No observations for {quarter}")]
    EmptyQuarter {
        /// The empty quarter.
        quarter: Quarter,
    },

    /// The same key appears twice where it must be unique.
    #[error("Duplicate key {key} in {quarter}")]
    DuplicateKey {
        /// Rendered key.
        key: String,
        /// Quarter in which the duplicate was found.
        quarter: Quarter,
    },

    /// A map period is neither a quarter label nor `Total`.
    #[error("Unknown period {period:?}")]
    UnknownPeriod {
        /// The rejected input.
        period: String,
    },
}

/// The two reconciled crime tables.
#[derive(Debug, Clone, PartialEq)]
pub struct CrimeTables {
    /// One row per key and quarter, quarter-major.
    pub long: Vec<QuarterObservation>,
    /// One row per key.
    pub wide: Vec<CrimeWideRow>,
}

/// Reconciles four cumulative exports, given in calendar order.
///
/// # Errors
///
/// Returns [`ReconcileError::EmptyQuarter`] if any export is empty and
/// [`ReconcileError::DuplicateKey`] if a key repeats within a quarter.
pub fn reconcile(quarters: [Vec<CrimeObservation>; 4]) -> Result<CrimeTables, ReconcileError> {
    let normalized = quarters.map(normalize::normalize_observations);

    let mut long = difference::difference(&normalized)?;
    let mut wide = reshape::pivot(&long)?;

    let long_filled = normalize::backfill_long(&mut long);
    let wide_filled = normalize::backfill_wide(&mut wide);
    log::debug!("Backfilled province on {long_filled} long rows and {wide_filled} wide rows");

    Ok(CrimeTables { long, wide })
}

/// Runs the crime pipeline end to end: reads the four exports named in
/// `config`, reconciles them, and writes the long and wide tables.
///
/// # Errors
///
/// Returns [`ReconcileError`] if any export is missing or malformed, if
/// reconciliation fails, or if the output cannot be written.
pub fn run_crime_pipeline(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<CrimeTables, ReconcileError> {
    let sources = config.quarter_sources()?;
    progress.set_total(sources.len() as u64 + 2);

    let mut loaded: [Vec<CrimeObservation>; 4] = Default::default();
    for (quarter, source) in sources {
        let path = config.data_dir.join(&source.file);
        progress.set_message(format!("Reading {}", source.period));
        log::info!("Reading {} export from {}", source.period, path.display());

        let observations = load_export(
            &path,
            &source.period,
            config.years,
            config.number_format,
        )?;
        log::info!("{}: {} observations", source.period, observations.len());

        loaded[quarter.index()] = observations;
        progress.inc(1);
    }

    progress.set_message("Reconciling quarters".to_string());
    let tables = reconcile(loaded)?;
    log::info!(
        "Reconciled {} keys into {} long rows",
        tables.wide.len(),
        tables.long.len()
    );
    progress.inc(1);

    progress.set_message("Writing tables".to_string());
    let long_path = config.long_output_path();
    let wide_path = config.wide_output_path();
    output::write_long(&long_path, &tables.long, config.years)?;
    output::write_wide(&wide_path, &tables.wide, config.years)?;
    log::info!(
        "Wrote {} and {}",
        long_path.display(),
        wide_path.display()
    );
    progress.inc(1);

    progress.finish(format!("{} crime keys reconciled", tables.wide.len()));

    Ok(tables)
}

/// Loads every configured income table after checking the scraper's
/// manifest, if one is present.
///
/// # Errors
///
/// Returns [`SourceError::KeyMisalignment`] if the manifest shows lost
/// provinces and [`SourceError::EmptyResultSet`] if no file loads.
pub fn run_income(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<IncomeRow>, ReconcileError> {
    if let Some(path) = config.manifest_path()
        && let Some(manifest) = read_manifest(&path)?
    {
        manifest.validate()?;
    }

    Ok(load_income_files(
        &config.income_paths(),
        config.number_format,
        progress,
    )?)
}
