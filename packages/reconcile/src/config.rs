//! Pipeline configuration.
//!
//! The default configuration is `pipeline.toml`, embedded at compile time
//! via [`include_str!`]. A different file may be passed on the command
//! line. The data directory can be overridden with the
//! `DELITOS_DATA_DIR` environment variable or a CLI flag.

use std::path::{Path, PathBuf};

use delitos_crime_models::{Quarter, ReportYears};
use delitos_source::parsing::NumberFormat;
use serde::{Deserialize, Serialize};

use crate::ReconcileError;

/// The embedded default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../pipeline.toml");

/// Environment variable that overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "DELITOS_DATA_DIR";

/// One cumulative crime export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterSource {
    /// Period label as it appears in the export's headers
    /// (`"Enero-junio"`).
    pub period: String,
    /// File name inside the data directory.
    pub file: String,
}

/// Crime stage inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeConfig {
    /// The four cumulative exports in calendar order.
    pub quarters: Vec<QuarterSource>,
    /// Long table file name.
    pub long_output: String,
    /// Wide table file name.
    pub wide_output: String,
}

/// Income stage inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeConfig {
    /// Per-province income files. Missing ones are skipped.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding every input and output file.
    pub data_dir: PathBuf,
    /// Scraper manifest file name, if validation is wanted.
    #[serde(default)]
    pub manifest: Option<String>,
    /// Report and comparison years.
    #[serde(default)]
    pub years: ReportYears,
    /// Separators for text-encoded numbers.
    #[serde(default)]
    pub number_format: NumberFormat,
    /// Crime stage.
    pub crime: CrimeConfig,
    /// Income stage.
    #[serde(default)]
    pub income: IncomeConfig,
}

impl PipelineConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self, ReconcileError> {
        toml::from_str(toml_str).map_err(|e| ReconcileError::Config {
            message: e.to_string(),
        })
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Config`] if the embedded file is invalid.
    pub fn embedded() -> Result<Self, ReconcileError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Loads `path`, or the embedded default when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ReconcileError> {
        match path {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                let contents = std::fs::read_to_string(path)?;
                Self::from_toml(&contents)
            }
            None => Self::embedded(),
        }
    }

    /// Applies the `DELITOS_DATA_DIR` override, if set.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        let dir = std::env::var(DATA_DIR_ENV)
            .ok()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from);
        self.with_data_dir(dir)
    }

    /// Replaces the data directory when `dir` is given.
    #[must_use]
    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.data_dir = dir;
        }
        self
    }

    /// The four crime exports paired with their quarters.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Config`] unless exactly four exports are
    /// configured.
    pub fn quarter_sources(&self) -> Result<[(Quarter, &QuarterSource); 4], ReconcileError> {
        let [q1, q2, q3, q4] = self.crime.quarters.as_slice() else {
            return Err(ReconcileError::Config {
                message: format!(
                    "expected 4 crime quarters, found {}",
                    self.crime.quarters.len()
                ),
            });
        };

        Ok([
            (Quarter::EneroMarzo, q1),
            (Quarter::AbrilJunio, q2),
            (Quarter::JulioSeptiembre, q3),
            (Quarter::OctubreDiciembre, q4),
        ])
    }

    /// Where the long table is written.
    #[must_use]
    pub fn long_output_path(&self) -> PathBuf {
        self.data_dir.join(&self.crime.long_output)
    }

    /// Where the wide table is written.
    #[must_use]
    pub fn wide_output_path(&self) -> PathBuf {
        self.data_dir.join(&self.crime.wide_output)
    }

    /// Full paths of the configured income files.
    #[must_use]
    pub fn income_paths(&self) -> Vec<PathBuf> {
        self.income
            .files
            .iter()
            .map(|f| self.data_dir.join(f))
            .collect()
    }

    /// Full path of the scraper manifest, if configured.
    #[must_use]
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.manifest.as_ref().map(|m| self.data_dir.join(m))
    }
}
