//! Scraper hand-off manifest.
//!
//! The income scraper enumerates the provinces offered by the portal and
//! downloads one table per province. When it finishes it writes a
//! `manifest.json` next to the downloads so the loader can tell a
//! complete scrape from one that silently lost provinces.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SourceError;

/// Default manifest file name inside the data directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Suffix the scraper appends to every income file name.
pub const INCOME_FILE_SUFFIX: &str = "_datos_rentas.xlsx";

/// What the scraper saw and what it saved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrapeManifest {
    /// When the scrape finished.
    #[serde(default)]
    pub scraped_at: Option<DateTime<Utc>>,
    /// Province names listed by the portal, as displayed.
    pub provinces_listed: Vec<String>,
    /// File names written, one per province.
    pub income_files: Vec<String>,
}

impl ScrapeManifest {
    /// Checks that every listed province was downloaded.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::KeyMisalignment`] when the counts differ or a
    /// listed province has no file.
    pub fn validate(&self) -> Result<(), SourceError> {
        let missing: Vec<String> = self
            .provinces_listed
            .iter()
            .filter(|p| !self.income_files.contains(&expected_file_name(p)))
            .cloned()
            .collect();

        if self.provinces_listed.len() != self.income_files.len() || !missing.is_empty() {
            return Err(SourceError::KeyMisalignment {
                expected: self.provinces_listed.len(),
                actual: self.income_files.len(),
                missing,
            });
        }

        log::debug!(
            "Manifest lists {} provinces, all downloaded",
            self.provinces_listed.len()
        );

        Ok(())
    }
}

/// File name the scraper uses for a province (`"Balears, Illes"` →
/// `"balears illes_datos_rentas.xlsx"`).
#[must_use]
pub fn expected_file_name(province: &str) -> String {
    let stem = province.replace('/', "_").replace(',', "").to_lowercase();
    format!("{stem}{INCOME_FILE_SUFFIX}")
}

/// Reads a manifest if one exists.
///
/// # Errors
///
/// Returns [`SourceError`] if the file exists but cannot be read or
/// parsed.
pub fn read_manifest(path: &Path) -> Result<Option<ScrapeManifest>, SourceError> {
    if !path.exists() {
        log::debug!("No scrape manifest at {}", path.display());
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)?;
    let manifest: ScrapeManifest = serde_json::from_str(&contents)?;

    if let Some(at) = manifest.scraped_at {
        log::info!("Scrape manifest from {at}");
    }

    Ok(Some(manifest))
}
