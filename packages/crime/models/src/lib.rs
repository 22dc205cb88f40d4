#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime observation, quarter, and wide-table types.
//!
//! This crate defines the shapes that flow through the reconciliation
//! pipeline: cumulative per-export observations, discrete per-quarter
//! observations (long form), and the one-row-per-key wide table consumed
//! by the dashboard. Column names are derived here so that every writer
//! and reader binds to the same literal strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Names of the four grouping columns, in output order.
pub const KEY_COLUMNS: [&str; 4] = ["Comunidad", "Provincia", "Municipio", "Tipo Delito"];

/// Label of the long table's quarter column.
pub const QUARTER_COLUMN: &str = "Trimestre";

/// One calendar quarter of the reporting year.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Quarter {
    /// January through March
    #[strum(serialize = "Enero-Marzo")]
    #[serde(rename = "Enero-Marzo")]
    EneroMarzo,
    /// April through June
    #[strum(serialize = "Abril-Junio")]
    #[serde(rename = "Abril-Junio")]
    AbrilJunio,
    /// July through September
    #[strum(serialize = "Julio-Septiembre")]
    #[serde(rename = "Julio-Septiembre")]
    JulioSeptiembre,
    /// October through December
    #[strum(serialize = "Octubre-Diciembre")]
    #[serde(rename = "Octubre-Diciembre")]
    OctubreDiciembre,
}

impl Quarter {
    /// All quarters in calendar order.
    pub const ALL: [Self; 4] = [
        Self::EneroMarzo,
        Self::AbrilJunio,
        Self::JulioSeptiembre,
        Self::OctubreDiciembre,
    ];

    /// Zero-based position within the year.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::EneroMarzo => 0,
            Self::AbrilJunio => 1,
            Self::JulioSeptiembre => 2,
            Self::OctubreDiciembre => 3,
        }
    }

    /// The quarter before this one, or `None` for the first quarter.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::EneroMarzo => None,
            Self::AbrilJunio => Some(Self::EneroMarzo),
            Self::JulioSeptiembre => Some(Self::AbrilJunio),
            Self::OctubreDiciembre => Some(Self::JulioSeptiembre),
        }
    }

    /// Display label used in column names (`"Enero-Marzo"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EneroMarzo => "Enero-Marzo",
            Self::AbrilJunio => "Abril-Junio",
            Self::JulioSeptiembre => "Julio-Septiembre",
            Self::OctubreDiciembre => "Octubre-Diciembre",
        }
    }

    /// Period label the ministry uses for the cumulative export that ends
    /// with this quarter (`"Enero-junio"` for the second quarter).
    #[must_use]
    pub const fn cumulative_period(self) -> &'static str {
        match self {
            Self::EneroMarzo => "Enero-marzo",
            Self::AbrilJunio => "Enero-junio",
            Self::JulioSeptiembre => "Enero-septiembre",
            Self::OctubreDiciembre => "Enero-diciembre",
        }
    }
}

/// The pair of years every export compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportYears {
    /// The reporting year (`Dato 2023`).
    pub current: u16,
    /// The comparison year (`Dato 2022`).
    pub prior: u16,
}

impl Default for ReportYears {
    fn default() -> Self {
        Self {
            current: 2023,
            prior: 2022,
        }
    }
}

impl ReportYears {
    /// `"Enero-Marzo2023"`.
    #[must_use]
    pub fn quarter_column(quarter: Quarter, year: u16) -> String {
        format!("{}{year}", quarter.label())
    }

    /// `"Enero-Marzo_VAR_2023_2022"`.
    #[must_use]
    pub fn quarter_variation_column(self, quarter: Quarter) -> String {
        format!("{}_VAR_{}_{}", quarter.label(), self.current, self.prior)
    }

    /// `"Total_2023"`.
    #[must_use]
    pub fn total_column(year: u16) -> String {
        format!("Total_{year}")
    }

    /// `"Variación_total_2023_2022"`.
    #[must_use]
    pub fn total_variation_column(self) -> String {
        format!("Variación_total_{}_{}", self.current, self.prior)
    }

    /// `"Dato 2023"`.
    #[must_use]
    pub fn long_value_column(year: u16) -> String {
        format!("Dato {year}")
    }

    /// `"Variación 2023/2022"`.
    #[must_use]
    pub fn long_variation_column(self) -> String {
        format!("Variación {}/{}", self.current, self.prior)
    }

    /// Header of a raw export's numeric column (`"Enero-junio 2023"`).
    #[must_use]
    pub fn export_column(period: &str, year: u16) -> String {
        format!("{period} {year}")
    }

    /// Full header row of the long table.
    #[must_use]
    pub fn long_headers(self) -> Vec<String> {
        let mut headers: Vec<String> = KEY_COLUMNS.iter().map(ToString::to_string).collect();
        headers.push(QUARTER_COLUMN.to_string());
        headers.push(Self::long_value_column(self.current));
        headers.push(Self::long_value_column(self.prior));
        headers.push(self.long_variation_column());
        headers
    }

    /// Full header row of the wide table, in the order the dashboard
    /// expects: keys, current-year quarters, prior-year quarters,
    /// variation quarters, then the annual columns.
    #[must_use]
    pub fn wide_headers(self) -> Vec<String> {
        let mut headers: Vec<String> = KEY_COLUMNS.iter().map(ToString::to_string).collect();
        headers.extend(
            Quarter::ALL
                .iter()
                .map(|q| Self::quarter_column(*q, self.current)),
        );
        headers.extend(Quarter::ALL.iter().map(|q| Self::quarter_column(*q, self.prior)));
        headers.extend(
            Quarter::ALL
                .iter()
                .map(|q| self.quarter_variation_column(*q)),
        );
        headers.push(Self::total_column(self.current));
        headers.push(Self::total_column(self.prior));
        headers.push(self.total_variation_column());
        headers
    }
}

/// Aggregate categories that look like community headers (all caps) in
/// some exports but carry data and must never reset the hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ReservedCategory {
    /// Conventional crime total.
    #[strum(serialize = "I. CRIMINALIDAD CONVENCIONAL")]
    Convencional,
    /// Cybercrime total.
    #[strum(
        serialize = "II. CIBERCRIMINALIDAD (infracciones penales cometidas en/por medio ciber)"
    )]
    Cibercriminalidad,
    /// Grand total of criminal offenses.
    #[strum(serialize = "III. TOTAL INFRACCIONES PENALES")]
    TotalInfracciones,
}

impl ReservedCategory {
    /// All reserved categories.
    pub const ALL: [Self; 3] = [
        Self::Convencional,
        Self::Cibercriminalidad,
        Self::TotalInfracciones,
    ];
}

/// Crime-type labels published in the quarterly balance, in the order the
/// ministry lists them. The last three are the [`ReservedCategory`]
/// aggregates.
pub const CRIME_TYPES: &[&str] = &[
    "1. Homicidios dolosos y asesinatos consumados",
    "2. Homicidios dolosos y asesinatos en grado tentativa",
    "3. Delitos graves y menos graves de lesiones y riña tumultuaria",
    "4. Secuestro",
    "5. Delitos contra la libertad sexual",
    "5.1.-Agresión sexual con penetración",
    "5.2.-Resto de delitos contra la libertad sexual",
    "6. Robos con violencia e intimidación",
    "7. Robos con fuerza en domicilios, establecimientos y otras instalaciones",
    "7.1.-Robos con fuerza en domicilios",
    "8. Hurtos",
    "9. Sustracciones de vehículos",
    "10. Tráfico de drogas",
    "11. Resto de criminalidad convencional",
    "12.-Estafas informáticas",
    "13.-Otros ciberdelitos",
    "I. CRIMINALIDAD CONVENCIONAL",
    "II. CIBERCRIMINALIDAD (infracciones penales cometidas en/por medio ciber)",
    "III. TOTAL INFRACCIONES PENALES",
];

/// Geographic and crime-type key shared by every table.
///
/// `provincia` is `None` on community-level rollups and `municipio` is
/// `None` on community- and province-level rollups. Empty strings are
/// never stored; [`CrimeKey::new`] maps them to `None`, which makes the
/// derived ordering sort missing levels first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CrimeKey {
    /// Autonomous community.
    pub comunidad: String,
    /// Province, when the row is below community level.
    pub provincia: Option<String>,
    /// Municipality, when the row is a leaf.
    pub municipio: Option<String>,
    /// Crime-type label.
    pub tipo_delito: String,
}

impl CrimeKey {
    /// Builds a key, trimming every component and treating blank
    /// province/municipality values as absent.
    #[must_use]
    pub fn new(
        comunidad: &str,
        provincia: Option<&str>,
        municipio: Option<&str>,
        tipo_delito: &str,
    ) -> Self {
        Self {
            comunidad: comunidad.trim().to_string(),
            provincia: non_blank(provincia),
            municipio: non_blank(municipio),
            tipo_delito: tipo_delito.trim().to_string(),
        }
    }

    /// Province as written to output files (empty when absent).
    #[must_use]
    pub fn provincia_str(&self) -> &str {
        self.provincia.as_deref().unwrap_or("")
    }

    /// Municipality as written to output files (empty when absent).
    #[must_use]
    pub fn municipio_str(&self) -> &str {
        self.municipio.as_deref().unwrap_or("")
    }

    /// Whether this is a community-level rollup.
    #[must_use]
    pub const fn is_community_level(&self) -> bool {
        self.provincia.is_none() && self.municipio.is_none()
    }

    /// Whether this is a province-level rollup.
    #[must_use]
    pub const fn is_province_level(&self) -> bool {
        self.provincia.is_some() && self.municipio.is_none()
    }
}

impl fmt::Display for CrimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.comunidad,
            self.provincia_str(),
            self.municipio_str(),
            self.tipo_delito
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// One data row of a cumulative export, as read from the spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeObservation {
    /// Geographic and crime-type key.
    pub key: CrimeKey,
    /// Cumulative period label of the export (`"Enero-junio"`).
    pub period: String,
    /// Year-to-date figure for the current year; `None` when the cell was
    /// not numeric.
    pub current: Option<f64>,
    /// Year-to-date figure for the prior year.
    pub prior: Option<f64>,
    /// Percentage variation as published.
    pub variation: Option<f64>,
}

/// One discrete quarter of the long table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterObservation {
    /// Geographic and crime-type key.
    pub key: CrimeKey,
    /// The quarter this delta belongs to.
    pub quarter: Quarter,
    /// Current-year count for this quarter alone.
    pub current: f64,
    /// Prior-year count for this quarter alone.
    pub prior: f64,
    /// Percentage variation; non-finite when `prior` is zero.
    pub variation: f64,
}

/// One row of the wide table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeWideRow {
    /// Geographic and crime-type key.
    pub key: CrimeKey,
    /// Current-year value per quarter, indexed by [`Quarter::index`].
    pub current: [Option<f64>; 4],
    /// Prior-year value per quarter.
    pub prior: [Option<f64>; 4],
    /// Variation per quarter.
    pub variation: [Option<f64>; 4],
    /// Sum of the current-year quarters.
    pub total_current: f64,
    /// Sum of the prior-year quarters.
    pub total_prior: f64,
    /// Annual percentage variation; non-finite when `total_prior` is zero.
    pub total_variation: f64,
}

impl CrimeWideRow {
    /// Builds a row from its quarter columns, deriving the annual totals.
    /// Missing quarters count as zero in the totals.
    #[must_use]
    pub fn from_quarters(
        key: CrimeKey,
        current: [Option<f64>; 4],
        prior: [Option<f64>; 4],
        variation: [Option<f64>; 4],
    ) -> Self {
        let total_current: f64 = current.iter().map(|v| v.unwrap_or(0.0)).sum();
        let total_prior: f64 = prior.iter().map(|v| v.unwrap_or(0.0)).sum();
        Self {
            key,
            current,
            prior,
            variation,
            total_current,
            total_prior,
            total_variation: percent_change(total_current, total_prior),
        }
    }
}

/// Percentage change from `prior` to `current`, rounded to one decimal.
///
/// Division by zero is not an error: the result is `inf`, `-inf`, or
/// `NaN` (for `0 / 0`) and callers must keep it distinct from zero.
#[must_use]
pub fn percent_change(current: f64, prior: f64) -> f64 {
    round_one_decimal((current - prior) / prior * 100.0)
}

/// Rounds to one decimal place, sending exact ties to the even digit
/// (`0.25` → `0.2`, `0.35` → `0.4`). Non-finite input is returned
/// unchanged.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    if value.is_finite() {
        (value * 10.0).round_ties_even() / 10.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn quarter_labels_roundtrip_through_strum() {
        for quarter in Quarter::ALL {
            assert_eq!(quarter.to_string(), quarter.label());
            assert_eq!(Quarter::from_str(quarter.label()).unwrap(), quarter);
        }
    }

    #[test]
    fn quarter_previous_chain() {
        assert_eq!(Quarter::EneroMarzo.previous(), None);
        assert_eq!(
            Quarter::OctubreDiciembre.previous(),
            Some(Quarter::JulioSeptiembre)
        );
        for (i, quarter) in Quarter::ALL.iter().enumerate() {
            assert_eq!(quarter.index(), i);
        }
    }

    #[test]
    fn wide_headers_match_dashboard_contract() {
        let headers = ReportYears::default().wide_headers();
        let expected = [
            "Comunidad",
            "Provincia",
            "Municipio",
            "Tipo Delito",
            "Enero-Marzo2023",
            "Abril-Junio2023",
            "Julio-Septiembre2023",
            "Octubre-Diciembre2023",
            "Enero-Marzo2022",
            "Abril-Junio2022",
            "Julio-Septiembre2022",
            "Octubre-Diciembre2022",
            "Enero-Marzo_VAR_2023_2022",
            "Abril-Junio_VAR_2023_2022",
            "Julio-Septiembre_VAR_2023_2022",
            "Octubre-Diciembre_VAR_2023_2022",
            "Total_2023",
            "Total_2022",
            "Variación_total_2023_2022",
        ];
        assert_eq!(headers, expected);
    }

    #[test]
    fn long_headers() {
        let headers = ReportYears::default().long_headers();
        assert_eq!(
            headers,
            [
                "Comunidad",
                "Provincia",
                "Municipio",
                "Tipo Delito",
                "Trimestre",
                "Dato 2023",
                "Dato 2022",
                "Variación 2023/2022"
            ]
        );
    }

    #[test]
    fn reserved_categories_are_listed_crime_types() {
        // The classifier's exclusion list and the published catalogue must
        // agree; a rename upstream has to be applied to both.
        for reserved in ReservedCategory::ALL {
            assert!(
                CRIME_TYPES.contains(&reserved.as_ref()),
                "{reserved:?} missing from CRIME_TYPES"
            );
            assert_eq!(
                ReservedCategory::from_str(reserved.as_ref()).unwrap(),
                reserved
            );
        }
    }

    #[test]
    fn key_blank_levels_become_none() {
        let key = CrimeKey::new(" MADRID ", Some("  "), None, "8. Hurtos ");
        assert_eq!(key.comunidad, "MADRID");
        assert_eq!(key.provincia, None);
        assert_eq!(key.tipo_delito, "8. Hurtos");
        assert!(key.is_community_level());
    }

    #[test]
    fn keys_sort_missing_levels_first() {
        let community = CrimeKey::new("A", None, None, "x");
        let province = CrimeKey::new("A", Some("P"), None, "x");
        let municipality = CrimeKey::new("A", Some("P"), Some("M"), "x");
        let mut keys = vec![municipality.clone(), province.clone(), community.clone()];
        keys.sort();
        assert_eq!(keys, vec![community, province, municipality]);
    }

    #[test]
    fn percent_change_rounds_to_one_decimal() {
        assert!((percent_change(120.0, 100.0) - 20.0).abs() < f64::EPSILON);
        assert!((percent_change(1.0, 3.0) - -66.7).abs() < 1e-9);
    }

    #[test]
    fn percent_change_ties_round_to_even() {
        assert!((percent_change(401.0, 400.0) - 0.2).abs() < 1e-9);
        assert!((percent_change(17.0, 16.0) - 6.2).abs() < 1e-9);
        assert!((round_one_decimal(0.35) - 0.4).abs() < 1e-9);
        assert!((round_one_decimal(-0.25) - -0.2).abs() < 1e-9);
    }

    #[test]
    fn percent_change_with_zero_prior_is_not_finite() {
        assert!(percent_change(50.0, 0.0).is_infinite());
        assert!(percent_change(-5.0, 0.0).is_infinite());
        assert!(percent_change(0.0, 0.0).is_nan());
    }

    #[test]
    fn wide_row_totals_treat_missing_as_zero() {
        let row = CrimeWideRow::from_quarters(
            CrimeKey::new("A", None, None, "x"),
            [Some(1.0), None, Some(3.0), None],
            [None, None, None, None],
            [None; 4],
        );
        assert!((row.total_current - 4.0).abs() < f64::EPSILON);
        assert!(row.total_prior.abs() < f64::EPSILON);
        assert!(row.total_variation.is_infinite());
    }
}
