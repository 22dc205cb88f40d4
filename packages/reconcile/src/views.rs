//! Data views the dashboard renders: region filters, choropleth rows, and
//! income summaries. Rendering itself happens elsewhere.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use delitos_crime_models::{CrimeWideRow, Quarter};
use delitos_geography_models::GeoLevel;
use delitos_geography_models::display::{community_polygon_name, province_polygon_name};
use delitos_geography_models::names::sole_province;
use delitos_source::income::{IncomeIndicator, IncomeRow};

use crate::ReconcileError;

/// Rows whose component at `level` equals `name`.
#[must_use]
pub fn region_rows<'a>(
    wide: &'a [CrimeWideRow],
    level: GeoLevel,
    name: &str,
) -> Vec<&'a CrimeWideRow> {
    wide.iter()
        .filter(|row| {
            let value = match level {
                GeoLevel::Community => Some(row.key.comunidad.as_str()),
                GeoLevel::Province => row.key.provincia.as_deref(),
                GeoLevel::Municipality => row.key.municipio.as_deref(),
            };
            value == Some(name)
        })
        .collect()
}

/// Which values a map colors by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPeriod {
    /// One discrete quarter.
    Quarter(Quarter),
    /// The annual totals.
    Total,
}

impl fmt::Display for MapPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quarter(quarter) => f.write_str(quarter.label()),
            Self::Total => f.write_str("Total"),
        }
    }
}

impl FromStr for MapPeriod {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("total") {
            return Ok(Self::Total);
        }
        Quarter::ALL
            .into_iter()
            .find(|q| q.label().eq_ignore_ascii_case(s))
            .map(Self::Quarter)
            .ok_or_else(|| ReconcileError::UnknownPeriod {
                period: s.to_string(),
            })
    }
}

/// One region of a choropleth layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRow {
    /// Canonical region name.
    pub region: String,
    /// Name in the boundary file.
    pub polygon: String,
    /// Current-year value.
    pub current: Option<f64>,
    /// Prior-year value.
    pub prior: Option<f64>,
    /// Percentage variation.
    pub variation: Option<f64>,
}

/// Communities with a rollup row that never got a province, per crime
/// type.
fn unfilled_communities(wide: &[CrimeWideRow]) -> BTreeSet<(&str, &str)> {
    wide.iter()
        .filter(|row| row.key.is_community_level())
        .map(|row| (row.key.comunidad.as_str(), row.key.tipo_delito.as_str()))
        .collect()
}

fn on_community_map(row: &CrimeWideRow, unfilled: &BTreeSet<(&str, &str)>) -> bool {
    if row.key.municipio.is_some() {
        return false;
    }
    match row.key.provincia.as_deref() {
        None => true,
        // A backfilled rollup stands in for the community unless backfill
        // was skipped and the plain rollup is still there.
        Some(province) => {
            sole_province(&row.key.comunidad) == Some(province)
                && !unfilled.contains(&(row.key.comunidad.as_str(), row.key.tipo_delito.as_str()))
        }
    }
}

/// Rows of a community or province choropleth for one crime type.
///
/// Community maps take the rows with neither province nor municipality.
/// A single-province community whose rollup had its province backfilled
/// is represented by that row instead, unless a rollup without a province
/// is also present, in which case only the latter is used. Province maps
/// take every province rollup. Municipality maps are not drawn and
/// yield nothing.
#[must_use]
pub fn map_rows(
    wide: &[CrimeWideRow],
    level: GeoLevel,
    crime_type: &str,
    period: MapPeriod,
) -> Vec<MapRow> {
    let unfilled = unfilled_communities(wide);

    let mut rows: Vec<MapRow> = wide
        .iter()
        .filter(|row| row.key.tipo_delito == crime_type)
        .filter_map(|row| {
            let (region, polygon) = match level {
                GeoLevel::Community if on_community_map(row, &unfilled) => {
                    let name = row.key.comunidad.as_str();
                    (name, community_polygon_name(name))
                }
                GeoLevel::Province if row.key.is_province_level() => {
                    let name = row.key.provincia_str();
                    (name, province_polygon_name(name))
                }
                _ => return None,
            };

            let (current, prior, variation) = match period {
                MapPeriod::Quarter(quarter) => {
                    let q = quarter.index();
                    (row.current[q], row.prior[q], row.variation[q])
                }
                MapPeriod::Total => (
                    Some(row.total_current),
                    Some(row.total_prior),
                    Some(row.total_variation),
                ),
            };

            Some(MapRow {
                region: region.to_string(),
                polygon: polygon.to_string(),
                current,
                prior,
                variation,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.region.cmp(&b.region));
    rows
}

/// Indicators averaged per community.
pub const SUMMARY_INDICATORS: [IncomeIndicator; 4] = [
    IncomeIndicator::NetPerPerson,
    IncomeIndicator::NetPerHousehold,
    IncomeIndicator::MeanPerConsumptionUnit,
    IncomeIndicator::MedianPerConsumptionUnit,
];

/// Mean income indicators of one community.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityIncome {
    /// Community name from the postal-code table.
    pub comunidad: String,
    /// Municipalities contributing.
    pub municipalities: usize,
    /// Mean of each [`SUMMARY_INDICATORS`] entry, ignoring missing values.
    pub means: [Option<f64>; 4],
}

impl CommunityIncome {
    /// Mean net income per person.
    #[must_use]
    pub const fn net_per_person(&self) -> Option<f64> {
        self.means[0]
    }
}

/// Descending order with missing values last.
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Per-community means of the `year` indicators, sorted by net income per
/// person descending. Rows without a community are left out.
#[must_use]
pub fn income_by_community(rows: &[IncomeRow], year: u16) -> Vec<CommunityIncome> {
    let columns = SUMMARY_INDICATORS.map(|i| i.column(year));

    let mut groups: BTreeMap<&str, Vec<&IncomeRow>> = BTreeMap::new();
    for row in rows {
        if let Some(community) = row.comunidad_autonoma.as_deref() {
            groups.entry(community).or_default().push(row);
        }
    }

    let mut summaries: Vec<CommunityIncome> = groups
        .into_iter()
        .map(|(community, members)| {
            let means = columns.each_ref().map(|column| {
                let values: Vec<f64> = members.iter().filter_map(|r| r.metric(column)).collect();
                mean(&values)
            });
            CommunityIncome {
                comunidad: community.to_string(),
                municipalities: members.len(),
                means,
            }
        })
        .collect();

    summaries.sort_by(|a, b| descending(a.net_per_person(), b.net_per_person()));
    summaries
}

/// One entry of a municipality ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedMunicipality<'a> {
    /// The ranked row.
    pub row: &'a IncomeRow,
    /// Its value for the ranking metric.
    pub value: f64,
}

/// The `n` municipalities with the highest `metric`, limited to
/// `communities` (empty means every community). Rows missing the metric
/// or without a community are excluded.
#[must_use]
pub fn top_municipalities<'a>(
    rows: &'a [IncomeRow],
    communities: &[String],
    metric: &str,
    n: usize,
) -> Vec<RankedMunicipality<'a>> {
    let mut ranked: Vec<RankedMunicipality<'a>> = rows
        .iter()
        .filter(|row| {
            row.comunidad_autonoma
                .as_ref()
                .is_some_and(|c| communities.is_empty() || communities.contains(c))
        })
        .filter_map(|row| row.metric(metric).map(|value| RankedMunicipality { row, value }))
        .collect();

    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(n);
    ranked
}

/// Summary statistics of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Number of values.
    pub count: usize,
}

/// Mean, median, and count of `metric` over the rows that have it and
/// belong to a community.
#[must_use]
pub fn summarize(rows: &[IncomeRow], metric: &str) -> Option<MetricSummary> {
    let mut values: Vec<f64> = rows
        .iter()
        .filter(|r| r.comunidad_autonoma.is_some())
        .filter_map(|r| r.metric(metric))
        .collect();
    let mean = mean(&values)?;
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        f64::midpoint(values[mid - 1], values[mid])
    } else {
        values[mid]
    };

    Some(MetricSummary {
        mean,
        median,
        count: values.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use delitos_crime_models::CrimeKey;

    use super::*;

    const HURTOS: &str = "8. Hurtos";

    fn wide_row(comunidad: &str, provincia: Option<&str>, municipio: Option<&str>) -> CrimeWideRow {
        CrimeWideRow::from_quarters(
            CrimeKey::new(comunidad, provincia, municipio, HURTOS),
            [Some(10.0), Some(20.0), Some(30.0), Some(40.0)],
            [Some(5.0), Some(20.0), Some(0.0), Some(40.0)],
            [Some(100.0), Some(0.0), Some(f64::INFINITY), Some(0.0)],
        )
    }

    fn sample_wide() -> Vec<CrimeWideRow> {
        vec![
            wide_row("Andalucía", None, None),
            wide_row("Andalucía", Some("Sevilla"), None),
            wide_row("Andalucía", Some("Sevilla"), Some("Dos Hermanas")),
            wide_row("Comunidad de Madrid", Some("Madrid"), None),
            wide_row("Comunidad de Madrid", Some("Madrid"), Some("Getafe")),
        ]
    }

    fn income_row(label: &str, community: Option<&str>, net_per_person: Option<f64>) -> IncomeRow {
        let column = IncomeIndicator::NetPerPerson.column(2023);
        IncomeRow {
            municipality: label.to_string(),
            codigo_postal: label.chars().take(5).collect(),
            comunidad_autonoma: community.map(ToString::to_string),
            metrics: BTreeMap::from([(column, net_per_person)]),
            source_file: PathBuf::from("test.xlsx"),
        }
    }

    #[test]
    fn filters_rows_by_region() {
        let wide = sample_wide();
        assert_eq!(region_rows(&wide, GeoLevel::Community, "Andalucía").len(), 3);
        assert_eq!(region_rows(&wide, GeoLevel::Province, "Madrid").len(), 2);
        assert_eq!(region_rows(&wide, GeoLevel::Municipality, "Getafe").len(), 1);
        assert!(region_rows(&wide, GeoLevel::Province, "Andalucía").is_empty());
    }

    #[test]
    fn parses_map_periods() {
        assert_eq!("Total".parse::<MapPeriod>().unwrap(), MapPeriod::Total);
        assert_eq!(
            "abril-junio".parse::<MapPeriod>().unwrap(),
            MapPeriod::Quarter(Quarter::AbrilJunio)
        );
        assert!(matches!(
            "Primavera".parse::<MapPeriod>(),
            Err(ReconcileError::UnknownPeriod { .. })
        ));
    }

    #[test]
    fn community_map_includes_backfilled_single_province_communities() {
        let wide = sample_wide();
        let rows = map_rows(&wide, GeoLevel::Community, HURTOS, MapPeriod::Total);

        let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, ["Andalucía", "Comunidad de Madrid"]);
        assert_eq!(rows[1].polygon, community_polygon_name("Comunidad de Madrid"));
        assert_eq!(rows[0].current, Some(100.0));
        assert_eq!(rows[0].prior, Some(65.0));
    }

    #[test]
    fn community_map_prefers_the_plain_rollup_after_a_skipped_backfill() {
        let wide = vec![
            wide_row("Comunidad de Madrid", None, None),
            wide_row("Comunidad de Madrid", Some("Madrid"), None),
        ];

        let rows = map_rows(&wide, GeoLevel::Community, HURTOS, MapPeriod::Total);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].region, "Comunidad de Madrid");

        let provinces = map_rows(&wide, GeoLevel::Province, HURTOS, MapPeriod::Total);
        let regions: Vec<&str> = provinces.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, ["Madrid"]);
    }

    #[test]
    fn province_map_takes_province_rollups() {
        let wide = sample_wide();
        let rows = map_rows(
            &wide,
            GeoLevel::Province,
            HURTOS,
            MapPeriod::Quarter(Quarter::JulioSeptiembre),
        );

        let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, ["Madrid", "Sevilla"]);
        assert_eq!(rows[1].current, Some(30.0));
        assert!(rows[1].variation.is_some_and(f64::is_infinite));
    }

    #[test]
    fn map_rows_filter_by_crime_type() {
        let wide = sample_wide();
        assert!(map_rows(&wide, GeoLevel::Community, "1. Homicidios", MapPeriod::Total).is_empty());
        assert!(map_rows(&wide, GeoLevel::Municipality, HURTOS, MapPeriod::Total).is_empty());
    }

    #[test]
    fn community_income_is_sorted_descending_with_missing_last() {
        let rows = vec![
            income_row("04001 Almería", Some("Andalucía"), Some(10_000.0)),
            income_row("41001 Sevilla", Some("Andalucía"), Some(14_000.0)),
            income_row("41002 Sevilla", Some("Andalucía"), None),
            income_row("28001 Madrid", Some("Madrid"), Some(20_000.0)),
            income_row("31001 Pamplona", Some("Navarra"), None),
            income_row("99001 Nowhere", None, Some(1.0)),
        ];

        let summary = income_by_community(&rows, 2023);
        let names: Vec<&str> = summary.iter().map(|s| s.comunidad.as_str()).collect();
        assert_eq!(names, ["Madrid", "Andalucía", "Navarra"]);

        let andalucia = &summary[1];
        assert_eq!(andalucia.municipalities, 3);
        assert_eq!(andalucia.net_per_person(), Some(12_000.0));
        assert_eq!(andalucia.means[1], None);
        assert_eq!(summary[2].net_per_person(), None);
    }

    #[test]
    fn ranks_municipalities_by_metric() {
        let rows = vec![
            income_row("04001 Almería", Some("Andalucía"), Some(10_000.0)),
            income_row("41001 Sevilla", Some("Andalucía"), Some(14_000.0)),
            income_row("41002 Sevilla", Some("Andalucía"), None),
            income_row("28001 Madrid", Some("Madrid"), Some(20_000.0)),
            income_row("99001 Sin comunidad", None, Some(90_000.0)),
        ];
        let metric = IncomeIndicator::NetPerPerson.column(2023);

        let top = top_municipalities(&rows, &[], &metric, 2);
        let labels: Vec<&str> = top.iter().map(|r| r.row.municipality.as_str()).collect();
        assert_eq!(labels, ["28001 Madrid", "41001 Sevilla"]);

        let andalucia = top_municipalities(&rows, &["Andalucía".to_string()], &metric, 10);
        assert_eq!(andalucia.len(), 2);
        assert!((andalucia[0].value - 14_000.0).abs() < f64::EPSILON);

        assert!(top_municipalities(&rows, &[], "Renta bruta media por hogar 2023", 5).is_empty());
    }

    #[test]
    fn summarizes_a_metric() {
        let metric = IncomeIndicator::NetPerPerson.column(2023);
        let rows = vec![
            income_row("04001 A", Some("Andalucía"), Some(1.0)),
            income_row("04002 B", Some("Andalucía"), Some(2.0)),
            income_row("04003 C", Some("Andalucía"), Some(9.0)),
            income_row("04004 D", Some("Andalucía"), None),
            income_row("99001 E", None, Some(1_000.0)),
        ];

        let summary = summarize(&rows, &metric).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 4.0).abs() < f64::EPSILON);
        assert!((summary.median - 2.0).abs() < f64::EPSILON);

        let even = summarize(&rows[..2], &metric).unwrap();
        assert!((even.median - 1.5).abs() < f64::EPSILON);

        assert_eq!(summarize(&rows[3..], &metric), None);
    }
}
