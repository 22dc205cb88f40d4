//! Cumulative-to-discrete quarter differencing.
//!
//! Each export reports year-to-date totals through the end of its
//! quarter. The four exports are aligned over the union of their keys,
//! with absent combinations filled with zero, and each quarter's figure
//! becomes its cumulative value minus the previous quarter's.

use std::collections::{BTreeMap, BTreeSet};

use delitos_crime_models::{
    CrimeKey, CrimeObservation, Quarter, QuarterObservation, percent_change,
};

use crate::ReconcileError;

/// Cumulative `(current, prior)` figures per key for one quarter.
pub type CumulativeTable = BTreeMap<CrimeKey, (f64, f64)>;

/// Indexes one quarter's observations by key. Missing figures count as
/// zero.
///
/// # Errors
///
/// Returns [`ReconcileError::EmptyQuarter`] if `observations` is empty
/// and [`ReconcileError::DuplicateKey`] if a key repeats.
pub fn index_quarter(
    quarter: Quarter,
    observations: &[CrimeObservation],
) -> Result<CumulativeTable, ReconcileError> {
    if observations.is_empty() {
        return Err(ReconcileError::EmptyQuarter { quarter });
    }

    let mut table = CumulativeTable::new();
    for observation in observations {
        let figures = (
            observation.current.unwrap_or(0.0),
            observation.prior.unwrap_or(0.0),
        );
        if table.insert(observation.key.clone(), figures).is_some() {
            return Err(ReconcileError::DuplicateKey {
                key: observation.key.to_string(),
                quarter,
            });
        }
    }

    Ok(table)
}

/// Every key present in at least one quarter, in key order.
#[must_use]
pub fn key_space(tables: &[CumulativeTable]) -> BTreeSet<CrimeKey> {
    tables
        .iter()
        .flat_map(|table| table.keys().cloned())
        .collect()
}

/// Figures for every key in `keys`, zero where the quarter lacks the key.
#[must_use]
pub fn align(table: &CumulativeTable, keys: &BTreeSet<CrimeKey>) -> Vec<(f64, f64)> {
    keys.iter()
        .map(|key| table.get(key).copied().unwrap_or((0.0, 0.0)))
        .collect()
}

/// Discrete values from cumulative ones: the first stays, every later one
/// loses its predecessor.
#[must_use]
pub fn deltas(cumulative: [f64; 4]) -> [f64; 4] {
    let mut previous = 0.0;
    cumulative.map(|value| {
        let delta = value - previous;
        previous = value;
        delta
    })
}

/// Turns four cumulative exports, in calendar order, into the long table
/// of discrete quarters.
///
/// The output has one row per key per quarter, quarter-major and in key
/// order within a quarter. Variation is recomputed from the deltas and is
/// non-finite when the prior-year delta is zero.
///
/// # Errors
///
/// Returns [`ReconcileError::EmptyQuarter`] if any export is empty and
/// [`ReconcileError::DuplicateKey`] if a key repeats within one.
pub fn difference(
    quarters: &[Vec<CrimeObservation>; 4],
) -> Result<Vec<QuarterObservation>, ReconcileError> {
    let tables = Quarter::ALL
        .iter()
        .zip(quarters)
        .map(|(quarter, observations)| index_quarter(*quarter, observations))
        .collect::<Result<Vec<_>, _>>()?;

    let keys = key_space(&tables);
    let aligned: Vec<Vec<(f64, f64)>> = tables.iter().map(|t| align(t, &keys)).collect();

    log::debug!(
        "Aligned {} keys across quarters of {} / {} / {} / {} rows",
        keys.len(),
        tables[0].len(),
        tables[1].len(),
        tables[2].len(),
        tables[3].len()
    );

    let per_key: Vec<([f64; 4], [f64; 4])> = (0..keys.len())
        .map(|i| {
            let current = deltas([0, 1, 2, 3].map(|q| aligned[q][i].0));
            let prior = deltas([0, 1, 2, 3].map(|q| aligned[q][i].1));
            (current, prior)
        })
        .collect();

    let mut long = Vec::with_capacity(keys.len() * Quarter::ALL.len());
    for quarter in Quarter::ALL {
        let q = quarter.index();
        for (key, (current, prior)) in keys.iter().zip(&per_key) {
            long.push(QuarterObservation {
                key: key.clone(),
                quarter,
                current: current[q],
                prior: prior[q],
                variation: percent_change(current[q], prior[q]),
            });
        }
    }

    Ok(long)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(
        community: &str,
        crime: &str,
        current: Option<f64>,
        prior: Option<f64>,
    ) -> CrimeObservation {
        CrimeObservation {
            key: CrimeKey::new(community, None, None, crime),
            period: String::new(),
            current,
            prior,
            variation: None,
        }
    }

    #[test]
    fn cumulative_values_become_quarterly_deltas() {
        let result = deltas([100.0, 260.0, 410.0, 500.0]);
        assert_eq!(result, [100.0, 160.0, 150.0, 90.0]);
    }

    #[test]
    fn differences_both_years() {
        let quarters = [
            vec![obs("Galicia", "8. Hurtos", Some(100.0), Some(50.0))],
            vec![obs("Galicia", "8. Hurtos", Some(260.0), Some(50.0))],
            vec![obs("Galicia", "8. Hurtos", Some(410.0), Some(150.0))],
            vec![obs("Galicia", "8. Hurtos", Some(500.0), Some(200.0))],
        ];

        let long = difference(&quarters).unwrap();
        let current: Vec<f64> = long.iter().map(|r| r.current).collect();
        let prior: Vec<f64> = long.iter().map(|r| r.prior).collect();
        assert_eq!(current, [100.0, 160.0, 150.0, 90.0]);
        assert_eq!(prior, [50.0, 0.0, 100.0, 50.0]);

        assert!((long[0].variation - 100.0).abs() < f64::EPSILON);
        assert!(long[1].variation.is_infinite());
        assert!((long[2].variation - 50.0).abs() < f64::EPSILON);
        assert!((long[3].variation - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn every_key_appears_in_every_quarter() {
        let quarters = [
            vec![obs("A", "x", Some(1.0), Some(1.0))],
            vec![obs("B", "x", Some(2.0), Some(2.0))],
            vec![
                obs("A", "x", Some(3.0), Some(3.0)),
                obs("C", "y", Some(1.0), Some(1.0)),
            ],
            vec![obs("D", "z", Some(4.0), Some(4.0))],
        ];

        let long = difference(&quarters).unwrap();
        assert_eq!(long.len(), 16);

        for quarter in Quarter::ALL {
            let keys: BTreeSet<&str> = long
                .iter()
                .filter(|r| r.quarter == quarter)
                .map(|r| r.key.comunidad.as_str())
                .collect();
            assert_eq!(keys, BTreeSet::from(["A", "B", "C", "D"]), "{quarter}");
        }
    }

    #[test]
    fn absent_keys_are_zero_filled_before_differencing() {
        let quarters = [
            vec![obs("A", "x", Some(5.0), Some(5.0))],
            vec![obs("B", "x", Some(1.0), Some(1.0))],
            vec![obs("A", "x", Some(8.0), Some(6.0))],
            vec![obs("A", "x", Some(8.0), Some(6.0))],
        ];

        let long = difference(&quarters).unwrap();
        let a: Vec<f64> = long
            .iter()
            .filter(|r| r.key.comunidad == "A")
            .map(|r| r.current)
            .collect();
        // Absent from the second export, so its cumulative value there is 0.
        assert_eq!(a, [5.0, -5.0, 8.0, 0.0]);
    }

    #[test]
    fn missing_figures_count_as_zero() {
        let quarters = [
            vec![obs("A", "x", None, Some(2.0))],
            vec![obs("A", "x", Some(3.0), None)],
            vec![obs("A", "x", Some(3.0), Some(2.0))],
            vec![obs("A", "x", Some(3.0), Some(2.0))],
        ];

        let long = difference(&quarters).unwrap();
        assert!(long[0].current.abs() < f64::EPSILON);
        assert!((long[1].current - 3.0).abs() < f64::EPSILON);
        assert!((long[1].prior - -2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_prior_gives_undefined_variation() {
        let quarters = [
            vec![obs("A", "x", Some(50.0), Some(0.0))],
            vec![obs("A", "x", Some(50.0), Some(0.0))],
            vec![obs("A", "x", Some(50.0), Some(0.0))],
            vec![obs("A", "x", Some(50.0), Some(0.0))],
        ];

        let long = difference(&quarters).unwrap();
        assert!(long[0].variation.is_infinite());
        assert!(long[1].variation.is_nan());
    }

    #[test]
    fn duplicate_key_within_a_quarter_is_fatal() {
        let quarters = [
            vec![obs("A", "x", Some(1.0), Some(1.0))],
            vec![
                obs("A", "x", Some(1.0), Some(1.0)),
                obs("A ", "x", Some(2.0), Some(2.0)),
            ],
            vec![obs("A", "x", Some(1.0), Some(1.0))],
            vec![obs("A", "x", Some(1.0), Some(1.0))],
        ];

        assert!(matches!(
            difference(&quarters),
            Err(ReconcileError::DuplicateKey {
                quarter: Quarter::AbrilJunio,
                ..
            })
        ));
    }

    #[test]
    fn empty_quarter_is_fatal() {
        let quarters = [
            vec![obs("A", "x", Some(1.0), Some(1.0))],
            vec![obs("A", "x", Some(1.0), Some(1.0))],
            vec![obs("A", "x", Some(1.0), Some(1.0))],
            Vec::new(),
        ];

        assert!(matches!(
            difference(&quarters),
            Err(ReconcileError::EmptyQuarter {
                quarter: Quarter::OctubreDiciembre
            })
        ));
    }
}
