//! Long-to-wide pivot.

use std::collections::BTreeMap;

use delitos_crime_models::{CrimeKey, CrimeWideRow, QuarterObservation};

use crate::ReconcileError;

#[derive(Default)]
struct Columns {
    current: [Option<f64>; 4],
    prior: [Option<f64>; 4],
    variation: [Option<f64>; 4],
}

/// Pivots the long table into one row per key, in key order.
///
/// Each key may have at most one row per quarter. Quarters a key lacks
/// stay `None` in the quarter columns and count as zero in the totals.
///
/// # Errors
///
/// Returns [`ReconcileError::DuplicateKey`] if a key has two rows for the
/// same quarter.
pub fn pivot(long: &[QuarterObservation]) -> Result<Vec<CrimeWideRow>, ReconcileError> {
    let mut groups: BTreeMap<&CrimeKey, Columns> = BTreeMap::new();

    for row in long {
        let columns = groups.entry(&row.key).or_default();
        let q = row.quarter.index();
        if columns.current[q].is_some() {
            return Err(ReconcileError::DuplicateKey {
                key: row.key.to_string(),
                quarter: row.quarter,
            });
        }
        columns.current[q] = Some(row.current);
        columns.prior[q] = Some(row.prior);
        columns.variation[q] = Some(row.variation);
    }

    Ok(groups
        .into_iter()
        .map(|(key, c)| {
            CrimeWideRow::from_quarters(key.clone(), c.current, c.prior, c.variation)
        })
        .collect())
}
