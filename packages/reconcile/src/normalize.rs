//! Canonical names and single-province backfill.
//!
//! Community and province labels are translated through the upstream
//! label tables in [`delitos_geography_models::names`]; labels missing
//! from a table pass through unchanged. Every function here is
//! idempotent.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use delitos_crime_models::{
    CrimeKey, CrimeObservation, CrimeWideRow, Quarter, QuarterObservation,
};
use delitos_geography_models::names::{canonical_community, canonical_province, sole_province};
use regex::Regex;

/// One or more leading `Municipio de ` / `Municipo de ` prefixes.
static MUNICIPALITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Municipi?o de(?:\s+|$))+").expect("valid municipality regex")
});

/// Canonical community name for an upstream label.
#[must_use]
pub fn normalize_community(label: &str) -> String {
    let label = label.trim();
    canonical_community(label).unwrap_or(label).to_string()
}

/// Canonical province name for an upstream label.
#[must_use]
pub fn normalize_province(label: &str) -> String {
    let label = label.trim();
    canonical_province(label).unwrap_or(label).to_string()
}

/// Municipality label without its `Municipio de ` prefix.
#[must_use]
pub fn normalize_municipality(label: &str) -> String {
    MUNICIPALITY_PREFIX
        .replace(label.trim(), "")
        .trim()
        .to_string()
}

/// Key with every geographic component normalized.
#[must_use]
pub fn normalize_key(key: &CrimeKey) -> CrimeKey {
    let provincia = key.provincia.as_deref().map(normalize_province);
    let municipio = key.municipio.as_deref().map(normalize_municipality);
    CrimeKey::new(
        &normalize_community(&key.comunidad),
        provincia.as_deref(),
        municipio.as_deref(),
        &key.tipo_delito,
    )
}

/// Normalizes the keys of one quarter's observations, keeping their
/// order.
#[must_use]
pub fn normalize_observations(observations: Vec<CrimeObservation>) -> Vec<CrimeObservation> {
    observations
        .into_iter()
        .map(|o| CrimeObservation {
            key: normalize_key(&o.key),
            ..o
        })
        .collect()
}

/// The key with its province filled in, if it belongs to a
/// single-province community and has no province.
#[must_use]
pub fn backfilled(key: &CrimeKey) -> Option<CrimeKey> {
    if key.provincia.is_some() {
        return None;
    }
    let province = sole_province(&key.comunidad)?;
    Some(CrimeKey {
        provincia: Some(province.to_string()),
        ..key.clone()
    })
}

/// Backfills provinces on the long table. A row is left alone if the
/// backfilled key already exists for the same quarter. Returns the number
/// of rows changed.
pub fn backfill_long(rows: &mut [QuarterObservation]) -> usize {
    let existing: BTreeSet<(CrimeKey, Quarter)> =
        rows.iter().map(|r| (r.key.clone(), r.quarter)).collect();

    let mut changed = 0;
    for row in rows.iter_mut() {
        let Some(key) = backfilled(&row.key) else {
            continue;
        };
        if existing.contains(&(key.clone(), row.quarter)) {
            log::warn!("Not backfilling {}: key already present", row.key);
            continue;
        }
        row.key = key;
        changed += 1;
    }
    changed
}

/// Backfills provinces on the wide table. A row is left alone if the
/// backfilled key already exists. Returns the number of rows changed.
pub fn backfill_wide(rows: &mut [CrimeWideRow]) -> usize {
    let existing: BTreeSet<CrimeKey> = rows.iter().map(|r| r.key.clone()).collect();

    let mut changed = 0;
    for row in rows.iter_mut() {
        let Some(key) = backfilled(&row.key) else {
            continue;
        };
        if existing.contains(&key) {
            log::warn!("Not backfilling {}: key already present", row.key);
            continue;
        }
        row.key = key;
        changed += 1;
    }
    changed
}

#[cfg(test)]
mod tests {
    use delitos_geography_models::names::{COMMUNITY_LABELS, PROVINCE_LABELS};

    use super::*;

    #[test]
    fn translates_upstream_labels() {
        assert_eq!(normalize_community("RIOJA (LA)"), "La Rioja");
        assert_eq!(normalize_province("Provincia de PALMAS (LAS)"), "Las Palmas");
        assert_eq!(normalize_province("Provincia de BALEARS (LAS)"), "Baleares");
        assert_eq!(normalize_municipality("Municipio de Getafe"), "Getafe");
        assert_eq!(normalize_municipality("Municipo de Alcorcón"), "Alcorcón");
        assert_eq!(normalize_municipality("Isla de Ibiza"), "Isla de Ibiza");
    }

    #[test]
    fn unknown_labels_pass_through() {
        assert_eq!(normalize_community("ATLÁNTIDA"), "ATLÁNTIDA");
        assert_eq!(normalize_province("Provincia de NINGUNA"), "Provincia de NINGUNA");
    }

    #[test]
    fn normalization_is_idempotent() {
        let labels = COMMUNITY_LABELS
            .iter()
            .chain(PROVINCE_LABELS)
            .flat_map(|(k, v)| [*k, *v])
            .chain([
                "Municipio de Municipio de Toledo",
                "Municipo de Municipio de Lugo",
                "  Municipio de Getafe ",
                "Municipio de ",
                "",
                "anything else",
            ]);

        for label in labels {
            let once = normalize_community(label);
            assert_eq!(normalize_community(&once), once, "community {label:?}");
            let once = normalize_province(label);
            assert_eq!(normalize_province(&once), once, "province {label:?}");
            let once = normalize_municipality(label);
            assert_eq!(normalize_municipality(&once), once, "municipality {label:?}");
        }
    }

    #[test]
    fn key_normalization_is_idempotent() {
        let key = CrimeKey::new(
            "CASTILLA Y LEON",
            Some("Provincia de LEÓN"),
            Some("Municipio de Ponferrada"),
            "8. Hurtos",
        );
        let once = normalize_key(&key);
        assert_eq!(once.comunidad, "Castilla y León");
        assert_eq!(once.provincia.as_deref(), Some("León"));
        assert_eq!(once.municipio.as_deref(), Some("Ponferrada"));
        assert_eq!(normalize_key(&once), once);
    }

    #[test]
    fn stripping_to_nothing_clears_the_municipality() {
        let key = CrimeKey::new("GALICIA", None, Some("Municipio de "), "x");
        assert_eq!(normalize_key(&key).municipio, None);
    }

    #[test]
    fn madrid_gets_its_province() {
        let key = CrimeKey::new("Comunidad de Madrid", None, None, "8. Hurtos");
        let filled = backfilled(&key).unwrap();
        assert_eq!(filled.provincia.as_deref(), Some("Madrid"));

        let blank = CrimeKey::new("Comunidad de Madrid", Some(""), None, "8. Hurtos");
        assert_eq!(backfilled(&blank), Some(filled));
    }

    #[test]
    fn multi_province_communities_are_not_backfilled() {
        assert_eq!(backfilled(&CrimeKey::new("Andalucía", None, None, "x")), None);
        assert_eq!(
            backfilled(&CrimeKey::new("Comunidad de Madrid", Some("Madrid"), None, "x")),
            None
        );
    }

    #[test]
    fn backfill_keeps_keys_unique() {
        let row = |province: Option<&str>| {
            CrimeWideRow::from_quarters(
                CrimeKey::new("Región de Murcia", province, None, "x"),
                [Some(1.0); 4],
                [Some(1.0); 4],
                [Some(0.0); 4],
            )
        };
        let mut rows = vec![row(None), row(Some("Murcia"))];
        assert_eq!(backfill_wide(&mut rows), 0);
        assert_eq!(rows[0].key.provincia, None);

        let mut rows = vec![row(None)];
        assert_eq!(backfill_wide(&mut rows), 1);
        assert_eq!(rows[0].key.provincia.as_deref(), Some("Murcia"));
    }

    #[test]
    fn backfills_long_rows_in_every_quarter() {
        let mut rows: Vec<QuarterObservation> = Quarter::ALL
            .iter()
            .map(|q| QuarterObservation {
                key: CrimeKey::new("La Rioja", None, Some("Logroño"), "x"),
                quarter: *q,
                current: 1.0,
                prior: 1.0,
                variation: 0.0,
            })
            .collect();

        assert_eq!(backfill_long(&mut rows), 4);
        assert!(rows.iter().all(|r| r.key.provincia.as_deref() == Some("La Rioja")));
    }
}
