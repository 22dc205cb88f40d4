#![allow(clippy::too_many_lines)]
//! Upstream label translation tables.
//!
//! The ministry's exports spell communities in upper case with
//! parenthetical qualifiers (`"MADRID (COMUNIDAD DE)"`) and provinces with a
//! `"Provincia de "` prefix. These tables map every variant seen in the
//! exports to the canonical names used throughout the pipeline. They are
//! distinct from the polygon display-name tables in [`crate::display`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Upstream community label → canonical community name.
pub const COMMUNITY_LABELS: &[(&str, &str)] = &[
    ("ANDALUCÍA", "Andalucía"),
    ("ARAGÓN", "Aragón"),
    ("ASTURIAS (PRINCIPADO DE)", "Principado de Asturias"),
    ("BALEARS (ILLES)", "Illes Balears"),
    ("CANARIAS", "Canarias"),
    ("CANTABRIA", "Cantabria"),
    ("CASTILLA - LA MANCHA", "Castilla-La Mancha"),
    ("CASTILLA Y LEON", "Castilla y León"),
    ("CATALUÑA", "Cataluña"),
    ("CIUDAD AUTÓNOMA DE CEUTA", "Ciudad Autónoma de Ceuta"),
    ("CIUDAD AUTÓNOMA DE MELILLA", "Ciudad Autónoma de Melilla"),
    ("COMUNITAT VALENCIANA", "Comunidad Valenciana"),
    ("EXTREMADURA", "Extremadura"),
    ("GALICIA", "Galicia"),
    ("MADRID (COMUNIDAD DE)", "Comunidad de Madrid"),
    ("MURCIA (REGION DE)", "Región de Murcia"),
    ("NAVARRA (COMUNIDAD FORAL DE)", "Comunidad Foral de Navarra"),
    ("PAÍS VASCO", "País Vasco"),
    ("RIOJA (LA)", "La Rioja"),
    ("NACIONAL", "Nacional"),
    ("EN EL EXTRANJERO", "En el extranjero"),
];

/// Upstream province label → canonical province name.
pub const PROVINCE_LABELS: &[(&str, &str)] = &[
    ("Provincia de ÁVILA", "Ávila"),
    ("Provincia de ALBACETE", "Albacete"),
    ("Provincia de ALICANTE/ALACANT", "Alicante"),
    ("Provincia de ALMERÍA", "Almería"),
    ("Provincia de ARABA/ÁLAVA", "Álava"),
    ("Provincia de BADAJOZ", "Badajoz"),
    ("Provincia de BALEARS (LAS)", "Baleares"),
    ("Provincia de BARCELONA", "Barcelona"),
    ("Provincia de BIZKAIA", "Bizkaia"),
    ("Provincia de BURGOS", "Burgos"),
    ("Provincia de CÁCERES", "Cáceres"),
    ("Provincia de CÁDIZ", "Cádiz"),
    ("Provincia de CASTELLÓN/CASTELLÓ", "Castellón"),
    ("Provincia de CIUDAD REAL", "Ciudad Real"),
    ("Provincia de CÓRDOBA", "Córdoba"),
    ("Provincia de CORUÑA (A)", "A Coruña"),
    ("Provincia de CUENCA", "Cuenca"),
    ("Provincia de GIRONA", "Girona"),
    ("Provincia de GRANADA", "Granada"),
    ("Provincia de GUADALAJARA", "Guadalajara"),
    ("Provincia de GIPUZKOA", "Gipuzkoa"),
    ("Provincia de HUELVA", "Huelva"),
    ("Provincia de HUESCA", "Huesca"),
    ("Provincia de JAÉN", "Jaén"),
    ("Provincia de LEÓN", "León"),
    ("Provincia de LLEIDA", "Lleida"),
    ("Provincia de LUGO", "Lugo"),
    ("Provincia de MADRID", "Madrid"),
    ("Provincia de MÁLAGA", "Málaga"),
    ("Provincia de MURCIA", "Murcia"),
    ("Provincia de OURENSE", "Ourense"),
    ("Provincia de PALENCIA", "Palencia"),
    ("Provincia de PALMAS (LAS)", "Las Palmas"),
    ("Provincia de PONTEVEDRA", "Pontevedra"),
    ("Provincia de SALAMANCA", "Salamanca"),
    ("Provincia de SANTA CRUZ DE TENERIFE", "Santa Cruz de Tenerife"),
    ("Provincia de SEGOVIA", "Segovia"),
    ("Provincia de SEVILLA", "Sevilla"),
    ("Provincia de SORIA", "Soria"),
    ("Provincia de TARRAGONA", "Tarragona"),
    ("Provincia de TERUEL", "Teruel"),
    ("Provincia de TOLEDO", "Toledo"),
    ("Provincia de VALENCIA/VALÈNCIA", "Valencia"),
    ("Provincia de VALLADOLID", "Valladolid"),
    ("Provincia de ZAMORA", "Zamora"),
    ("Provincia de ZARAGOZA", "Zaragoza"),
];

/// Communities made of exactly one province. The exports omit the
/// province level for these, so the province is filled in from here.
pub const SINGLE_PROVINCE_COMMUNITIES: &[(&str, &str)] = &[
    ("Cantabria", "Cantabria"),
    ("Comunidad Foral de Navarra", "Navarra"),
    ("Comunidad de Madrid", "Madrid"),
    ("Illes Balears", "Baleares"),
    ("La Rioja", "La Rioja"),
    ("Principado de Asturias", "Asturias"),
    ("Región de Murcia", "Murcia"),
];

static COMMUNITIES: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| COMMUNITY_LABELS.iter().copied().collect());

static PROVINCES: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| PROVINCE_LABELS.iter().copied().collect());

static SINGLE_PROVINCE: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| SINGLE_PROVINCE_COMMUNITIES.iter().copied().collect());

/// Canonical name for an upstream community label, if the label is known.
#[must_use]
pub fn canonical_community(label: &str) -> Option<&'static str> {
    COMMUNITIES.get(label).copied()
}

/// Canonical name for an upstream province label, if the label is known.
#[must_use]
pub fn canonical_province(label: &str) -> Option<&'static str> {
    PROVINCES.get(label).copied()
}

/// The only province of a single-province community.
#[must_use]
pub fn sole_province(community: &str) -> Option<&'static str> {
    SINGLE_PROVINCE.get(community).copied()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn table_sizes() {
        assert_eq!(COMMUNITY_LABELS.len(), 21);
        assert_eq!(PROVINCE_LABELS.len(), 46);
        assert_eq!(SINGLE_PROVINCE_COMMUNITIES.len(), 7);
    }

    #[test]
    fn upstream_labels_are_unique() {
        let communities: BTreeSet<_> = COMMUNITY_LABELS.iter().map(|(k, _)| k).collect();
        assert_eq!(communities.len(), COMMUNITY_LABELS.len());
        let provinces: BTreeSet<_> = PROVINCE_LABELS.iter().map(|(k, _)| k).collect();
        assert_eq!(provinces.len(), PROVINCE_LABELS.len());
    }

    #[test]
    fn province_names_are_unique() {
        let names: BTreeSet<_> = PROVINCE_LABELS.iter().map(|(_, v)| v).collect();
        assert_eq!(names.len(), PROVINCE_LABELS.len());
    }

    #[test]
    fn canonical_names_are_fixed_points() {
        for (_, name) in COMMUNITY_LABELS {
            assert_eq!(canonical_community(name), None, "{name} is also a key");
        }
        for (_, name) in PROVINCE_LABELS {
            assert_eq!(canonical_province(name), None, "{name} is also a key");
        }
    }

    #[test]
    fn single_province_communities_are_canonical() {
        let canonical: BTreeSet<_> = COMMUNITY_LABELS.iter().map(|(_, v)| *v).collect();
        for (community, _) in SINGLE_PROVINCE_COMMUNITIES {
            assert!(canonical.contains(community), "{community} not canonical");
        }
    }

    #[test]
    fn looks_up_known_labels() {
        assert_eq!(
            canonical_community("MADRID (COMUNIDAD DE)"),
            Some("Comunidad de Madrid")
        );
        assert_eq!(canonical_province("Provincia de CORUÑA (A)"), Some("A Coruña"));
        assert_eq!(sole_province("Comunidad de Madrid"), Some("Madrid"));
        assert_eq!(sole_province("Andalucía"), None);
    }
}
