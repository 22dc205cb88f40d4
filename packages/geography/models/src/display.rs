//! Polygon display-name tables.
//!
//! Boundary files name regions differently from the canonical names the
//! pipeline produces (`"Castilla-Leon"` rather than `"Castilla y León"`).
//! Map views translate through these tables before joining by name.
//! Names absent from a table are assumed to match the boundary file.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Canonical community name → community polygon name.
pub const COMMUNITY_POLYGONS: &[(&str, &str)] = &[
    ("Castilla y León", "Castilla-Leon"),
    ("Andalucía", "Andalucia"),
    ("País Vasco", "Pais Vasco"),
    ("Aragón", "Aragon"),
    ("Illes Balears", "Baleares"),
    ("Comunidad Valenciana", "Valencia"),
    ("Comunidad de Madrid", "Madrid"),
    ("Ciudad Autónoma de Ceuta", "Ceuta"),
    ("Ciudad Autónoma de Melilla", "Melilla"),
    ("Castilla-La Mancha", "Castilla-La Mancha"),
    ("La Rioja", "La Rioja"),
    ("Galicia", "Galicia"),
    ("Extremadura", "Extremadura"),
    ("Principado de Asturias", "Asturias"),
    ("Canarias", "Canarias"),
    ("Cantabria", "Cantabria"),
    ("Cataluña", "Cataluña"),
    ("Comunidad Foral de Navarra", "Navarra"),
    ("Región de Murcia", "Murcia"),
];

/// Canonical province name → province polygon name.
pub const PROVINCE_POLYGONS: &[(&str, &str)] = &[
    ("Baleares", "Illes Balears"),
    ("Asturias", "Asturias"),
    ("A Coruña", "A Coruña"),
    ("Girona", "Girona"),
    ("Las Palmas", "Las Palmas"),
    ("Pontevedra", "Pontevedra"),
    ("Santa Cruz de Tenerife", "Santa Cruz De Tenerife"),
    ("Cantabria", "Cantabria"),
    ("Málaga", "Málaga"),
    ("Almería", "Almería"),
    ("Murcia", "Murcia"),
    ("Albacete", "Albacete"),
    ("Ávila", "Ávila"),
    ("Álava", "Araba/Álava"),
    ("Badajoz", "Badajoz"),
    ("Alicante", "Alacant/Alicante"),
    ("Ourense", "Ourense"),
    ("Barcelona", "Barcelona"),
    ("Burgos", "Burgos"),
    ("Cáceres", "Cáceres"),
    ("Cádiz", "Cádiz"),
    ("Castellón", "Castelló/Castellón"),
    ("Ciudad Real", "Ciudad Real"),
    ("Jaén", "Jaén"),
    ("Córdoba", "Córdoba"),
    ("Cuenca", "Cuenca"),
    ("Granada", "Granada"),
    ("Guadalajara", "Guadalajara"),
    ("Gipuzkoa", "Gipuzkoa/Guipúzcoa"),
    ("Huelva", "Huelva"),
    ("Huesca", "Huesca"),
    ("León", "León"),
    ("Lleida", "Lleida"),
    ("La Rioja", "La Rioja"),
    ("Soria", "Soria"),
    ("Navarra", "Navarra"),
    ("Ceuta", "Ceuta"),
    ("Lugo", "Lugo"),
    ("Madrid", "Madrid"),
    ("Palencia", "Palencia"),
    ("Salamanca", "Salamanca"),
    ("Segovia", "Segovia"),
    ("Sevilla", "Sevilla"),
    ("Toledo", "Toledo"),
    ("Tarragona", "Tarragona"),
    ("Teruel", "Teruel"),
    ("Valencia", "València/Valencia"),
    ("Valladolid", "Valladolid"),
    ("Bizkaia", "Bizkaia/Vizcaya"),
    ("Zamora", "Zamora"),
    ("Zaragoza", "Zaragoza"),
    ("Melilla", "Melilla"),
];

static COMMUNITIES: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| COMMUNITY_POLYGONS.iter().copied().collect());

static PROVINCES: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| PROVINCE_POLYGONS.iter().copied().collect());

/// Polygon name for a canonical community name. Unknown names pass
/// through unchanged.
#[must_use]
pub fn community_polygon_name(name: &str) -> &str {
    COMMUNITIES.get(name).copied().unwrap_or(name)
}

/// Polygon name for a canonical province name. Unknown names pass
/// through unchanged.
#[must_use]
pub fn province_polygon_name(name: &str) -> &str {
    PROVINCES.get(name).copied().unwrap_or(name)
}
