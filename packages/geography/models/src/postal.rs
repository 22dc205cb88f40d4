//! Two-digit postal prefix utilities.
//!
//! The first two digits of a Spanish five-digit code identify the
//! province. The income dashboard labels each municipality with the
//! region name looked up from this prefix.

/// All 52 two-digit prefixes, `"01"` through `"52"`.
pub const POSTAL_PREFIXES: &[&str] = &[
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13", "14", "15", "16",
    "17", "18", "19", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "30", "31", "32",
    "33", "34", "35", "36", "37", "38", "39", "40", "41", "42", "43", "44", "45", "46", "47", "48",
    "49", "50", "51", "52",
];

/// Maps a two-digit prefix to the region name shown next to income rows.
///
/// Returns `None` for unrecognized prefixes.
#[must_use]
pub fn region_for_prefix(prefix: &str) -> Option<&'static str> {
    let name = match prefix {
        "01" => "Araba/Álava",
        "02" => "Albacete",
        "03" => "Alicante/Alacant",
        "04" => "Almería",
        "05" => "Ávila",
        "06" => "Badajoz",
        "07" => "Balears, Illes",
        "08" => "Barcelona",
        "09" => "Burgos",
        "10" => "Cáceres",
        "11" => "Cádiz",
        "12" => "Castellón/Castelló",
        "13" => "Ciudad Real",
        "14" => "Córdoba",
        "15" => "Coruña, A",
        "16" => "Cuenca",
        "17" => "Girona",
        "18" => "Granada",
        "19" => "Guadalajara",
        "20" => "Gipuzkoa",
        "21" => "Huelva",
        "22" => "Huesca",
        "23" => "Jaén",
        "24" => "León",
        "25" => "Lleida",
        "26" => "Rioja, La",
        "27" => "Lugo",
        "28" => "Madrid",
        "29" => "Málaga",
        "30" => "Murcia",
        "31" => "Navarra",
        "32" => "Ourense",
        "33" => "Asturias",
        "34" => "Palencia",
        "35" => "Palmas, Las",
        "36" => "Pontevedra",
        "37" => "Salamanca",
        "38" => "Santa Cruz de Tenerife",
        "39" => "Cantabria",
        "40" => "Segovia",
        "41" => "Sevilla",
        "42" => "Soria",
        "43" => "Tarragona",
        "44" => "Teruel",
        "45" => "Toledo",
        "46" => "Valencia/València",
        "47" => "Valladolid",
        "48" => "Bizkaia",
        "49" => "Zamora",
        "50" => "Zaragoza",
        "51" => "Ceuta",
        "52" => "Melilla",
        _ => return None,
    };
    Some(name)
}

/// Returns the leading five ASCII digits of `label`, or `None` when the
/// label does not start with at least five digits.
#[must_use]
pub fn postal_code(label: &str) -> Option<&str> {
    let code = label.trim_start().get(..5)?;
    code.bytes().all(|b| b.is_ascii_digit()).then_some(code)
}

/// Region name for a full five-digit code, looked up from its prefix.
#[must_use]
pub fn region_for_code(code: &str) -> Option<&'static str> {
    region_for_prefix(code.get(..2)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_count() {
        assert_eq!(POSTAL_PREFIXES.len(), 52);
    }

    #[test]
    fn every_prefix_has_a_region() {
        for prefix in POSTAL_PREFIXES {
            assert!(
                region_for_prefix(prefix).is_some(),
                "no region for prefix {prefix}"
            );
        }
    }

    #[test]
    fn unknown_prefix() {
        assert_eq!(region_for_prefix("00"), None);
        assert_eq!(region_for_prefix("53"), None);
        assert_eq!(region_for_prefix("9"), None);
    }

    #[test]
    fn extracts_code_from_label() {
        assert_eq!(postal_code("28001 Madrid"), Some("28001"));
        assert_eq!(region_for_code("28001"), Some("Madrid"));
    }

    #[test]
    fn rejects_labels_without_five_digits() {
        assert_eq!(postal_code("Madrid"), None);
        assert_eq!(postal_code("2800 Madrid"), None);
        assert_eq!(postal_code("Total"), None);
        assert_eq!(postal_code(""), None);
    }

    #[test]
    fn multibyte_label_does_not_panic() {
        assert_eq!(postal_code("Ávila"), None);
        assert_eq!(postal_code("0500é"), None);
    }
}
