//! ISO3 normalization for map features whose boundary data carries a missing
//! or placeholder code.

/// Placeholder the boundary dataset uses for disputed or unassigned territories.
pub const PLACEHOLDER_ISO3: &str = "-99";

const NAME_TO_ISO3: [(&str, &str); 10] = [
    ("United States of America", "USA"),
    ("United Kingdom", "GBR"),
    ("South Africa", "ZAF"),
    ("Turkey", "TUR"),
    ("Türkiye", "TUR"),
    ("Spain", "ESP"),
    ("Sweden", "SWE"),
    ("Germany", "DEU"),
    ("Brazil", "BRA"),
    ("Australia", "AUS"),
];

pub fn iso3_for_name(name: &str) -> Option<&'static str> {
    NAME_TO_ISO3.iter().find(|(n, _)| *n == name).map(|(_, iso)| *iso)
}

pub fn is_valid_iso3(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Uppercased code; the name table fills in empty or placeholder codes. When no
/// fallback exists the raw code is returned as-is.
pub fn normalize_iso3(raw: &str, name: &str) -> String {
    let raw = raw.trim();
    if !raw.is_empty() && raw != PLACEHOLDER_ISO3 {
        return raw.to_ascii_uppercase();
    }
    match iso3_for_name(name.trim()) {
        Some(iso) => iso.to_string(),
        None => raw.to_string(),
    }
}

pub fn same_country(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_falls_back_to_name() {
        assert_eq!(normalize_iso3("-99", "Türkiye"), "TUR");
        assert_eq!(normalize_iso3("", "United Kingdom"), "GBR");
        assert_eq!(normalize_iso3("-99", "Somaliland"), "-99");
        assert_eq!(normalize_iso3(" fra ", "France"), "FRA");
    }

    #[test]
    fn validity_and_matching() {
        assert!(is_valid_iso3("DEU"));
        assert!(!is_valid_iso3("DE"));
        assert!(!is_valid_iso3("-99"));
        assert!(same_country("usa", "USA "));
    }
}
