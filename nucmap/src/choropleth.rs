//! Country fill arbitration: report shading over continent coloring, with the
//! search filter applied last.

use crate::algorithms::color_scale::ColorScale;
use crate::error::{IngestError, ScaleError};
use crate::model::{Color, ReportTable};
use crate::palette::{continent_or_neutral, SEARCH_MUTED};
use std::collections::HashMap;

/// The active report, indexed by country for fill lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportSelection {
    pub table_id: String,
    pub values: HashMap<String, f64>,
    /// Largest value in the table, or 0 for an empty table.
    pub max_value: f64,
}

impl ReportSelection {
    /// Fails on a non-finite value or on a country listed twice.
    pub fn from_table(table: &ReportTable) -> Result<ReportSelection, IngestError> {
        let mut values = HashMap::with_capacity(table.rows.len());
        for row in &table.rows {
            if !row.value.is_finite() {
                return Err(IngestError::non_finite(&table.value_key));
            }
            let key = row.iso3.to_ascii_uppercase();
            if values.insert(key.clone(), row.value).is_some() {
                return Err(IngestError::duplicate_country(&table.id, &key));
            }
        }
        Ok(ReportSelection { table_id: table.id.clone(), max_value: max_of(values.values().copied()), values })
    }

    pub fn value(&self, iso3: &str) -> Option<f64> {
        self.values.get(&iso3.to_ascii_uppercase()).copied()
    }
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0f64, f64::max)
}

/// Report color when the active report has a row for the country, otherwise the
/// continent color (neutral gray when the continent is unknown).
pub fn fill_for<F>(
    iso3: &str,
    active: Option<&ReportSelection>,
    scale: &ColorScale,
    continent_of: F,
) -> Result<Color, ScaleError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(report) = active {
        if let Some(v) = report.value(iso3) {
            return scale.color_for(v, report.max_value);
        }
    }
    Ok(continent_or_neutral(continent_of(iso3).as_deref()))
}

/// Case-insensitive substring match on name or code; an empty query matches all.
pub fn matches_query(name: &str, iso3: &str, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    q.is_empty() || name.to_lowercase().contains(&q) || iso3.to_lowercase().contains(&q)
}

/// Replaces the fill outright with the muted color when the search excludes
/// the country.
pub fn apply_search(fill: Color, name: &str, iso3: &str, query: &str) -> Color {
    if matches_query(name, iso3, query) {
        fill
    } else {
        SEARCH_MUTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::color_scale::{SCALE_HIGH, SCALE_LOW};
    use crate::model::{ReportRow, VisualizationType};
    use crate::palette::{continent_color, NEUTRAL};

    fn table(rows: &[(&str, f64)]) -> ReportTable {
        ReportTable {
            id: "reactors".into(),
            title: "Reactors".into(),
            kind: VisualizationType::Map,
            value_key: "units".into(),
            rows: rows.iter().map(|(iso, v)| ReportRow { iso3: iso.to_string(), value: *v }).collect(),
        }
    }

    fn continent_of(iso: &str) -> Option<String> {
        match iso {
            "USA" => Some("North America".into()),
            "FRA" | "DEU" => Some("Europe".into()),
            "BRA" => Some("South America".into()),
            _ => None,
        }
    }

    #[test]
    fn report_rows_shade_and_others_fall_back() {
        let sel = ReportSelection::from_table(&table(&[("USA", 100.0), ("FRA", 50.0), ("DEU", 0.0)])).unwrap();
        assert_eq!(sel.max_value, 100.0);
        let s = ColorScale::default();
        assert_eq!(fill_for("USA", Some(&sel), &s, continent_of).unwrap(), SCALE_HIGH);
        assert_eq!(fill_for("DEU", Some(&sel), &s, continent_of).unwrap(), SCALE_LOW);
        assert_eq!(fill_for("BRA", Some(&sel), &s, continent_of).unwrap(), continent_color("South America").unwrap());
        assert_eq!(fill_for("XKX", Some(&sel), &s, continent_of).unwrap(), NEUTRAL);
        assert_eq!(fill_for("USA", None, &s, continent_of).unwrap(), continent_color("North America").unwrap());
    }

    #[test]
    fn duplicates_are_rejected() {
        let t = table(&[("FRA", 1.0), ("fra", 9.0)]);
        assert_eq!(ReportSelection::from_table(&t).unwrap_err().code, "duplicate_country");
    }

    #[test]
    fn empty_and_negative_tables_have_zero_max() {
        assert_eq!(ReportSelection::from_table(&table(&[])).unwrap().max_value, 0.0);
        let sel = ReportSelection::from_table(&table(&[("FRA", -4.0)])).unwrap();
        assert_eq!(sel.max_value, 0.0);
        let c = fill_for("FRA", Some(&sel), &ColorScale::default(), continent_of).unwrap();
        assert_eq!(c, SCALE_LOW);
    }

    #[test]
    fn search_mutes_without_blending() {
        let fill = continent_color("Europe").unwrap();
        assert_eq!(apply_search(fill, "Germany", "DEU", "  GER "), fill);
        assert_eq!(apply_search(fill, "Germany", "DEU", "deu"), fill);
        assert_eq!(apply_search(fill, "Germany", "DEU", "fra"), SEARCH_MUTED);
        assert_eq!(apply_search(fill, "Germany", "DEU", ""), fill);
    }
}
