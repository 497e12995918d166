//! Fixed colors: continents, marker categories and country interaction states.

use crate::model::{Color, FeatureDetail, FeatureKind, PointFeature};

pub const NEUTRAL: Color = Color::hex(0xe2e8f0);
pub const SEARCH_MUTED: Color = Color::hex(0xf1f5f9);
pub const COUNTRY_HOVER: Color = Color::hex(0x0ea5e9);
pub const COUNTRY_PRESSED: Color = Color::hex(0x0284c7);
pub const COUNTRY_STROKE: Color = Color::hex(0xffffff);

/// Legend order.
pub const CONTINENTS: [(&str, Color); 7] = [
    ("Africa", Color::hex(0x10b981)),
    ("Asia", Color::hex(0xf59e0b)),
    ("Europe", Color::hex(0x3b82f6)),
    ("North America", Color::hex(0xef4444)),
    ("South America", Color::hex(0x8b5cf6)),
    ("Oceania", Color::hex(0x14b8a6)),
    ("Antarctica", Color::hex(0x94a3b8)),
];

pub const PLANT_OTHER: Color = Color::hex(0x6b7280);
pub const WASTE_OTHER: Color = Color::hex(0x64748b);

pub fn continent_color(continent: &str) -> Option<Color> {
    CONTINENTS.iter().find(|(name, _)| *name == continent).map(|(_, c)| *c)
}

pub fn continent_or_neutral(continent: Option<&str>) -> Color {
    continent.and_then(continent_color).unwrap_or(NEUTRAL)
}

pub fn plant_status_color(status: &str) -> Color {
    match status {
        "operational" => Color::hex(0x16a34a),
        "construction" => Color::hex(0xeab308),
        "planning" => Color::hex(0x3b82f6),
        "site_characterization" => Color::hex(0x8b5cf6),
        "decommissioning" => Color::hex(0xf97316),
        "shutdown" => Color::hex(0xdc2626),
        _ => PLANT_OTHER,
    }
}

/// Facility types are free text in the source data, so match on keywords.
pub fn waste_type_color(facility_type: &str) -> Color {
    let t = facility_type.to_lowercase();
    if t.contains("disposal") || t.contains("repository") {
        Color::hex(0x7c3aed)
    } else if t.contains("storage") {
        Color::hex(0x0891b2)
    } else if t.contains("treatment") || t.contains("processing") || t.contains("conditioning") {
        Color::hex(0xdb2777)
    } else {
        WASTE_OTHER
    }
}

/// Badge color for a waste facility's status line.
pub fn waste_status_color(status: &str) -> Color {
    let s = status.to_lowercase();
    if s.contains("operational") {
        Color::hex(0x15803d)
    } else if s.contains("construction") {
        Color::hex(0xa16207)
    } else if s.contains("closed") || s.contains("decommission") {
        Color::hex(0xb91c1c)
    } else {
        Color::hex(0x334155)
    }
}

/// Color of the status badge in a feature's detail panel.
pub fn status_badge_color(f: &PointFeature) -> Color {
    match &f.detail {
        FeatureDetail::Plant { status, .. } => plant_status_color(status),
        FeatureDetail::WasteFacility { status, .. } => waste_status_color(status),
    }
}

pub fn category_color(kind: FeatureKind, category: &str) -> Color {
    match kind {
        FeatureKind::Plant => plant_status_color(category),
        FeatureKind::WasteFacility => waste_type_color(category),
    }
}
