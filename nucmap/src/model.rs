use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    /// `0xRRGGBB`, fully opaque.
    pub const fn hex(v: u32) -> Color {
        Color::rgb(((v >> 16) & 0xff) as u8, ((v >> 8) & 0xff) as u8, (v & 0xff) as u8)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> LonLat {
        LonLat { lon, lat }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Plant = 0,
    WasteFacility = 1,
}

impl FeatureKind {
    pub fn from_u8(v: u8) -> Option<FeatureKind> {
        match v {
            0 => Some(FeatureKind::Plant),
            1 => Some(FeatureKind::WasteFacility),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Plant => "plant",
            FeatureKind::WasteFacility => "waste_facility",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureDetail {
    Plant {
        status: String,
        reactor_type: Option<String>,
        net_electrical_mw: Option<f64>,
        commissioning_year: Option<i32>,
        shutdown_year: Option<i32>,
        source_cite: Option<String>,
    },
    WasteFacility {
        site_name: Option<String>,
        facility_type: String,
        waste_level: Option<String>,
        waste_types: Option<String>,
        status: String,
        commissioning_year: Option<i32>,
        closure_year: Option<i32>,
        source_cite: Option<String>,
    },
}

/// A located plant or waste facility. `id` is unique within its kind only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub id: u32,
    pub iso3: String,
    pub name: String,
    pub position: Option<LonLat>,
    pub detail: FeatureDetail,
}

impl PointFeature {
    pub fn kind(&self) -> FeatureKind {
        match self.detail {
            FeatureDetail::Plant { .. } => FeatureKind::Plant,
            FeatureDetail::WasteFacility { .. } => FeatureKind::WasteFacility,
        }
    }

    /// Plant status or waste facility type; drives marker color only.
    pub fn category(&self) -> &str {
        match &self.detail {
            FeatureDetail::Plant { status, .. } => status,
            FeatureDetail::WasteFacility { facility_type, .. } => facility_type,
        }
    }

    pub fn feature_ref(&self) -> FeatureRef {
        FeatureRef { kind: self.kind(), id: self.id }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureRef {
    pub kind: FeatureKind,
    pub id: u32,
}

/// Quantized coordinate cell. Cells count multiples of the grid precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridKey {
    pub lat_cell: i64,
    pub lon_cell: i64,
}

/// Identifies one location group across both marker layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef {
    pub layer: FeatureKind,
    pub key: GridKey,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
    pub key: GridKey,
    /// The rounded coordinate pair the key stands for.
    pub key_position: LonLat,
    pub members: Vec<PointFeature>,
}

impl LocationGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_cluster(&self) -> bool {
        self.members.len() > 1
    }

    /// Arithmetic mean of member positions; falls back to the key position.
    pub fn centroid(&self) -> LonLat {
        let mut n = 0usize;
        let (mut sx, mut sy) = (0.0f64, 0.0f64);
        for p in self.members.iter().filter_map(|m| m.position) {
            sx += p.lon;
            sy += p.lat;
            n += 1;
        }
        if n == 0 {
            return self.key_position;
        }
        LonLat::new(sx / n as f64, sy / n as f64)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryRow {
    pub iso3: String,
    pub name: String,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub capital: Option<String>,
    pub population: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationType {
    Map,
    Bar,
    Pie,
    Table,
    Mixed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub iso3: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub id: String,
    pub title: String,
    pub kind: VisualizationType,
    pub value_key: String,
    pub rows: Vec<ReportRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactorStatistic {
    pub iso3: String,
    pub name: String,
    pub operational_units: u32,
    pub operational_capacity_mw: f64,
    pub under_construction_units: u32,
    pub under_construction_capacity_mw: f64,
    pub shutdown_units: u32,
    pub reference_year: i32,
}

/// The one detail panel the UI shows at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Feature { feature: FeatureRef },
    Country { iso3: String },
}
