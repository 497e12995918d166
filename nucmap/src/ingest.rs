//! Conversion of loosely shaped JSON rows from the data source into typed
//! records. Lenient mode skips bad rows and counts them; strict mode stops at
//! the first bad row with a coded error.

use crate::error::IngestError;
use crate::geometry::limits;
use crate::iso::is_valid_iso3;
use crate::model::{
    CountryRow, FeatureDetail, LonLat, PointFeature, ReactorStatistic, ReportRow, ReportTable,
    VisualizationType,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Lenient,
    Strict,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Loaded<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

// Postgres numeric columns arrive as strings, so numbers are accepted in both forms.
fn num_from_value(v: &Value) -> Result<Option<f64>, String> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| "unrepresentable number".to_string()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| format!("'{}' is not a number", s)),
        other => Err(format!("expected number, got {}", other)),
    }
}

fn de_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    match num_from_value(&v).map_err(serde::de::Error::custom)? {
        Some(x) if !x.is_finite() => Err(serde::de::Error::custom("non-finite number")),
        other => Ok(other),
    }
}

fn de_opt_i32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    Ok(de_opt_f64(d)?.map(|x| x.round() as i32))
}

fn de_opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(de_opt_f64(d)?.map(|x| x.round() as i64))
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    match de_opt_f64(d)? {
        Some(x) if x >= 0.0 && x <= u32::MAX as f64 && x.fract() == 0.0 => Ok(x as u32),
        _ => Err(serde::de::Error::custom("id must be a non-negative integer")),
    }
}

fn rows_array(v: Value, what: &str, cap: usize) -> Result<Vec<Value>, IngestError> {
    match v {
        Value::Array(items) => {
            if items.len() > cap {
                return Err(IngestError::caps_exceeded(what, cap));
            }
            Ok(items)
        }
        _ => Err(IngestError::invalid_structure(format!("{} must be an array", what))),
    }
}

fn collect<T, F>(items: Vec<Value>, what: &str, mode: Mode, mut f: F) -> Result<Loaded<T>, IngestError>
where
    F: FnMut(Value) -> Result<T, IngestError>,
{
    let mut rows = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for (i, item) in items.into_iter().enumerate() {
        match f(item) {
            Ok(row) => rows.push(row),
            Err(e) => match mode {
                Mode::Strict => return Err(IngestError::new(e.code, format!("{}[{}]: {}", what, i, e.message))),
                Mode::Lenient => {
                    log::warn!("skipping {}[{}]: {}", what, i, e);
                    skipped += 1;
                }
            },
        }
    }
    Ok(Loaded { rows, skipped })
}

fn parse_row<'a, T: Deserialize<'a>>(v: &'a Value) -> Result<T, IngestError> {
    T::deserialize(v).map_err(|e| IngestError::invalid_structure(e.to_string()))
}

fn check_iso3(raw: &str) -> Result<String, IngestError> {
    let iso = raw.trim().to_ascii_uppercase();
    if !is_valid_iso3(&iso) {
        return Err(IngestError::invalid_iso3(raw));
    }
    Ok(iso)
}

fn check_name(name: &str) -> Result<(), IngestError> {
    if name.len() > limits::MAX_NAME_LEN {
        return Err(IngestError::out_of_bounds("name"));
    }
    Ok(())
}

fn check_text(field: &str, v: &Option<String>) -> Result<(), IngestError> {
    match v {
        Some(s) if s.len() > limits::MAX_TEXT_LEN => Err(IngestError::out_of_bounds(field)),
        _ => Ok(()),
    }
}

/// Both coordinates present and in range make a position. A lone coordinate
/// means no position; an out-of-range one is an error in strict mode.
fn position(lat: Option<f64>, lon: Option<f64>, mode: Mode) -> Result<Option<LonLat>, IngestError> {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Ok(None);
    };
    if !limits::in_lat_bounds(lat) {
        return match mode {
            Mode::Strict => Err(IngestError::out_of_bounds("latitude")),
            Mode::Lenient => Ok(None),
        };
    }
    if !limits::in_lon_bounds(lon) {
        return match mode {
            Mode::Strict => Err(IngestError::out_of_bounds("longitude")),
            Mode::Lenient => Ok(None),
        };
    }
    Ok(Some(LonLat::new(lon, lat)))
}

#[derive(Deserialize)]
struct CountryDe {
    iso3: String,
    name: String,
    region: Option<String>,
    subregion: Option<String>,
    capital: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    population: Option<i64>,
    notes: Option<String>,
}

pub fn countries_from_json(v: Value, mode: Mode) -> Result<Loaded<CountryRow>, IngestError> {
    let items = rows_array(v, "countries", limits::MAX_COUNTRIES)?;
    collect(items, "countries", mode, |item| {
        let c: CountryDe = parse_row(&item)?;
        check_name(&c.name)?;
        check_text("notes", &c.notes)?;
        Ok(CountryRow {
            iso3: check_iso3(&c.iso3)?,
            name: c.name,
            region: c.region,
            subregion: c.subregion,
            capital: c.capital,
            population: c.population,
            notes: c.notes,
        })
    })
}

#[derive(Deserialize)]
struct PlantDe {
    #[serde(deserialize_with = "de_id")]
    id: u32,
    iso3: String,
    name: String,
    status: Option<String>,
    reactor_type: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    net_electrical_mw: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_i32")]
    commissioning_year: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_i32")]
    shutdown_year: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    longitude: Option<f64>,
    source_cite: Option<String>,
}

pub fn plants_from_json(v: Value, mode: Mode) -> Result<Loaded<PointFeature>, IngestError> {
    let items = rows_array(v, "plants", limits::MAX_FEATURES)?;
    collect(items, "plants", mode, |item| {
        let p: PlantDe = parse_row(&item)?;
        check_name(&p.name)?;
        Ok(PointFeature {
            id: p.id,
            iso3: check_iso3(&p.iso3)?,
            name: p.name,
            position: position(p.latitude, p.longitude, mode)?,
            detail: FeatureDetail::Plant {
                status: p.status.map(|s| s.trim().to_lowercase()).unwrap_or_else(|| "unknown".into()),
                reactor_type: p.reactor_type,
                net_electrical_mw: p.net_electrical_mw,
                commissioning_year: p.commissioning_year,
                shutdown_year: p.shutdown_year,
                source_cite: p.source_cite,
            },
        })
    })
}

#[derive(Deserialize)]
struct WasteDe {
    #[serde(deserialize_with = "de_id")]
    id: u32,
    iso3: String,
    name: String,
    site_name: Option<String>,
    facility_type: Option<String>,
    waste_level: Option<String>,
    waste_types: Option<String>,
    status: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i32")]
    commissioning_year: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_i32")]
    closure_year: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    longitude: Option<f64>,
    source_cite: Option<String>,
}

pub fn waste_facilities_from_json(v: Value, mode: Mode) -> Result<Loaded<PointFeature>, IngestError> {
    let items = rows_array(v, "waste_facilities", limits::MAX_FEATURES)?;
    collect(items, "waste_facilities", mode, |item| {
        let w: WasteDe = parse_row(&item)?;
        check_name(&w.name)?;
        check_text("waste_types", &w.waste_types)?;
        Ok(PointFeature {
            id: w.id,
            iso3: check_iso3(&w.iso3)?,
            name: w.name,
            position: position(w.latitude, w.longitude, mode)?,
            detail: FeatureDetail::WasteFacility {
                site_name: w.site_name,
                facility_type: w.facility_type.unwrap_or_default(),
                waste_level: w.waste_level,
                waste_types: w.waste_types,
                status: w.status.unwrap_or_default(),
                commissioning_year: w.commissioning_year,
                closure_year: w.closure_year,
                source_cite: w.source_cite,
            },
        })
    })
}

#[derive(Deserialize)]
struct TableDe {
    #[serde(alias = "slug")]
    id: String,
    title: String,
    #[serde(rename = "type", default = "default_kind")]
    kind: VisualizationType,
    #[serde(alias = "mapKey", default = "default_map_key")]
    map_key: String,
    #[serde(alias = "valueKey")]
    value_key: String,
    #[serde(default)]
    data: Vec<Value>,
}

fn default_kind() -> VisualizationType {
    VisualizationType::Map
}

fn default_map_key() -> String {
    "iso3".to_string()
}

/// Rows missing the metric or carrying a non-numeric one are left out of the
/// table; a non-finite metric is an error in strict mode.
fn table_rows(t: &TableDe, mode: Mode) -> Result<Vec<ReportRow>, IngestError> {
    if t.data.len() > limits::MAX_REPORT_ROWS {
        return Err(IngestError::caps_exceeded("report rows", limits::MAX_REPORT_ROWS));
    }
    let mut rows: Vec<ReportRow> = Vec::with_capacity(t.data.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(t.data.len());
    for item in &t.data {
        let Some(raw_iso) = item.get(&t.map_key).and_then(Value::as_str) else {
            continue;
        };
        let iso3 = match check_iso3(raw_iso) {
            Ok(iso) => iso,
            Err(e) if mode == Mode::Strict => return Err(e),
            Err(_) => continue,
        };
        let value = match item.get(&t.value_key).map(num_from_value) {
            Some(Ok(Some(x))) => x,
            _ => continue,
        };
        if !value.is_finite() {
            match mode {
                Mode::Strict => return Err(IngestError::non_finite(&t.value_key)),
                Mode::Lenient => continue,
            }
        }
        match index.get(&iso3) {
            Some(_) if mode == Mode::Strict => return Err(IngestError::duplicate_country(&t.id, &iso3)),
            Some(&i) => rows[i].value = value,
            None => {
                index.insert(iso3.clone(), rows.len());
                rows.push(ReportRow { iso3, value });
            }
        }
    }
    Ok(rows)
}

pub fn report_tables_from_json(v: Value, mode: Mode) -> Result<Loaded<ReportTable>, IngestError> {
    let items = rows_array(v, "report_tables", limits::MAX_REPORT_TABLES)?;
    collect(items, "report_tables", mode, |item| {
        let t: TableDe = parse_row(&item)?;
        let rows = table_rows(&t, mode)?;
        Ok(ReportTable { id: t.id, title: t.title, kind: t.kind, value_key: t.value_key, rows })
    })
}

/// Joins the flat export form (table metadata plus `{table_id, iso3, data}`
/// rows) into nested tables, then loads them like `report_tables_from_json`.
pub fn report_tables_from_flat_json(tables: Value, data: Value, mode: Mode) -> Result<Loaded<ReportTable>, IngestError> {
    let metas = rows_array(tables, "report_tables", limits::MAX_REPORT_TABLES)?;
    let rows = rows_array(data, "report_data", limits::MAX_REPORT_ROWS * limits::MAX_REPORT_TABLES)?;
    let mut nested = Vec::with_capacity(metas.len());
    for meta in metas {
        let Value::Object(mut obj) = meta else {
            if mode == Mode::Strict {
                return Err(IngestError::invalid_structure("report table must be an object"));
            }
            continue;
        };
        let table_id = obj.get("id").cloned().unwrap_or(Value::Null);
        let data: Vec<Value> = rows
            .iter()
            .filter(|r| r.get("table_id") == Some(&table_id))
            .map(|r| {
                let mut flat = serde_json::Map::new();
                if let Some(iso) = r.get("iso3") {
                    flat.insert("iso3".into(), iso.clone());
                }
                if let Some(Value::Object(fields)) = r.get("data") {
                    for (k, v) in fields {
                        flat.insert(k.clone(), v.clone());
                    }
                }
                Value::Object(flat)
            })
            .collect();
        // The slug is the id the UI refers to.
        if let Some(slug) = obj.remove("slug") {
            obj.insert("id".into(), slug);
        } else if let Some(Value::Number(n)) = obj.get("id").cloned() {
            obj.insert("id".into(), Value::String(n.to_string()));
        }
        obj.insert("data".into(), Value::Array(data));
        nested.push(Value::Object(obj));
    }
    report_tables_from_json(Value::Array(nested), mode)
}

#[derive(Deserialize)]
struct StatDe {
    iso3: String,
    name: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    operational_units: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    operational_capacity_mw: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    under_construction_units: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    under_construction_capacity_mw: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    shutdown_units: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_i32")]
    reference_year: Option<i32>,
}

fn units(v: Option<f64>) -> u32 {
    v.map(|x| x.max(0.0).round() as u32).unwrap_or(0)
}

pub fn reactor_stats_from_json(v: Value, mode: Mode) -> Result<Loaded<ReactorStatistic>, IngestError> {
    let items = rows_array(v, "reactor_statistics", limits::MAX_COUNTRIES)?;
    collect(items, "reactor_statistics", mode, |item| {
        let s: StatDe = parse_row(&item)?;
        check_name(&s.name)?;
        Ok(ReactorStatistic {
            iso3: check_iso3(&s.iso3)?,
            name: s.name,
            operational_units: units(s.operational_units),
            operational_capacity_mw: s.operational_capacity_mw.unwrap_or(0.0),
            under_construction_units: units(s.under_construction_units),
            under_construction_capacity_mw: s.under_construction_capacity_mw.unwrap_or(0.0),
            shutdown_units: units(s.shutdown_units),
            reference_year: s.reference_year.unwrap_or(0),
        })
    })
}
