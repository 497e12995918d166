use crate::interop::{arr_f64, arr_u32, arr_u8, new_obj, set_kv, to_js, JsProjector};
use crate::NuclearMap;
use js_sys::{Array, Function, Object};
use nucmap::config::MapConfig;
use nucmap::error::IngestError;
use nucmap::geometry::limits;
use nucmap::ingest::Mode;
use nucmap::interaction::MapEvent;
use nucmap::markers::glyph_arrays;
use nucmap::model::{FeatureKind, FeatureRef, LonLat, PointFeature};
use nucmap::palette::status_badge_color;
use nucmap::LoadSummary;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
type JsValue = wasm_bindgen::JsValue;
use crate::error;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Sends core log records to the console. `level`: 0 off, 1 error, 2 warn,
/// 3 info, 4 debug, 5 trace. Returns false if a logger was already set.
#[wasm_bindgen]
pub fn init_logging(level: u8) -> bool {
    crate::logging::init(crate::logging::level_filter(level))
}

fn from_js(v: JsValue) -> Result<Value, JsValue> {
    serde_wasm_bindgen::from_value::<Value>(v).map_err(error::json_parse)
}

fn log_summary(what: &str, s: &LoadSummary) {
    let msg = format!("{}: {} loaded, {} skipped, {} without coordinates", what, s.loaded, s.skipped, s.ungeolocated);
    if s.skipped > 0 {
        web_sys::console::warn_1(&JsValue::from_str(&msg));
    } else {
        web_sys::console::debug_1(&JsValue::from_str(&msg));
    }
}

/// Feature record plus `status_color` (`#rrggbb`) for the detail badge.
fn feature_js(f: &PointFeature) -> JsValue {
    let v = to_js(f);
    if let Some(o) = v.dyn_ref::<Object>() {
        set_kv(o, "status_color", &JsValue::from_str(&status_badge_color(f).to_hex()));
    }
    v
}

type Loader = fn(&mut nucmap::NuclearMap, Value, Mode) -> Result<LoadSummary, IngestError>;

impl NuclearMap {
    fn load_lenient(&mut self, what: &str, v: JsValue, f: Loader) -> bool {
        let Ok(val) = from_js(v) else { return false };
        match f(&mut self.inner, val, Mode::Lenient) {
            Ok(s) => { log_summary(what, &s); true }
            Err(e) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!("{}: {}", what, e)));
                false
            }
        }
    }

    fn load_strict(&mut self, what: &str, v: JsValue, f: Loader) -> JsValue {
        let val = match from_js(v) {
            Ok(val) => val,
            Err(e) => return e,
        };
        match f(&mut self.inner, val, Mode::Strict) {
            Ok(s) => { log_summary(what, &s); error::ok(to_js(&s)) }
            Err(e) => error::ingest(e),
        }
    }

    fn check_view(zoom: f64, lon: f64, lat: f64) -> Option<JsValue> {
        if !zoom.is_finite() { return Some(error::non_finite("zoom")); }
        if !lon.is_finite() { return Some(error::non_finite("lon")); }
        if !lat.is_finite() { return Some(error::non_finite("lat")); }
        if !limits::in_zoom_bounds(zoom) {
            return Some(error::out_of_range("zoom", limits::ZOOM_MIN, limits::ZOOM_MAX, zoom));
        }
        if !limits::in_lon_bounds(lon) {
            return Some(error::out_of_range("lon", limits::LON_MIN, limits::LON_MAX, lon));
        }
        if !limits::in_lat_bounds(lat) {
            return Some(error::out_of_range("lat", limits::LAT_MIN, limits::LAT_MAX, lat));
        }
        None
    }
}

#[wasm_bindgen]
impl NuclearMap {
    #[wasm_bindgen(constructor)]
    pub fn new() -> NuclearMap {
        crate::NuclearMap::rs_new()
    }
    pub fn data_version(&self) -> u64 {
        self.rs_data_version()
    }

    // Config
    pub fn get_config(&self) -> JsValue {
        to_js(self.inner.config())
    }
    pub fn set_config_res(&mut self, v: JsValue) -> JsValue {
        let val = match from_js(v) {
            Ok(val) => val,
            Err(e) => return e,
        };
        match MapConfig::from_json_value(val).and_then(|cfg| self.inner.set_config(cfg)) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::ingest(e),
        }
    }

    // Loading: plain variants skip bad rows, `_res` variants reject the batch.
    pub fn load_countries(&mut self, v: JsValue) -> bool {
        self.load_lenient("countries", v, nucmap::NuclearMap::load_countries)
    }
    pub fn load_countries_res(&mut self, v: JsValue) -> JsValue {
        self.load_strict("countries", v, nucmap::NuclearMap::load_countries)
    }
    pub fn load_plants(&mut self, v: JsValue) -> bool {
        self.load_lenient("plants", v, |m, v, mode| m.load_features(FeatureKind::Plant, v, mode))
    }
    pub fn load_plants_res(&mut self, v: JsValue) -> JsValue {
        self.load_strict("plants", v, |m, v, mode| m.load_features(FeatureKind::Plant, v, mode))
    }
    pub fn load_waste_facilities(&mut self, v: JsValue) -> bool {
        self.load_lenient("waste_facilities", v, |m, v, mode| m.load_features(FeatureKind::WasteFacility, v, mode))
    }
    pub fn load_waste_facilities_res(&mut self, v: JsValue) -> JsValue {
        self.load_strict("waste_facilities", v, |m, v, mode| m.load_features(FeatureKind::WasteFacility, v, mode))
    }
    pub fn load_reports(&mut self, v: JsValue) -> bool {
        self.load_lenient("report_tables", v, nucmap::NuclearMap::load_reports)
    }
    pub fn load_reports_res(&mut self, v: JsValue) -> JsValue {
        self.load_strict("report_tables", v, nucmap::NuclearMap::load_reports)
    }
    /// Flat export form: table metadata plus `{table_id, iso3, data}` rows.
    pub fn load_reports_flat_res(&mut self, tables: JsValue, data: JsValue) -> JsValue {
        let (tables, data) = match (from_js(tables), from_js(data)) {
            (Ok(t), Ok(d)) => (t, d),
            (Err(e), _) | (_, Err(e)) => return e,
        };
        match self.inner.load_reports_flat(tables, data, Mode::Strict) {
            Ok(s) => { log_summary("report_tables", &s); error::ok(to_js(&s)) }
            Err(e) => error::ingest(e),
        }
    }
    pub fn load_reactor_stats(&mut self, v: JsValue) -> bool {
        self.load_lenient("reactor_statistics", v, nucmap::NuclearMap::load_reactor_stats)
    }
    pub fn load_reactor_stats_res(&mut self, v: JsValue) -> JsValue {
        self.load_strict("reactor_statistics", v, nucmap::NuclearMap::load_reactor_stats)
    }

    // Reports, search and country paint
    pub fn report_tables(&self) -> JsValue {
        to_js(self.inner.report_tables())
    }
    pub fn active_report_id(&self) -> Option<String> {
        self.inner.active_report().map(|r| r.table_id.clone())
    }
    pub fn select_report(&mut self, id: &str) -> bool {
        self.inner.select_report(id).is_ok()
    }
    pub fn select_report_res(&mut self, id: &str) -> JsValue {
        match self.inner.select_report(id) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::ingest(e),
        }
    }
    pub fn clear_report(&mut self) {
        self.inner.clear_report();
    }
    pub fn set_query(&mut self, query: &str) {
        self.inner.set_query(query);
    }
    pub fn country(&self, iso3: &str) -> JsValue {
        self.inner.country(iso3).map(to_js).unwrap_or(JsValue::NULL)
    }
    pub fn country_style(&self, raw_iso3: &str, name: &str, continent: Option<String>) -> JsValue {
        match self.inner.country_style(raw_iso3, name, continent.as_deref()) {
            Ok(s) => to_js(&s),
            Err(_) => JsValue::NULL,
        }
    }
    pub fn country_style_res(&self, raw_iso3: &str, name: &str, continent: Option<String>) -> JsValue {
        match self.inner.country_style(raw_iso3, name, continent.as_deref()) {
            Ok(s) => error::ok(to_js(&s)),
            Err(e) => error::scale(e),
        }
    }
    /// Fill as `#rrggbb`, neutral when the value cannot be scaled.
    pub fn country_fill(&self, raw_iso3: &str, name: &str, continent: Option<String>) -> String {
        self.inner
            .country_style(raw_iso3, name, continent.as_deref())
            .map(|s| s.fill.to_hex())
            .unwrap_or_else(|_| nucmap::palette::NEUTRAL.to_hex())
    }
    pub fn legend(&self) -> JsValue {
        let arr = Array::new();
        for (name, color) in self.inner.legend() {
            let o = new_obj();
            set_kv(&o, "name", &JsValue::from_str(name));
            set_kv(&o, "color", &JsValue::from_str(&color.to_hex()));
            arr.push(&o.into());
        }
        arr.into()
    }

    // Markers
    pub fn glyphs(&self) -> JsValue {
        to_js(&self.inner.all_glyphs())
    }
    /// Typed arrays for a batched draw, one entry per glyph in draw order.
    pub fn glyph_data(&self) -> JsValue {
        let glyphs = self.inner.all_glyphs();
        let a = glyph_arrays(&glyphs);
        let groups: Vec<_> = glyphs.iter().map(|g| g.group).collect();
        let obj = new_obj();
        set_kv(&obj, "positions", &arr_f64(&a.positions).into());
        set_kv(&obj, "colors", &arr_u8(&a.colors).into());
        set_kv(&obj, "counts", &arr_u32(&a.counts).into());
        set_kv(&obj, "states", &arr_u8(&a.states).into());
        set_kv(&obj, "groups", &to_js(&groups));
        obj.into()
    }
    pub fn pick(&self, x: f64, y: f64, tol: f64, project: &Function) -> JsValue {
        let proj = JsProjector { project };
        match self.inner.pick(&proj, x, y, tol) {
            Some(p) => to_js(&p),
            None => JsValue::NULL,
        }
    }
    pub fn pick_res(&self, x: f64, y: f64, tol: f64, project: &Function) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        if !tol.is_finite() {
            return error::non_finite("tol");
        }
        if tol < 0.0 {
            return error::out_of_range("tol", 0.0, f64::INFINITY, tol);
        }
        error::ok(self.pick(x, y, tol, project))
    }
    pub fn feature_res(&self, layer: u8, id: u32) -> JsValue {
        let Some(kind) = FeatureKind::from_u8(layer) else {
            return error::invalid_layer(layer);
        };
        match self.inner.feature(FeatureRef { kind, id }) {
            Some(f) => error::ok(feature_js(f)),
            None => error::invalid_id(kind.as_str(), id),
        }
    }

    // Interaction
    pub fn handle_event(&mut self, event: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<MapEvent>(event) {
            Ok(ev) => to_js(&self.inner.handle_event(ev)),
            Err(_) => JsValue::NULL,
        }
    }
    pub fn handle_event_res(&mut self, event: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<MapEvent>(event) {
            Ok(ev) => error::ok(to_js(&self.inner.handle_event(ev))),
            Err(e) => error::json_parse(e),
        }
    }
    pub fn set_view(&mut self, zoom: f64, lon: f64, lat: f64) -> JsValue {
        to_js(&self.inner.set_view(zoom, LonLat::new(lon, lat)))
    }
    pub fn set_view_res(&mut self, zoom: f64, lon: f64, lat: f64) -> JsValue {
        if let Some(e) = Self::check_view(zoom, lon, lat) {
            return e;
        }
        error::ok(self.set_view(zoom, lon, lat))
    }
    pub fn interaction(&self) -> JsValue {
        to_js(self.inner.interaction())
    }
    pub fn selected_feature(&self) -> JsValue {
        self.inner.selected_feature().map(feature_js).unwrap_or(JsValue::NULL)
    }
    pub fn selected_country(&self) -> JsValue {
        self.inner.selected_country().map(to_js).unwrap_or(JsValue::NULL)
    }

    // Statistics
    pub fn reactor_stats(&self) -> JsValue {
        to_js(self.inner.reactor_stats())
    }
    pub fn top_reactor_stats(&self, n: u32) -> JsValue {
        to_js(&self.inner.top_reactor_stats(n as usize))
    }
    pub fn unit_totals(&self) -> JsValue {
        to_js(&self.inner.unit_totals())
    }
}
