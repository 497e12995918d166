use js_sys::Reflect;
use nucmap_wasm::NuclearMap;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn parse(s: &str) -> JsValue {
    js_sys::JSON::parse(s).unwrap()
}

fn is_err(v: &JsValue, code: &str) -> bool {
    if let Ok(ok) =
        Reflect::get(v, &JsValue::from_str("ok")).and_then(|x| x.as_bool().ok_or(JsValue::NULL))
    {
        if ok {
            return false;
        }
        if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
            if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
                return c.as_string().map_or(false, |s| s == code);
            }
        }
    }
    false
}

#[wasm_bindgen_test]
fn strict_loads_reject_and_leave_state_alone() {
    let mut m = NuclearMap::new();
    let ver = m.data_version();
    assert!(is_err(&m.load_plants_res(parse(r#"{"rows": []}"#)), "invalid_structure"));
    assert!(is_err(
        &m.load_plants_res(parse(r#"[{"id": 1, "iso3": "SWE", "name": "R", "latitude": 91, "longitude": 12}]"#)),
        "out_of_bounds"
    ));
    assert!(is_err(&m.load_countries_res(parse(r#"[{"iso3": "SWEDEN", "name": "Sweden"}]"#)), "invalid_iso3"));
    assert!(is_err(
        &m.load_reports_res(parse(
            r#"[{"id": "t", "title": "T", "value_key": "v", "data": [{"iso3": "FRA", "v": 1}, {"iso3": "FRA", "v": 2}]}]"#
        )),
        "duplicate_country"
    ));
    assert_eq!(m.data_version(), ver, "state mutated on error");
}

#[wasm_bindgen_test]
fn view_and_pick_parameters_are_checked() {
    let mut m = NuclearMap::new();
    assert!(is_err(&m.set_view_res(f64::NAN, 0.0, 0.0), "non_finite"));
    assert!(is_err(&m.set_view_res(5000.0, 0.0, 0.0), "out_of_range"));
    assert!(is_err(&m.set_view_res(2.0, 0.0, 95.0), "out_of_range"));
    let project = js_sys::Function::new_with_args("lon, lat", "return [lon, -lat];");
    assert!(is_err(&m.pick_res(0.0, 0.0, -1.0, &project), "out_of_range"));
    assert!(is_err(&m.pick_res(f64::INFINITY, 0.0, 1.0, &project), "non_finite"));
}

#[wasm_bindgen_test]
fn unknown_ids_and_layers() {
    let m = NuclearMap::new();
    assert!(is_err(&m.feature_res(0, 42), "invalid_id"));
    assert!(is_err(&m.feature_res(7, 42), "invalid_layer"));
    let mut m = m;
    assert!(is_err(&m.select_report_res("nope"), "unknown_report"));
    assert!(is_err(&m.set_config_res(parse(r#"{"grid_precision": 0}"#)), "invalid_config"));
    assert!(is_err(&m.handle_event_res(parse(r#"{"type": "teleport"}"#)), "json_parse"));
}
