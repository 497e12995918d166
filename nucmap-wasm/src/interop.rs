use js_sys::{Float64Array, Function, Object, Reflect, Uint32Array, Uint8Array};
use nucmap::projector::GeoProjector;
use serde::Serialize;
use wasm_bindgen::JsValue;

pub fn new_obj() -> Object { Object::new() }
pub fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}
pub fn arr_u32(slice: &[u32]) -> Uint32Array {
    let arr = Uint32Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}
pub fn arr_f64(slice: &[f64]) -> Float64Array {
    let arr = Float64Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}
pub fn arr_u8(slice: &[u8]) -> Uint8Array {
    let arr = Uint8Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}

/// Plain objects, not `Map`s, so the UI can read fields directly.
pub fn to_js<T: Serialize + ?Sized>(v: &T) -> JsValue {
    let ser = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    v.serialize(&ser).unwrap_or(JsValue::NULL)
}

/// Projection owned by the page: `project(lon, lat)` returns `[x, y]` in
/// pixels. A throwing or malformed callback projects to NaN, which never hits.
pub struct JsProjector<'a> {
    pub project: &'a Function,
}

impl GeoProjector for JsProjector<'_> {
    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let Ok(out) = self.project.call2(&JsValue::NULL, &JsValue::from_f64(lon), &JsValue::from_f64(lat)) else {
            return (f64::NAN, f64::NAN);
        };
        let at = |i: u32| Reflect::get_u32(&out, i).ok().and_then(|v| v.as_f64()).unwrap_or(f64::NAN);
        (at(0), at(1))
    }
}
