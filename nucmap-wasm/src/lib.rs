use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;
mod logging;

pub use api::{init_logging, set_panic_hook};

#[wasm_bindgen]
pub struct NuclearMap { pub(crate) inner: nucmap::NuclearMap }

impl NuclearMap {
    pub fn rs_new() -> NuclearMap { NuclearMap { inner: nucmap::NuclearMap::new() } }
    pub fn rs_data_version(&self) -> u64 { self.inner.data_version() }
}
