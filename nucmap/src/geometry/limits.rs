// Centralized ingestion limits to harden against untrusted rows from the data source

// Row caps
pub const MAX_FEATURES: usize = 200_000;
pub const MAX_COUNTRIES: usize = 1_000;
pub const MAX_REPORT_TABLES: usize = 500;
pub const MAX_REPORT_ROWS: usize = 10_000; // per table

// String caps (bytes)
pub const MAX_NAME_LEN: usize = 512;
pub const MAX_TEXT_LEN: usize = 16 * 1024;

// Geographic bounds (decimal degrees)
pub const LAT_MIN: f64 = -90.0;
pub const LAT_MAX: f64 = 90.0;
pub const LON_MIN: f64 = -180.0;
pub const LON_MAX: f64 = 180.0;

// Zoom range accepted from the projector
pub const ZOOM_MIN: f64 = 0.01;
pub const ZOOM_MAX: f64 = 1_000.0;

#[inline]
pub fn in_lat_bounds(v: f64) -> bool { v.is_finite() && v >= LAT_MIN && v <= LAT_MAX }

#[inline]
pub fn in_lon_bounds(v: f64) -> bool { v.is_finite() && v >= LON_MIN && v <= LON_MAX }

#[inline]
pub fn in_zoom_bounds(z: f64) -> bool { z.is_finite() && z >= ZOOM_MIN && z <= ZOOM_MAX }
