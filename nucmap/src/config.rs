use crate::error::IngestError;
use crate::model::{FeatureKind, LonLat};
use serde::{Deserialize, Serialize};

/// Tunables for grouping, fan-out and the view. Every field has a default, so a
/// partial JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Grid cell size in degrees.
    pub grid_precision: f64,
    pub spiderify_zoom_threshold: f64,
    /// Ring radius in degrees at zoom 1; divided by the zoom level.
    pub plant_base_offset: f64,
    pub waste_base_offset: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub initial_center: LonLat,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            grid_precision: 0.5,
            spiderify_zoom_threshold: 3.0,
            plant_base_offset: 5.5,
            waste_base_offset: 5.5,
            min_zoom: 0.75,
            max_zoom: 6.0,
            initial_center: LonLat::new(0.0, 20.0),
        }
    }
}

impl MapConfig {
    pub fn base_offset(&self, layer: FeatureKind) -> f64 {
        match layer {
            FeatureKind::Plant => self.plant_base_offset,
            FeatureKind::WasteFacility => self.waste_base_offset,
        }
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        let finite = [
            ("grid_precision", self.grid_precision),
            ("spiderify_zoom_threshold", self.spiderify_zoom_threshold),
            ("plant_base_offset", self.plant_base_offset),
            ("waste_base_offset", self.waste_base_offset),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("initial_center.lon", self.initial_center.lon),
            ("initial_center.lat", self.initial_center.lat),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(IngestError::invalid_config(format!("'{}' must be finite", name)));
            }
        }
        if self.grid_precision <= 0.0 {
            return Err(IngestError::invalid_config("'grid_precision' must be > 0"));
        }
        if self.plant_base_offset <= 0.0 || self.waste_base_offset <= 0.0 {
            return Err(IngestError::invalid_config("base offsets must be > 0"));
        }
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(IngestError::invalid_config("zoom range must satisfy 0 < min_zoom <= max_zoom"));
        }
        Ok(())
    }

    pub fn from_json_value(v: serde_json::Value) -> Result<MapConfig, IngestError> {
        let cfg: MapConfig =
            serde_json::from_value(v).map_err(|e| IngestError::json_parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
