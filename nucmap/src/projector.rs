use crate::model::LonLat;

/// Map projection and view transform owned by the rendering side.
pub trait GeoProjector {
    /// Screen position in pixels.
    fn project(&self, lon: f64, lat: f64) -> (f64, f64);
}

/// Plate carrée with a pan center and zoom, enough for hit-testing and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Equirectangular {
    /// Pixels per degree at zoom 1.
    pub scale: f64,
    pub zoom: f64,
    pub center: LonLat,
    pub width: f64,
    pub height: f64,
}

impl Equirectangular {
    pub fn new(width: f64, height: f64, scale: f64) -> Equirectangular {
        Equirectangular { scale, zoom: 1.0, center: LonLat::new(0.0, 0.0), width, height }
    }

    pub fn with_view(mut self, zoom: f64, center: LonLat) -> Equirectangular {
        self.zoom = zoom;
        self.center = center;
        self
    }
}

impl GeoProjector for Equirectangular {
    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let k = self.scale * self.zoom;
        let x = self.width * 0.5 + (lon - self.center.lon) * k;
        // Screen y grows downward.
        let y = self.height * 0.5 - (lat - self.center.lat) * k;
        (x, y)
    }
}
