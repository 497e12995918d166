use crate::geometry::math::ring_point;
use crate::model::{LocationGroup, LonLat, PointFeature};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedFeature {
    pub feature: PointFeature,
    pub position: LonLat,
}

/// Ring radius in degrees at a given zoom.
#[inline]
pub fn ring_offset(base_offset: f64, zoom: f64) -> f64 {
    base_offset / zoom
}

/// True when a group should fan out: it is a cluster, the view is zoomed in at
/// least to `threshold`, and it is the hovered group.
pub fn should_expand(group: &LocationGroup, zoom: f64, threshold: f64, hovered: bool) -> bool {
    hovered && group.is_cluster() && zoom >= threshold
}

/// Spreads members over a ring around `center`. Member `i` of `n` sits at angle
/// `i / n * 2π` clockwise from north, so the same member order always produces
/// the same layout.
pub fn expand(cluster: &[PointFeature], center: LonLat, zoom: f64, base_offset: f64) -> Vec<PlacedFeature> {
    let n = cluster.len();
    let offset = ring_offset(base_offset, zoom);
    cluster
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let (lon, lat) = ring_point(center.lon, center.lat, offset, i, n);
            PlacedFeature { feature: f.clone(), position: LonLat::new(lon, lat) }
        })
        .collect()
}
