use crate::geometry::math::dist_sq;
use crate::markers::MarkerGlyph;
use crate::model::{FeatureRef, GroupRef};
use crate::projector::GeoProjector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerPick {
    /// A fanned-out member of a spiderified cluster.
    Member { group: GroupRef, feature: FeatureRef, dist: f64 },
    Glyph { group: GroupRef, dist: f64 },
}

/// Nearest glyph within `tol` pixels of `(x, y)`. Fanned-out members win over
/// collapsed glyphs; equal distances keep render order.
pub fn pick_impl<P: GeoProjector + ?Sized>(glyphs: &[MarkerGlyph], proj: &P, x: f64, y: f64, tol: f64) -> Option<MarkerPick> {
    let tol2 = tol * tol;
    // Expanded members first
    let mut best_member: Option<(GroupRef, FeatureRef, f64)> = None;
    for g in glyphs {
        for m in &g.expanded {
            let (sx, sy) = proj.project(m.position.lon, m.position.lat);
            let d2 = dist_sq(x, y, sx, sy);
            if d2 <= tol2 && best_member.map_or(true, |(_, _, bd)| d2 < bd) {
                best_member = Some((g.group, m.feature, d2));
            }
        }
    }
    if let Some((group, feature, d2)) = best_member {
        return Some(MarkerPick::Member { group, feature, dist: d2.sqrt() });
    }
    let mut best_glyph: Option<(GroupRef, f64)> = None;
    for g in glyphs {
        let (sx, sy) = proj.project(g.position.lon, g.position.lat);
        let d2 = dist_sq(x, y, sx, sy);
        if d2 <= tol2 && best_glyph.map_or(true, |(_, bd)| d2 < bd) {
            best_glyph = Some((g.group, d2));
        }
    }
    best_glyph.map(|(group, d2)| MarkerPick::Glyph { group, dist: d2.sqrt() })
}
