use crate::algorithms::declutter::{expand, should_expand};
use crate::algorithms::grouping::Grouping;
use crate::algorithms::majority::glyph_color;
use crate::interaction::{InteractionState, MarkerState};
use crate::model::{Color, FeatureKind, FeatureRef, GroupRef, LonLat};
use crate::palette::category_color;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpandedMember {
    pub feature: FeatureRef,
    pub name: String,
    pub position: LonLat,
    pub color: Color,
}

/// One drawable marker: a singleton or a cluster, plus its fan-out when
/// spiderified.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerGlyph {
    pub group: GroupRef,
    pub count: usize,
    /// Count text shown on cluster glyphs.
    pub label: Option<String>,
    pub position: LonLat,
    pub color: Color,
    pub state: MarkerState,
    pub expanded: Vec<ExpandedMember>,
}

pub fn build_glyphs(layer: FeatureKind, grouping: &Grouping, ui: &InteractionState, base_offset: f64) -> Vec<MarkerGlyph> {
    let mut out = Vec::with_capacity(grouping.groups.len());
    for g in &grouping.groups {
        let Some(color) = glyph_color(&g.members) else {
            continue;
        };
        let r = GroupRef { layer, key: g.key };
        let state = ui.marker_state(r, g);
        let position = g.centroid();
        let hovered = ui.is_hovered(r);
        let expanded = if should_expand(g, ui.zoom, ui.spiderify_zoom_threshold, hovered) {
            expand(&g.members, position, ui.zoom, base_offset)
                .into_iter()
                .map(|p| ExpandedMember {
                    feature: p.feature.feature_ref(),
                    color: category_color(p.feature.kind(), p.feature.category()),
                    name: p.feature.name,
                    position: p.position,
                })
                .collect()
        } else {
            Vec::new()
        };
        out.push(MarkerGlyph {
            group: r,
            count: g.len(),
            label: g.is_cluster().then(|| g.len().to_string()),
            position,
            color,
            state,
            expanded,
        });
    }
    out
}

/// Flat buffers for the renderer: positions as lon/lat pairs, rgba colors,
/// counts and states, one entry per glyph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphArrays {
    pub positions: Vec<f64>,
    pub colors: Vec<u8>,
    pub counts: Vec<u32>,
    pub states: Vec<u8>,
}

pub fn glyph_arrays(glyphs: &[MarkerGlyph]) -> GlyphArrays {
    let mut a = GlyphArrays::default();
    for g in glyphs {
        a.positions.push(g.position.lon);
        a.positions.push(g.position.lat);
        a.colors.extend_from_slice(&g.color.to_rgba());
        a.counts.push(g.count as u32);
        a.states.push(g.state as u8);
    }
    a
}
