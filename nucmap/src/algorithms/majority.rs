use crate::model::{Color, PointFeature};
use crate::palette::category_color;

/// Most frequent member color. Ties go to the color whose first member comes
/// earliest in member order. Empty input has no color.
pub fn majority_color(members: &[PointFeature]) -> Option<Color> {
    // (color, count) in first-seen order; clusters are small, a scan is enough.
    let mut tally: Vec<(Color, usize)> = Vec::new();
    for m in members {
        let c = category_color(m.kind(), m.category());
        match tally.iter_mut().find(|(seen, _)| *seen == c) {
            Some((_, n)) => *n += 1,
            None => tally.push((c, 1)),
        }
    }
    let mut best: Option<(Color, usize)> = None;
    for (c, n) in tally {
        if best.map_or(true, |(_, bn)| n > bn) {
            best = Some((c, n));
        }
    }
    best.map(|(c, _)| c)
}

/// Color of a glyph: the single member's category color, or the majority for a
/// cluster.
pub fn glyph_color(members: &[PointFeature]) -> Option<Color> {
    match members {
        [] => None,
        [one] => Some(category_color(one.kind(), one.category())),
        many => majority_color(many),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureDetail, LonLat};
    use crate::palette::plant_status_color;

    fn with_status(id: u32, status: &str) -> PointFeature {
        PointFeature {
            id,
            iso3: "KOR".into(),
            name: format!("k{}", id),
            position: Some(LonLat::new(129.2, 35.3)),
            detail: FeatureDetail::Plant {
                status: status.into(),
                reactor_type: None,
                net_electrical_mw: None,
                commissioning_year: None,
                shutdown_year: None,
                source_cite: None,
            },
        }
    }

    #[test]
    fn plurality_wins() {
        let ms = [with_status(1, "shutdown"), with_status(2, "operational"), with_status(3, "operational")];
        assert_eq!(majority_color(&ms), Some(plant_status_color("operational")));
    }

    #[test]
    fn tie_goes_to_first_seen() {
        // Both reach two; "construction" reaches two first but "planning" was seen first.
        let ms = [
            with_status(1, "planning"),
            with_status(2, "construction"),
            with_status(3, "construction"),
            with_status(4, "planning"),
        ];
        assert_eq!(majority_color(&ms), Some(plant_status_color("planning")));
    }

    #[test]
    fn categories_sharing_a_color_pool_their_votes() {
        // Unknown statuses all map to the fallback gray.
        let ms = [with_status(1, "operational"), with_status(2, "mothballed"), with_status(3, "unknown")];
        assert_eq!(majority_color(&ms), Some(plant_status_color("other")));
    }

    #[test]
    fn singleton_uses_own_color() {
        assert_eq!(glyph_color(&[with_status(1, "shutdown")]), Some(plant_status_color("shutdown")));
        assert_eq!(glyph_color(&[]), None);
    }
}
