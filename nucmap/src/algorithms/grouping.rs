use crate::model::{GridKey, LocationGroup, LonLat, PointFeature};
use std::collections::HashMap;

/// Cell index of a coordinate for a grid of `precision` degrees.
#[inline]
pub fn quantize(v: f64, precision: f64) -> i64 {
    let k = 1.0 / precision;
    (v * k).round() as i64
}

pub fn grid_key(p: LonLat, precision: f64) -> GridKey {
    GridKey { lat_cell: quantize(p.lat, precision), lon_cell: quantize(p.lon, precision) }
}

/// The rounded coordinate pair `(round(v * k) / k)` a key stands for.
pub fn key_position(key: GridKey, precision: f64) -> LonLat {
    let k = 1.0 / precision;
    LonLat::new(key.lon_cell as f64 / k, key.lat_cell as f64 / k)
}

/// Result of bucketing one feature layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grouping {
    pub precision: f64,
    /// Groups in order of their first member's appearance in the input.
    pub groups: Vec<LocationGroup>,
    pub index: HashMap<GridKey, usize>,
    /// Features left out for lacking a position.
    pub dropped: usize,
}

impl Grouping {
    pub fn get(&self, key: GridKey) -> Option<&LocationGroup> {
        self.index.get(&key).and_then(|&i| self.groups.get(i))
    }

    pub fn cluster_count(&self) -> usize {
        self.groups.iter().filter(|g| g.is_cluster()).count()
    }

    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// Members of every group, group by group, in member order.
    pub fn flattened(&self) -> Vec<PointFeature> {
        self.groups.iter().flat_map(|g| g.members.iter().cloned()).collect()
    }

    /// Group keys paired with member ids, a compact view of the partition.
    pub fn partition(&self) -> Vec<(GridKey, Vec<u32>)> {
        self.groups.iter().map(|g| (g.key, g.members.iter().map(|m| m.id).collect())).collect()
    }
}

/// Buckets features by rounded coordinates. Members keep their input order and
/// features without a position are skipped. `precision` must be positive and
/// finite; callers validate it through `MapConfig`.
pub fn group(features: &[PointFeature], precision: f64) -> Grouping {
    let mut out = Grouping { precision, ..Default::default() };
    for f in features {
        let Some(pos) = f.position else {
            out.dropped += 1;
            continue;
        };
        let key = grid_key(pos, precision);
        let slot = match out.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = out.groups.len();
                out.groups.push(LocationGroup {
                    key,
                    key_position: key_position(key, precision),
                    members: Vec::new(),
                });
                out.index.insert(key, i);
                i
            }
        };
        out.groups[slot].members.push(f.clone());
    }
    log::debug!(
        "grouped {} features into {} groups ({} clusters, {} without position)",
        features.len(),
        out.groups.len(),
        out.cluster_count(),
        out.dropped
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureDetail;

    fn plant(id: u32, lon: f64, lat: f64) -> PointFeature {
        PointFeature {
            id,
            iso3: "FRA".into(),
            name: format!("p{}", id),
            position: Some(LonLat::new(lon, lat)),
            detail: FeatureDetail::Plant {
                status: "operational".into(),
                reactor_type: None,
                net_electrical_mw: None,
                commissioning_year: None,
                shutdown_year: None,
                source_cite: None,
            },
        }
    }

    #[test]
    fn quantizes_to_half_degree() {
        assert_eq!(quantize(36.001, 0.5), 72);
        assert_eq!(quantize(35.26, 0.5), 71);
        assert_eq!(quantize(-0.2, 0.5), 0);
        let k = grid_key(LonLat::new(35.003, 35.999), 0.5);
        assert_eq!(key_position(k, 0.5), LonLat::new(35.0, 36.0));
    }

    #[test]
    fn keeps_first_appearance_order() {
        let fs = vec![plant(1, 10.0, 10.0), plant(2, 50.0, 50.0), plant(3, 10.1, 10.1)];
        let g = group(&fs, 0.5);
        assert_eq!(g.partition()[0].1, vec![1, 3]);
        assert_eq!(g.partition()[1].1, vec![2]);
        assert_eq!(g.cluster_count(), 1);
    }

    #[test]
    fn missing_position_is_dropped() {
        let mut lost = plant(9, 0.0, 0.0);
        lost.position = None;
        let g = group(&[lost, plant(1, 0.0, 0.0)], 0.5);
        assert_eq!(g.dropped, 1);
        assert_eq!(g.member_count(), 1);
    }
}
