use nucmap::algorithms::declutter::expand;
use nucmap::algorithms::grouping::{grid_key, group};
use nucmap::model::{FeatureDetail, LonLat, PointFeature};
use proptest::prelude::*;
use std::collections::HashSet;

fn feature(id: u32, pos: Option<(i32, i32)>) -> PointFeature {
    PointFeature {
        id,
        iso3: "JPN".into(),
        name: format!("f{}", id),
        // Thousandths of a degree keep inputs finite and inside bounds.
        position: pos.map(|(lon, lat)| LonLat::new(lon as f64 / 1000.0, lat as f64 / 1000.0)),
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

fn features_strategy() -> impl Strategy<Value = Vec<PointFeature>> {
    prop::collection::vec(
        prop::option::weighted(0.85, (-180_000i32..=180_000, -90_000i32..=90_000)),
        0..120,
    )
    .prop_map(|ps| ps.into_iter().enumerate().map(|(i, p)| feature(i as u32, p)).collect())
}

fn precision_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.5), Just(0.25), Just(1.0), Just(2.0), 0.05f64..5.0]
}

proptest! {
    #[test]
    fn regrouping_flattened_members_is_idempotent(fs in features_strategy(), precision in precision_strategy()) {
        let first = group(&fs, precision);
        let second = group(&first.flattened(), precision);
        prop_assert_eq!(first.partition(), second.partition());
        prop_assert_eq!(second.dropped, 0);
    }

    #[test]
    fn same_input_same_grouping(fs in features_strategy(), precision in precision_strategy()) {
        prop_assert_eq!(group(&fs, precision), group(&fs, precision));
    }

    #[test]
    fn located_features_land_in_exactly_one_group(fs in features_strategy(), precision in precision_strategy()) {
        let g = group(&fs, precision);
        let located: Vec<u32> = fs.iter().filter(|f| f.position.is_some()).map(|f| f.id).collect();
        let mut seen = Vec::new();
        for lg in &g.groups {
            for m in &lg.members {
                prop_assert!(m.position.is_some());
                prop_assert_eq!(grid_key(m.position.unwrap(), precision), lg.key);
                seen.push(m.id);
            }
        }
        seen.sort_unstable();
        let mut expected = located.clone();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(g.dropped, fs.len() - located.len());
    }

    #[test]
    fn members_keep_input_order(fs in features_strategy()) {
        let g = group(&fs, 0.5);
        for lg in &g.groups {
            let ids: Vec<u32> = lg.members.iter().map(|m| m.id).collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            prop_assert_eq!(ids, sorted);
        }
    }

    #[test]
    fn fan_out_has_n_distinct_positions(n in 1usize..=360, zoom in 3.0f64..6.0, lon in -170.0f64..170.0, lat in -80.0f64..80.0) {
        let members: Vec<_> = (0..n as u32).map(|i| feature(i, Some((0, 0)))).collect();
        let out = expand(&members, LonLat::new(lon, lat), zoom, 5.5);
        prop_assert_eq!(out.len(), n);
        let distinct: HashSet<(u64, u64)> =
            out.iter().map(|p| (p.position.lon.to_bits(), p.position.lat.to_bits())).collect();
        prop_assert_eq!(distinct.len(), n);
    }

    #[test]
    fn fan_out_is_deterministic(n in 2usize..40, zoom in 0.75f64..6.0) {
        let members: Vec<_> = (0..n as u32).map(|i| feature(i, Some((1000, 2000)))).collect();
        let c = LonLat::new(1.0, 2.0);
        let a = expand(&members, c, zoom, 5.5);
        let b = expand(&members, c, zoom, 5.5);
        for (p, q) in a.iter().zip(b.iter()) {
            prop_assert_eq!(p.position.lon.to_bits(), q.position.lon.to_bits());
            prop_assert_eq!(p.position.lat.to_bits(), q.position.lat.to_bits());
            prop_assert_eq!(p.feature.id, q.feature.id);
        }
    }
}
