//! End-to-end flows through `NuclearMap`: rows in as JSON, glyphs and fills out.

use nucmap::algorithms::color_scale::{SCALE_HIGH, SCALE_LOW};
use nucmap::algorithms::picking::MarkerPick;
use nucmap::geometry::math::deg_distance;
use nucmap::geometry::tolerance::approx_eq;
use nucmap::ingest::Mode;
use nucmap::interaction::{MapEvent, MarkerState, Transition};
use nucmap::model::{FeatureKind, GroupRef, LonLat};
use nucmap::palette::{continent_color, SEARCH_MUTED};
use nucmap::projector::Equirectangular;
use nucmap::config::MapConfig;
use nucmap::NuclearMap;
use pretty_assertions::assert_eq;
use serde_json::json;

fn plant(id: u32, lat: f64, lon: f64, status: &str) -> serde_json::Value {
    json!({ "id": id, "iso3": "TUR", "name": format!("Unit {}", id), "status": status,
            "latitude": lat, "longitude": lon })
}

fn map_with_plants(rows: Vec<serde_json::Value>) -> NuclearMap {
    let mut m = NuclearMap::new();
    m.load_features(FeatureKind::Plant, serde_json::Value::Array(rows), Mode::Strict).unwrap();
    m
}

fn four_unit_site() -> NuclearMap {
    map_with_plants(vec![
        plant(1, 36.14, 34.15, "construction"),
        plant(2, 36.15, 34.16, "construction"),
        plant(3, 36.13, 34.14, "operational"),
        plant(4, 36.16, 34.15, "planning"),
    ])
}

fn only_group(m: &NuclearMap) -> GroupRef {
    m.glyphs(FeatureKind::Plant)[0].group
}

#[test]
fn nearby_plants_share_one_cluster_glyph() {
    let m = map_with_plants(vec![plant(1, 35.000, 36.001, "operational"), plant(2, 35.003, 35.999, "operational")]);
    let g = m.grouping(FeatureKind::Plant);
    assert_eq!(g.groups.len(), 1);
    assert_eq!(g.groups[0].key_position, LonLat::new(36.0, 35.0));
    let glyphs = m.glyphs(FeatureKind::Plant);
    assert_eq!(glyphs.len(), 1);
    assert_eq!(glyphs[0].label.as_deref(), Some("2"));
    assert_eq!(glyphs[0].state, MarkerState::Collapsed);
}

#[test]
fn report_shading_with_continent_fallback() {
    let mut m = NuclearMap::new();
    m.load_countries(
        json!([
            { "iso3": "USA", "name": "United States", "region": "North America" },
            { "iso3": "BRA", "name": "Brazil", "region": "South America" }
        ]),
        Mode::Strict,
    )
    .unwrap();
    m.load_reports(
        json!([{ "id": "units", "title": "Units", "value_key": "n",
                 "data": [ { "iso3": "USA", "n": 100 }, { "iso3": "FRA", "n": 50 }, { "iso3": "DEU", "n": 0 } ] }]),
        Mode::Strict,
    )
    .unwrap();
    m.select_report("units").unwrap();
    assert_eq!(m.active_report().unwrap().max_value, 100.0);

    assert_eq!(m.country_style("USA", "United States of America", Some("North America")).unwrap().fill, SCALE_HIGH);
    assert_eq!(m.country_style("DEU", "Germany", Some("Europe")).unwrap().fill, SCALE_LOW);
    // No boundary continent: the country row's region is used.
    let bra = m.country_style("-99", "Brazil", None).unwrap();
    assert_eq!(bra.iso3, "BRA");
    assert!(bra.has_data);
    assert_eq!(bra.fill, continent_color("South America").unwrap());

    m.set_query("ger");
    assert_eq!(m.country_style("USA", "United States of America", Some("North America")).unwrap().fill, SEARCH_MUTED);
    assert_eq!(m.country_style("DEU", "Germany", Some("Europe")).unwrap().fill, SCALE_LOW);

    m.clear_report();
    m.set_query("");
    assert_eq!(m.country_style("DEU", "Germany", Some("Europe")).unwrap().fill, continent_color("Europe").unwrap());
    assert_eq!(m.select_report("missing").unwrap_err().code, "unknown_report");
}

#[test]
fn hovered_cluster_fans_out_when_zoomed_in() {
    let mut m = four_unit_site();
    let r = only_group(&m);
    m.set_view(4.0, LonLat::new(34.0, 36.0));
    let t = m.handle_event(MapEvent::GroupPointerEnter { group: r });
    assert_eq!(t, Transition::GroupHovered { group: r, state: MarkerState::Spiderified });

    let glyph = &m.glyphs(FeatureKind::Plant)[0];
    assert_eq!(glyph.state, MarkerState::Spiderified);
    assert_eq!(glyph.expanded.len(), 4);
    for (i, a) in glyph.expanded.iter().enumerate() {
        let d = deg_distance(glyph.position.lon, glyph.position.lat, a.position.lon, a.position.lat);
        assert!(approx_eq(d, 5.5 / 4.0, 1e-9));
        for b in &glyph.expanded[i + 1..] {
            assert!(a.position != b.position);
        }
    }
    // Majority color: two of four are under construction.
    assert_eq!(glyph.color.to_hex(), "#eab308");
}

#[test]
fn hovered_cluster_stays_collapsed_when_zoomed_out() {
    let mut m = four_unit_site();
    let r = only_group(&m);
    m.set_view(1.0, LonLat::new(0.0, 20.0));
    m.handle_event(MapEvent::GroupPointerEnter { group: r });
    let glyph = &m.glyphs(FeatureKind::Plant)[0];
    assert_eq!(glyph.state, MarkerState::Hovered);
    assert!(glyph.expanded.is_empty());
    assert_eq!(glyph.label.as_deref(), Some("4"));

    m.handle_event(MapEvent::GroupPointerLeave { group: r });
    assert_eq!(m.glyphs(FeatureKind::Plant)[0].state, MarkerState::Collapsed);
}

#[test]
fn pick_and_select_an_expanded_member() {
    let mut m = four_unit_site();
    let r = only_group(&m);
    let center = LonLat::new(34.15, 36.145);
    m.set_view(4.0, center);
    m.handle_event(MapEvent::GroupPointerEnter { group: r });
    let proj = Equirectangular::new(800.0, 600.0, 2.0).with_view(4.0, center);

    let glyph = m.glyphs(FeatureKind::Plant)[0].clone();
    let target = &glyph.expanded[2];
    let (x, y) = nucmap::projector::GeoProjector::project(&proj, target.position.lon, target.position.lat);
    let picked = m.pick(&proj, x + 1.0, y, 4.0).unwrap();
    let MarkerPick::Member { group, feature, .. } = picked else {
        panic!("expected an expanded member, got {:?}", picked);
    };
    assert_eq!(feature, target.feature);

    m.handle_event(MapEvent::FeatureClick { group, feature });
    assert_eq!(m.selected_feature().unwrap().name, "Unit 3");
    assert_eq!(m.interaction().hovered_group, Some(r));
}

#[test]
fn zoom_is_clamped_to_config_range() {
    let mut m = NuclearMap::new();
    assert_eq!(m.set_view(40.0, LonLat::new(0.0, 0.0)), Transition::ViewUpdated { zoom: 6.0 });
    assert_eq!(m.set_view(f64::NAN, LonLat::new(0.0, 0.0)), Transition::Ignored);
    assert_eq!(m.interaction().zoom, 6.0);
}

#[test]
fn reload_replaces_rows_and_drops_stale_hover() {
    let mut m = four_unit_site();
    let r = only_group(&m);
    m.handle_event(MapEvent::GroupPointerEnter { group: r });
    let v0 = m.data_version();

    // A failed strict load keeps everything as it was.
    let bad = json!([{ "id": 1, "iso3": "TUR", "name": "x", "latitude": 120.0, "longitude": 0.0 }]);
    let err = m.load_features(FeatureKind::Plant, bad, Mode::Strict).unwrap_err();
    assert_eq!(err.code, "out_of_bounds");
    assert!(err.message.starts_with("plants[0]"));
    assert_eq!(m.data_version(), v0);
    assert_eq!(m.interaction().hovered_group, Some(r));

    let summary = m
        .load_features(FeatureKind::Plant, json!([plant(9, -33.0, 18.4, "operational"), { "id": 10, "iso3": "ZAF", "name": "No coords" }]), Mode::Strict)
        .unwrap();
    assert_eq!((summary.loaded, summary.skipped, summary.ungeolocated), (2, 0, 1));
    assert!(m.data_version() > v0);
    assert_eq!(m.interaction().hovered_group, None);
    assert_eq!(m.glyphs(FeatureKind::Plant).len(), 1);
}

#[test]
fn changing_precision_regroups() {
    let mut m = map_with_plants(vec![plant(1, 10.0, 10.0, "operational"), plant(2, 10.4, 10.4, "operational")]);
    assert_eq!(m.grouping(FeatureKind::Plant).groups.len(), 2);
    let mut cfg = m.config().clone();
    cfg.grid_precision = 2.0;
    m.set_config(cfg).unwrap();
    assert_eq!(m.grouping(FeatureKind::Plant).groups.len(), 1);

    let mut bad = m.config().clone();
    bad.waste_base_offset = 0.0;
    assert_eq!(m.set_config(bad).unwrap_err().code, "invalid_config");
}

#[test]
fn waste_layer_uses_its_own_offset_and_colors() {
    let mut m = NuclearMap::new();
    let mut cfg = m.config().clone();
    cfg.waste_base_offset = 2.0;
    m.set_config(cfg).unwrap();
    m.load_features(
        FeatureKind::WasteFacility,
        json!([
            { "id": 1, "iso3": "FIN", "name": "Onkalo", "facility_type": "Deep geological disposal", "status": "Under construction", "latitude": 61.24, "longitude": 21.44 },
            { "id": 2, "iso3": "FIN", "name": "Olkiluoto KPA", "facility_type": "Spent fuel storage", "status": "Operational", "latitude": 61.23, "longitude": 21.45 }
        ]),
        Mode::Strict,
    )
    .unwrap();
    let r = m.glyphs(FeatureKind::WasteFacility)[0].group;
    m.set_view(5.0, LonLat::new(21.0, 61.0));
    m.handle_event(MapEvent::GroupPointerEnter { group: r });
    let g = &m.glyphs(FeatureKind::WasteFacility)[0];
    let first = g.expanded[0].position;
    assert!(approx_eq(first.lat - g.position.lat, 2.0 / 5.0, 1e-9));
    // Tie between the two types: the first member's color wins.
    assert_eq!(g.color.to_hex(), "#7c3aed");
}

#[test]
fn active_report_follows_reloads() {
    let mut m = NuclearMap::new();
    let tables = json!([{ "id": 1, "slug": "capacity", "title": "Capacity", "type": "map", "value_key": "mw" }]);
    m.load_reports_flat(tables.clone(), json!([{ "table_id": 1, "iso3": "FRA", "data": { "mw": 61370 } }]), Mode::Strict)
        .unwrap();
    m.select_report("capacity").unwrap();
    assert_eq!(m.active_report().unwrap().value("FRA"), Some(61370.0));

    m.load_reports_flat(
        tables,
        json!([
            { "table_id": 1, "iso3": "FRA", "data": { "mw": 61370 } },
            { "table_id": 1, "iso3": "USA", "data": { "mw": 96952 } }
        ]),
        Mode::Strict,
    )
    .unwrap();
    assert_eq!(m.active_report().unwrap().max_value, 96952.0);

    m.load_reports(json!([]), Mode::Strict).unwrap();
    assert!(m.active_report().is_none());
}

#[test]
fn reactor_statistics_rank_by_capacity() {
    let mut m = NuclearMap::new();
    let s = m
        .load_reactor_stats(
            json!([
                { "iso3": "FRA", "name": "France", "operational_units": 56, "operational_capacity_mw": "61370", "reference_year": 2023 },
                { "iso3": "USA", "name": "United States", "operational_units": 93, "operational_capacity_mw": 95835, "reference_year": 2023 },
                { "iso3": "XX", "name": "bad" }
            ]),
            Mode::Lenient,
        )
        .unwrap();
    assert_eq!((s.loaded, s.skipped), (2, 1));
    let top: Vec<_> = m.top_reactor_stats(1).into_iter().map(|r| r.iso3).collect();
    assert_eq!(top, vec!["USA".to_string()]);
}

#[test]
fn country_click_opens_country_detail() {
    let mut m = NuclearMap::new();
    m.load_countries(json!([{ "iso3": "JPN", "name": "Japan", "region": "Asia" }]), Mode::Strict).unwrap();
    m.handle_event(MapEvent::CountryFocus { iso3: "jpn".into() });
    assert!(m.country_style("JPN", "Japan", None).unwrap().focused);
    m.handle_event(MapEvent::CountryClick { iso3: "JPN".into() });
    assert_eq!(m.selected_country().unwrap().name, "Japan");
    m.handle_event(MapEvent::CloseDetail);
    assert!(m.selected_country().is_none());
}

#[test]
fn starting_zoom_respects_configured_range() {
    let cfg = MapConfig { min_zoom: 2.0, max_zoom: 8.0, ..MapConfig::default() };
    assert_eq!(NuclearMap::with_config(cfg).interaction().zoom, 2.0);
    let cfg = MapConfig { min_zoom: 0.1, max_zoom: 0.5, ..MapConfig::default() };
    assert_eq!(NuclearMap::with_config(cfg).interaction().zoom, 0.5);
    assert_eq!(NuclearMap::new().interaction().zoom, 1.0);
}

#[test]
fn unit_totals_over_loaded_statistics() {
    let mut m = NuclearMap::new();
    m.load_reactor_stats(
        json!([
            { "iso3": "FRA", "name": "France", "operational_units": 56, "under_construction_units": 1, "shutdown_units": 14 },
            { "iso3": "USA", "name": "United States", "operational_units": 1e12, "shutdown_units": 41 }
        ]),
        Mode::Strict,
    )
    .unwrap();
    let t = m.unit_totals();
    assert_eq!((t.operational, t.under_construction, t.shutdown), (u32::MAX, 1, 55));
}
