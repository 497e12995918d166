use nucmap::ingest::Mode;
use nucmap::interaction::MapEvent;
use nucmap::model::{FeatureKind, LonLat};
use nucmap::projector::Equirectangular;
use nucmap::NuclearMap;
use serde_json::{json, Value};
use std::time::Instant;

// Sites spread over a lat/lon box, a few units per site like real plants.
fn synthetic_plants(n: usize, seed: u64) -> Value {
    let mut s = seed;
    let mut next = || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (s >> 11) as f64 / (1u64 << 53) as f64
    };
    let statuses = ["operational", "construction", "planning", "shutdown", "cancelled"];
    let mut rows = Vec::with_capacity(n);
    let mut site = (0.0, 0.0);
    for i in 0..n {
        if i % 4 == 0 {
            site = (next() * 120.0 - 55.0, next() * 340.0 - 170.0);
        }
        let status = statuses[(next() * statuses.len() as f64) as usize % statuses.len()];
        rows.push(json!({
            "id": i, "iso3": "USA", "name": format!("Unit {}", i), "status": status,
            "latitude": site.0 + next() * 0.05, "longitude": site.1 + next() * 0.05
        }));
    }
    Value::Array(rows)
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut features = 20_000usize;
    let mut frames = 500usize;
    let mut zoom = 4.0f64;
    let mut assert_ms: Option<f64> = None;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--features=") { if let Ok(v) = val.parse() { features = v; } }
        else if let Some(val) = a.strip_prefix("--frames=") { if let Ok(v) = val.parse() { frames = v; } }
        else if let Some(val) = a.strip_prefix("--zoom=") { if let Ok(v) = val.parse() { zoom = v; } }
        else if let Some(val) = a.strip_prefix("--assert-ms=") { if let Ok(v) = val.parse() { assert_ms = Some(v); } }
    }

    let rows = synthetic_plants(features, 0x5eed);
    let mut map = NuclearMap::new();
    let t0 = Instant::now();
    let summary = match map.load_features(FeatureKind::Plant, rows, Mode::Lenient) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("load failed: {}", e);
            std::process::exit(1);
        }
    };
    let load_ms = t0.elapsed().as_secs_f64() * 1000.0;
    let groups = map.grouping(FeatureKind::Plant).groups.len();

    let center = LonLat::new(0.0, 20.0);
    map.set_view(zoom, center);
    let refs: Vec<_> = map.glyphs(FeatureKind::Plant).iter().filter(|g| g.count > 1).map(|g| g.group).collect();
    let proj = Equirectangular::new(1280.0, 720.0, 3.5).with_view(zoom, center);

    // Each frame: hover the next cluster, rebuild glyphs, pick at the viewport middle.
    let mut times_ms: Vec<f64> = Vec::with_capacity(frames);
    let mut hits = 0usize;
    for k in 0..frames {
        let t = Instant::now();
        if let Some(&r) = refs.get(k % refs.len().max(1)) {
            map.handle_event(MapEvent::GroupPointerEnter { group: r });
        }
        let glyphs = map.all_glyphs();
        if map.pick(&proj, 640.0, 360.0, 6.0).is_some() { hits += 1; }
        std::hint::black_box(glyphs);
        times_ms.push(t.elapsed().as_secs_f64() * 1000.0);
    }
    times_ms.sort_by(|a, b| a.total_cmp(b));
    let med = percentile(&times_ms, 0.5);
    let p90 = percentile(&times_ms, 0.9);
    let p99 = percentile(&times_ms, 0.99);
    println!(
        "features={} loaded={} groups={} clusters={} frames={} hits={} load_ms={:.3} median_ms={:.4} p90_ms={:.4} p99_ms={:.4}",
        features, summary.loaded, groups, refs.len(), frames, hits, load_ms, med, p90, p99
    );
    if let Some(th) = assert_ms { if med > th { eprintln!("FAIL: median {:.4} ms > threshold {:.3} ms", med, th); std::process::exit(1); } }
}
