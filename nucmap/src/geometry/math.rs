use super::tolerance::clamp01;

/// Linear blend of one 8-bit channel, rounded to nearest.
#[inline]
pub fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let t = clamp01(t);
    let v = a as f64 + (b as f64 - a as f64) * t;
    v.round().max(0.0).min(255.0) as u8
}

/// Planar distance in degrees; adequate for the small offsets used by the fan-out.
#[inline]
pub fn deg_distance(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> f64 {
    let dx = lon1 - lon0;
    let dy = lat1 - lat0;
    (dx * dx + dy * dy).sqrt()
}

#[inline]
pub fn dist_sq(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    let dx = x1 - x0;
    let dy = y1 - y0;
    dx * dx + dy * dy
}

/// Point `i` of `n` evenly spaced on a ring, angle measured clockwise from north.
#[inline]
pub fn ring_point(cx: f64, cy: f64, radius: f64, i: usize, n: usize) -> (f64, f64) {
    let theta = (i as f64 / n as f64) * std::f64::consts::TAU;
    (cx + theta.sin() * radius, cy + theta.cos() * radius)
}
