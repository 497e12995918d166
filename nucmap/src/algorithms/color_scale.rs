use crate::error::ScaleError;
use crate::geometry::math::lerp_channel;
use crate::geometry::tolerance::clamp01;
use crate::model::Color;

pub const SCALE_LOW: Color = Color::rgb(219, 234, 254);
pub const SCALE_HIGH: Color = Color::rgb(30, 58, 138);

/// Two-stop linear gradient used for choropleth shading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    pub low: Color,
    pub high: Color,
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale { low: SCALE_LOW, high: SCALE_HIGH }
    }
}

impl ColorScale {
    pub fn new(low: Color, high: Color) -> ColorScale {
        ColorScale { low, high }
    }

    /// `value / max` clamped to [0, 1], each channel blended independently.
    /// A non-positive `max` or a zero `value` yields `low`; values past `max`
    /// saturate at `high`.
    pub fn color_for(&self, value: f64, max: f64) -> Result<Color, ScaleError> {
        if !value.is_finite() {
            return Err(ScaleError::NonFinite { param: "value" });
        }
        if !max.is_finite() {
            return Err(ScaleError::NonFinite { param: "max" });
        }
        if max <= 0.0 || value == 0.0 {
            return Ok(self.low);
        }
        Ok(self.at(value / max))
    }

    pub fn at(&self, ratio: f64) -> Color {
        let t = clamp01(ratio);
        Color {
            r: lerp_channel(self.low.r, self.high.r, t),
            g: lerp_channel(self.low.g, self.high.g, t),
            b: lerp_channel(self.low.b, self.high.b, t),
            a: lerp_channel(self.low.a, self.high.a, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn endpoints_are_exact() {
        let s = ColorScale::default();
        assert_eq!(s.color_for(0.0, 100.0).unwrap(), SCALE_LOW);
        assert_eq!(s.color_for(100.0, 100.0).unwrap(), SCALE_HIGH);
        assert_eq!(s.color_for(250.0, 100.0).unwrap(), SCALE_HIGH);
        assert_eq!(s.color_for(-5.0, 100.0).unwrap(), SCALE_LOW);
    }

    #[test]
    fn degenerate_max_is_baseline() {
        let s = ColorScale::default();
        assert_eq!(s.color_for(10.0, 0.0).unwrap(), SCALE_LOW);
        assert_eq!(s.color_for(10.0, -3.0).unwrap(), SCALE_LOW);
    }

    #[test]
    fn tiny_max_still_reaches_dark_endpoint() {
        let s = ColorScale::default();
        assert_eq!(s.color_for(1e-13, 1e-13).unwrap(), SCALE_HIGH);
        assert_eq!(s.color_for(f64::MIN_POSITIVE, f64::MIN_POSITIVE).unwrap(), SCALE_HIGH);
        assert_eq!(s.color_for(1.0, 1e-300).unwrap(), SCALE_HIGH);
    }

    #[test]
    fn midpoint_rounds_per_channel() {
        let s = ColorScale::default();
        let c = s.color_for(50.0, 100.0).unwrap();
        // (219+30)/2 = 124.5, (234+58)/2 = 146, (254+138)/2 = 196
        assert_eq!((c.r, c.g, c.b), (125, 146, 196));
    }

    #[test]
    fn non_finite_is_rejected() {
        let s = ColorScale::default();
        assert_eq!(s.color_for(f64::NAN, 1.0), Err(ScaleError::NonFinite { param: "value" }));
        assert_eq!(s.color_for(1.0, f64::INFINITY), Err(ScaleError::NonFinite { param: "max" }));
    }

    proptest! {
        #[test]
        fn zero_is_baseline_for_any_max(max in 0.0f64..1e12) {
            prop_assert_eq!(ColorScale::default().color_for(0.0, max).unwrap(), SCALE_LOW);
        }

        #[test]
        fn max_is_dark_endpoint(max in f64::MIN_POSITIVE..1e12) {
            prop_assert_eq!(ColorScale::default().color_for(max, max).unwrap(), SCALE_HIGH);
        }

        #[test]
        fn monotonic_per_channel(max in 1e-3f64..1e6, a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let s = ColorScale::default();
            let c0 = s.color_for(lo * max, max).unwrap();
            let c1 = s.color_for(hi * max, max).unwrap();
            // Gradient darkens on every channel, so channels never increase.
            prop_assert!(c1.r <= c0.r);
            prop_assert!(c1.g <= c0.g);
            prop_assert!(c1.b <= c0.b);
        }
    }
}
