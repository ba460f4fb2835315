use serde::{Deserialize, Serialize};

use crate::common::Color;

/// Strategy deciding whether a pixel is close enough to the target color.
pub trait ColorMatcher: Send + Sync {
    fn is_match(&self, pixel: &Color, target: &Color, tolerance: f32) -> bool;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    Rgb,
    Hsv,
}

impl MatchMode {
    pub fn from_hsv_flag(use_hsv_detection: bool) -> Self {
        if use_hsv_detection {
            MatchMode::Hsv
        } else {
            MatchMode::Rgb
        }
    }

    pub fn matcher(&self) -> Box<dyn ColorMatcher> {
        match self {
            MatchMode::Rgb => Box::new(RgbToleranceMatcher),
            MatchMode::Hsv => Box::new(HsvToleranceMatcher),
        }
    }
}

/// Maps the user-facing tolerance onto the average-difference limit. The 1.5
/// exponent keeps the accepted region tight at high slider values.
pub fn scaled_tolerance(tolerance: f32) -> f32 {
    tolerance.max(0.0).powf(1.5) * 0.5
}

/// Matches on raw RGB channel differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbToleranceMatcher;

const RGB_MAX_CHANNEL_DIFF: f32 = 0.4;
const RGB_CHANNEL_DIFF_SCALE: f32 = 1.2;

impl ColorMatcher for RgbToleranceMatcher {
    fn is_match(&self, pixel: &Color, target: &Color, tolerance: f32) -> bool {
        let diffs = pixel.channel_diffs(target);
        let max_diff = RGB_MAX_CHANNEL_DIFF.min(tolerance * RGB_CHANNEL_DIFF_SCALE);
        if diffs.iter().any(|d| *d >= max_diff) {
            return false;
        }

        let avg_diff = (diffs[0] + diffs[1] + diffs[2]) / 3.0;
        avg_diff < scaled_tolerance(tolerance)
    }

    fn name(&self) -> &'static str {
        "RgbToleranceMatcher"
    }
}

/// Matches on a hue-weighted HSV difference, which holds up better than RGB
/// when the lighting changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HsvToleranceMatcher;

const HUE_WEIGHT: f32 = 2.0;
const SATURATION_WEIGHT: f32 = 1.0;
const VALUE_WEIGHT: f32 = 0.5;
const WEIGHT_SUM: f32 = HUE_WEIGHT + SATURATION_WEIGHT + VALUE_WEIGHT;
const PREFILTER_SCALE: f32 = 0.7;
/// Above this saturation on both sides hue is reliable enough to gate on.
const SATURATED: f32 = 0.3;

impl ColorMatcher for HsvToleranceMatcher {
    fn is_match(&self, pixel: &Color, target: &Color, tolerance: f32) -> bool {
        let gate = PREFILTER_SCALE * tolerance;

        // Cheap RGB reject before the HSV conversion.
        if pixel.channel_diffs(target).iter().any(|d| *d > gate) {
            return false;
        }

        let p = pixel.to_hsv();
        let t = target.to_hsv();
        let h_diff = p.hue_distance(&t);
        let s_diff = (p.s - t.s).abs();
        let v_diff = (p.v - t.v).abs();

        // Hue bleed between neighbouring saturated colors.
        if p.s > SATURATED && t.s > SATURATED && h_diff > gate {
            return false;
        }

        let max_h = tolerance.min(0.25);
        let max_s = (tolerance * 1.2).min(0.5);
        let max_v = (tolerance * 1.5).min(0.5);
        if h_diff > max_h || s_diff > max_s || v_diff > max_v {
            return false;
        }

        let weighted =
            (h_diff * HUE_WEIGHT + s_diff * SATURATION_WEIGHT + v_diff * VALUE_WEIGHT) / WEIGHT_SUM;
        weighted < scaled_tolerance(tolerance)
    }

    fn name(&self) -> &'static str {
        "HsvToleranceMatcher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MODES: [MatchMode; 2] = [MatchMode::Rgb, MatchMode::Hsv];

    #[test]
    fn scaled_tolerance_curve() {
        assert_eq!(scaled_tolerance(0.0), 0.0);
        assert!((scaled_tolerance(0.25) - 0.0625).abs() < 1e-6);
        assert!((scaled_tolerance(1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn red_matches_red_but_not_blue() {
        for mode in MODES {
            let matcher = mode.matcher();
            let dark_red = Color::rgb(0.95, 0.03, 0.02);
            assert!(matcher.is_match(&dark_red, &Color::RED, 0.2), "{}", matcher.name());
            assert!(!matcher.is_match(&Color::BLUE, &Color::RED, 0.2), "{}", matcher.name());
        }
    }

    #[test]
    fn rgb_channel_cap_rejects_single_channel_outliers() {
        // Average diff is small, but green is far off.
        let pixel = Color::rgb(1.0, 0.3, 0.0);
        let matcher = RgbToleranceMatcher;
        assert!(!matcher.is_match(&pixel, &Color::RED, 0.2));
        // 0.3 is under the 0.4 cap at tolerance 0.75, and the average 0.1 is
        // under 0.75^1.5 * 0.5.
        assert!(matcher.is_match(&pixel, &Color::RED, 0.75));
    }

    #[test]
    fn hsv_rejects_saturated_hue_bleed() {
        // Dim orange against dim red: every channel is within the RGB gate,
        // but the hue is already 0.15 of the wheel away.
        let dim_red = Color::rgb(0.1, 0.0, 0.0);
        let dim_orange = Color::rgb(0.1, 0.09, 0.0);
        let matcher = HsvToleranceMatcher;
        assert!(!matcher.is_match(&dim_orange, &dim_red, 0.2));
        assert!(matcher.is_match(&dim_red, &dim_red, 0.2));
    }

    #[test]
    fn hsv_accepts_a_darker_shade_of_the_same_hue() {
        let shade = Color::rgb(0.85, 0.0, 0.0);
        assert!(HsvToleranceMatcher.is_match(&shade, &Color::RED, 0.3));
        assert!(!HsvToleranceMatcher.is_match(&shade, &Color::RED, 0.1));
    }

    #[test]
    fn hsv_component_caps_hold_at_high_tolerance() {
        // At tolerance 1.0 the RGB gate is 0.7 and the weighted score limit is
        // 0.5, so only the 0.5 saturation and value caps reject these.
        let matcher = HsvToleranceMatcher;
        let dark_red = Color::rgb(0.4, 0.0, 0.0);
        let pale_red = Color::rgb(1.0, 0.6, 0.6);
        assert!(!matcher.is_match(&dark_red, &Color::RED, 1.0));
        assert!(!matcher.is_match(&pale_red, &Color::RED, 1.0));

        // Just inside both caps.
        assert!(matcher.is_match(&Color::rgb(0.6, 0.0, 0.0), &Color::RED, 1.0));
        assert!(matcher.is_match(&Color::rgb(1.0, 0.4, 0.4), &Color::RED, 1.0));
    }

    #[test]
    fn zero_tolerance_matches_nothing() {
        for mode in MODES {
            assert!(!mode.matcher().is_match(&Color::RED, &Color::RED, 0.0));
        }
    }

    fn any_color() -> impl Strategy<Value = Color> {
        (0u8..=255, 0u8..=255, 0u8..=255).prop_map(|(r, g, b)| Color::from_bytes(r, g, b))
    }

    proptest! {
        #[test]
        fn matching_is_reflexive(color in any_color(), tolerance in 0.001f32..=1.0) {
            for mode in MODES {
                prop_assert!(mode.matcher().is_match(&color, &color, tolerance));
            }
        }

        #[test]
        fn matching_is_monotonic_in_tolerance(
            pixel in any_color(),
            target in any_color(),
            low in 0.0f32..=1.0,
            extra in 0.0f32..=1.0,
        ) {
            let high = (low + extra).min(1.0);
            for mode in MODES {
                let matcher = mode.matcher();
                if matcher.is_match(&pixel, &target, low) {
                    prop_assert!(matcher.is_match(&pixel, &target, high));
                }
            }
        }
    }
}
