use image::{Rgb, Rgba};
use serde::{Deserialize, Serialize};

/// An RGBA color with every channel normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

/// Hue, saturation and value, all in [0, 1]. Hue wraps around at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Channels back to 0..=255, rounded.
    pub fn to_bytes(&self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    /// Per-channel absolute difference of the RGB channels.
    pub fn channel_diffs(&self, other: &Color) -> [f32; 3] {
        [
            (self.r - other.r).abs(),
            (self.g - other.g).abs(),
            (self.b - other.b).abs(),
        ]
    }

    pub fn to_hsv(&self) -> Hsv {
        let max = self.r.max(self.g.max(self.b));
        let min = self.r.min(self.g.min(self.b));
        let chroma = max - min;

        let h = if chroma <= 1e-6 {
            0.0
        } else {
            let (base, sector) = if max == self.r {
                (self.g - self.b, 0.0)
            } else if max == self.g {
                (self.b - self.r, 2.0)
            } else {
                (self.r - self.g, 4.0)
            };
            let mut sixths = base / chroma + sector;
            if sixths < 0.0 {
                sixths += 6.0;
            }
            sixths / 6.0
        };

        let s = if max <= 1e-6 { 0.0 } else { chroma / max };

        Hsv { h, s, v: max }
    }
}

impl From<Rgb<u8>> for Color {
    fn from(px: Rgb<u8>) -> Self {
        let [r, g, b] = px.0;
        Color::from_bytes(r, g, b)
    }
}

impl From<Rgba<u8>> for Color {
    fn from(px: Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Color {
            a: a as f32 / 255.0,
            ..Color::from_bytes(r, g, b)
        }
    }
}

impl Hsv {
    /// Circular hue distance, at most 0.5.
    pub fn hue_distance(&self, other: &Hsv) -> f32 {
        let d = (self.h - other.h).abs();
        d.min(1.0 - d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn primaries_land_on_their_hue_sectors() {
        let red = Color::RED.to_hsv();
        let green = Color::GREEN.to_hsv();
        let blue = Color::BLUE.to_hsv();

        assert!(approx(red.h, 0.0) && approx(red.s, 1.0) && approx(red.v, 1.0));
        assert!(approx(green.h, 1.0 / 3.0));
        assert!(approx(blue.h, 2.0 / 3.0));
    }

    #[test]
    fn magenta_wraps_instead_of_going_negative() {
        let magenta = Color::rgb(1.0, 0.0, 1.0).to_hsv();
        assert!(approx(magenta.h, 5.0 / 6.0));
    }

    #[test]
    fn greys_have_no_hue_or_saturation() {
        let grey = Color::rgb(0.4, 0.4, 0.4).to_hsv();
        assert_eq!(grey.h, 0.0);
        assert_eq!(grey.s, 0.0);
        assert!(approx(grey.v, 0.4));
        assert_eq!(Color::BLACK.to_hsv().s, 0.0);
    }

    #[test]
    fn hue_distance_is_circular() {
        let a = Hsv { h: 0.95, s: 1.0, v: 1.0 };
        let b = Hsv { h: 0.05, s: 1.0, v: 1.0 };
        assert!(approx(a.hue_distance(&b), 0.1));
        assert!(approx(b.hue_distance(&a), 0.1));
    }

    #[test]
    fn byte_conversions_round_trip_through_pixels() {
        let c = Color::from(Rgba([255, 128, 0, 0]));
        assert_eq!(c.a, 0.0);
        assert_eq!(c.to_bytes(), [255, 128, 0]);
    }
}
