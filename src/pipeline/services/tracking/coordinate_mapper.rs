//! Texture space to output space.
//!
//! Texture row 0 is the top of the captured frame; the output quad's origin is
//! bottom-left. This module is the only place where the vertical axis is
//! flipped: texture (0, 0) lands on the quad's top-left corner and texture
//! (width, height) on its bottom-right corner.

use crate::common::{OutputQuad, Point2};

/// Texture coordinates normalized to [0, 1] with `v` pointing up.
pub fn normalize(texture: Point2, frame_width: u32, frame_height: u32) -> Option<Point2> {
    if frame_width == 0 || frame_height == 0 {
        return None;
    }
    let u = texture.x / frame_width as f32;
    let v = 1.0 - texture.y / frame_height as f32;
    Some(Point2::new(u, v))
}

/// Bilinear interpolation inside `quad` at normalized `(u, v)`.
pub fn interpolate(quad: &OutputQuad, uv: Point2) -> Point2 {
    let bottom = quad.bottom_left.lerp(&quad.bottom_right, uv.x);
    let top = quad.top_left.lerp(&quad.top_right, uv.x);
    bottom.lerp(&top, uv.y)
}

/// Maps a texture-space point onto the output quad. `None` for a zero-sized
/// frame.
pub fn map_texture_to_output(
    texture: Point2,
    frame_width: u32,
    frame_height: u32,
    quad: &OutputQuad,
) -> Option<Point2> {
    normalize(texture, frame_width, frame_height).map(|uv| interpolate(quad, uv))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_quad() -> OutputQuad {
        OutputQuad::from_rect(Point2::new(0.0, 0.0), Point2::new(1920.0, 1080.0))
    }

    #[test]
    fn frame_corners_land_on_quad_corners() {
        let quad = screen_quad();
        assert_eq!(
            map_texture_to_output(Point2::new(0.0, 0.0), 640, 480, &quad),
            Some(quad.top_left)
        );
        assert_eq!(
            map_texture_to_output(Point2::new(640.0, 480.0), 640, 480, &quad),
            Some(quad.bottom_right)
        );
        assert_eq!(
            map_texture_to_output(Point2::new(0.0, 480.0), 640, 480, &quad),
            Some(quad.bottom_left)
        );
        assert_eq!(
            map_texture_to_output(Point2::new(640.0, 0.0), 640, 480, &quad),
            Some(quad.top_right)
        );
    }

    #[test]
    fn center_maps_to_center() {
        let quad = OutputQuad::from_rect(Point2::new(-8.0, -4.5), Point2::new(8.0, 4.5));
        let out = map_texture_to_output(Point2::new(50.0, 50.0), 100, 100, &quad);
        assert_eq!(out, Some(Point2::new(0.0, 0.0)));
    }

    #[test]
    fn lower_texture_rows_map_lower_on_screen() {
        let quad = screen_quad();
        let high = map_texture_to_output(Point2::new(10.0, 10.0), 100, 100, &quad).unwrap();
        let low = map_texture_to_output(Point2::new(10.0, 90.0), 100, 100, &quad).unwrap();
        assert!(high.y > low.y);
        assert_eq!(high.x, low.x);
    }

    #[test]
    fn skewed_quads_interpolate_bilinearly() {
        // Display rotated and sheared: the top edge is shifted right by 2.
        let quad = OutputQuad {
            bottom_left: Point2::new(0.0, 0.0),
            top_left: Point2::new(2.0, 4.0),
            top_right: Point2::new(6.0, 4.0),
            bottom_right: Point2::new(4.0, 0.0),
        };
        let mid = interpolate(&quad, Point2::new(0.5, 0.5));
        assert_eq!(mid, Point2::new(3.0, 2.0));
    }

    #[test]
    fn empty_frames_do_not_map() {
        assert!(map_texture_to_output(Point2::ZERO, 0, 10, &screen_quad()).is_none());
        assert!(map_texture_to_output(Point2::ZERO, 10, 0, &screen_quad()).is_none());
    }
}
