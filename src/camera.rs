use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{Frame, FrameSource, Point2};
use crate::error::AppError;

/// A fake camera: a colored square circling over a noisy dark background.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    square_size: u32,
    color: Rgb<u8>,
    noise: u8,
    phase: f32,
    phase_step: f32,
    rng: StdRng,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            square_size: width.min(height) / 2,
            color: Rgb([255, 0, 0]),
            noise: 20,
            phase: 0.0,
            phase_step: 0.05,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_color(mut self, color: Rgb<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn with_square_size(mut self, square_size: u32) -> Self {
        self.square_size = square_size;
        self
    }

    pub fn with_noise(mut self, noise: u8) -> Self {
        self.noise = noise;
        self
    }

    /// Radians the square advances along its orbit per frame.
    pub fn with_phase_step(mut self, phase_step: f32) -> Self {
        self.phase_step = phase_step;
        self
    }

    /// Top-left corner of the square in the next frame.
    pub fn square_origin(&self) -> (u32, u32) {
        let free_x = self.width.saturating_sub(self.square_size) as f32;
        let free_y = self.height.saturating_sub(self.square_size) as f32;
        let x = free_x * 0.5 * (1.0 + self.phase.cos());
        let y = free_y * 0.5 * (1.0 + self.phase.sin());
        (x.round() as u32, y.round() as u32)
    }

    /// Center of the square in the next frame, in texture coordinates.
    pub fn square_center(&self) -> Point2 {
        let (x, y) = self.square_origin();
        let half = self.square_size as f32 / 2.0;
        Point2::new(x as f32 + half, y as f32 + half)
    }

    fn render(&mut self) -> DynamicImage {
        let (sx, sy) = self.square_origin();
        let (ex, ey) = (sx + self.square_size, sy + self.square_size);
        let color = self.color;
        let noise = self.noise;
        let rng = &mut self.rng;

        let image = ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let jitter = |rng: &mut StdRng| {
                if noise == 0 {
                    0
                } else {
                    rng.random_range(0..=noise)
                }
            };
            if (sx..ex).contains(&x) && (sy..ey).contains(&y) {
                Rgb([
                    color[0].saturating_sub(jitter(rng)),
                    color[1].saturating_add(jitter(rng)),
                    color[2].saturating_add(jitter(rng)),
                ])
            } else {
                let base = jitter(rng).saturating_mul(2);
                Rgb([base, base, base])
            }
        });
        DynamicImage::ImageRgb8(image)
    }
}

impl FrameSource for SyntheticCamera {
    fn current_frame(&mut self) -> Option<Frame> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let image = self.render();
        self.phase += self.phase_step;
        Some(Frame::capture(image))
    }
}

/// Replays a single image file as a camera feed.
pub struct StillImageCamera {
    frame: Frame,
}

impl StillImageCamera {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let image = image::open(path)?;
        tracing::info!(
            "Loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self {
            frame: Frame::capture(image),
        })
    }
}

impl FrameSource for StillImageCamera {
    fn current_frame(&mut self) -> Option<Frame> {
        Some(self.frame.recapture())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Color, OutputQuad};
    use crate::config::TrackingConfig;
    use crate::pipeline::services::{RecordingSink, TickContext, TrackingController};
    use crate::pipeline::types::TargetColor;

    #[test]
    fn the_square_is_drawn_where_reported() {
        let mut camera = SyntheticCamera::new(64, 48, 7).with_square_size(10).with_noise(0);
        let (x, y) = camera.square_origin();
        let frame = camera.current_frame().expect("frame");

        assert_eq!(frame.color_at(x, y), Some(Color::RED));
        assert_eq!(frame.color_at(x + 9, y + 9), Some(Color::RED));
        assert_eq!(frame.color_at(x - 1, y), Some(Color::BLACK));
    }

    #[test]
    fn the_square_moves_between_frames() {
        let mut camera = SyntheticCamera::new(640, 480, 1).with_phase_step(0.5);
        let first = camera.square_center();
        camera.current_frame();
        assert_ne!(camera.square_center(), first);
    }

    #[test]
    fn the_tracker_follows_the_synthetic_square() {
        let mut camera = SyntheticCamera::new(200, 200, 3).with_square_size(60);
        let expected = camera.square_center();
        let frame = camera.current_frame().expect("frame");

        let config = TrackingConfig::default()
            .with_scan_frequency(1)
            .with_sample_points(400);
        let mut controller = TrackingController::new(config, TargetColor::default());
        let mut sink = RecordingSink::default();
        let quad = OutputQuad::from_rect(Point2::ZERO, Point2::new(200.0, 200.0));
        controller.update(TickContext::new(Some(&frame), Some(quad), 0.016), &mut sink);

        let tracked = controller.tracked_position().expect("square detected");
        // Grid step is 10 px, so the sampled centroid is within one step.
        assert!(tracked.texture.distance(&expected) <= 10.0);
    }

    #[test]
    fn empty_cameras_report_not_ready() {
        let mut camera = SyntheticCamera::new(0, 48, 1);
        assert!(camera.current_frame().is_none());
    }

    #[test]
    fn missing_image_files_are_errors() {
        let result = StillImageCamera::open(Path::new("does/not/exist.png"));
        assert!(matches!(result, Err(AppError::Image(_))));
    }
}
