use chrono::{DateTime, Utc};
use image::{DynamicImage, GenericImageView};
use std::sync::Arc;
use uuid::Uuid;

use super::color::Color;

/// A read-only snapshot of one captured video frame.
///
/// Cloning is cheap: the pixel buffer is shared.
#[derive(Clone)]
pub struct Frame {
    frame_id: Uuid,
    image: Arc<DynamicImage>,
    captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(image: DynamicImage, captured_at: DateTime<Utc>, frame_id: Uuid) -> Self {
        Self {
            frame_id,
            image: Arc::new(image),
            captured_at,
        }
    }

    /// Wraps an image captured right now under a fresh id.
    pub fn capture(image: DynamicImage) -> Self {
        Self::new(image, Utc::now(), Uuid::new_v4())
    }

    /// The same pixels under a fresh id and timestamp.
    pub fn recapture(&self) -> Self {
        Self {
            frame_id: Uuid::new_v4(),
            image: Arc::clone(&self.image),
            captured_at: Utc::now(),
        }
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Normalized color at `(x, y)`, row 0 being the top of the frame.
    /// Out-of-range coordinates yield `None`.
    pub fn color_at(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(Color::from(self.image.get_pixel(x, y)))
    }
}

/// Supplies frames to the tracker. `None` means the device is not ready yet.
pub trait FrameSource {
    fn current_frame(&mut self) -> Option<Frame>;
}
