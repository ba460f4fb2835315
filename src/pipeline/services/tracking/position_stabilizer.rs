use crate::common::Point2;

/// How long the filtered position must stay within the movement threshold
/// before the held position catches up with it.
pub const STABLE_DWELL_SECONDS: f32 = 0.2;

/// Smooths the raw centroid and holds it still while it only jitters.
///
/// Movement at or beyond `min_movement_threshold` is followed immediately;
/// smaller movement is held at the last stable position until it has lasted
/// [`STABLE_DWELL_SECONDS`].
#[derive(Debug, Clone)]
pub struct PositionStabilizer {
    smooth_factor: f32,
    min_movement_threshold: f32,
    filtered: Option<Point2>,
    last_stable: Point2,
    stable_time: f32,
}

impl PositionStabilizer {
    pub fn new(smooth_factor: f32, min_movement_threshold: f32) -> Self {
        Self {
            smooth_factor: smooth_factor.clamp(0.0, 1.0),
            min_movement_threshold: min_movement_threshold.max(0.0),
            filtered: None,
            last_stable: Point2::ZERO,
            stable_time: 0.0,
        }
    }

    /// Feeds one raw centroid observed `delta_seconds` after the previous one
    /// and returns the position to publish.
    pub fn update(&mut self, raw: Point2, delta_seconds: f32) -> Point2 {
        let Some(previous) = self.filtered else {
            self.filtered = Some(raw);
            self.last_stable = raw;
            self.stable_time = 0.0;
            return raw;
        };

        let filtered = previous.lerp(&raw, self.smooth_factor);
        self.filtered = Some(filtered);

        if filtered.distance(&self.last_stable) < self.min_movement_threshold {
            self.stable_time += delta_seconds.max(0.0);
            if self.stable_time > STABLE_DWELL_SECONDS {
                self.last_stable = filtered;
                self.stable_time = 0.0;
            }
            self.last_stable
        } else {
            self.stable_time = 0.0;
            self.last_stable = filtered;
            filtered
        }
    }

    pub fn filtered(&self) -> Option<Point2> {
        self.filtered
    }

    pub fn last_stable(&self) -> Option<Point2> {
        self.filtered.map(|_| self.last_stable)
    }

    pub fn stable_time(&self) -> f32 {
        self.stable_time
    }

    pub fn is_initialized(&self) -> bool {
        self.filtered.is_some()
    }

    /// Forgets the tracked object; the next update starts unsmoothed.
    pub fn reset(&mut self) {
        self.filtered = None;
        self.last_stable = Point2::ZERO;
        self.stable_time = 0.0;
    }
}
