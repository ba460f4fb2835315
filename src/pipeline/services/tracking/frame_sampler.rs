/// A texture-space pixel coordinate picked by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
}

/// Spacing of the sample grid for a given frame size and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpacing {
    pub step_x: u32,
    pub step_y: u32,
}

impl GridSpacing {
    /// `floor(extent / sqrt(budget))` per axis, never below 1. `None` for an
    /// empty frame.
    pub fn for_frame(width: u32, height: u32, sample_points: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let side = (sample_points.max(1) as f64).sqrt();
        let step = |extent: u32| ((extent as f64 / side).floor() as u32).max(1);
        Some(Self {
            step_x: step(width),
            step_y: step(height),
        })
    }

    /// Number of grid points this spacing yields over a `width x height` frame.
    pub fn point_count(&self, width: u32, height: u32) -> usize {
        let columns = width.div_ceil(self.step_x) as usize;
        let rows = height.div_ceil(self.step_y) as usize;
        columns * rows
    }
}

/// Picks an evenly spaced grid of pixels out of a frame.
///
/// The coordinate buffer is kept between calls so steady-state sampling does
/// not allocate.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    sample_points: u32,
    points: Vec<GridPoint>,
}

impl FrameSampler {
    pub fn new(sample_points: u32) -> Self {
        let sample_points = sample_points.max(1);
        Self {
            sample_points,
            points: Vec::with_capacity(sample_points as usize),
        }
    }

    pub fn sample_points(&self) -> u32 {
        self.sample_points
    }

    pub fn set_sample_points(&mut self, sample_points: u32) {
        self.sample_points = sample_points.max(1);
    }

    /// Grid coordinates for a `width x height` frame, column by column (x outer,
    /// y inner). Empty when either dimension is zero.
    pub fn sample(&mut self, width: u32, height: u32) -> &[GridPoint] {
        self.points.clear();

        let Some(spacing) = GridSpacing::for_frame(width, height, self.sample_points) else {
            return &self.points;
        };

        self.points.reserve(spacing.point_count(width, height));
        for x in (0..width).step_by(spacing.step_x as usize) {
            for y in (0..height).step_by(spacing.step_y as usize) {
                self.points.push(GridPoint { x, y });
            }
        }

        &self.points
    }
}
