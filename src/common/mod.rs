pub mod color;
pub mod frame;
pub mod geometry;

pub use color::{Color, Hsv};
pub use frame::{Frame, FrameSource};
pub use geometry::{Bounds2, OutputQuad, Point2, Position3};
