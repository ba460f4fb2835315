pub mod camera;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pipeline;

pub use config::Configuration;
pub use coordinator::{Coordinator, CoordinatorBuilder, TrackerUpdate};
pub use error::{AppError, CoordinatorError};
