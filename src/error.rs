use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Coordinator Error: {0}")]
    Coordinator(#[from] CoordinatorError),
}

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Output quad not set")]
    MissingOutputQuad,
    #[error("Frame channel closed")]
    FrameChannelClosed,
    #[error("Tracking task failed: {0}")]
    TaskFailed(String),
}
