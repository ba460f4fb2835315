use std::path::PathBuf;
use std::time::Duration;

use chromatrack::camera::{StillImageCamera, SyntheticCamera};
use chromatrack::common::{FrameSource, OutputQuad, Point2};
use chromatrack::pipeline::{ColorSelector, MarkerField};
use chromatrack::{AppError, Configuration, CoordinatorBuilder};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chromatrack")]
#[command(about = "Tracks a colored object in a camera feed")]
struct Cli {
    /// Configuration file; `chromatrack.toml` is used when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay this image instead of the synthetic camera
    #[arg(long)]
    image: Option<PathBuf>,

    /// Number of frames to feed
    #[arg(long, default_value = "300")]
    frames: usize,

    /// Frames per second of the feed
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Seed of the synthetic camera noise
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let cli = Cli::parse();
    if cli.fps == 0 {
        return Err(AppError::InvalidConfiguration("fps must be at least 1".to_string()));
    }

    let configuration = Configuration::load(cli.config.as_deref())?;
    let mut camera: Box<dyn FrameSource + Send> = match &cli.image {
        Some(path) => Box::new(StillImageCamera::open(path)?),
        None => Box::new(SyntheticCamera::new(640, 480, cli.seed)),
    };

    let markers = MarkerField::new(configuration.markers.clone());
    let mut selector = ColorSelector::new(&configuration.selector);
    let coordinator = CoordinatorBuilder::new(configuration)
        .enable_metrics(true)
        .output_quad(OutputQuad::from_rect(
            Point2::new(-8.0, -4.5),
            Point2::new(8.0, 4.5),
        ))
        .marker_spawner(Box::new(markers.clone()))
        .build()?;
    coordinator.bind_selector(&mut selector);

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / cli.fps as f64));
    for index in 0..cli.frames {
        ticker.tick().await;
        if index == cli.frames / 2 {
            // Loosen the match halfway through, as a user dragging the slider would.
            selector.set_tolerance(selector.tolerance() + 0.1);
        }
        if let Some(frame) = camera.current_frame() {
            coordinator.submit_frame(frame).await?;
        }
    }

    let update = coordinator.latest();
    info!(
        "Finished: detected={}, actor at ({:.2}, {:.2}, {:.2}), {} live markers",
        update.detected,
        update.actor_position.x,
        update.actor_position.y,
        update.actor_position.z,
        markers.len()
    );
    if let Some(stats) = coordinator.performance_stats() {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    if let Some(debug_info) = coordinator.debug_info() {
        println!("{}", serde_json::to_string_pretty(&debug_info)?);
    }

    coordinator.shutdown().await
}
