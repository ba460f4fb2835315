use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::{Bounds2, Color, Point2};
use crate::error::AppError;

const ENV_PREFIX: &str = "CHROMATRACK";
const DEFAULT_FILE_NAME: &str = "chromatrack";
/// Largest match buffer the tracker will preallocate.
pub const MAX_MATCHING_PIXELS: usize = 1 << 20;

/// Top-level configuration for the tracker and its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub tracking: TrackingConfig,
    pub selector: SelectorConfig,
    pub actor: ActorConfig,
    pub markers: MarkerConfig,
    pub frame_buffer_size: usize,
    pub enable_metrics: bool,
}

/// Tunables of the color-tracking pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Rendered frames between two scans.
    pub scan_frequency: u32,
    /// Approximate number of pixels sampled per scan.
    pub sample_points: u32,
    /// A scan detects the object only when strictly more pixels match.
    pub min_object_size: usize,
    /// Capacity of the match buffer; later matches are dropped.
    pub max_matching_pixels: usize,
    /// Texture-space distance under which two matches belong to the same blob.
    pub blob_proximity_threshold: f32,
    pub use_hsv_detection: bool,
    pub position_smooth_factor: f32,
    /// Texture-space distance below which movement counts as jitter.
    pub min_movement_threshold: f32,
    /// Seconds between two detection markers.
    pub marker_spawn_interval: f32,
}

/// Initial state and limits of the color selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub default_color: Color,
    pub default_tolerance: f32,
    /// Upper end of the tolerance slider.
    pub max_tolerance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub smooth_speed: f32,
    pub direct_positioning: bool,
    /// Visible world area; no clamping when absent.
    pub screen_bounds: Option<Bounds2>,
    pub boundary_padding: f32,
    /// Half the sprite size in world units.
    pub half_extents: Point2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub fade_speed: f32,
    pub initial_size: f32,
    pub growth_speed: f32,
    pub max_size: f32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            selector: SelectorConfig::default(),
            actor: ActorConfig::default(),
            markers: MarkerConfig::default(),
            frame_buffer_size: 60,
            enable_metrics: false,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            scan_frequency: 30,
            sample_points: 100,
            min_object_size: 10,
            max_matching_pixels: 1000,
            // One grid step of a 1280x720 frame at 100 samples is 128x72 pixels.
            blob_proximity_threshold: 150.0,
            use_hsv_detection: true,
            position_smooth_factor: 0.5,
            min_movement_threshold: 4.0,
            marker_spawn_interval: 0.5,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            default_color: Color::RED,
            default_tolerance: 0.2,
            max_tolerance: 0.75,
        }
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            smooth_speed: 10.0,
            direct_positioning: false,
            screen_bounds: None,
            boundary_padding: 0.5,
            half_extents: Point2::new(0.5, 0.5),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            fade_speed: 1.0,
            initial_size: 30.0,
            growth_speed: 15.0,
            max_size: 60.0,
        }
    }
}

impl Configuration {
    /// Loads `chromatrack.toml` (or `path` when given) and applies
    /// `CHROMATRACK__SECTION__KEY` environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_FILE_NAME).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let configuration: Configuration = settings.try_deserialize()?;
        Ok(configuration.sanitized())
    }

    /// Clamps every option into its usable range instead of failing.
    pub fn sanitized(mut self) -> Self {
        self.tracking = self.tracking.sanitized();
        self.selector = self.selector.sanitized();
        self.actor = self.actor.sanitized();
        self.markers = self.markers.sanitized();
        if self.frame_buffer_size == 0 {
            warn!("frame_buffer_size of 0 clamped to 1");
            self.frame_buffer_size = 1;
        }
        self
    }
}

fn at_least_one<T: PartialOrd + Copy + std::fmt::Debug + From<u8>>(name: &str, value: T) -> T {
    let one = T::from(1);
    if value < one {
        warn!("{} of {:?} clamped to 1", name, value);
        one
    } else {
        value
    }
}

fn at_most(name: &str, value: usize, max: usize) -> usize {
    if value > max {
        warn!("{} of {} clamped to {}", name, value, max);
        max
    } else {
        value
    }
}

fn unit_interval(name: &str, value: f32) -> f32 {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    if clamped != value {
        warn!("{} of {} clamped to {}", name, value, clamped);
    }
    clamped
}

fn non_negative(name: &str, value: f32) -> f32 {
    if value.is_nan() || value < 0.0 {
        warn!("{} of {} clamped to 0", name, value);
        0.0
    } else {
        value
    }
}

impl TrackingConfig {
    pub fn sanitized(self) -> Self {
        Self {
            scan_frequency: at_least_one("scan_frequency", self.scan_frequency),
            sample_points: at_least_one("sample_points", self.sample_points),
            min_object_size: self.min_object_size,
            max_matching_pixels: at_most(
                "max_matching_pixels",
                at_least_one("max_matching_pixels", self.max_matching_pixels),
                MAX_MATCHING_PIXELS,
            ),
            blob_proximity_threshold: non_negative(
                "blob_proximity_threshold",
                self.blob_proximity_threshold,
            ),
            use_hsv_detection: self.use_hsv_detection,
            position_smooth_factor: unit_interval(
                "position_smooth_factor",
                self.position_smooth_factor,
            ),
            min_movement_threshold: non_negative(
                "min_movement_threshold",
                self.min_movement_threshold,
            ),
            marker_spawn_interval: non_negative("marker_spawn_interval", self.marker_spawn_interval),
        }
    }

    pub fn with_scan_frequency(mut self, scan_frequency: u32) -> Self {
        self.scan_frequency = scan_frequency;
        self
    }

    pub fn with_sample_points(mut self, sample_points: u32) -> Self {
        self.sample_points = sample_points;
        self
    }

    pub fn with_min_object_size(mut self, min_object_size: usize) -> Self {
        self.min_object_size = min_object_size;
        self
    }

    pub fn with_hsv_detection(mut self, enabled: bool) -> Self {
        self.use_hsv_detection = enabled;
        self
    }

    pub fn with_proximity_threshold(mut self, threshold: f32) -> Self {
        self.blob_proximity_threshold = threshold;
        self
    }
}

impl SelectorConfig {
    pub fn sanitized(self) -> Self {
        let max_tolerance = unit_interval("max_tolerance", self.max_tolerance);
        let default_tolerance =
            unit_interval("default_tolerance", self.default_tolerance).min(max_tolerance);
        let c = self.default_color;
        Self {
            default_color: Color {
                r: c.r.clamp(0.0, 1.0),
                g: c.g.clamp(0.0, 1.0),
                b: c.b.clamp(0.0, 1.0),
                a: c.a.clamp(0.0, 1.0),
            },
            default_tolerance,
            max_tolerance,
        }
    }
}

impl ActorConfig {
    pub fn sanitized(self) -> Self {
        Self {
            smooth_speed: non_negative("smooth_speed", self.smooth_speed),
            boundary_padding: non_negative("boundary_padding", self.boundary_padding),
            half_extents: Point2::new(
                non_negative("half_extents.x", self.half_extents.x),
                non_negative("half_extents.y", self.half_extents.y),
            ),
            ..self
        }
    }
}

impl MarkerConfig {
    pub fn sanitized(self) -> Self {
        let initial_size = non_negative("initial_size", self.initial_size);
        Self {
            fade_speed: non_negative("fade_speed", self.fade_speed),
            initial_size,
            growth_speed: non_negative("growth_speed", self.growth_speed),
            max_size: non_negative("max_size", self.max_size).max(initial_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(source: &str) -> Configuration {
        config::Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize::<Configuration>())
            .expect("valid configuration")
    }

    #[test]
    fn defaults_follow_the_tracker_tunables() {
        let config = Configuration::default();
        assert_eq!(config.tracking.scan_frequency, 30);
        assert_eq!(config.tracking.sample_points, 100);
        assert_eq!(config.tracking.min_object_size, 10);
        assert!(config.tracking.use_hsv_detection);
        assert_eq!(config.selector.default_tolerance, 0.2);
        assert_eq!(config.selector.default_color, Color::RED);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config = from_toml(
            r#"
            enable_metrics = true

            [tracking]
            sample_points = 400
            use_hsv_detection = false

            [selector]
            default_color = { r = 0.0, g = 1.0, b = 0.0 }
            "#,
        );

        assert!(config.enable_metrics);
        assert_eq!(config.tracking.sample_points, 400);
        assert!(!config.tracking.use_hsv_detection);
        assert_eq!(config.tracking.scan_frequency, 30);
        assert_eq!(config.selector.default_color, Color::GREEN);
        assert_eq!(config.actor, ActorConfig::default());
    }

    #[test]
    fn inconsistent_values_are_clamped_not_rejected() {
        let mut config = Configuration::default();
        config.tracking.scan_frequency = 0;
        config.tracking.sample_points = 0;
        config.tracking.max_matching_pixels = 0;
        config.tracking.position_smooth_factor = 3.0;
        config.tracking.blob_proximity_threshold = -1.0;
        config.selector.default_tolerance = 0.9;
        config.markers.max_size = 5.0;
        config.frame_buffer_size = 0;

        let config = config.sanitized();

        assert_eq!(config.tracking.scan_frequency, 1);
        assert_eq!(config.tracking.sample_points, 1);
        assert_eq!(config.tracking.max_matching_pixels, 1);
        assert_eq!(config.tracking.position_smooth_factor, 1.0);
        assert_eq!(config.tracking.blob_proximity_threshold, 0.0);
        assert_eq!(config.selector.default_tolerance, 0.75);
        assert_eq!(config.markers.max_size, config.markers.initial_size);
        assert_eq!(config.frame_buffer_size, 1);
    }

    #[test]
    fn oversized_match_buffers_are_clamped() {
        let config = TrackingConfig {
            max_matching_pixels: usize::MAX,
            ..TrackingConfig::default()
        }
        .sanitized();
        assert_eq!(config.max_matching_pixels, MAX_MATCHING_PIXELS);

        let config = TrackingConfig::default().sanitized();
        assert_eq!(config.max_matching_pixels, 1000);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = Configuration::load(Some(Path::new("does/not/exist.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
