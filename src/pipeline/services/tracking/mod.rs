pub mod blob_clusterer;
pub mod color_matcher;
pub mod coordinate_mapper;
pub mod frame_sampler;
pub mod position_stabilizer;
pub mod tracking_controller;

pub use blob_clusterer::{BlobClusterer, ClusterSummary};
pub use color_matcher::{ColorMatcher, HsvToleranceMatcher, MatchMode, RgbToleranceMatcher};
pub use coordinate_mapper::map_texture_to_output;
pub use frame_sampler::{FrameSampler, GridPoint, GridSpacing};
pub use position_stabilizer::PositionStabilizer;
pub use tracking_controller::{TickContext, TrackingController};
