use serde::Serialize;
use uuid::Uuid;

use crate::common::{Point2, Position3};

use super::tick_timings::TickTimings;

/// Where a tick is in the detect-and-publish sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TickState {
    Idle,
    Sampling,
    Matching,
    NoObject,
    Clustering,
    Stabilizing,
    Mapping,
    Publishing,
}

impl TickState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickState::Idle => "Idle",
            TickState::Sampling => "Sampling",
            TickState::Matching => "Matching",
            TickState::NoObject => "NoObject",
            TickState::Clustering => "Clustering",
            TickState::Stabilizing => "Stabilizing",
            TickState::Mapping => "Mapping",
            TickState::Publishing => "Publishing",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TickState::NoObject | TickState::Publishing)
    }
}

/// Why a scan could not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnavailableReason {
    FrameNotReady,
    EmptyFrame,
    MissingOutputQuad,
}

/// Result of one call to `TrackingController::update`.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not a scan frame; nothing ran.
    Skipped,
    /// A scan was due but its inputs were missing.
    Unavailable(UnavailableReason),
    /// Too few matches; detection cleared.
    NoObject { matched: usize },
    /// Object found and its position pushed to the actor.
    Published { position: Position3, matched: usize },
}

impl TickOutcome {
    pub fn is_detection(&self) -> bool {
        matches!(self, TickOutcome::Published { .. })
    }
}

/// Last known location of the tracked object in texture space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackedPosition {
    /// Output of the stabilizer.
    pub texture: Point2,
    /// `false` once detection is lost; the position is kept for continuity.
    pub detected: bool,
}

/// Everything a telemetry sink learns about one scan tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickDiagnostics {
    pub frame_id: Option<Uuid>,
    pub state: TickState,
    pub unavailable: Option<UnavailableReason>,
    pub sampled_pixels: usize,
    pub matched_pixels: usize,
    pub dropped_matches: usize,
    pub blob_count: usize,
    pub dominant_blob_size: usize,
    pub detected: bool,
    pub published: Option<Position3>,
    pub duration_us: u64,
    pub timings: TickTimings,
}

impl TickDiagnostics {
    pub fn new(frame_id: Option<Uuid>) -> Self {
        Self {
            frame_id,
            state: TickState::Idle,
            unavailable: None,
            sampled_pixels: 0,
            matched_pixels: 0,
            dropped_matches: 0,
            blob_count: 0,
            dominant_blob_size: 0,
            detected: false,
            published: None,
            duration_us: 0,
            timings: TickTimings::default(),
        }
    }
}
