use std::time::Instant;

use tracing::{debug, info, trace};

use crate::common::{Frame, OutputQuad, Point2, Position3};
use crate::config::TrackingConfig;
use crate::pipeline::services::actor::ActorSink;
use crate::pipeline::services::markers::MarkerSpawner;
use crate::pipeline::services::telemetry::TelemetryCollector;
use crate::pipeline::types::{
    MatchSet, TargetColor, TickDiagnostics, TickOutcome, TickState, TrackedPosition,
    UnavailableReason,
};

use super::blob_clusterer::BlobClusterer;
use super::color_matcher::{ColorMatcher, MatchMode};
use super::coordinate_mapper::map_texture_to_output;
use super::frame_sampler::{FrameSampler, GridPoint};
use super::position_stabilizer::PositionStabilizer;

/// Inputs of one rendered frame.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    /// `None` while the camera is not delivering frames.
    pub frame: Option<&'a Frame>,
    /// Where the feed is displayed; `None` until the display is laid out.
    pub output_quad: Option<OutputQuad>,
    /// Seconds since the previous rendered frame.
    pub delta_seconds: f32,
}

impl<'a> TickContext<'a> {
    pub fn new(frame: Option<&'a Frame>, output_quad: Option<OutputQuad>, delta_seconds: f32) -> Self {
        Self {
            frame,
            output_quad,
            delta_seconds,
        }
    }
}

/// Values a scan reads, copied once at its start.
#[derive(Debug, Clone, Copy)]
struct TickSnapshot {
    target: TargetColor,
    min_object_size: usize,
    marker_spawn_interval: f32,
}

/// Drives the scan pipeline once per rendered frame.
///
/// Every `scan_frequency` frames it samples the current frame, keeps the
/// pixels close to the target color, finds the dominant blob, smooths its
/// centroid and publishes the mapped position to the actor.
pub struct TrackingController {
    config: TrackingConfig,
    target: TargetColor,
    match_mode: MatchMode,
    matcher: Box<dyn ColorMatcher>,
    sampler: FrameSampler,
    matches: MatchSet,
    clusterer: BlobClusterer,
    stabilizer: PositionStabilizer,
    telemetry: TelemetryCollector,
    markers: Option<Box<dyn MarkerSpawner>>,
    frame_counter: u32,
    elapsed_since_scan: f32,
    since_last_marker: Option<f32>,
    detected: bool,
    tracked: Option<TrackedPosition>,
    last_diagnostics: Option<TickDiagnostics>,
}

impl TrackingController {
    pub fn new(config: TrackingConfig, target: TargetColor) -> Self {
        let config = config.sanitized();
        let match_mode = MatchMode::from_hsv_flag(config.use_hsv_detection);
        Self {
            target,
            match_mode,
            matcher: match_mode.matcher(),
            sampler: FrameSampler::new(config.sample_points),
            matches: MatchSet::with_capacity(config.max_matching_pixels),
            clusterer: BlobClusterer::new(
                config.blob_proximity_threshold,
                config.max_matching_pixels,
            ),
            stabilizer: PositionStabilizer::new(
                config.position_smooth_factor,
                config.min_movement_threshold,
            ),
            telemetry: TelemetryCollector::new(),
            markers: None,
            frame_counter: 0,
            elapsed_since_scan: 0.0,
            since_last_marker: None,
            detected: false,
            tracked: None,
            last_diagnostics: None,
            config,
        }
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_marker_spawner(mut self, markers: Box<dyn MarkerSpawner>) -> Self {
        self.markers = Some(markers);
        self
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn target(&self) -> TargetColor {
        self.target
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// Last stabilized texture position. Kept after detection is lost, with
    /// `detected` cleared.
    pub fn tracked_position(&self) -> Option<TrackedPosition> {
        self.tracked
    }

    pub fn last_diagnostics(&self) -> Option<&TickDiagnostics> {
        self.last_diagnostics.as_ref()
    }

    /// Replaces the target color. Takes effect on the next scan; a different
    /// target also restarts smoothing.
    pub fn set_target(&mut self, target: TargetColor) {
        if target == self.target {
            return;
        }
        debug!(
            "Target changed to {:?} with tolerance {:.2} ({})",
            target.color().to_bytes(),
            target.tolerance(),
            target.level()
        );
        self.target = target;
        self.stabilizer.reset();
    }

    /// Applies new tunables. Buffers are resized and smoothing restarts.
    pub fn reconfigure(&mut self, config: TrackingConfig) {
        let config = config.sanitized();
        self.match_mode = MatchMode::from_hsv_flag(config.use_hsv_detection);
        self.matcher = self.match_mode.matcher();
        self.sampler.set_sample_points(config.sample_points);
        self.matches.set_capacity(config.max_matching_pixels);
        self.clusterer
            .set_proximity_threshold(config.blob_proximity_threshold);
        self.stabilizer =
            PositionStabilizer::new(config.position_smooth_factor, config.min_movement_threshold);
        self.frame_counter = 0;
        self.config = config;
    }

    /// Called once per rendered frame.
    pub fn update(&mut self, ctx: TickContext<'_>, actor: &mut dyn ActorSink) -> TickOutcome {
        let delta = if ctx.delta_seconds.is_nan() {
            0.0
        } else {
            ctx.delta_seconds.max(0.0)
        };

        self.telemetry.notify_frame(delta);
        if let Some(markers) = self.markers.as_mut() {
            markers.advance(delta);
        }
        self.elapsed_since_scan += delta;
        if let Some(since) = self.since_last_marker.as_mut() {
            *since += delta;
        }

        self.frame_counter += 1;
        if self.frame_counter < self.config.scan_frequency {
            return TickOutcome::Skipped;
        }
        self.frame_counter = 0;
        let scan_delta = std::mem::take(&mut self.elapsed_since_scan);

        let snapshot = TickSnapshot {
            target: self.target,
            min_object_size: self.config.min_object_size,
            marker_spawn_interval: self.config.marker_spawn_interval,
        };

        let started = Instant::now();
        let mut diagnostics = TickDiagnostics::new(ctx.frame.map(Frame::frame_id));
        let outcome = self.scan(&ctx, &snapshot, scan_delta, actor, &mut diagnostics);

        diagnostics.timings.finish();
        diagnostics.duration_us = started.elapsed().as_micros() as u64;
        diagnostics.detected = self.detected;
        trace!(
            "Scan finished in {}: sampled={} matched={} dropped={} blobs={} ({}us)",
            diagnostics.state.as_str(),
            diagnostics.sampled_pixels,
            diagnostics.matched_pixels,
            diagnostics.dropped_matches,
            diagnostics.blob_count,
            diagnostics.duration_us
        );
        self.telemetry.notify_tick(&diagnostics);
        self.last_diagnostics = Some(diagnostics);

        outcome
    }

    fn scan(
        &mut self,
        ctx: &TickContext<'_>,
        snapshot: &TickSnapshot,
        scan_delta: f32,
        actor: &mut dyn ActorSink,
        diagnostics: &mut TickDiagnostics,
    ) -> TickOutcome {
        let (frame, quad) = match Self::validate(ctx) {
            Ok(inputs) => inputs,
            Err(reason) => {
                debug!("Scan skipped: {:?}", reason);
                diagnostics.unavailable = Some(reason);
                self.set_detected(false);
                return TickOutcome::Unavailable(reason);
            }
        };
        let (width, height) = frame.dimensions();

        diagnostics.timings.enter(TickState::Sampling);
        diagnostics.state = TickState::Sampling;
        let grid = self.sampler.sample(width, height);
        diagnostics.sampled_pixels = grid.len();

        diagnostics.timings.enter(TickState::Matching);
        diagnostics.state = TickState::Matching;
        collect_matches(
            frame,
            grid,
            self.matcher.as_ref(),
            &snapshot.target,
            &mut self.matches,
        );
        let matched = self.matches.len();
        diagnostics.matched_pixels = matched;
        diagnostics.dropped_matches = self.matches.dropped();

        if matched <= snapshot.min_object_size {
            diagnostics.timings.enter(TickState::NoObject);
            diagnostics.state = TickState::NoObject;
            self.set_detected(false);
            return TickOutcome::NoObject { matched };
        }

        diagnostics.timings.enter(TickState::Clustering);
        diagnostics.state = TickState::Clustering;
        let Some(summary) = self.clusterer.cluster(self.matches.points()) else {
            diagnostics.state = TickState::NoObject;
            self.set_detected(false);
            return TickOutcome::NoObject { matched };
        };
        diagnostics.blob_count = summary.blob_count;
        diagnostics.dominant_blob_size = summary.dominant_size;

        diagnostics.timings.enter(TickState::Stabilizing);
        diagnostics.state = TickState::Stabilizing;
        let stable = self.stabilizer.update(summary.centroid, scan_delta);

        diagnostics.timings.enter(TickState::Mapping);
        diagnostics.state = TickState::Mapping;
        let Some(mapped) = map_texture_to_output(stable, width, height, &quad) else {
            diagnostics.unavailable = Some(UnavailableReason::EmptyFrame);
            self.set_detected(false);
            return TickOutcome::Unavailable(UnavailableReason::EmptyFrame);
        };

        diagnostics.timings.enter(TickState::Publishing);
        diagnostics.state = TickState::Publishing;
        let position = Position3::from_point(mapped, actor.current_depth());
        actor.set_target_position(position);
        diagnostics.published = Some(position);
        self.tracked = Some(TrackedPosition {
            texture: stable,
            detected: true,
        });
        self.set_detected(true);
        self.maybe_spawn_marker(position, snapshot);

        TickOutcome::Published { position, matched }
    }

    fn validate<'a>(ctx: &TickContext<'a>) -> Result<(&'a Frame, OutputQuad), UnavailableReason> {
        let frame = ctx.frame.ok_or(UnavailableReason::FrameNotReady)?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(UnavailableReason::EmptyFrame);
        }
        let quad = ctx.output_quad.ok_or(UnavailableReason::MissingOutputQuad)?;
        Ok((frame, quad))
    }

    fn maybe_spawn_marker(&mut self, position: Position3, snapshot: &TickSnapshot) {
        let Some(markers) = self.markers.as_mut() else {
            return;
        };
        let due = self
            .since_last_marker
            .map_or(true, |since| since >= snapshot.marker_spawn_interval);
        if due {
            markers.spawn_marker(position, snapshot.target.color());
            self.since_last_marker = Some(0.0);
        }
    }

    fn set_detected(&mut self, detected: bool) {
        if !detected {
            if let Some(tracked) = self.tracked.as_mut() {
                tracked.detected = false;
            }
        }
        if detected == self.detected {
            return;
        }
        self.detected = detected;
        if detected {
            info!("Target acquired");
        } else {
            info!("Target lost");
        }
        self.telemetry.notify_detection_changed(detected);
    }
}

/// Appends every grid pixel that matches `target` to `matches`, in grid order.
fn collect_matches(
    frame: &Frame,
    grid: &[GridPoint],
    matcher: &dyn ColorMatcher,
    target: &TargetColor,
    matches: &mut MatchSet,
) {
    matches.clear();
    let color = target.color();
    let tolerance = target.tolerance();
    for point in grid {
        let Some(pixel) = frame.color_at(point.x, point.y) else {
            continue;
        };
        if matcher.is_match(&pixel, &color, tolerance) {
            matches.push(Point2::new(point.x as f32, point.y as f32));
        }
    }
}
