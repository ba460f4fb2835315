use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    common::{Frame, OutputQuad, Position3},
    config::Configuration,
    error::{AppError, CoordinatorError},
    pipeline::{
        services::{
            ColorSelector, DebugInfo, DebugTracker, MarkerSpawner, PerformanceMonitor,
            PerformanceStats, ShipActor, SubscriptionId, TelemetryCollector, TickContext,
            TrackingController,
        },
        TargetColor,
    },
};

/// What the tracking task last published.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackerUpdate {
    pub frame_id: Option<Uuid>,
    pub detected: bool,
    /// Actor position after the frame, including smoothing.
    pub actor_position: Position3,
}

/// Runs the tracking controller and its actor on a background task.
///
/// Frames go in through a bounded channel; target colors through a watch
/// channel that is read between ticks only.
pub struct Coordinator {
    tracking_task: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
    frame_tx: mpsc::Sender<Frame>,
    target_tx: Arc<watch::Sender<TargetColor>>,
    update_rx: watch::Receiver<TrackerUpdate>,
    performance: Option<Arc<Mutex<PerformanceStats>>>,
    debug_info: Option<Arc<Mutex<DebugInfo>>>,
}

struct TrackingTask {
    controller: TrackingController,
    actor: ShipActor,
    output_quad: OutputQuad,
    frame_rx: mpsc::Receiver<Frame>,
    target_rx: watch::Receiver<TargetColor>,
    update_tx: watch::Sender<TrackerUpdate>,
    previous_capture: Option<chrono::DateTime<chrono::Utc>>,
}

impl Coordinator {
    /// Queues a frame, waiting while the buffer is full.
    pub async fn submit_frame(&self, frame: Frame) -> Result<(), CoordinatorError> {
        self.frame_tx
            .send(frame)
            .await
            .map_err(|_| CoordinatorError::FrameChannelClosed)
    }

    /// The new target is picked up before the next frame is processed.
    pub fn set_target(&self, target: TargetColor) {
        self.target_tx.send_replace(target);
    }

    /// Forwards every change made on `selector` to the tracking task.
    pub fn bind_selector(&self, selector: &mut ColorSelector) -> SubscriptionId {
        let target_tx = Arc::clone(&self.target_tx);
        let id = selector.subscribe(move |target| {
            target_tx.send_replace(target);
        });
        self.set_target(selector.target());
        id
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerUpdate> {
        self.update_rx.clone()
    }

    pub fn latest(&self) -> TrackerUpdate {
        *self.update_rx.borrow()
    }

    pub fn performance_stats(&self) -> Option<PerformanceStats> {
        self.performance.as_ref().map(|stats| stats.lock().clone())
    }

    pub fn debug_info(&self) -> Option<DebugInfo> {
        self.debug_info.as_ref().map(|info| info.lock().clone())
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(mut self) -> Result<(), AppError> {
        self.stop();
        if let Some(task) = self.tracking_task.take() {
            task.await
                .map_err(|e| CoordinatorError::TaskFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

impl TrackingTask {
    async fn run(mut self, cancel_token: CancellationToken) {
        tracing::info!("Tracking task started");
        loop {
            let frame = tokio::select! {
                _ = cancel_token.cancelled() => break,
                frame = self.frame_rx.recv() => frame,
            };
            let Some(frame) = frame else {
                tracing::debug!("Frame channel closed");
                break;
            };
            self.process(frame);
        }
        tracing::info!("Tracking task stopped");
    }

    fn process(&mut self, frame: Frame) {
        if self.target_rx.has_changed().unwrap_or(false) {
            let target = *self.target_rx.borrow_and_update();
            self.controller.set_target(target);
        }

        let delta_seconds = self.delta_since_previous(&frame);
        let ctx = TickContext::new(Some(&frame), Some(self.output_quad), delta_seconds);
        self.controller.update(ctx, &mut self.actor);
        self.actor.update(delta_seconds);

        self.update_tx.send_replace(TrackerUpdate {
            frame_id: Some(frame.frame_id()),
            detected: self.controller.is_detected(),
            actor_position: self.actor.position(),
        });
    }

    fn delta_since_previous(&mut self, frame: &Frame) -> f32 {
        let captured_at = frame.captured_at();
        let delta = self
            .previous_capture
            .replace(captured_at)
            .and_then(|previous| (captured_at - previous).num_microseconds())
            .unwrap_or(0);
        delta.max(0) as f32 / 1_000_000.0
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    target: Option<TargetColor>,
    output_quad: Option<OutputQuad>,
    initial_position: Position3,
    telemetry: Option<TelemetryCollector>,
    marker_spawner: Option<Box<dyn MarkerSpawner>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            target: None,
            output_quad: None,
            initial_position: Position3::default(),
            telemetry: None,
            marker_spawner: None,
        }
    }

    // Adjusts the frame buffer size, this will override the default configuration.
    pub fn frame_buffer_size(mut self, frame_buffer_size: usize) -> Self {
        self.configuration.frame_buffer_size = frame_buffer_size;
        self
    }

    // Enables metrics, this will override the default configuration.
    pub fn enable_metrics(mut self, enable_metrics: bool) -> Self {
        self.configuration.enable_metrics = enable_metrics;
        self
    }

    // Sets the scan frequency, this will override the default configuration.
    pub fn scan_frequency(mut self, scan_frequency: u32) -> Self {
        self.configuration.tracking.scan_frequency = scan_frequency;
        self
    }

    // Starts from this target instead of the selector defaults.
    pub fn target(mut self, target: TargetColor) -> Self {
        self.target = Some(target);
        self
    }

    pub fn output_quad(mut self, output_quad: OutputQuad) -> Self {
        self.output_quad = Some(output_quad);
        self
    }

    pub fn initial_position(mut self, position: Position3) -> Self {
        self.initial_position = position;
        self
    }

    pub fn telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn marker_spawner(mut self, marker_spawner: Box<dyn MarkerSpawner>) -> Self {
        self.marker_spawner = Some(marker_spawner);
        self
    }

    /// Spawns the tracking task; must be called inside a tokio runtime.
    pub fn build(self) -> Result<Coordinator, AppError> {
        if self.configuration.frame_buffer_size == 0 {
            return Err(AppError::InvalidConfiguration(
                "frame_buffer_size must be at least 1".to_string(),
            ));
        }
        let output_quad = self.output_quad.ok_or(CoordinatorError::MissingOutputQuad)?;
        let configuration = self.configuration.sanitized();

        let target = self.target.unwrap_or_else(|| {
            TargetColor::new(
                configuration.selector.default_color,
                configuration.selector.default_tolerance,
            )
        });

        let mut telemetry = self.telemetry.unwrap_or_default();
        let (mut performance, mut debug_info) = (None, None);
        if configuration.enable_metrics {
            let monitor = PerformanceMonitor::new();
            let tracker = DebugTracker::new();
            performance = Some(monitor.get_stats_shared());
            debug_info = Some(tracker.get_debug_info_shared());
            telemetry = telemetry
                .add_observer(Box::new(monitor))
                .add_observer(Box::new(tracker));
        }

        let mut controller =
            TrackingController::new(configuration.tracking.clone(), target).with_telemetry(telemetry);
        if let Some(marker_spawner) = self.marker_spawner {
            controller = controller.with_marker_spawner(marker_spawner);
        }
        let actor = ShipActor::new(&configuration.actor, self.initial_position);

        let (frame_tx, frame_rx) = mpsc::channel(configuration.frame_buffer_size);
        let (target_tx, target_rx) = watch::channel(target);
        let (update_tx, update_rx) = watch::channel(TrackerUpdate {
            frame_id: None,
            detected: false,
            actor_position: actor.position(),
        });

        let task = TrackingTask {
            controller,
            actor,
            output_quad,
            frame_rx,
            target_rx,
            update_tx,
            previous_capture: None,
        };
        let cancel_token = CancellationToken::new();
        let tracking_task = tokio::spawn(task.run(cancel_token.clone()));

        Ok(Coordinator {
            tracking_task: Some(tracking_task),
            cancel_token,
            frame_tx,
            target_tx: Arc::new(target_tx),
            update_rx,
            performance,
            debug_info,
        })
    }
}
