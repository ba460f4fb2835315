use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::Position3;
use crate::pipeline::types::{TickDiagnostics, TickState};

/// Observer pattern for tracker telemetry
pub trait TelemetryObserver: Send + Sync {
    fn on_tick(&mut self, diagnostics: &TickDiagnostics);
    fn on_frame(&mut self, _delta_seconds: f32) {}
    fn on_detection_changed(&mut self, _detected: bool) {}
}

/// Fans telemetry out to every registered observer
#[derive(Default)]
pub struct TelemetryCollector {
    observers: Vec<Box<dyn TelemetryObserver>>,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn add_observer(mut self, observer: Box<dyn TelemetryObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify_tick(&mut self, diagnostics: &TickDiagnostics) {
        for observer in &mut self.observers {
            observer.on_tick(diagnostics);
        }
    }

    pub fn notify_frame(&mut self, delta_seconds: f32) {
        for observer in &mut self.observers {
            observer.on_frame(delta_seconds);
        }
    }

    pub fn notify_detection_changed(&mut self, detected: bool) {
        for observer in &mut self.observers {
            observer.on_detection_changed(detected);
        }
    }
}

/// EWMA smoothing factor shared by every running average.
const ALPHA: f32 = 0.1;

fn update_ewma(current: f32, new_value: f32, alpha: f32) -> f32 {
    current * (1.0 - alpha) + new_value * alpha
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceBand {
    Low,
    Medium,
    High,
}

impl PerformanceBand {
    pub fn from_fps(fps: f32) -> Self {
        if fps < 30.0 {
            PerformanceBand::Low
        } else if fps < 60.0 {
            PerformanceBand::Medium
        } else {
            PerformanceBand::High
        }
    }
}

/// Performance monitoring observer
pub struct PerformanceMonitor {
    stats: Arc<Mutex<PerformanceStats>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    pub total_frames: usize,
    pub total_scans: usize,
    pub total_detections: usize,
    pub unavailable_scans: usize,
    pub average_tick_us: f32,
    pub max_tick_us: u64,
    /// Smoothed seconds between rendered frames; 0 until the first frame.
    pub average_frame_delta: f32,
    pub frames_per_second: f32,
    pub band: PerformanceBand,
    /// EWMA of each stage's cost in microseconds.
    pub stage_average_us: IndexMap<TickState, f32>,
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self {
            total_frames: 0,
            total_scans: 0,
            total_detections: 0,
            unavailable_scans: 0,
            average_tick_us: 0.0,
            max_tick_us: 0,
            average_frame_delta: 0.0,
            frames_per_second: 0.0,
            band: PerformanceBand::Low,
            stage_average_us: IndexMap::new(),
        }
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Mutex::new(PerformanceStats::default())),
        }
    }

    pub fn get_stats(&self) -> PerformanceStats {
        self.stats.lock().clone()
    }

    pub fn get_stats_shared(&self) -> Arc<Mutex<PerformanceStats>> {
        Arc::clone(&self.stats)
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryObserver for PerformanceMonitor {
    fn on_tick(&mut self, diagnostics: &TickDiagnostics) {
        let mut stats = self.stats.lock();
        stats.total_scans += 1;
        if diagnostics.detected {
            stats.total_detections += 1;
        }
        if diagnostics.unavailable.is_some() {
            stats.unavailable_scans += 1;
            return;
        }

        let timed_scans = stats.total_scans - stats.unavailable_scans;
        stats.average_tick_us = if timed_scans == 1 {
            diagnostics.duration_us as f32
        } else {
            update_ewma(stats.average_tick_us, diagnostics.duration_us as f32, ALPHA)
        };
        stats.max_tick_us = stats.max_tick_us.max(diagnostics.duration_us);

        for (stage, duration) in diagnostics.timings.stages() {
            let us = duration.as_micros() as f32;
            stats
                .stage_average_us
                .entry(*stage)
                .and_modify(|avg| *avg = update_ewma(*avg, us, ALPHA))
                .or_insert(us);
        }

        tracing::trace!(
            "PerformanceMonitor: scan {}, tick={}us avg={:.1}us",
            stats.total_scans,
            diagnostics.duration_us,
            stats.average_tick_us
        );
    }

    fn on_frame(&mut self, delta_seconds: f32) {
        let mut stats = self.stats.lock();
        stats.total_frames += 1;
        // Frames without a usable delta are counted but do not touch the rate.
        if delta_seconds.is_nan() || delta_seconds <= 0.0 {
            return;
        }
        // The first timed frame seeds the average so the rate does not start at infinity.
        stats.average_frame_delta = if stats.average_frame_delta == 0.0 {
            delta_seconds
        } else {
            update_ewma(stats.average_frame_delta, delta_seconds, ALPHA)
        };
        stats.frames_per_second = 1.0 / stats.average_frame_delta;
        stats.band = PerformanceBand::from_fps(stats.frames_per_second);
    }
}

/// Ticks slower than one 60 Hz frame are reported.
const SLOW_TICK_US: u64 = 16_667;
const RECENT_TICKS: usize = 10;
const MAX_WARNINGS: usize = 5;

/// Debug information tracker
pub struct DebugTracker {
    debug_info: Arc<Mutex<DebugInfo>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugInfo {
    pub last_frame: Option<Uuid>,
    pub last_state: Option<TickState>,
    pub last_published: Option<Position3>,
    pub detected: bool,
    pub detection_changes: usize,
    pub recent_tick_times: Vec<u64>,
    pub warnings: Vec<String>,
}

impl DebugInfo {
    fn warn(&mut self, warning: String) {
        self.warnings.push(warning);
        if self.warnings.len() > MAX_WARNINGS {
            self.warnings.remove(0);
        }
    }
}

impl DebugTracker {
    pub fn new() -> Self {
        Self {
            debug_info: Arc::new(Mutex::new(DebugInfo::default())),
        }
    }

    pub fn get_debug_info(&self) -> DebugInfo {
        self.debug_info.lock().clone()
    }

    pub fn get_debug_info_shared(&self) -> Arc<Mutex<DebugInfo>> {
        Arc::clone(&self.debug_info)
    }
}

impl Default for DebugTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryObserver for DebugTracker {
    fn on_tick(&mut self, diagnostics: &TickDiagnostics) {
        let mut debug = self.debug_info.lock();
        debug.last_frame = diagnostics.frame_id;
        if diagnostics.state.is_terminal() {
            debug.last_state = Some(diagnostics.state);
        }
        if diagnostics.published.is_some() {
            debug.last_published = diagnostics.published;
        }

        debug.recent_tick_times.push(diagnostics.duration_us);
        if debug.recent_tick_times.len() > RECENT_TICKS {
            debug.recent_tick_times.remove(0);
        }

        if diagnostics.duration_us > SLOW_TICK_US {
            let warning = format!("Slow scan: {}us", diagnostics.duration_us);
            debug.warn(warning);
        }
        if diagnostics.dropped_matches > 0 {
            let warning = format!(
                "Match buffer full: {} matches dropped",
                diagnostics.dropped_matches
            );
            debug.warn(warning);
        }
    }

    fn on_detection_changed(&mut self, detected: bool) {
        let mut debug = self.debug_info.lock();
        debug.detected = detected;
        debug.detection_changes += 1;
    }
}
