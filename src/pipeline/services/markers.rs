use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::common::{Color, Position3};
use crate::config::MarkerConfig;

/// Receives a marker request whenever a detection is published and the spawn
/// interval has passed.
pub trait MarkerSpawner: Send {
    fn spawn_marker(&mut self, position: Position3, color: Color);

    /// Advances marker animations; spawners without animation ignore it.
    fn advance(&mut self, _delta_seconds: f32) {}
}

/// A short-lived ring left where the object was seen. It grows and fades out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionMarker {
    pub position: Position3,
    pub color: Color,
    pub alpha: f32,
    pub size: f32,
}

impl DetectionMarker {
    pub fn new(position: Position3, color: Color, config: &MarkerConfig) -> Self {
        Self {
            position,
            color,
            alpha: 1.0,
            size: config.initial_size,
        }
    }

    /// Returns `false` once the marker has fully faded.
    pub fn advance(&mut self, delta_seconds: f32, config: &MarkerConfig) -> bool {
        let dt = delta_seconds.max(0.0);
        self.alpha -= config.fade_speed * dt;
        self.size = (self.size + config.growth_speed * dt).min(config.max_size);
        self.alpha > 0.0
    }
}

/// Live markers, shared with whoever draws them.
#[derive(Debug, Clone)]
pub struct MarkerField {
    config: MarkerConfig,
    markers: Arc<Mutex<Vec<DetectionMarker>>>,
}

impl MarkerField {
    pub fn new(config: MarkerConfig) -> Self {
        Self {
            config,
            markers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn markers(&self) -> Vec<DetectionMarker> {
        self.markers.lock().clone()
    }

    pub fn markers_shared(&self) -> Arc<Mutex<Vec<DetectionMarker>>> {
        Arc::clone(&self.markers)
    }

    pub fn len(&self) -> usize {
        self.markers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.lock().is_empty()
    }
}

impl MarkerSpawner for MarkerField {
    fn spawn_marker(&mut self, position: Position3, color: Color) {
        tracing::trace!("Spawning marker at ({}, {})", position.x, position.y);
        self.markers
            .lock()
            .push(DetectionMarker::new(position, color, &self.config));
    }

    fn advance(&mut self, delta_seconds: f32) {
        let config = &self.config;
        self.markers
            .lock()
            .retain_mut(|marker| marker.advance(delta_seconds, config));
    }
}
