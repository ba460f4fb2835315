pub mod actor;
pub mod color_selector;
pub mod markers;
pub mod telemetry;
pub mod tracking;

pub use actor::{ActorSink, RecordingSink, ShipActor};
pub use color_selector::{Channel, ColorSelector, SubscriptionId};
pub use markers::{DetectionMarker, MarkerField, MarkerSpawner};
pub use telemetry::{
    DebugInfo, DebugTracker, PerformanceBand, PerformanceMonitor, PerformanceStats,
    TelemetryCollector, TelemetryObserver,
};
pub use tracking::{TickContext, TrackingController};
