pub mod services;
pub mod types;

pub use services::{
    ActorSink, ColorSelector, MarkerField, MarkerSpawner, ShipActor, TelemetryCollector,
    TickContext, TrackingController,
};
pub use types::{TargetColor, TickDiagnostics, TickOutcome, TrackedPosition};
