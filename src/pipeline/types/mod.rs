mod match_set;
mod target_color;
mod tick;
mod tick_timings;

pub use match_set::MatchSet;
pub use target_color::{TargetColor, ToleranceLevel};
pub use tick::{
    TickDiagnostics, TickOutcome, TickState, TrackedPosition, UnavailableReason,
};
pub use tick_timings::TickTimings;
