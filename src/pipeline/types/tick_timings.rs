use indexmap::IndexMap;
use serde::Serialize;
use std::time::{Duration, Instant};

use super::tick::TickState;

/// Time spent in each stage of a single tick, in the order the stages ran.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickTimings {
    stage_durations: IndexMap<TickState, Duration>,
    #[serde(skip)]
    current_stage: Option<(TickState, Instant)>,
}

impl TickTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the running stage, if any, and starts timing `stage`.
    pub fn enter(&mut self, stage: TickState) {
        self.finish();
        self.current_stage = Some((stage, Instant::now()));
    }

    /// Closes the running stage and accumulates its duration.
    pub fn finish(&mut self) {
        if let Some((stage, started)) = self.current_stage.take() {
            self.record(stage, started.elapsed());
        }
    }

    pub fn record(&mut self, stage: TickState, duration: Duration) {
        *self.stage_durations.entry(stage).or_insert(Duration::ZERO) += duration;
    }

    pub fn stage_duration(&self, stage: &TickState) -> Duration {
        self.stage_durations
            .get(stage)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Stages in the order they were first entered.
    pub fn stages(&self) -> impl Iterator<Item = (&TickState, &Duration)> {
        self.stage_durations.iter()
    }

    pub fn total(&self) -> Duration {
        self.stage_durations.values().sum()
    }

    pub fn reset(&mut self) {
        self.stage_durations.clear();
        self.current_stage = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_keep_entry_order_and_accumulate() {
        let mut timings = TickTimings::new();
        timings.record(TickState::Sampling, Duration::from_micros(10));
        timings.record(TickState::Matching, Duration::from_micros(5));
        timings.record(TickState::Sampling, Duration::from_micros(10));

        let order: Vec<TickState> = timings.stages().map(|(s, _)| *s).collect();
        assert_eq!(order, vec![TickState::Sampling, TickState::Matching]);
        assert_eq!(
            timings.stage_duration(&TickState::Sampling),
            Duration::from_micros(20)
        );
        assert_eq!(timings.total(), Duration::from_micros(25));
        assert_eq!(timings.stage_duration(&TickState::Mapping), Duration::ZERO);
    }

    #[test]
    fn enter_closes_previous_stage() {
        let mut timings = TickTimings::new();
        timings.enter(TickState::Sampling);
        timings.enter(TickState::Matching);
        timings.finish();
        assert_eq!(timings.stages().count(), 2);

        timings.reset();
        assert_eq!(timings.stages().count(), 0);
    }
}
