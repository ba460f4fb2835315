use tracing::{debug, info};
use uuid::Uuid;

use crate::common::Color;
use crate::config::SelectorConfig;
use crate::pipeline::types::{TargetColor, ToleranceLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

pub type SubscriptionId = Uuid;

type Listener = Box<dyn Fn(TargetColor) + Send + Sync>;

/// Holds the user's color choice and tells subscribers whenever it changes.
///
/// Channels are edited as 0..=255 values, the tolerance as a slider bounded by
/// `max_tolerance`.
pub struct ColorSelector {
    color: Color,
    tolerance: f32,
    max_tolerance: f32,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl ColorSelector {
    pub fn new(config: &SelectorConfig) -> Self {
        let max_tolerance = config.max_tolerance.clamp(0.0, 1.0);
        Self {
            color: config.default_color,
            tolerance: config.default_tolerance.clamp(0.0, max_tolerance),
            max_tolerance,
            listeners: Vec::new(),
        }
    }

    pub fn target(&self) -> TargetColor {
        TargetColor::new(self.color, self.tolerance)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn level(&self) -> ToleranceLevel {
        ToleranceLevel::from_tolerance(self.tolerance)
    }

    /// Slider label, e.g. `"0.20 - Strict"`.
    pub fn tolerance_label(&self) -> String {
        format!("{:.2} - {}", self.tolerance, self.level())
    }

    pub fn channel_value(&self, channel: Channel) -> u8 {
        let [r, g, b] = self.color.to_bytes();
        match channel {
            Channel::Red => r,
            Channel::Green => g,
            Channel::Blue => b,
        }
    }

    /// Sets one channel from a 0..=255 value (clamped) and notifies.
    pub fn set_channel(&mut self, channel: Channel, value: i32) {
        let normalized = value.clamp(0, 255) as f32 / 255.0;
        match channel {
            Channel::Red => self.color.r = normalized,
            Channel::Green => self.color.g = normalized,
            Channel::Blue => self.color.b = normalized,
        }
        self.notify();
    }

    /// Parses typed channel input. Unparsable text leaves the color untouched
    /// and returns `false`.
    pub fn input_channel(&mut self, channel: Channel, input: &str) -> bool {
        match input.trim().parse::<i32>() {
            Ok(value) => {
                self.set_channel(channel, value);
                true
            }
            Err(_) => {
                debug!("Ignoring channel input {:?} for {:?}", input, channel);
                false
            }
        }
    }

    /// Sets the tolerance (clamped to [0, 1], then to the slider maximum) and
    /// notifies.
    pub fn set_tolerance(&mut self, tolerance: f32) {
        let tolerance = if tolerance.is_nan() { 0.0 } else { tolerance };
        self.tolerance = tolerance.clamp(0.0, 1.0).min(self.max_tolerance);
        self.notify();
    }

    pub fn input_tolerance(&mut self, input: &str) -> bool {
        match input.trim().parse::<f32>() {
            Ok(value) => {
                self.set_tolerance(value);
                true
            }
            Err(_) => {
                debug!("Ignoring tolerance input {:?}", input);
                false
            }
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.notify();
    }

    /// Registers a listener. It is not called until the next change or
    /// explicit [`notify`](Self::notify).
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(TargetColor) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Pushes the current target to every listener.
    pub fn notify(&self) {
        let target = self.target();
        let [r, g, b] = self.color.to_bytes();
        info!(
            "Target color updated: R:{} G:{} B:{}, tolerance {}",
            r,
            g,
            b,
            self.tolerance_label()
        );
        for (_, listener) in &self.listeners {
            listener(target);
        }
    }
}

impl Default for ColorSelector {
    fn default() -> Self {
        Self::new(&SelectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording(selector: &mut ColorSelector) -> (SubscriptionId, Arc<Mutex<Vec<TargetColor>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = selector.subscribe(move |target| sink.lock().push(target));
        (id, seen)
    }

    #[test]
    fn starts_from_configured_defaults() {
        let selector = ColorSelector::default();
        assert_eq!(selector.color(), Color::RED);
        assert_eq!(selector.tolerance(), 0.2);
        assert_eq!(selector.channel_value(Channel::Red), 255);
        assert_eq!(selector.tolerance_label(), "0.20 - Strict");
    }

    #[test]
    fn every_change_reaches_subscribers() {
        let mut selector = ColorSelector::default();
        let (_, seen) = recording(&mut selector);

        selector.set_channel(Channel::Green, 128);
        selector.set_tolerance(0.35);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].color().to_bytes(), [255, 128, 0]);
        assert_eq!(seen[1].tolerance(), 0.35);
        assert_eq!(seen[1].level(), ToleranceLevel::Permissive);
    }

    #[test]
    fn channel_input_is_clamped_or_rejected() {
        let mut selector = ColorSelector::default();
        assert!(selector.input_channel(Channel::Blue, " 300 "));
        assert_eq!(selector.channel_value(Channel::Blue), 255);
        assert!(selector.input_channel(Channel::Red, "-5"));
        assert_eq!(selector.channel_value(Channel::Red), 0);

        assert!(!selector.input_channel(Channel::Green, "lots"));
        assert_eq!(selector.channel_value(Channel::Green), 0);
    }

    #[test]
    fn tolerance_is_bounded_by_the_slider() {
        let mut selector = ColorSelector::default();
        selector.set_tolerance(0.9);
        assert_eq!(selector.tolerance(), 0.75);
        assert!(selector.input_tolerance("-1"));
        assert_eq!(selector.tolerance(), 0.0);
        assert!(!selector.input_tolerance("0.2 - Strict"));
        assert_eq!(selector.tolerance(), 0.0);
    }

    #[test]
    fn unsubscribed_listeners_stay_quiet() {
        let mut selector = ColorSelector::default();
        let (id, seen) = recording(&mut selector);
        assert!(selector.unsubscribe(id));
        assert!(!selector.unsubscribe(id));

        selector.set_color(Color::BLUE);
        assert!(seen.lock().is_empty());
    }
}
