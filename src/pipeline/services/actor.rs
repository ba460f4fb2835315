use crate::common::{Bounds2, Point2, Position3};
use crate::config::ActorConfig;

/// Receives the tracked position once per detection.
pub trait ActorSink: Send {
    /// Depth the actor wants to keep; published positions carry it as `z`.
    fn current_depth(&self) -> f32;
    fn set_target_position(&mut self, position: Position3);
}

/// An actor that follows the tracked object around the screen.
///
/// In smoothing mode the target is approached a fraction of the way every
/// frame; in direct mode it is jumped to. The depth never changes and the
/// position stays inside the configured screen bounds.
#[derive(Debug, Clone)]
pub struct ShipActor {
    position: Position3,
    target: Position3,
    smooth_speed: f32,
    direct_positioning: bool,
    limits: Option<Bounds2>,
}

impl ShipActor {
    pub fn new(config: &ActorConfig, initial: Position3) -> Self {
        let limits = config.screen_bounds.map(|bounds| {
            bounds.inset(
                config.half_extents.x + config.boundary_padding,
                config.half_extents.y + config.boundary_padding,
            )
        });
        let mut actor = Self {
            position: initial,
            target: initial,
            smooth_speed: config.smooth_speed.max(0.0),
            direct_positioning: config.direct_positioning,
            limits,
        };
        actor.position = actor.constrain(initial);
        actor.target = actor.position;
        actor
    }

    pub fn position(&self) -> Position3 {
        self.position
    }

    pub fn target(&self) -> Position3 {
        self.target
    }

    /// The area the actor's center may occupy.
    pub fn limits(&self) -> Option<Bounds2> {
        self.limits
    }

    /// Advances the smoothing by one frame of `delta_seconds`.
    pub fn update(&mut self, delta_seconds: f32) {
        if self.direct_positioning {
            self.position = self.target;
            return;
        }
        let t = (self.smooth_speed * delta_seconds.max(0.0)).min(1.0);
        self.position = self.position.lerp(&self.target, t);
    }

    fn constrain(&self, position: Position3) -> Position3 {
        let xy = match self.limits {
            Some(limits) => limits.clamp(position.xy()),
            None => position.xy(),
        };
        Position3::from_point(xy, position.z)
    }
}

impl ActorSink for ShipActor {
    fn current_depth(&self) -> f32 {
        self.position.z
    }

    fn set_target_position(&mut self, position: Position3) {
        let target = self.constrain(Position3::from_point(position.xy(), self.position.z));
        self.target = target;
        if self.direct_positioning {
            self.position = target;
        }
    }
}

/// Remembers every position it is given. Useful when the consumer lives
/// elsewhere and only the latest value matters.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    depth: f32,
    positions: Vec<Position3>,
}

impl RecordingSink {
    pub fn with_depth(depth: f32) -> Self {
        Self {
            depth,
            positions: Vec::new(),
        }
    }

    pub fn positions(&self) -> &[Position3] {
        &self.positions
    }

    pub fn last(&self) -> Option<Position3> {
        self.positions.last().copied()
    }

    pub fn last_xy(&self) -> Option<Point2> {
        self.last().map(|p| p.xy())
    }
}

impl ActorSink for RecordingSink {
    fn current_depth(&self) -> f32 {
        self.depth
    }

    fn set_target_position(&mut self, position: Position3) {
        self.positions.push(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded_config() -> ActorConfig {
        ActorConfig {
            screen_bounds: Some(Bounds2::new(Point2::new(-8.0, -4.5), Point2::new(8.0, 4.5))),
            ..ActorConfig::default()
        }
    }

    #[test]
    fn depth_survives_every_target() {
        let mut ship = ShipActor::new(&ActorConfig::default(), Position3::new(0.0, 0.0, 5.0));
        ship.set_target_position(Position3::new(3.0, 2.0, -100.0));
        assert_eq!(ship.target(), Position3::new(3.0, 2.0, 5.0));
        assert_eq!(ship.current_depth(), 5.0);
    }

    #[test]
    fn smoothing_moves_part_of_the_way() {
        let mut ship = ShipActor::new(&ActorConfig::default(), Position3::new(0.0, 0.0, 0.0));
        ship.set_target_position(Position3::new(10.0, 0.0, 0.0));
        assert_eq!(ship.position(), Position3::new(0.0, 0.0, 0.0));

        // smooth_speed 10 * 0.05 s covers half the gap.
        ship.update(0.05);
        assert_eq!(ship.position(), Position3::new(5.0, 0.0, 0.0));

        // A long frame never overshoots.
        ship.update(1.0);
        assert_eq!(ship.position(), Position3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn direct_positioning_jumps_immediately() {
        let config = ActorConfig {
            direct_positioning: true,
            ..ActorConfig::default()
        };
        let mut ship = ShipActor::new(&config, Position3::new(0.0, 0.0, 1.0));
        ship.set_target_position(Position3::new(2.0, -1.0, 0.0));
        assert_eq!(ship.position(), Position3::new(2.0, -1.0, 1.0));
    }

    #[test]
    fn targets_are_kept_inside_the_padded_screen() {
        let mut ship = ShipActor::new(&bounded_config(), Position3::new(0.0, 0.0, 0.0));
        let limits = ship.limits().expect("bounds configured");
        assert_eq!(limits.min, Point2::new(-7.0, -3.5));
        assert_eq!(limits.max, Point2::new(7.0, 3.5));

        ship.set_target_position(Position3::new(100.0, -100.0, 0.0));
        assert_eq!(ship.target(), Position3::new(7.0, -3.5, 0.0));
    }

    #[test]
    fn recording_sink_keeps_history() {
        let mut sink = RecordingSink::with_depth(2.0);
        assert!(sink.last().is_none());
        sink.set_target_position(Position3::new(1.0, 1.0, 2.0));
        sink.set_target_position(Position3::new(2.0, 1.0, 2.0));
        assert_eq!(sink.positions().len(), 2);
        assert_eq!(sink.last_xy(), Some(Point2::new(2.0, 1.0)));
    }
}
