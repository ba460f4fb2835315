use crate::common::Point2;

/// Texture coordinates that matched the target color this tick, in scan order.
///
/// Capacity is fixed at construction and the storage is reused across ticks.
/// Pushes beyond capacity are dropped and counted.
#[derive(Debug, Clone)]
pub struct MatchSet {
    points: Vec<Point2>,
    capacity: usize,
    dropped: usize,
}

impl MatchSet {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Returns `false` when the point was dropped for lack of room.
    pub fn push(&mut self, point: Point2) -> bool {
        if self.points.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.dropped = 0;
    }

    /// Changes the capacity, keeping the earliest points.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.points.truncate(self.capacity);
        self.points.reserve(self.capacity.saturating_sub(self.points.len()));
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_keeps_first_points_in_order() {
        let mut set = MatchSet::with_capacity(3);
        for i in 0..5 {
            set.push(Point2::new(i as f32, 0.0));
        }
        assert_eq!(set.len(), 3);
        assert_eq!(set.dropped(), 2);
        assert_eq!(set.points()[2], Point2::new(2.0, 0.0));

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.dropped(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut set = MatchSet::with_capacity(0);
        assert!(set.push(Point2::ZERO));
        assert!(!set.push(Point2::ZERO));
    }
}
