use std::collections::VecDeque;

use crate::common::Point2;

/// Below this many matches the points are treated as one blob.
pub const FAST_PATH_LIMIT: usize = 20;

/// The dominant blob of one clustering pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterSummary {
    /// Mean of the dominant blob's members.
    pub centroid: Point2,
    pub dominant_size: usize,
    pub blob_count: usize,
    /// `true` when the pass skipped clustering for a small input.
    pub fast_path: bool,
}

/// Groups matched points into proximity-connected blobs and picks the largest.
///
/// Two points are neighbours when their distance is strictly below the
/// threshold; a blob is the transitive closure of that relation. The pass is
/// O(M^2) in the number of points, which the match capacity bounds.
#[derive(Debug, Clone)]
pub struct BlobClusterer {
    proximity_threshold: f32,
    visited: Vec<bool>,
    queue: VecDeque<usize>,
    labels: Vec<usize>,
}

impl BlobClusterer {
    pub fn new(proximity_threshold: f32, capacity: usize) -> Self {
        Self {
            proximity_threshold: proximity_threshold.max(0.0),
            visited: Vec::with_capacity(capacity),
            queue: VecDeque::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    pub fn proximity_threshold(&self) -> f32 {
        self.proximity_threshold
    }

    pub fn set_proximity_threshold(&mut self, proximity_threshold: f32) {
        self.proximity_threshold = proximity_threshold.max(0.0);
    }

    /// Blob index of every point from the last call, aligned with its input.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn cluster(&mut self, points: &[Point2]) -> Option<ClusterSummary> {
        self.labels.clear();
        if points.is_empty() {
            return None;
        }

        if points.len() < FAST_PATH_LIMIT {
            self.labels.resize(points.len(), 0);
            return Some(ClusterSummary {
                centroid: centroid(points.iter()),
                dominant_size: points.len(),
                blob_count: 1,
                fast_path: true,
            });
        }

        let threshold_sq = self.proximity_threshold * self.proximity_threshold;
        self.visited.clear();
        self.visited.resize(points.len(), false);
        self.labels.resize(points.len(), usize::MAX);
        self.queue.clear();

        let mut blob_count = 0;
        let mut best: Option<(usize, (f64, f64))> = None;

        for seed in 0..points.len() {
            if self.visited[seed] {
                continue;
            }

            let label = blob_count;
            blob_count += 1;
            self.visited[seed] = true;
            self.labels[seed] = label;
            self.queue.push_back(seed);

            let mut size = 0usize;
            let mut sum = (0.0f64, 0.0f64);

            while let Some(current) = self.queue.pop_front() {
                let p = points[current];
                size += 1;
                sum.0 += p.x as f64;
                sum.1 += p.y as f64;

                for (candidate, q) in points.iter().enumerate() {
                    if !self.visited[candidate] && p.distance_squared(q) < threshold_sq {
                        self.visited[candidate] = true;
                        self.labels[candidate] = label;
                        self.queue.push_back(candidate);
                    }
                }
            }

            // Strict comparison: the first blob to reach the largest size wins.
            if best.map_or(true, |(best_size, _)| size > best_size) {
                best = Some((size, sum));
            }
        }

        best.map(|(size, (sx, sy))| ClusterSummary {
            centroid: Point2::new((sx / size as f64) as f32, (sy / size as f64) as f32),
            dominant_size: size,
            blob_count,
            fast_path: false,
        })
    }
}

/// Arithmetic mean; the origin for an empty set.
pub fn centroid<'a>(points: impl Iterator<Item = &'a Point2>) -> Point2 {
    let (mut sx, mut sy, mut n) = (0.0f64, 0.0f64, 0usize);
    for p in points {
        sx += p.x as f64;
        sy += p.y as f64;
        n += 1;
    }
    if n == 0 {
        return Point2::ZERO;
    }
    Point2::new((sx / n as f64) as f32, (sy / n as f64) as f32)
}
