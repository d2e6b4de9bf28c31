//! Spatial join between two rectangle datasets.
//!
//! A pair joins when the closed rectangles intersect:
//! `a.xmin ≤ b.xmax ∧ b.xmin ≤ a.xmax ∧ a.ymin ≤ b.ymax ∧ b.ymin ≤ a.ymax`.

use crate::grid::Grid;
use gridquery_types::rect::Rectangle;
use gridquery_types::stats::{Algorithm, QueryStats};
use std::time::Instant;

/// Label joined on the left by default.
pub const LEFT_LABEL: &str = "A";
/// Label joined on the right by default.
pub const RIGHT_LABEL: &str = "B";

/// One intersecting pair, left rectangle first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinPair<'a> {
    pub left: &'a Rectangle,
    pub right: &'a Rectangle,
}

impl<'a> JoinPair<'a> {
    pub fn ids(&self) -> (&'a str, &'a str) {
        (self.left.id(), self.right.id())
    }
}

/// Nested-loop join over two flat collections.
///
/// Pairs are emitted with the left collection as the outer loop, both in
/// input order.
///
/// # Examples
///
/// ```
/// use gridquery::NaiveSpatialJoin;
/// use gridquery_types::rect::Rectangle;
///
/// let a = vec![Rectangle::new("A1", 0.0, 0.0, 10.0, 10.0)];
/// let b = vec![
///     Rectangle::new("B1", 5.0, 5.0, 15.0, 15.0),
///     Rectangle::new("B2", 50.0, 50.0, 60.0, 60.0),
/// ];
/// let (pairs, stats) = NaiveSpatialJoin::new(&a, &b).execute();
/// assert_eq!(pairs[0].ids(), ("A1", "B1"));
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(stats.comparisons, 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NaiveSpatialJoin<'a> {
    left: &'a [Rectangle],
    right: &'a [Rectangle],
}

impl<'a> NaiveSpatialJoin<'a> {
    pub fn new(left: &'a [Rectangle], right: &'a [Rectangle]) -> Self {
        Self { left, right }
    }

    pub fn execute(&self) -> (Vec<JoinPair<'a>>, QueryStats) {
        let start = Instant::now();
        let mut stats = QueryStats::new(Algorithm::NaiveJoin);

        let mut pairs = Vec::new();
        for a in self.left {
            for b in self.right {
                if a.intersects(b) {
                    pairs.push(JoinPair { left: a, right: b });
                }
            }
        }

        stats.comparisons = self.left.len() as u64 * self.right.len() as u64;
        stats.results = pairs.len();
        if self.left.is_empty() || self.right.is_empty() {
            stats.add_note("one of the datasets is empty");
        }
        stats.elapsed = start.elapsed();

        log::debug!(
            "Naive join: {} pairs from {} comparisons",
            pairs.len(),
            stats.comparisons
        );
        (pairs, stats)
    }
}

/// Partition-based spatial-merge join over two labeled datasets in a grid.
///
/// Each cell joins only its local buckets. A rectangle spanning several cells
/// sits in every one of them, so an intersecting pair can be rediscovered in
/// each cell both rectangles share; it is reported only from its owner cell,
/// the smallest `(row, col)` common to both rectangles' cell ranges. The
/// output therefore equals the naive join as a set and holds no duplicates.
#[derive(Debug, Clone, Copy)]
pub struct PbsmJoin<'a> {
    grid: &'a Grid,
    left: &'a str,
    right: &'a str,
}

impl<'a> PbsmJoin<'a> {
    /// Join label `"A"` against label `"B"`.
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            left: LEFT_LABEL,
            right: RIGHT_LABEL,
        }
    }

    pub fn with_labels(mut self, left: &'a str, right: &'a str) -> Self {
        self.left = left;
        self.right = right;
        self
    }

    pub fn execute(&self) -> (Vec<JoinPair<'a>>, QueryStats) {
        let start = Instant::now();
        let mut stats = QueryStats::new(Algorithm::PbsmJoin);
        let grid = self.grid;

        let (Some(a), Some(b)) = (grid.dataset(self.left), grid.dataset(self.right)) else {
            for label in [self.left, self.right] {
                if !grid.contains_label(label) {
                    stats.add_note(format!("dataset '{}' is not loaded", label));
                }
            }
            log::warn!("PBSM join skipped: {}", stats.notes.join("; "));
            stats.elapsed = start.elapsed();
            return (Vec::new(), stats);
        };

        let mut pairs = Vec::new();
        for cell in grid.cells() {
            let local_a = a.bucket(grid, cell);
            let local_b = b.bucket(grid, cell);
            if local_a.is_empty() || local_b.is_empty() {
                continue;
            }

            stats.cells_visited += 1;
            stats.comparisons += local_a.len() as u64 * local_b.len() as u64;

            for &ia in local_a {
                let (ra, range_a) = (&a.rects[ia as usize], &a.ranges[ia as usize]);
                for &ib in local_b {
                    let rb = &b.rects[ib as usize];
                    if !ra.intersects(rb) {
                        continue;
                    }
                    stats.candidate_pairs += 1;
                    if range_a.first_shared(&b.ranges[ib as usize]) == Some(cell) {
                        pairs.push(JoinPair {
                            left: ra,
                            right: rb,
                        });
                    } else {
                        stats.duplicates_suppressed += 1;
                    }
                }
            }
        }

        stats.results = pairs.len();
        if a.rects.is_empty() || b.rects.is_empty() {
            stats.add_note("one of the datasets is empty");
        }
        stats.elapsed = start.elapsed();

        log::debug!(
            "PBSM join: {} pairs, {} local comparisons over {} cells, {} duplicates suppressed",
            pairs.len(),
            stats.comparisons,
            stats.cells_visited,
            stats.duplicates_suppressed
        );
        (pairs, stats)
    }
}
