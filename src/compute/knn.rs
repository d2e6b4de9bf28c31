//! k-nearest-neighbor search over rectangles.
//!
//! Distance from a query point to a rectangle is the Euclidean distance to the
//! nearest point of the rectangle (zero inside or on the boundary). Results
//! are ordered by ascending distance with ties broken by natural id order, so
//! the brute-force and grid searches return identical lists.

use crate::compute::validation::{validate_k, validate_query_point};
use crate::error::Result;
use crate::grid::{Cell, Grid};
use gridquery_types::rect::Rectangle;
use gridquery_types::stats::{Algorithm, QueryStats};
use std::cmp::Ordering;
use std::time::Instant;

/// One k-NN result row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub distance: f64,
    pub rect: &'a Rectangle,
}

impl<'a> Neighbor<'a> {
    fn measure(rect: &'a Rectangle, x: f64, y: f64) -> Self {
        Self {
            distance: rect.distance_to(x, y),
            rect,
        }
    }
}

fn rank(a: &Neighbor<'_>, b: &Neighbor<'_>) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.rect.cmp_id(b.rect))
}

/// Keep the `k` best candidates, sorted.
fn select_k(mut candidates: Vec<Neighbor<'_>>, k: usize) -> Vec<Neighbor<'_>> {
    if candidates.len() > k {
        candidates.select_nth_unstable_by(k - 1, rank);
        candidates.truncate(k);
    }
    candidates.sort_by(rank);
    candidates
}

fn note_shortfall(stats: &mut QueryStats, found: usize, k: usize) {
    if found == 0 {
        stats.add_note("dataset is empty; no neighbors returned");
        log::warn!("{} query against an empty dataset", stats.algorithm);
    } else if found < k {
        stats.add_note(format!(
            "only {} of {} requested neighbors available",
            found, k
        ));
        log::warn!(
            "{} returned {} of {} requested neighbors",
            stats.algorithm,
            found,
            k
        );
    }
}

/// Brute-force k-NN over a flat rectangle collection.
///
/// # Examples
///
/// ```
/// use gridquery::LinearScan;
/// use gridquery_types::rect::Rectangle;
///
/// let rects = vec![
///     Rectangle::new("R1", 0.0, 0.0, 10.0, 10.0),
///     Rectangle::new("R2", 50.0, 50.0, 60.0, 60.0),
/// ];
/// let (nearest, stats) = LinearScan::new(&rects).knn(55.0, 70.0, 1)?;
/// assert_eq!(nearest[0].rect.id(), "R2");
/// assert_eq!(nearest[0].distance, 10.0);
/// assert_eq!(stats.comparisons, 2);
/// # Ok::<(), gridquery::GridQueryError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LinearScan<'a> {
    rects: &'a [Rectangle],
}

impl<'a> LinearScan<'a> {
    pub fn new(rects: &'a [Rectangle]) -> Self {
        Self { rects }
    }

    /// The `k` rectangles nearest to `(x, y)`.
    ///
    /// A dataset smaller than `k` yields every member plus a note in the
    /// statistics; this is not an error.
    pub fn knn(&self, x: f64, y: f64, k: usize) -> Result<(Vec<Neighbor<'a>>, QueryStats)> {
        validate_k(k)?;
        validate_query_point(x, y)?;

        let start = Instant::now();
        let mut stats = QueryStats::new(Algorithm::LinearScan);

        let candidates: Vec<Neighbor<'a>> = self
            .rects
            .iter()
            .map(|rect| Neighbor::measure(rect, x, y))
            .collect();
        stats.comparisons = candidates.len() as u64;

        let results = select_k(candidates, k);
        stats.results = results.len();
        note_shortfall(&mut stats, results.len(), k);
        stats.elapsed = start.elapsed();

        log::debug!(
            "Linear scan k={} at ({}, {}): {} comparisons",
            k,
            x,
            y,
            stats.comparisons
        );
        Ok((results, stats))
    }
}

/// Grid-accelerated k-NN over one labeled dataset.
///
/// Starting from the cell containing the query point, the search examines
/// the surrounding block of cells with radius 1, 2, 4, 8, ... (3×3, 5×5,
/// 9×9, ...), visiting each cell once. It stops when at least `k` candidates
/// are known and every unvisited cell lies strictly farther away than the
/// current k-th best distance, or when the block covers the whole grid.
#[derive(Debug, Clone, Copy)]
pub struct GridKnn<'a> {
    grid: &'a Grid,
    label: &'a str,
}

impl<'a> GridKnn<'a> {
    pub fn new(grid: &'a Grid, label: &'a str) -> Self {
        Self { grid, label }
    }

    pub fn knn(&self, x: f64, y: f64, k: usize) -> Result<(Vec<Neighbor<'a>>, QueryStats)> {
        validate_k(k)?;
        validate_query_point(x, y)?;

        let start = Instant::now();
        let mut stats = QueryStats::new(Algorithm::GridKnn);

        let Some(dataset) = self.grid.dataset(self.label).filter(|d| !d.rects.is_empty()) else {
            note_shortfall(&mut stats, 0, k);
            stats.elapsed = start.elapsed();
            return Ok((Vec::new(), stats));
        };

        let grid = self.grid;
        let last = grid.partitions() - 1;
        let center = grid.cell_of(x, y);

        let mut seen = vec![false; dataset.rects.len()];
        let mut candidates: Vec<Neighbor<'a>> = Vec::new();
        let mut previous: Option<Block> = None;
        let mut radius = 1usize;

        loop {
            let block = Block::around(center, radius, last);

            for cell in block.cells() {
                if previous.is_some_and(|p| p.contains(cell)) {
                    continue;
                }
                stats.cells_visited += 1;
                for &idx in dataset.bucket(grid, cell) {
                    let idx = idx as usize;
                    if !seen[idx] {
                        seen[idx] = true;
                        stats.comparisons += 1;
                        candidates.push(Neighbor::measure(&dataset.rects[idx], x, y));
                    }
                }
            }
            stats.rings += 1;

            if block.covers_grid(last) {
                break;
            }

            if candidates.len() >= k {
                let kth = kth_distance(&mut candidates, k);
                if block.unvisited_gap(grid, x, y, last) > kth {
                    break;
                }
            }

            previous = Some(block);
            radius = radius.saturating_mul(2);
        }

        let results = select_k(candidates, k);
        stats.results = results.len();
        note_shortfall(&mut stats, results.len(), k);
        stats.elapsed = start.elapsed();

        log::debug!(
            "Grid k-NN k={} at ({}, {}): {} cells, {} comparisons, {} rings",
            k,
            x,
            y,
            stats.cells_visited,
            stats.comparisons,
            stats.rings
        );
        Ok((results, stats))
    }
}

fn kth_distance(candidates: &mut [Neighbor<'_>], k: usize) -> f64 {
    let (_, kth, _) = candidates.select_nth_unstable_by(k - 1, rank);
    kth.distance
}

/// Square block of cells clamped to the grid.
#[derive(Debug, Clone, Copy)]
struct Block {
    row_lo: usize,
    row_hi: usize,
    col_lo: usize,
    col_hi: usize,
}

impl Block {
    fn around(center: Cell, radius: usize, last: usize) -> Self {
        Self {
            row_lo: center.row.saturating_sub(radius),
            row_hi: center.row.saturating_add(radius).min(last),
            col_lo: center.col.saturating_sub(radius),
            col_hi: center.col.saturating_add(radius).min(last),
        }
    }

    fn contains(&self, cell: Cell) -> bool {
        (self.row_lo..=self.row_hi).contains(&cell.row)
            && (self.col_lo..=self.col_hi).contains(&cell.col)
    }

    fn cells(self) -> impl Iterator<Item = Cell> {
        (self.row_lo..=self.row_hi)
            .flat_map(move |row| (self.col_lo..=self.col_hi).map(move |col| Cell::new(row, col)))
    }

    fn covers_grid(&self, last: usize) -> bool {
        self.row_lo == 0 && self.col_lo == 0 && self.row_hi == last && self.col_hi == last
    }

    /// Lower bound on the distance from `(x, y)` to any cell outside the block.
    ///
    /// Sides that already reach the domain edge have no unvisited cells
    /// beyond them; rectangles outside the domain are clamped into boundary
    /// cells and lie even farther out.
    fn unvisited_gap(&self, grid: &Grid, x: f64, y: f64, last: usize) -> f64 {
        let bounds = grid.bounds();
        let (cw, ch) = (grid.cell_width(), grid.cell_height());
        let mut gap = f64::INFINITY;

        if self.col_lo > 0 {
            gap = gap.min(x - (bounds.xl + self.col_lo as f64 * cw));
        }
        if self.col_hi < last {
            gap = gap.min(bounds.xl + (self.col_hi + 1) as f64 * cw - x);
        }
        if self.row_lo > 0 {
            gap = gap.min(y - (bounds.yl + self.row_lo as f64 * ch));
        }
        if self.row_hi < last {
            gap = gap.min(bounds.yl + (self.row_hi + 1) as f64 * ch - y);
        }
        gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::GridQueryError;
    use gridquery_types::bounds::Bounds;

    fn sample() -> Vec<Rectangle> {
        vec![
            Rectangle::new("R1", 0.0, 0.0, 10.0, 10.0),
            Rectangle::new("R2", 50.0, 50.0, 60.0, 60.0),
            Rectangle::new("R3", 5.0, 5.0, 15.0, 15.0),
        ]
    }

    fn grid_with(rects: Vec<Rectangle>, m: usize) -> Grid {
        let mut grid = Grid::new(Bounds::new(0.0, 0.0, 100.0, 100.0), m).unwrap();
        grid.load_rectangles(rects, "default").unwrap();
        grid
    }

    fn ids<'a>(results: &[Neighbor<'a>]) -> Vec<&'a str> {
        results.iter().map(|n| n.rect.id()).collect()
    }

    #[test]
    fn test_linear_scan_tie_break_by_id() {
        let rects = sample();
        let (results, stats) = LinearScan::new(&rects).knn(5.0, 5.0, 2).unwrap();
        assert_eq!(ids(&results), vec!["R1", "R3"]);
        assert!(results.iter().all(|n| n.distance == 0.0));
        assert_eq!(stats.comparisons, 3);
        assert!(!stats.has_notes());
    }

    #[test]
    fn test_grid_knn_scenario() {
        let grid = grid_with(sample(), 10);
        let (results, stats) = GridKnn::new(&grid, "default").knn(5.0, 5.0, 2).unwrap();
        assert_eq!(ids(&results), vec!["R1", "R3"]);
        assert_eq!(results[0].distance, 0.0);
        assert!(stats.cells_visited >= 4);
        assert!(stats.comparisons <= 3);
    }

    #[test]
    fn test_fewer_than_k_is_a_note_not_an_error() {
        let rects = sample();
        let (results, stats) = LinearScan::new(&rects).knn(0.0, 0.0, 10).unwrap();
        assert_eq!(results.len(), 3);
        assert!(stats.to_string().contains("only 3 of 10"));

        let grid = grid_with(sample(), 4);
        let (results, stats) = GridKnn::new(&grid, "default").knn(0.0, 0.0, 10).unwrap();
        assert_eq!(results.len(), 3);
        assert!(stats.has_notes());
    }

    #[test]
    fn test_empty_dataset() {
        let (results, stats) = LinearScan::new(&[]).knn(1.0, 1.0, 3).unwrap();
        assert!(results.is_empty());
        assert!(stats.to_string().contains("dataset is empty"));

        let grid = Grid::new(Bounds::default(), 5).unwrap();
        let (results, stats) = GridKnn::new(&grid, "missing").knn(1.0, 1.0, 3).unwrap();
        assert!(results.is_empty());
        assert!(stats.has_notes());
    }

    #[test]
    fn test_invalid_parameters() {
        let rects = sample();
        assert!(matches!(
            LinearScan::new(&rects).knn(0.0, 0.0, 0),
            Err(GridQueryError::InvalidParameter(_))
        ));
        let grid = grid_with(sample(), 10);
        assert!(GridKnn::new(&grid, "default").knn(f64::NAN, 0.0, 1).is_err());
    }

    #[test]
    fn test_query_outside_domain() {
        let grid = grid_with(sample(), 10);
        let rects = sample();
        let (grid_results, _) = GridKnn::new(&grid, "default").knn(-40.0, 200.0, 3).unwrap();
        let (scan_results, _) = LinearScan::new(&rects).knn(-40.0, 200.0, 3).unwrap();
        assert_eq!(ids(&grid_results), vec!["R2", "R3", "R1"]);
        assert_eq!(ids(&grid_results), ids(&scan_results));
        for (g, s) in grid_results.iter().zip(&scan_results) {
            assert_eq!(g.distance, s.distance);
        }
    }

    #[test]
    fn test_far_neighbor_requires_expansion() {
        let rects = vec![
            Rectangle::new("near", 91.0, 91.0, 92.0, 92.0),
            Rectangle::new("far", 1.0, 1.0, 2.0, 2.0),
        ];
        let grid = grid_with(rects, 20);
        let (results, stats) = GridKnn::new(&grid, "default").knn(2.0, 1.0, 1).unwrap();
        assert_eq!(ids(&results), vec!["far"]);

        let (results, stats_two) = GridKnn::new(&grid, "default").knn(2.0, 1.0, 2).unwrap();
        assert_eq!(ids(&results), vec!["far", "near"]);
        assert!(stats_two.rings > stats.rings);
    }

    #[test]
    fn test_matches_linear_scan_on_generated_data() {
        let rects = Generator::new(Bounds::new(0.0, 0.0, 100.0, 100.0))
            .unwrap()
            .with_seed(11)
            .generate(300, None)
            .unwrap();
        let scan = rects.clone();
        let grid = grid_with(rects, 16);

        for (x, y) in [(0.0, 0.0), (50.0, 50.0), (99.9, 3.2), (-10.0, 120.0)] {
            for k in [1, 5, 40, 300] {
                let (expected, _) = LinearScan::new(&scan).knn(x, y, k).unwrap();
                let (actual, _) = GridKnn::new(&grid, "default").knn(x, y, k).unwrap();
                let expected: Vec<(f64, &str)> =
                    expected.iter().map(|n| (n.distance, n.rect.id())).collect();
                let actual: Vec<(f64, &str)> =
                    actual.iter().map(|n| (n.distance, n.rect.id())).collect();
                assert_eq!(actual, expected, "query ({x}, {y}) k={k}");
            }
        }
    }
}
