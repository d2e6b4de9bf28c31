//! Grid-accelerated skyline over lower-left corners.

use crate::grid::{Cell, Grid};
use gridquery_types::rect::{Rectangle, dominates_point};
use gridquery_types::stats::{Algorithm, QueryStats};
use std::time::Instant;

/// Skyline of one labeled dataset.
///
/// Cells are swept in increasing `(row + col, row)` order and every rectangle
/// is considered once, in its home cell (the cell of its lower-left corner).
/// A cell whose home rectangles all lie above-right of a running skyline
/// member is pruned without per-candidate tests.
///
/// The result is sorted by natural id and does not depend on the partition
/// count.
#[derive(Debug, Clone, Copy)]
pub struct SkylineQuery<'a> {
    grid: &'a Grid,
    label: &'a str,
}

impl<'a> SkylineQuery<'a> {
    pub fn new(grid: &'a Grid, label: &'a str) -> Self {
        Self { grid, label }
    }

    /// Alias for [`SkylineQuery::run`].
    pub fn sky_query(&self) -> (Vec<&'a Rectangle>, QueryStats) {
        self.run()
    }

    pub fn run(&self) -> (Vec<&'a Rectangle>, QueryStats) {
        let start = Instant::now();
        let mut stats = QueryStats::new(Algorithm::Skyline);
        let grid = self.grid;

        let Some(dataset) = grid.dataset(self.label) else {
            stats.add_note(format!("dataset '{}' is not loaded", self.label));
            log::warn!("Skyline skipped: dataset '{}' is not loaded", self.label);
            stats.elapsed = start.elapsed();
            return (Vec::new(), stats);
        };

        // Home-cell grouping, indexed like the buckets
        let mut homes: Vec<Vec<u32>> = vec![Vec::new(); grid.cell_count()];
        for (idx, range) in dataset.ranges.iter().enumerate() {
            homes[grid.bucket_index(range.lo)].push(idx as u32);
        }

        let mut order: Vec<Cell> = grid.cells().collect();
        order.sort_by_key(|c| (c.row + c.col, c.row));

        let mut skyline: Vec<&'a Rectangle> = Vec::new();
        for cell in order {
            let home = &homes[grid.bucket_index(cell)];
            if home.is_empty() {
                continue;
            }
            stats.cells_visited += 1;

            let (min_x, min_y) = home
                .iter()
                .map(|&i| &dataset.rects[i as usize])
                .fold((f64::INFINITY, f64::INFINITY), |(x, y), r| {
                    (x.min(r.xmin()), y.min(r.ymin()))
                });

            let mut cell_dominated = false;
            for member in &skyline {
                stats.dominance_tests += 1;
                if dominates_point(member.xmin(), member.ymin(), min_x, min_y) {
                    cell_dominated = true;
                    break;
                }
            }
            if cell_dominated {
                stats.cells_pruned += 1;
                stats.candidates_pruned += home.len() as u64;
                continue;
            }

            for &idx in home {
                let candidate = &dataset.rects[idx as usize];
                stats.candidates_compared += 1;

                let mut dominated = false;
                for member in &skyline {
                    stats.dominance_tests += 1;
                    if member.dominates(candidate) {
                        dominated = true;
                        break;
                    }
                }
                if dominated {
                    continue;
                }

                skyline.retain(|member| {
                    stats.dominance_tests += 1;
                    !candidate.dominates(member)
                });
                skyline.push(candidate);
            }
        }

        skyline.sort_by(|a, b| a.cmp_id(b));
        stats.results = skyline.len();
        if dataset.rects.is_empty() {
            stats.add_note("dataset is empty");
        }
        stats.elapsed = start.elapsed();

        log::debug!(
            "Skyline over '{}': {} members, {} of {} cells pruned",
            self.label,
            skyline.len(),
            stats.cells_pruned,
            stats.cells_visited
        );
        (skyline, stats)
    }
}
