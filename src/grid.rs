//! Uniform-grid spatial index.
//!
//! The domain `[xL, xU] × [yL, yU]` is split into `m × m` equal cells. Each
//! labeled dataset owns an arena of rectangles; every cell keeps a bucket of
//! arena indices for the rectangles whose bounding box overlaps it, so a
//! rectangle spanning `k` cells is stored once and referenced `k` times.
//!
//! The grid is mutated only through `load`, `load_rectangles` and `reset`,
//! all of which take `&mut self`. Queries borrow it immutably.

use crate::compute::validation::{validate_grid_shape, validate_record};
use crate::config::{Config, LoadPolicy};
use crate::error::Result;
use crate::reader::{DatasetBuilder, LoadReport, read_path, read_rectangles};
use gridquery_types::bounds::Bounds;
use gridquery_types::rect::Rectangle;
use rustc_hash::FxHashMap;
use std::io::BufRead;
use std::path::Path;

/// A grid cell index. Ordering is lexicographic on `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Inclusive block of cells `lo..=hi` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub lo: Cell,
    pub hi: Cell,
}

impl CellRange {
    /// Row-major iteration over the block.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        let (lo, hi) = (self.lo, self.hi);
        (lo.row..=hi.row).flat_map(move |row| (lo.col..=hi.col).map(move |col| Cell::new(row, col)))
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (self.lo.row..=self.hi.row).contains(&cell.row)
            && (self.lo.col..=self.hi.col).contains(&cell.col)
    }

    /// The smallest cell shared with `other`, if the blocks overlap.
    pub fn first_shared(&self, other: &CellRange) -> Option<Cell> {
        let row = self.lo.row.max(other.lo.row);
        let col = self.lo.col.max(other.lo.col);
        if row <= self.hi.row.min(other.hi.row) && col <= self.hi.col.min(other.hi.col) {
            Some(Cell::new(row, col))
        } else {
            None
        }
    }
}

/// Rectangles of one label plus their per-cell buckets.
#[derive(Debug, Clone, Default)]
pub(crate) struct Dataset {
    pub(crate) rects: Vec<Rectangle>,
    /// Cell range of each arena entry, parallel to `rects`
    pub(crate) ranges: Vec<CellRange>,
    /// Indexed by `row * m + col`
    pub(crate) buckets: Vec<Vec<u32>>,
}

impl Dataset {
    pub(crate) fn bucket(&self, grid: &Grid, cell: Cell) -> &[u32] {
        &self.buckets[grid.bucket_index(cell)]
    }

    fn entries(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

/// Uniform-cell spatial index over a fixed bounding domain.
///
/// # Examples
///
/// ```
/// use gridquery::grid::{Cell, Grid};
/// use gridquery_types::bounds::Bounds;
/// use gridquery_types::rect::Rectangle;
///
/// let mut grid = Grid::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 10)?;
/// grid.load_rectangles(vec![Rectangle::new("R1", 5.0, 5.0, 15.0, 15.0)], "default")?;
///
/// // Spans four cells but is stored once
/// assert_eq!(grid.cells_overlapping(&grid.get_dataset("default")[0]).len(), 4);
/// assert_eq!(grid.get_dataset("default").len(), 1);
/// assert_eq!(grid.bucket("default", Cell::new(1, 1)).count(), 1);
/// # Ok::<(), gridquery::GridQueryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    bounds: Bounds,
    partitions: usize,
    cell_width: f64,
    cell_height: f64,
    load_policy: LoadPolicy,
    datasets: FxHashMap<String, Dataset>,
}

impl Grid {
    /// Create an empty grid with `partitions` cells per axis.
    ///
    /// Fails with `InvalidParameter` when `partitions < 1` or the bounds are
    /// inverted or non-finite.
    pub fn new(bounds: Bounds, partitions: usize) -> Result<Self> {
        validate_grid_shape(&bounds, partitions)?;
        Ok(Self {
            bounds,
            partitions,
            cell_width: bounds.width() / partitions as f64,
            cell_height: bounds.height() / partitions as f64,
            load_policy: LoadPolicy::default(),
            datasets: FxHashMap::default(),
        })
    }

    /// Create a grid from the domain, partition count and load policy in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.bounds, config.partitions)?.with_load_policy(config.load_policy))
    }

    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    pub fn load_policy(&self) -> LoadPolicy {
        self.load_policy
    }

    pub fn set_load_policy(&mut self, policy: LoadPolicy) {
        self.load_policy = policy;
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Partitions per axis (`m`).
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    pub fn cell_count(&self) -> usize {
        self.partitions * self.partitions
    }

    /// Discard every dataset and re-partition the domain.
    pub fn reset(&mut self, bounds: Bounds, partitions: usize) -> Result<()> {
        validate_grid_shape(&bounds, partitions)?;
        self.bounds = bounds;
        self.partitions = partitions;
        self.cell_width = bounds.width() / partitions as f64;
        self.cell_height = bounds.height() / partitions as f64;
        self.datasets.clear();
        log::debug!(
            "Grid reset to m={} over [{}, {}]-[{}, {}]",
            partitions,
            bounds.xl,
            bounds.yl,
            bounds.xu,
            bounds.yu
        );
        Ok(())
    }

    /// Parse delimited records from `source` and index them under `label`.
    ///
    /// Malformed rows abort the load or are skipped according to the grid's
    /// load policy; the report carries the malformed-row count either way.
    /// A label that already holds data is replaced, so loading the same
    /// source twice leaves a single copy of every id.
    pub fn load<R: BufRead>(&mut self, source: R, label: &str) -> Result<LoadReport> {
        let parsed = read_rectangles(source, Some(label), self.load_policy)?;
        self.install(label, parsed.rects);
        Ok(parsed.report)
    }

    /// Open a delimited file and index it under `label`.
    pub fn load_path<P: AsRef<Path>>(&mut self, path: P, label: &str) -> Result<LoadReport> {
        let parsed = read_path(path, Some(label), self.load_policy)?;
        self.install(label, parsed.rects);
        Ok(parsed.report)
    }

    /// Index already-parsed rectangles under `label`.
    ///
    /// Duplicate ids and non-finite coordinates follow the load policy;
    /// positions in the report are 1-based record positions. Inverted
    /// corners never reach this point since [`Rectangle::new`] orders
    /// them, so only the file reader reports inverted rows.
    pub fn load_rectangles<I>(&mut self, rects: I, label: &str) -> Result<LoadReport>
    where
        I: IntoIterator<Item = Rectangle>,
    {
        let mut builder = DatasetBuilder::new(Some(label), self.load_policy);
        for (idx, rect) in rects.into_iter().enumerate() {
            match validate_record(idx + 1, rect.xmin(), rect.ymin(), rect.xmax(), rect.ymax()) {
                Ok(()) => builder.push(idx + 1, rect)?,
                Err(err) => builder.reject(err)?,
            }
        }
        let parsed = builder.finish();
        self.install(label, parsed.rects);
        Ok(parsed.report)
    }

    fn install(&mut self, label: &str, rects: Vec<Rectangle>) {
        let mut dataset = Dataset {
            ranges: Vec::with_capacity(rects.len()),
            buckets: vec![Vec::new(); self.cell_count()],
            rects: Vec::new(),
        };

        for (idx, rect) in rects.iter().enumerate() {
            let range = self.cell_range(rect);
            for cell in range.cells() {
                let bucket = self.bucket_index(cell);
                dataset.buckets[bucket].push(idx as u32);
            }
            dataset.ranges.push(range);
        }
        dataset.rects = rects;

        log::debug!(
            "Indexed {} rectangles under '{}' ({} bucket entries)",
            dataset.rects.len(),
            label,
            dataset.entries()
        );

        if self.datasets.insert(label.to_string(), dataset).is_some() {
            log::debug!("Replaced existing dataset '{}'", label);
        }
    }

    /// The rectangles under `label`, each exactly once, in load order.
    ///
    /// Unknown labels yield an empty slice.
    pub fn get_dataset(&self, label: &str) -> &[Rectangle] {
        self.datasets
            .get(label)
            .map(|d| d.rects.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.datasets.contains_key(label)
    }

    /// Loaded labels in sorted order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.datasets.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    pub(crate) fn dataset(&self, label: &str) -> Option<&Dataset> {
        self.datasets.get(label)
    }

    /// Rectangles stored in one bucket; empty for unknown labels or cells.
    pub fn bucket<'a>(
        &'a self,
        label: &str,
        cell: Cell,
    ) -> impl Iterator<Item = &'a Rectangle> + use<'a> {
        let (rects, ids): (&'a [Rectangle], &'a [u32]) = match self.datasets.get(label) {
            Some(d) if cell.row < self.partitions && cell.col < self.partitions => {
                (&d.rects, d.bucket(self, cell))
            }
            _ => (&[], &[]),
        };
        ids.iter().map(move |&idx| &rects[idx as usize])
    }

    /// Cell containing `(x, y)`, clamped to the grid.
    ///
    /// `row = clamp(floor((y - yL) / cellHeight), 0, m-1)`, symmetric for col.
    pub fn cell_of(&self, x: f64, y: f64) -> Cell {
        Cell::new(
            self.axis_index(y, self.bounds.yl, self.cell_height),
            self.axis_index(x, self.bounds.xl, self.cell_width),
        )
    }

    fn axis_index(&self, value: f64, lower: f64, size: f64) -> usize {
        if size <= 0.0 {
            return 0;
        }
        let idx = ((value - lower) / size).floor();
        if idx.is_nan() || idx < 0.0 {
            0
        } else {
            // `as` saturates for values beyond usize
            (idx as usize).min(self.partitions - 1)
        }
    }

    /// Block of cells overlapped by a rectangle's bounding box.
    pub fn cell_range(&self, rect: &Rectangle) -> CellRange {
        CellRange {
            lo: self.cell_of(rect.xmin(), rect.ymin()),
            hi: self.cell_of(rect.xmax(), rect.ymax()),
        }
    }

    /// Cells a query region touches, in row-major order.
    pub fn cells_overlapping(&self, rect: &Rectangle) -> Vec<Cell> {
        self.cell_range(rect).cells().collect()
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        CellRange {
            lo: Cell::new(0, 0),
            hi: Cell::new(self.partitions - 1, self.partitions - 1),
        }
        .cells()
    }

    /// Spatial extent of one cell.
    pub fn cell_rect(&self, cell: Cell) -> Bounds {
        let xl = self.bounds.xl + cell.col as f64 * self.cell_width;
        let yl = self.bounds.yl + cell.row as f64 * self.cell_height;
        Bounds::new(xl, yl, xl + self.cell_width, yl + self.cell_height)
    }

    pub(crate) fn bucket_index(&self, cell: Cell) -> usize {
        cell.row * self.partitions + cell.col
    }
}
