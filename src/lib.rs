//! Grid-indexed spatial queries over axis-aligned rectangles.
//!
//! Datasets are loaded into a uniform grid under a label and queried with
//! k-nearest-neighbor search, spatial joins and skyline computation. Every
//! query returns its results together with a [`QueryStats`] record whose
//! `Display` form is the human-readable statistics block.
//!
//! ```rust
//! use gridquery::prelude::*;
//!
//! let mut grid = Grid::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 10)?;
//! grid.load_rectangles(
//!     vec![
//!         Rectangle::new("R1", 0.0, 0.0, 10.0, 10.0),
//!         Rectangle::new("R2", 50.0, 50.0, 60.0, 60.0),
//!         Rectangle::new("R3", 5.0, 5.0, 15.0, 15.0),
//!     ],
//!     "default",
//! )?;
//!
//! let (nearest, stats) = GridKnn::new(&grid, "default").knn(5.0, 5.0, 2)?;
//! let ids: Vec<&str> = nearest.iter().map(|n| n.rect.id()).collect();
//! assert_eq!(ids, vec!["R1", "R3"]);
//! println!("{}", stats);
//! # Ok::<(), gridquery::GridQueryError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod grid;
pub mod reader;
pub mod session;

pub use builder::SessionBuilder;
pub use config::{Config, LoadPolicy};
pub use error::{GridQueryError, Result};
pub use generator::Generator;
pub use grid::{Cell, CellRange, Grid};
pub use reader::{LoadReport, ParsedDataset, RowIssue};
pub use session::Session;

pub use compute::join::{JoinPair, NaiveSpatialJoin, PbsmJoin};
pub use compute::knn::{GridKnn, LinearScan, Neighbor};
pub use compute::skyline::SkylineQuery;

pub use geo::{Point, Rect};

pub use gridquery_types::bounds::Bounds;
pub use gridquery_types::rect::Rectangle;
pub use gridquery_types::stats::{Algorithm, QueryStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, GridQueryError, LoadPolicy, Result, Session, SessionBuilder};

    pub use crate::{Bounds, Grid, Rectangle};

    pub use crate::{GridKnn, LinearScan, NaiveSpatialJoin, PbsmJoin, SkylineQuery};

    pub use crate::{Algorithm, Generator, QueryStats};
}
