//! Query algorithms over loaded rectangle datasets.
//!
//! This module separates query logic from the grid's storage concerns.
//! It provides:
//! - k-nearest-neighbor search, flat and grid-accelerated
//! - Spatial joins, nested-loop and partition-based
//! - Skyline computation
//!
//! Every query borrows its inputs immutably and returns its results together
//! with a [`QueryStats`](gridquery_types::stats::QueryStats) record.

pub mod join;
pub mod knn;
pub mod skyline;
pub mod validation;
