//! # gridquery-types
//!
//! Core value types for the gridquery spatial query engine.
//!
//! This crate provides the types shared by the index, the query algorithms and
//! the export layer:
//!
//! - **Rectangle**: `Rectangle`, an immutable axis-aligned box with an id and an optional label
//! - **Domain**: `Bounds`, the fixed bounding domain of a grid or generator
//! - **Statistics**: `Algorithm` and `QueryStats`, the observational counters every query returns
//!
//! Rectangles are built on top of `geo::Rect` and every type is serializable with Serde.
//!
//! ## Examples
//!
//! ```rust
//! use gridquery_types::bounds::Bounds;
//! use gridquery_types::rect::Rectangle;
//!
//! let domain = Bounds::new(0.0, 0.0, 100.0, 100.0);
//! let r = Rectangle::new("R1", 0.0, 0.0, 10.0, 10.0);
//!
//! assert!(domain.contains(r.xmin(), r.ymin()));
//! assert_eq!(r.distance_to(5.0, 5.0), 0.0);
//! ```

pub mod bounds;
pub mod rect;
pub mod stats;
