//! Validation for query parameters, grid domains and rectangle records.

use crate::error::{GridQueryError, Result};
use gridquery_types::bounds::Bounds;

/// Upper bound on partitions per axis; each dataset allocates `m²` buckets.
pub const MAX_PARTITIONS: usize = 4096;

/// Validates that a neighbor count is at least one.
///
/// # Examples
///
/// ```
/// use gridquery::compute::validation::validate_k;
///
/// assert!(validate_k(1).is_ok());
/// assert!(validate_k(0).is_err());
/// ```
pub fn validate_k(k: usize) -> Result<()> {
    if k < 1 {
        return Err(GridQueryError::InvalidParameter(format!(
            "k must be at least 1, got: {}",
            k
        )));
    }
    Ok(())
}

/// Validates that a query point has finite coordinates.
pub fn validate_query_point(x: f64, y: f64) -> Result<()> {
    if !x.is_finite() {
        return Err(GridQueryError::InvalidParameter(format!(
            "Query x must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(GridQueryError::InvalidParameter(format!(
            "Query y must be finite, got: {}",
            y
        )));
    }

    Ok(())
}

/// Validates a grid domain and partition count.
///
/// # Examples
///
/// ```
/// use gridquery::compute::validation::validate_grid_shape;
/// use gridquery_types::bounds::Bounds;
///
/// assert!(validate_grid_shape(&Bounds::new(0.0, 0.0, 100.0, 100.0), 10).is_ok());
///
/// // Inverted x axis
/// assert!(validate_grid_shape(&Bounds::new(100.0, 0.0, 0.0, 100.0), 10).is_err());
///
/// // No partitions
/// assert!(validate_grid_shape(&Bounds::new(0.0, 0.0, 100.0, 100.0), 0).is_err());
/// ```
pub fn validate_grid_shape(bounds: &Bounds, partitions: usize) -> Result<()> {
    validate_bounds(bounds)?;

    if partitions < 1 {
        return Err(GridQueryError::InvalidParameter(format!(
            "Partition count must be at least 1, got: {}",
            partitions
        )));
    }

    if partitions > MAX_PARTITIONS {
        return Err(GridQueryError::InvalidParameter(format!(
            "Partition count must be at most {}, got: {}",
            MAX_PARTITIONS, partitions
        )));
    }

    Ok(())
}

/// Validates domain bounds: finite, `xl <= xu`, `yl <= yu` and a finite extent.
pub fn validate_bounds(bounds: &Bounds) -> Result<()> {
    let Bounds { xl, yl, xu, yu } = *bounds;

    for (name, value) in [("xL", xl), ("yL", yl), ("xU", xu), ("yU", yu)] {
        if !value.is_finite() {
            return Err(GridQueryError::InvalidParameter(format!(
                "Domain bound {} must be finite, got: {}",
                name, value
            )));
        }
    }

    if xu < xl {
        return Err(GridQueryError::InvalidParameter(format!(
            "Domain xU ({}) must be >= xL ({})",
            xu, xl
        )));
    }

    if yu < yl {
        return Err(GridQueryError::InvalidParameter(format!(
            "Domain yU ({}) must be >= yL ({})",
            yu, yl
        )));
    }

    // Finite bounds can still overflow once subtracted
    if !bounds.width().is_finite() || !bounds.height().is_finite() {
        return Err(GridQueryError::InvalidParameter(format!(
            "Domain extent must be finite, got: {} x {}",
            bounds.width(),
            bounds.height()
        )));
    }

    Ok(())
}

/// Validates the coordinates of one rectangle record read from `line`.
///
/// Returns `MalformedRecord` naming the offending value.
pub fn validate_record(line: usize, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<()> {
    for (name, value) in [("xmin", xmin), ("ymin", ymin), ("xmax", xmax), ("ymax", ymax)] {
        if !value.is_finite() {
            return Err(GridQueryError::malformed(
                line,
                value.to_string(),
                format!("{} must be finite", name),
            ));
        }
    }

    if xmin > xmax {
        return Err(GridQueryError::malformed(
            line,
            format!("{} > {}", xmin, xmax),
            "xmin is greater than xmax",
        ));
    }

    if ymin > ymax {
        return Err(GridQueryError::malformed(
            line,
            format!("{} > {}", ymin, ymax),
            "ymin is greater than ymax",
        ));
    }

    Ok(())
}
