use geo::{Distance, Euclidean, Point, Rect};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// An axis-aligned rectangle with an opaque identifier.
///
/// This is a wrapper around `geo::Rect` carrying the record id read from the
/// input file and the label of the dataset it was loaded under. Degenerate
/// rectangles (zero width and/or height) are valid and represent points or
/// segments.
///
/// # Examples
///
/// ```
/// use gridquery_types::rect::Rectangle;
///
/// let r = Rectangle::new("R1", 0.0, 0.0, 10.0, 10.0);
/// assert_eq!(r.width(), 10.0);
/// assert!(r.is_point() == false);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Record identifier, compared in natural order
    pub id: String,
    /// The underlying geometric rectangle
    pub rect: Rect,
    /// Dataset label the rectangle belongs to, if any
    #[serde(default)]
    pub label: Option<String>,
}

impl Rectangle {
    /// Create a new rectangle from its id and minimum/maximum coordinates.
    ///
    /// `geo::Rect` orders its corners, so callers that need to reject inverted
    /// bounds must check them before constructing (the reader does).
    pub fn new(id: impl Into<String>, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            id: id.into(),
            rect: Rect::new(geo::coord! { x: xmin, y: ymin }, geo::coord! { x: xmax, y: ymax }),
            label: None,
        }
    }

    /// Attach a dataset label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn xmin(&self) -> f64 {
        self.rect.min().x
    }

    pub fn ymin(&self) -> f64 {
        self.rect.min().y
    }

    pub fn xmax(&self) -> f64 {
        self.rect.max().x
    }

    pub fn ymax(&self) -> f64 {
        self.rect.max().y
    }

    pub fn width(&self) -> f64 {
        self.xmax() - self.xmin()
    }

    pub fn height(&self) -> f64 {
        self.ymax() - self.ymin()
    }

    /// True when the rectangle has zero extent on both axes.
    pub fn is_point(&self) -> bool {
        self.width() == 0.0 && self.height() == 0.0
    }

    /// The lower-left corner, used as the representative point for dominance.
    pub fn lower_left(&self) -> Point {
        Point::new(self.xmin(), self.ymin())
    }

    /// Closed axis-aligned intersection test; touching edges count.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.xmin() <= other.xmax()
            && other.xmin() <= self.xmax()
            && self.ymin() <= other.ymax()
            && other.ymin() <= self.ymax()
    }

    /// Euclidean distance from `(x, y)` to the nearest point of the rectangle.
    ///
    /// Zero when the point lies inside or on the boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridquery_types::rect::Rectangle;
    ///
    /// let r = Rectangle::new("R", 0.0, 0.0, 10.0, 10.0);
    /// assert_eq!(r.distance_to(13.0, 14.0), 5.0);
    /// ```
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let nearest = Point::new(
            x.clamp(self.xmin(), self.xmax()),
            y.clamp(self.ymin(), self.ymax()),
        );
        Euclidean.distance(Point::new(x, y), nearest)
    }

    /// Skyline dominance over lower-left corners.
    ///
    /// `self` dominates `other` when it is no greater on both axes and strictly
    /// smaller on at least one. Identical corners never dominate each other.
    pub fn dominates(&self, other: &Rectangle) -> bool {
        dominates_point(self.xmin(), self.ymin(), other.xmin(), other.ymin())
    }

    /// Natural order on ids, see [`natural_cmp`].
    pub fn cmp_id(&self, other: &Rectangle) -> Ordering {
        natural_cmp(&self.id, &other.id)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rectangle(id={}, xmin={}, ymin={}, xmax={}, ymax={})",
            self.id,
            self.xmin(),
            self.ymin(),
            self.xmax(),
            self.ymax()
        )
    }
}

/// Dominance between two corner points `(px, py)` and `(qx, qy)`.
pub fn dominates_point(px: f64, py: f64, qx: f64, qy: f64) -> bool {
    px <= qx && py <= qy && (px < qx || py < qy)
}

/// Compare ids in natural order.
///
/// The non-digit prefix is compared first, then the trailing decimal suffix by
/// numeric value, then the raw strings. `R2` sorts before `R10` and plain
/// integer ids sort numerically.
///
/// # Examples
///
/// ```
/// use gridquery_types::rect::natural_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(natural_cmp("R2", "R10"), Ordering::Less);
/// assert_eq!(natural_cmp("A9", "B1"), Ordering::Less);
/// assert_eq!(natural_cmp("10", "9"), Ordering::Greater);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a_prefix, a_digits) = split_numeric_suffix(a);
    let (b_prefix, b_digits) = split_numeric_suffix(b);

    a_prefix
        .cmp(b_prefix)
        .then_with(|| cmp_digits(a_digits, b_digits))
        .then_with(|| a.cmp(b))
}

fn split_numeric_suffix(s: &str) -> (&str, &str) {
    let prefix = s.trim_end_matches(|c: char| c.is_ascii_digit());
    (prefix, &s[prefix.len()..])
}

// Digit strings of arbitrary length, compared by value without parsing.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
