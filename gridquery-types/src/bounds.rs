use serde::{Deserialize, Serialize};

/// The fixed bounding domain `[xl, xu] × [yl, yu]` of a grid or generator.
///
/// Construction does not validate; use [`Bounds::is_valid`] or the core
/// crate's validation before partitioning a domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower x bound
    pub xl: f64,
    /// Lower y bound
    pub yl: f64,
    /// Upper x bound
    pub xu: f64,
    /// Upper y bound
    pub yu: f64,
}

impl Bounds {
    /// Create a domain from lower and upper corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridquery_types::bounds::Bounds;
    ///
    /// let domain = Bounds::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(domain.width(), 100.0);
    /// assert_eq!(domain.height(), 50.0);
    /// ```
    pub const fn new(xl: f64, yl: f64, xu: f64, yu: f64) -> Self {
        Self { xl, yl, xu, yu }
    }

    pub fn width(&self) -> f64 {
        self.xu - self.xl
    }

    pub fn height(&self) -> f64 {
        self.yu - self.yl
    }

    /// All coordinates finite and the upper corner not below the lower one.
    pub fn is_valid(&self) -> bool {
        [self.xl, self.yl, self.xu, self.yu]
            .iter()
            .all(|v| v.is_finite())
            && self.xl <= self.xu
            && self.yl <= self.yu
    }

    /// Closed containment test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xl && x <= self.xu && y >= self.yl && y <= self.yu
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_domain() {
        let b = Bounds::default();
        assert_eq!(b, Bounds::new(0.0, 0.0, 100.0, 100.0));
        assert!(b.is_valid());
    }

    #[test]
    fn test_invalid_domains() {
        assert!(!Bounds::new(10.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!Bounds::new(0.0, 10.0, 10.0, 0.0).is_valid());
        assert!(!Bounds::new(0.0, 0.0, f64::NAN, 10.0).is_valid());
        assert!(!Bounds::new(f64::NEG_INFINITY, 0.0, 1.0, 1.0).is_valid());
        // Zero extent is allowed
        assert!(Bounds::new(5.0, 5.0, 5.0, 5.0).is_valid());
    }

    #[test]
    fn test_contains() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(0.0, 10.0));
        assert!(b.contains(5.0, 5.0));
        assert!(!b.contains(10.1, 5.0));
    }
}
