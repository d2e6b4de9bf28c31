//! Uniform random rectangle datasets.
//!
//! Lower-left corners are drawn uniformly from `[xL, xU-ε] × [yL, yU-ε]` and
//! upper-right corners uniformly from `[xmin, xU] × [ymin, yU]`, so every
//! generated rectangle is valid and lies inside the domain.

use crate::compute::validation::validate_bounds;
use crate::error::{GridQueryError, Result};
use gridquery_types::bounds::Bounds;
use gridquery_types::rect::Rectangle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Fraction of the axis extent kept free above the lower-left corner range.
const EPSILON_FRACTION: f64 = 1e-6;

/// Header row written before generated records.
pub const CSV_HEADER: &str = "ID,xmin,ymin,xmax,ymax";

/// Produces datasets of uniformly distributed rectangles.
///
/// Unseeded generators draw from the thread RNG and are not reproducible;
/// set a seed for deterministic runs.
///
/// # Examples
///
/// ```
/// use gridquery::Generator;
/// use gridquery_types::bounds::Bounds;
///
/// let generator = Generator::new(Bounds::new(0.0, 0.0, 100.0, 100.0))?.with_seed(7);
/// let rects = generator.generate(3, Some("A"))?;
///
/// let ids: Vec<&str> = rects.iter().map(|r| r.id()).collect();
/// assert_eq!(ids, vec!["A1", "A2", "A3"]);
/// assert_eq!(rects, generator.generate(3, Some("A"))?);
/// # Ok::<(), gridquery::GridQueryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    bounds: Bounds,
    seed: Option<u64>,
}

impl Generator {
    pub fn new(bounds: Bounds) -> Result<Self> {
        validate_bounds(&bounds)?;
        Ok(Self { bounds, seed: None })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_optional_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Generate `n` rectangles with sequential ids, prefixed by `label` when given.
    pub fn generate(&self, n: usize, label: Option<&str>) -> Result<Vec<Rectangle>> {
        if n < 1 {
            return Err(GridQueryError::InvalidParameter(
                "Rectangle count must be at least 1".to_string(),
            ));
        }

        let rects = match self.seed {
            Some(seed) => self.fill(&mut StdRng::seed_from_u64(seed), n, label),
            None => self.fill(&mut rand::thread_rng(), n, label),
        };
        log::debug!("Generated {} rectangles (seed: {:?})", rects.len(), self.seed);
        Ok(rects)
    }

    fn fill<R: Rng>(&self, rng: &mut R, n: usize, label: Option<&str>) -> Vec<Rectangle> {
        let Bounds { xl, yl, xu, yu } = self.bounds;
        let eps_x = (xu - xl) * EPSILON_FRACTION;
        let eps_y = (yu - yl) * EPSILON_FRACTION;

        (1..=n)
            .map(|i| {
                let xmin = rng.gen_range(xl..=xu - eps_x);
                let ymin = rng.gen_range(yl..=yu - eps_y);
                let xmax = rng.gen_range(xmin..=xu);
                let ymax = rng.gen_range(ymin..=yu);

                match label {
                    Some(label) => {
                        Rectangle::new(format!("{}{}", label, i), xmin, ymin, xmax, ymax)
                            .with_label(label)
                    }
                    None => Rectangle::new(i.to_string(), xmin, ymin, xmax, ymax),
                }
            })
            .collect()
    }

    /// Generate `n` rectangles and write them to a new file at `path`.
    pub fn generate_to_path<P: AsRef<Path>>(
        &self,
        path: P,
        n: usize,
        label: Option<&str>,
    ) -> Result<Vec<Rectangle>> {
        let rects = self.generate(n, label)?;
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        write_csv(&mut writer, &rects)?;
        writer.flush()?;
        log::info!(
            "Wrote {} rectangles to {}",
            rects.len(),
            path.as_ref().display()
        );
        Ok(rects)
    }
}

/// Write rectangles as comma-delimited rows under the standard header.
pub fn write_csv<W: Write>(writer: &mut W, rects: &[Rectangle]) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for r in rects {
        writeln!(
            writer,
            "{},{},{},{},{}",
            r.id(),
            r.xmin(),
            r.ymin(),
            r.xmax(),
            r.ymax()
        )?;
    }
    Ok(())
}
