//! Explicit query context.
//!
//! A [`Session`] owns the configuration and the current grid. Callers pass it
//! (or the grid it exposes) into each query instead of relying on shared
//! global state; `reset` starts a fresh grid.

use crate::builder::SessionBuilder;
use crate::config::Config;
use crate::error::{GridQueryError, Result};
use crate::generator::Generator;
use crate::grid::Grid;
use crate::reader::{LoadReport, ParsedDataset, read_path};
use gridquery_types::bounds::Bounds;
use std::path::Path;

/// Configuration plus the grid built from it.
///
/// # Examples
///
/// ```
/// use gridquery::{GridKnn, Session};
///
/// let mut session = Session::builder().partitions(10).seed(3).build()?;
/// let rects = session.generator()?.generate(50, None)?;
/// session.grid_mut().load_rectangles(rects, "default")?;
///
/// let (neighbors, stats) = GridKnn::new(session.grid(), "default").knn(50.0, 50.0, 3)?;
/// assert_eq!(neighbors.len(), 3);
/// println!("{}", stats);
/// # Ok::<(), gridquery::GridQueryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    grid: Grid,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        config.validate().map_err(GridQueryError::Config)?;
        let grid = Grid::from_config(&config)?;
        log::debug!(
            "Session created: m={}, policy={:?}",
            config.partitions,
            config.load_policy
        );
        Ok(Self { config, grid })
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Load a delimited file into the grid under `label`.
    pub fn load_path<P: AsRef<Path>>(&mut self, path: P, label: &str) -> Result<LoadReport> {
        let report = self.grid.load_path(path.as_ref(), label)?;
        log::info!(
            "Loaded {} rectangles from {} as '{}' ({} skipped)",
            report.loaded,
            path.as_ref().display(),
            label,
            report.skipped()
        );
        Ok(report)
    }

    /// Parse a delimited file without indexing it, for flat scans.
    pub fn load_flat<P: AsRef<Path>>(&self, path: P) -> Result<ParsedDataset> {
        read_path(path, None, self.config.load_policy)
    }

    /// Generator over the session's domain, seeded from the configuration.
    pub fn generator(&self) -> Result<Generator> {
        Ok(Generator::new(self.config.bounds)?.with_optional_seed(self.config.seed))
    }

    /// Replace the grid with an empty one over `bounds` split `partitions` ways.
    pub fn reset(&mut self, bounds: Bounds, partitions: usize) -> Result<()> {
        self.grid.reset(bounds, partitions)?;
        self.config.bounds = bounds;
        self.config.partitions = partitions;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadPolicy;
    use gridquery_types::rect::Rectangle;
    use std::io::Write;

    #[test]
    fn test_session_new_and_reset() {
        let mut session = Session::new(Config::default()).unwrap();
        session
            .grid_mut()
            .load_rectangles(vec![Rectangle::new("R1", 0.0, 0.0, 1.0, 1.0)], "A")
            .unwrap();
        assert_eq!(session.grid().labels(), vec!["A"]);

        session.reset(Bounds::new(0.0, 0.0, 20.0, 20.0), 2).unwrap();
        assert!(session.grid().labels().is_empty());
        assert_eq!(session.config().partitions, 2);
        assert_eq!(session.grid().cell_width(), 10.0);

        assert!(session.reset(Bounds::default(), 0).is_err());
        assert_eq!(session.config().partitions, 2);
    }

    #[test]
    fn test_session_rejects_invalid_config() {
        let config = Config::default().with_bounds(Bounds::new(1.0, 0.0, 0.0, 1.0));
        assert!(matches!(Session::new(config), Err(GridQueryError::Config(_))));
    }

    #[test]
    fn test_load_path_and_flat() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ID\txmin\tymin\txmax\tymax").unwrap();
        writeln!(file, "R1\t0\t0\t10\t10").unwrap();
        writeln!(file, "R2\tbad\t0\t1\t1").unwrap();
        file.flush().unwrap();

        let mut strict = Session::new(Config::default()).unwrap();
        assert!(strict.load_path(file.path(), "A").is_err());
        assert!(strict.load_flat(file.path()).is_err());

        let mut lenient = Session::builder()
            .load_policy(LoadPolicy::Lenient)
            .build()
            .unwrap();
        let report = lenient.load_path(file.path(), "A").unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.malformed, 1);

        let flat = lenient.load_flat(file.path()).unwrap();
        assert_eq!(flat.rects.len(), 1);
        assert!(flat.rects[0].label().is_none());
    }

    #[test]
    fn test_generator_uses_config_seed() {
        let session = Session::builder().seed(9).build().unwrap();
        let a = session.generator().unwrap().generate(10, None).unwrap();
        let b = session.generator().unwrap().generate(10, None).unwrap();
        assert_eq!(a, b);
        assert!(
            a.iter()
                .all(|r| session.config().bounds.contains(r.xmax(), r.ymax()))
        );
    }
}
