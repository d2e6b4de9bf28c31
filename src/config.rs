//! Engine configuration.
//!
//! Configuration is plain serde data so it can be loaded from JSON or, with
//! the `toml` feature, from TOML, while keeping complexity minimal.
use crate::compute::validation::validate_grid_shape;
use crate::error::{GridQueryError, Result};
use gridquery_types::bounds::Bounds;
use serde::{Deserialize, Serialize};

/// How malformed rows are handled while loading a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Abort the load on the first malformed row or duplicate id
    #[default]
    Strict,
    /// Skip malformed rows and duplicate ids, counting them in the load report
    Lenient,
}

/// Engine configuration
///
/// # Example
///
/// ```rust
/// use gridquery::{Config, LoadPolicy};
///
/// let config = Config::default();
/// assert_eq!(config.partitions, 10);
///
/// let json = r#"{
///     "bounds": { "xl": 0.0, "yl": 0.0, "xu": 50.0, "yu": 50.0 },
///     "partitions": 5,
///     "load_policy": "lenient"
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.load_policy, LoadPolicy::Lenient);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Grid domain; also the generator's sampling domain
    #[serde(default)]
    pub bounds: Bounds,

    /// Partitions per axis (grid has `partitions²` cells)
    #[serde(default = "Config::default_partitions")]
    pub partitions: usize,

    #[serde(default)]
    pub load_policy: LoadPolicy,

    /// Generator seed; `None` draws from the thread RNG
    #[serde(default)]
    pub seed: Option<u64>,

    /// Prefix exported result files with the statistics string
    #[serde(default = "Config::default_include_stats")]
    pub include_stats: bool,
}

impl Config {
    const fn default_partitions() -> usize {
        10
    }

    const fn default_include_stats() -> bool {
        true
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_include_stats(mut self, include: bool) -> Self {
        self.include_stats = include;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.partitions < 1 {
            return Err("Partition count must be at least 1".to_string());
        }

        if !self.bounds.is_valid() {
            return Err(format!(
                "Domain bounds must be finite with xl <= xu and yl <= yu, got [{}, {}]-[{}, {}]",
                self.bounds.xl, self.bounds.yl, self.bounds.xu, self.bounds.yu
            ));
        }

        // Same limits every grid constructor enforces
        validate_grid_shape(&self.bounds, self.partitions).map_err(|err| err.to_string())?;

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate().map_err(GridQueryError::Config)?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate().map_err(GridQueryError::Config)?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            partitions: Self::default_partitions(),
            load_policy: LoadPolicy::default(),
            seed: None,
            include_stats: Self::default_include_stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.bounds, Bounds::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(config.partitions, 10);
        assert_eq!(config.load_policy, LoadPolicy::Strict);
        assert!(config.seed.is_none());
        assert!(config.include_stats);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_bounds(Bounds::new(-10.0, -10.0, 10.0, 10.0))
            .with_partitions(4)
            .with_load_policy(LoadPolicy::Lenient)
            .with_seed(42)
            .with_include_stats(false);

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.partitions, 10);
        assert_eq!(config.bounds, Bounds::default());
    }

    #[test]
    fn test_config_rejects_zero_partitions() {
        let config = Config::default().with_partitions(0);
        assert!(config.validate().is_err());
        assert!(matches!(
            Config::from_json(r#"{ "partitions": 0 }"#),
            Err(GridQueryError::Config(_))
        ));
    }

    #[test]
    fn test_config_rejects_inverted_bounds() {
        let config = Config::default().with_bounds(Bounds::new(10.0, 0.0, 0.0, 10.0));
        let err = config.validate().unwrap_err();
        assert!(err.contains("xl <= xu"));
    }

    #[test]
    fn test_config_rejects_oversized_grid() {
        let config = Config::default().with_partitions(65_535);
        assert!(config.validate().unwrap_err().contains("at most"));

        let huge = Config::default().with_bounds(Bounds::new(-1e308, 0.0, 1e308, 1.0));
        assert!(huge.validate().unwrap_err().contains("extent"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default().with_partitions(3).with_seed(9);
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
