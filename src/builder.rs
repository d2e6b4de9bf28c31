//! Session builder for flexible configuration
//!
//! This module provides a builder pattern for creating sessions with a custom
//! domain, partition count, load policy and generator seed.

use crate::config::{Config, LoadPolicy};
use crate::error::{GridQueryError, Result};
use crate::session::Session;
use gridquery_types::bounds::Bounds;

/// Builder for [`Session`].
#[derive(Debug, Default)]
pub struct SessionBuilder {
    config: Config,
}

impl SessionBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration. Later setters override its fields.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.config = self.config.with_bounds(bounds);
        self
    }

    /// Partitions per axis.
    pub fn partitions(mut self, partitions: usize) -> Self {
        self.config = self.config.with_partitions(partitions);
        self
    }

    pub fn load_policy(mut self, policy: LoadPolicy) -> Self {
        self.config = self.config.with_load_policy(policy);
        self
    }

    /// Seed used by the session's generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config = self.config.with_seed(seed);
        self
    }

    pub fn include_stats(mut self, include: bool) -> Self {
        self.config = self.config.with_include_stats(include);
        self
    }

    /// Validate the configuration and create an empty grid for it.
    pub fn build(self) -> Result<Session> {
        self.config.validate().map_err(GridQueryError::Config)?;
        Session::new(self.config)
    }
}
