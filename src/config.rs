//! Configuration types for tree-walker
//!
//! A walk is configured once, at construction time, and validated before
//! any I/O is issued.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Maximum reasonable number of outstanding I/O calls
pub const MAX_CONCURRENT_IO: usize = 512;

/// Validated walk configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Path the walk starts from
    pub root: PathBuf,

    /// Upper bound on simultaneously outstanding stat/listing calls
    pub max_concurrent_io: usize,
}

impl WalkConfig {
    /// Create a configuration rooted at `root` with default concurrency
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_concurrent_io: default_concurrency(),
        }
    }

    /// Set the I/O concurrency bound
    pub fn max_concurrent_io(mut self, count: usize) -> Self {
        self.max_concurrent_io = count;
        self
    }

    /// Path the walk starts from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check the configuration before a walk starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }

        if self.max_concurrent_io == 0 || self.max_concurrent_io > MAX_CONCURRENT_IO {
            return Err(ConfigError::InvalidConcurrency {
                count: self.max_concurrent_io,
                max: MAX_CONCURRENT_IO,
            });
        }

        Ok(())
    }
}

fn default_concurrency() -> usize {
    // Stat and readdir are I/O bound, so oversubscribe the cores
    (num_cpus::get() * 2).min(MAX_CONCURRENT_IO)
}
