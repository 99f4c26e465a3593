//! Configuration for OrionDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for an OrionDB table
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the backing database file. Created on first open if absent.
    pub path: PathBuf,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Flush strategy: when resident pages are written back to disk
    pub flush_strategy: FlushStrategy,
}

/// Page flush strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStrategy {
    /// Flush after every structural mutation (split or root relocation) and
    /// on close (balanced durability/performance)
    StructuralOnly,

    /// Flush after every successful insert (safest, slowest)
    EveryInsert,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./orion.db"),
            flush_strategy: FlushStrategy::StructuralOnly,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the page flush strategy
    pub fn flush_strategy(mut self, strategy: FlushStrategy) -> Self {
        self.config.flush_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
