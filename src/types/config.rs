//! Configuration for polycache.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{PolyCacheError, PolyCacheResult};

/// Main configuration for polycache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Generic cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Memoized polygon operation settings.
    #[serde(default)]
    pub operations: OperationsConfig,

    /// Rendering payload optimization settings.
    #[serde(default)]
    pub rendering: RenderingConfig,
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// LRU cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cache capacity (number of entries).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

/// Settings for [`PolygonOperations`](crate::geometry::PolygonOperations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsConfig {
    /// Tolerance used when `simplify` is called without one.
    #[serde(default = "default_simplify_tolerance")]
    pub default_simplify_tolerance: f64,

    /// Whether results are memoized at all.
    #[serde(default = "default_true")]
    pub use_memoization: bool,

    /// Capacity of each operation's cache.
    #[serde(default = "default_operations_cache_size")]
    pub cache_size: usize,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            default_simplify_tolerance: default_simplify_tolerance(),
            use_memoization: true,
            cache_size: default_operations_cache_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_simplify_tolerance() -> f64 {
    0.001
}

fn default_operations_cache_size() -> usize {
    50
}

/// Settings for [`PayloadOptimizer`](crate::geometry::PayloadOptimizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderingConfig {
    /// Flatten MultiPolygons into Polygons.
    #[serde(default = "default_true")]
    pub flatten: bool,

    /// Simplify shapes.
    #[serde(default = "default_true")]
    pub simplify: bool,

    /// Simplification tolerance (0-1).
    #[serde(default = "default_simplify_tolerance")]
    pub simplify_tolerance: f64,

    /// Run payloads through the optimizer at all.
    #[serde(default = "default_true")]
    pub auto_optimize: bool,

    /// Capacity of the payload cache. Payloads are large, so it stays small.
    #[serde(default = "default_rendering_cache_size")]
    pub cache_size: usize,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            flatten: true,
            simplify: true,
            simplify_tolerance: default_simplify_tolerance(),
            auto_optimize: true,
            cache_size: default_rendering_cache_size(),
        }
    }
}

fn default_rendering_cache_size() -> usize {
    20
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> PolyCacheResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PolyCacheResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            operations: OperationsConfig::default(),
            rendering: RenderingConfig::default(),
        }
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load("polycache.toml").unwrap_or_else(|_| Self::default_config())
    }

    /// Rejects settings that would build an unusable cache.
    pub fn validate(&self) -> PolyCacheResult<()> {
        if self.cache.capacity == 0 {
            return Err(PolyCacheError::InvalidCapacity(0));
        }
        if self.operations.use_memoization && self.operations.cache_size == 0 {
            return Err(PolyCacheError::config("operations.cache_size must be at least 1"));
        }
        if self.rendering.cache_size == 0 {
            return Err(PolyCacheError::config("rendering.cache_size must be at least 1"));
        }
        for (name, tolerance) in [
            ("operations.default_simplify_tolerance", self.operations.default_simplify_tolerance),
            ("rendering.simplify_tolerance", self.rendering.simplify_tolerance),
        ] {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(PolyCacheError::config(format!(
                    "{name} must be a non-negative number, got {tolerance}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
