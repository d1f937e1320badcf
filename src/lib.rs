//! # polycache
//!
//! Bounded LRU cache and memoization for polygon rendering pipelines.
//!
//! Expensive geometry transforms (simplification, union, area,
//! point-in-polygon) are computed once per distinct input and served from a
//! private, fixed-capacity cache afterwards.
//!
//! ## Modules
//!
//! - [`cache`] - LRU cache, key derivation and memoizers
//! - [`geometry`] - GeoJSON types and memoized polygon operations
//! - [`logging`] - Optional `tracing` subscriber setup
//! - [`types`] - Configuration and error types

pub mod cache;
pub mod geometry;
pub mod logging;
pub mod types;

pub use cache::{LruCache, Memoizer};
pub use types::config::Config;
pub use types::errors::{PolyCacheError, PolyCacheResult};
