//! Polygon helpers built on the cache layer.
//!
//! The geometry algorithms themselves (simplification, union, area,
//! point-in-polygon) come from a [`GeometryEngine`] supplied by the caller.
//! This module adds:
//!
//! - GeoJSON polygon types
//! - Plain transforms, including MultiPolygon flattening
//! - [`PolygonOperations`]: every operation behind its own memoizer
//! - [`PayloadOptimizer`]: memoized rendering optimization of raw payloads
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use polycache::geometry::PolygonOperations;
//! use polycache::types::config::OperationsConfig;
//!
//! let mut ops = PolygonOperations::new(Arc::new(engine), &OperationsConfig::default())?;
//! let simplified = ops.simplify(&shape, None)?;
//! let again = ops.simplify(&shape, None)?; // cached
//! ```

mod engine;
mod operations;
mod ops;
mod payload;
mod types;

pub use self::engine::GeometryEngine;
pub use self::operations::PolygonOperations;
pub use self::ops::{
    calculate_area, flatten_multi_polygon, is_point_in_polygon, merge_polygons,
    optimize_for_rendering, simplify_polygon, OptimizeOptions,
};
pub use self::payload::{PayloadKey, PayloadOptimizer};
pub use self::types::{
    Feature, FeatureCollection, FeatureCollectionTag, FeatureTag, GeoJson, Geometry, Point,
    Position, Ring,
};
