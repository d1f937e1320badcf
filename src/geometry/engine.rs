//! Geometry backend seam.

use super::types::{GeoJson, Point};
use crate::PolyCacheResult;

/// Computational-geometry backend.
///
/// The algorithms behind these operations live outside this crate; the
/// memoized wrappers call into whatever implementation the application
/// provides. Implementations must be pure: equal inputs give equal outputs.
pub trait GeometryEngine: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// Reduces the number of vertices while keeping the overall shape.
    /// Higher `tolerance` means more simplification.
    fn simplify(&self, shape: &GeoJson, tolerance: f64) -> PolyCacheResult<GeoJson>;

    /// Union of two shapes.
    fn union(&self, a: &GeoJson, b: &GeoJson) -> PolyCacheResult<GeoJson>;

    /// Area in square meters.
    fn area(&self, shape: &GeoJson) -> f64;

    /// Whether `point` lies inside `shape`.
    fn contains(&self, point: Point, shape: &GeoJson) -> bool;
}
