//! Plain (non-memoized) polygon transforms.

use super::engine::GeometryEngine;
use super::types::{Feature, GeoJson, Point};
use crate::types::config::RenderingConfig;
use crate::PolyCacheResult;

/// Options for [`optimize_for_rendering`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOptions {
    pub flatten: bool,
    pub simplify: bool,
    pub simplify_tolerance: f64,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            flatten: true,
            simplify: true,
            simplify_tolerance: 0.001,
        }
    }
}

impl From<&RenderingConfig> for OptimizeOptions {
    fn from(config: &RenderingConfig) -> Self {
        Self {
            flatten: config.flatten,
            simplify: config.simplify,
            simplify_tolerance: config.simplify_tolerance,
        }
    }
}

/// Turns a MultiPolygon, or a Feature holding one, into a single Polygon.
///
/// Feature id and properties are kept. Every other shape is returned as is.
pub fn flatten_multi_polygon(shape: &GeoJson) -> GeoJson {
    match shape {
        GeoJson::Geometry(geometry) if geometry.is_multi() => {
            GeoJson::Geometry(geometry.flattened())
        }
        GeoJson::Feature(feature) if feature.geometry.is_multi() => GeoJson::Feature(Feature {
            kind: feature.kind,
            id: feature.id.clone(),
            properties: feature.properties.clone(),
            geometry: feature.geometry.flattened(),
        }),
        other => other.clone(),
    }
}

pub fn simplify_polygon<E: GeometryEngine + ?Sized>(
    engine: &E,
    shape: &GeoJson,
    tolerance: f64,
) -> PolyCacheResult<GeoJson> {
    engine.simplify(shape, tolerance)
}

/// Merges shapes by sequential union.
///
/// Returns `None` for an empty slice and the shape itself for a single one.
/// If any union fails the first shape is returned and a warning is logged.
pub fn merge_polygons<E: GeometryEngine + ?Sized>(engine: &E, shapes: &[GeoJson]) -> Option<GeoJson> {
    let (first, rest) = shapes.split_first()?;
    if rest.is_empty() {
        return Some(first.clone());
    }

    let mut features = shapes.iter().cloned().map(GeoJson::into_feature);
    let seed = features.next()?;
    let merged = features.try_fold(seed, |acc, next| engine.union(&acc, &next));

    match merged {
        Ok(merged) => Some(merged),
        Err(e) => {
            tracing::warn!(
                engine = engine.name(),
                shapes = shapes.len(),
                error = %e,
                "Failed to merge polygons, falling back to first shape"
            );
            Some(first.clone())
        }
    }
}

/// Area in square meters.
pub fn calculate_area<E: GeometryEngine + ?Sized>(engine: &E, shape: &GeoJson) -> f64 {
    engine.area(shape)
}

pub fn is_point_in_polygon<E: GeometryEngine + ?Sized>(
    engine: &E,
    point: Point,
    shape: &GeoJson,
) -> bool {
    engine.contains(point, shape)
}

/// Prepares a shape for rendering: optional flattening, then optional
/// simplification.
pub fn optimize_for_rendering<E: GeometryEngine + ?Sized>(
    engine: &E,
    shape: &GeoJson,
    options: &OptimizeOptions,
) -> PolyCacheResult<GeoJson> {
    let flattened;
    let mut result = shape;

    if options.flatten {
        flattened = flatten_multi_polygon(result);
        result = &flattened;
    }

    if options.simplify {
        return engine.simplify(result, options.simplify_tolerance);
    }

    Ok(result.clone())
}
