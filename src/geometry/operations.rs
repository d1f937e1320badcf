//! Memoized polygon operations.

use std::sync::Arc;

use serde_json::Value;

use super::engine::GeometryEngine;
use super::ops;
use super::types::{GeoJson, Point};
use crate::cache::{canonical_json, CacheStats, Memoizer};
use crate::types::config::OperationsConfig;
use crate::PolyCacheResult;

type BoxedOp<A, R> = Box<dyn Fn(&A) -> PolyCacheResult<R> + Send + Sync>;
type BoxedKey<A> = Box<dyn Fn(&A) -> PolyCacheResult<String> + Send + Sync>;

/// One operation, either behind its own memoizer or called directly.
enum Operation<A: ?Sized + 'static, R: 'static> {
    Memoized(Memoizer<A, R, BoxedOp<A, R>, BoxedKey<A>>),
    Direct(BoxedOp<A, R>),
}

impl<A: ?Sized + 'static, R: Clone + 'static> Operation<A, R> {
    fn new(op: BoxedOp<A, R>, key: BoxedKey<A>, config: &OperationsConfig) -> PolyCacheResult<Self> {
        if !config.use_memoization {
            return Ok(Self::Direct(op));
        }

        let memo = Memoizer::fallible(op)
            .with_key_fn(key)
            .with_capacity(config.cache_size)?;
        Ok(Self::Memoized(memo))
    }

    fn run(&mut self, args: &A) -> PolyCacheResult<R> {
        match self {
            Self::Memoized(memo) => memo.try_call(args),
            Self::Direct(op) => op(args),
        }
    }

    fn stats(&self) -> Option<CacheStats> {
        match self {
            Self::Memoized(memo) => Some(memo.stats()),
            Self::Direct(_) => None,
        }
    }

    fn clear(&mut self) {
        if let Self::Memoized(memo) = self {
            memo.clear();
        }
    }
}

/// Polygon helpers whose results are cached per operation.
///
/// Each operation owns a private LRU cache sized by
/// [`OperationsConfig::cache_size`]. Build one instance per unit of work and
/// reuse it across calls with structurally identical inputs.
pub struct PolygonOperations {
    default_simplify_tolerance: f64,
    simplify: Operation<(GeoJson, f64), GeoJson>,
    flatten: Operation<GeoJson, GeoJson>,
    merge: Operation<[GeoJson], Option<GeoJson>>,
    area: Operation<GeoJson, f64>,
    contains: Operation<(Point, GeoJson), bool>,
}

impl PolygonOperations {
    /// Creates the operations on top of `engine`.
    ///
    /// # Errors
    /// Fails when memoization is on and `cache_size` is zero.
    pub fn new<E: GeometryEngine + 'static>(
        engine: Arc<E>,
        config: &OperationsConfig,
    ) -> PolyCacheResult<Self> {
        tracing::debug!(
            engine = engine.name(),
            memoized = config.use_memoization,
            cache_size = config.cache_size,
            "Creating polygon operations"
        );

        let simplify = {
            let engine = engine.clone();
            Operation::<(GeoJson, f64), GeoJson>::new(
                Box::new(move |(shape, tolerance): &(GeoJson, f64)| {
                    ops::simplify_polygon(engine.as_ref(), shape, *tolerance)
                }),
                Box::new(|(shape, tolerance): &(GeoJson, f64)| -> PolyCacheResult<String> {
                    Ok(format!("{}-{}", canonical_json(shape)?, tolerance))
                }),
                config,
            )?
        };

        let flatten = Operation::<GeoJson, GeoJson>::new(
            Box::new(|shape: &GeoJson| -> PolyCacheResult<GeoJson> {
                Ok(ops::flatten_multi_polygon(shape))
            }),
            Box::new(|shape: &GeoJson| canonical_json(shape)),
            config,
        )?;

        let merge = {
            let engine = engine.clone();
            Operation::<[GeoJson], Option<GeoJson>>::new(
                Box::new(move |shapes: &[GeoJson]| -> PolyCacheResult<Option<GeoJson>> {
                    Ok(ops::merge_polygons(engine.as_ref(), shapes))
                }),
                Box::new(|shapes: &[GeoJson]| merge_key(shapes)),
                config,
            )?
        };

        let area = {
            let engine = engine.clone();
            Operation::<GeoJson, f64>::new(
                Box::new(move |shape: &GeoJson| -> PolyCacheResult<f64> {
                    Ok(ops::calculate_area(engine.as_ref(), shape))
                }),
                Box::new(|shape: &GeoJson| canonical_json(shape)),
                config,
            )?
        };

        let contains = Operation::<(Point, GeoJson), bool>::new(
            Box::new(move |(point, shape): &(Point, GeoJson)| -> PolyCacheResult<bool> {
                Ok(ops::is_point_in_polygon(engine.as_ref(), *point, shape))
            }),
            Box::new(|(point, shape): &(Point, GeoJson)| -> PolyCacheResult<String> {
                Ok(format!("{},{}-{}", point[0], point[1], canonical_json(shape)?))
            }),
            config,
        )?;

        Ok(Self {
            default_simplify_tolerance: config.default_simplify_tolerance,
            simplify,
            flatten,
            merge,
            area,
            contains,
        })
    }

    /// Simplifies a shape, using the configured tolerance when none is given.
    pub fn simplify(&mut self, shape: &GeoJson, tolerance: Option<f64>) -> PolyCacheResult<GeoJson> {
        let tolerance = tolerance.unwrap_or(self.default_simplify_tolerance);
        self.simplify.run(&(shape.clone(), tolerance))
    }

    /// Flattens a MultiPolygon into a Polygon.
    pub fn flatten(&mut self, shape: &GeoJson) -> PolyCacheResult<GeoJson> {
        self.flatten.run(shape)
    }

    /// Merges shapes into one. `None` for an empty slice.
    pub fn merge(&mut self, shapes: &[GeoJson]) -> PolyCacheResult<Option<GeoJson>> {
        self.merge.run(shapes)
    }

    /// Area in square meters.
    pub fn area(&mut self, shape: &GeoJson) -> PolyCacheResult<f64> {
        self.area.run(shape)
    }

    /// Whether `point` lies inside `shape`.
    pub fn contains(&mut self, point: Point, shape: &GeoJson) -> PolyCacheResult<bool> {
        self.contains.run(&(point, shape.clone()))
    }

    /// Statistics of every memoized operation, by name.
    ///
    /// Empty when memoization is disabled.
    pub fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        [
            ("simplify", self.simplify.stats()),
            ("flatten", self.flatten.stats()),
            ("merge", self.merge.stats()),
            ("area", self.area.stats()),
            ("contains", self.contains.stats()),
        ]
        .into_iter()
        .filter_map(|(name, stats)| stats.map(|s| (name, s)))
        .collect()
    }

    /// Drops every cached result.
    pub fn clear(&mut self) {
        self.simplify.clear();
        self.flatten.clear();
        self.merge.clear();
        self.area.clear();
        self.contains.clear();
    }
}

/// Shapes are identified by their feature id when they have one, otherwise
/// by their full JSON text.
fn merge_key(shapes: &[GeoJson]) -> PolyCacheResult<String> {
    let parts = shapes
        .iter()
        .map(|shape| match shape.id() {
            Some(id) => Ok(id.clone()),
            None => canonical_json(shape).map(Value::String),
        })
        .collect::<PolyCacheResult<Vec<Value>>>()?;
    canonical_json(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::types::{Feature, Geometry};

    fn square(offset: f64) -> GeoJson {
        GeoJson::Geometry(Geometry::Polygon {
            coordinates: vec![vec![
                vec![offset, 0.0],
                vec![offset + 1.0, 0.0],
                vec![offset + 1.0, 1.0],
                vec![offset, 0.0],
            ]],
        })
    }

    #[test]
    fn test_merge_key_prefers_id() {
        let GeoJson::Geometry(geometry) = square(0.0) else {
            unreachable!()
        };
        let with_id = GeoJson::Feature(Feature::new(geometry.clone()).with_id("a"));
        let same_id_other_shape = GeoJson::Feature(
            Feature::new(Geometry::Polygon {
                coordinates: vec![],
            })
            .with_id("a"),
        );

        assert_eq!(
            merge_key(&[with_id]).unwrap(),
            merge_key(&[same_id_other_shape]).unwrap()
        );
    }

    #[test]
    fn test_merge_key_numeric_id() {
        let GeoJson::Geometry(geometry) = square(0.0) else {
            unreachable!()
        };
        let shape = GeoJson::Feature(Feature::new(geometry).with_id(7));
        assert_eq!(merge_key(&[shape]).unwrap(), "[7]");
    }

    #[test]
    fn test_merge_key_keeps_id_type() {
        let GeoJson::Geometry(geometry) = square(0.0) else {
            unreachable!()
        };
        let text_id = GeoJson::Feature(Feature::new(geometry.clone()).with_id("7"));
        let number_id = GeoJson::Feature(Feature::new(geometry).with_id(7));

        assert_eq!(merge_key(&[text_id.clone()]).unwrap(), r#"["7"]"#);
        assert_ne!(
            merge_key(&[text_id]).unwrap(),
            merge_key(&[number_id]).unwrap()
        );
    }

    #[test]
    fn test_merge_key_without_id_is_structural() {
        assert_eq!(
            merge_key(&[square(0.0), square(1.0)]).unwrap(),
            merge_key(&[square(0.0), square(1.0)]).unwrap()
        );
        assert_ne!(
            merge_key(&[square(0.0), square(1.0)]).unwrap(),
            merge_key(&[square(1.0), square(0.0)]).unwrap()
        );
    }
}
