//! Memoized optimization of fetched GeoJSON payloads.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::engine::GeometryEngine;
use super::ops::{optimize_for_rendering, OptimizeOptions};
use super::types::GeoJson;
use crate::cache::{CacheStats, HashedJsonKey, KeyFn, Memoizer};
use crate::types::config::RenderingConfig;
use crate::PolyCacheResult;

type Transform = Box<dyn Fn(&Value) -> PolyCacheResult<Value> + Send + Sync>;

/// Cache key for a raw payload.
///
/// A payload carrying an `id` is identified by `{id, lastModified}`, with
/// `lastModified` left out when absent. A payload without `id` is identified
/// by the SHA256 of its canonical JSON. The key never depends on the clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadKey;

impl KeyFn<Value> for PayloadKey {
    fn derive(&self, payload: &Value) -> PolyCacheResult<String> {
        let Some(id) = field(payload, "id") else {
            return HashedJsonKey.derive(payload);
        };

        let mut key = Map::new();
        key.insert("id".to_string(), id.clone());
        if let Some(modified) = field(payload, "lastModified") {
            key.insert("lastModified".to_string(), modified.clone());
        }
        Ok(Value::Object(key).to_string())
    }
}

fn field<'a>(payload: &'a Value, name: &str) -> Option<&'a Value> {
    payload.get(name).filter(|v| !v.is_null())
}

/// Runs fetched payloads through [`optimize_for_rendering`], skipping the
/// work for payloads seen recently.
pub struct PayloadOptimizer {
    auto_optimize: bool,
    memo: Memoizer<Value, Value, Transform, PayloadKey>,
}

impl PayloadOptimizer {
    /// Creates an optimizer with a cache of `config.cache_size` payloads.
    pub fn new<E: GeometryEngine + 'static>(
        engine: Arc<E>,
        config: &RenderingConfig,
    ) -> PolyCacheResult<Self> {
        let options = OptimizeOptions::from(config);
        let transform: Transform = Box::new(move |payload: &Value| -> PolyCacheResult<Value> {
            let shape: GeoJson = serde_json::from_value(payload.clone())?;
            let optimized = optimize_for_rendering(engine.as_ref(), &shape, &options)?;
            Ok(serde_json::to_value(optimized)?)
        });

        let memo = Memoizer::fallible(transform)
            .with_key_fn(PayloadKey)
            .with_capacity(config.cache_size)?;

        Ok(Self {
            auto_optimize: config.auto_optimize,
            memo,
        })
    }

    /// Returns the optimized payload, or the payload itself when
    /// auto-optimization is off.
    ///
    /// # Errors
    /// Fails when the payload is not polygon GeoJSON or the engine fails.
    /// Failed payloads are not cached.
    pub fn process(&mut self, payload: &Value) -> PolyCacheResult<Value> {
        if !self.auto_optimize {
            return Ok(payload.clone());
        }
        self.memo.try_call(payload)
    }

    pub fn stats(&self) -> CacheStats {
        self.memo.stats()
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }
}
