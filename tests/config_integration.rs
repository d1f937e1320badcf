//! Integration tests for configuration loading.

use std::sync::Arc;

use polycache::cache::{LruCache, Memoizer};
use polycache::types::config::Config;
use polycache::PolyCacheError;
use tempfile::TempDir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polycache.toml");

    let mut config = Config::default();
    config.cache.capacity = 32;
    config.operations.use_memoization = false;
    config.rendering.simplify_tolerance = 0.05;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_partial_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polycache.toml");
    std::fs::write(
        &path,
        r#"
[general]
log_level = "debug"

[operations]
cache_size = 10
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "text");
    assert_eq!(config.operations.cache_size, 10);
    assert_eq!(config.cache.capacity, 100);
    assert_eq!(config.rendering.cache_size, 20);
}

#[test]
fn test_load_rejects_zero_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polycache.toml");
    std::fs::write(&path, "[cache]\ncapacity = 0\n").unwrap();

    assert!(matches!(
        Config::load(&path),
        Err(PolyCacheError::InvalidCapacity(0))
    ));
}

#[test]
fn test_load_invalid_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polycache.toml");
    std::fs::write(&path, "[cache\ncapacity = ").unwrap();

    assert!(matches!(Config::load(&path), Err(PolyCacheError::TomlParse(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();

    assert!(matches!(
        Config::load(dir.path().join("missing.toml")),
        Err(PolyCacheError::Io(_))
    ));
}

#[test]
fn test_configured_capacity_drives_cache() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polycache.toml");
    std::fs::write(&path, "[cache]\ncapacity = 3\n").unwrap();
    let config = Config::load(&path).unwrap();

    let mut cache: LruCache<u32, u32> = LruCache::from_config(&config.cache).unwrap();
    for i in 0..10 {
        cache.set(i, i);
    }
    assert_eq!(cache.size(), 3);

    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = calls.clone();
    let mut memo = Memoizer::new(move |n: &u32| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        n * 2
    })
    .with_config(&config.cache)
    .unwrap();

    for i in 0..3 {
        memo.call(&i).unwrap();
    }
    for i in 0..3 {
        memo.call(&i).unwrap();
    }
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(memo.capacity(), 3);
}

#[test]
fn test_zero_configured_capacity_rejected_by_constructors() {
    let mut config = Config::default();
    config.cache.capacity = 0;

    assert!(matches!(
        LruCache::<u32, u32>::from_config(&config.cache),
        Err(PolyCacheError::InvalidCapacity(0))
    ));
    assert!(Memoizer::new(|n: &u32| *n)
        .with_config(&config.cache)
        .is_err());

    let defaults = LruCache::<u32, u32>::from_config(&Config::default().cache).unwrap();
    assert_eq!(defaults.capacity(), 100);
}
