//! Cache resolution against a local source directory.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use grid_cache::{CacheManager, FetchError, FetchTarget, Fetcher, SourceFetcher};
use ndfd_common::{ForecastCycle, NdfdConfig, NdfdError};
use tempfile::TempDir;
use test_utils::fixtures::{write_source_elevation, write_source_variable};

fn cycle(day: u32, hour: u32) -> ForecastCycle {
    ForecastCycle::at(Utc.with_ymd_and_hms(2024, 3, day, hour, 45, 0).unwrap())
}

struct Dirs {
    source: TempDir,
    cache: TempDir,
}

impl Dirs {
    fn new() -> Self {
        Self {
            source: tempfile::tempdir().unwrap(),
            cache: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self) -> NdfdConfig {
        NdfdConfig::default()
            .with_source(self.source.path().to_string_lossy(), true)
            .with_cache_root(self.cache.path())
    }

    /// Publish a one-message `variable` file in the source tree.
    fn publish(&self, region: &str, period: &str, variable: &str, contents: &[u8]) {
        write_source_variable(self.source.path(), region, period, variable, &[contents.to_vec()])
            .unwrap();
    }
}

/// Delegates to a real fetcher and counts transfers.
struct CountingFetcher {
    inner: SourceFetcher,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, target: &FetchTarget, dest: &Path) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(target, dest).await
    }
}

fn counting(config: NdfdConfig) -> (CacheManager<CountingFetcher>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = CountingFetcher {
        inner: SourceFetcher::new(config.fetch_timeout()).unwrap(),
        calls: calls.clone(),
    };
    (CacheManager::with_fetcher(config, fetcher), calls)
}

#[tokio::test]
async fn test_resolves_every_group_in_order() {
    let dirs = Dirs::new();
    dirs.publish("conus", "001-003", "apt", b"GRIB-a");
    dirs.publish("conus", "004-007", "apt", b"GRIB-b");

    let cache = CacheManager::new(dirs.config()).unwrap();
    let paths = cache.resolve_for_cycle("apt", "conus", cycle(14, 12)).await.unwrap();

    let root = dirs.cache.path().join("2024-03-14-12/DC.ndfd/AR.conus");
    assert_eq!(
        paths,
        vec![
            root.join("VP.001-003/ds.apt.bin"),
            root.join("VP.004-007/ds.apt.bin"),
        ]
    );
    assert_eq!(std::fs::read(&paths[0]).unwrap(), b"GRIB-a");
    assert_eq!(std::fs::read(&paths[1]).unwrap(), b"GRIB-b");
}

#[tokio::test]
async fn test_cached_files_are_not_refetched() {
    let dirs = Dirs::new();
    dirs.publish("hawaii", "001-003", "temp", b"GRIB");
    dirs.publish("hawaii", "004-007", "temp", b"GRIB");

    let (cache, calls) = counting(dirs.config());
    cache.resolve_for_cycle("temp", "hawaii", cycle(14, 12)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    cache.resolve_for_cycle("temp", "hawaii", cycle(14, 12)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_new_cycle_clears_old_cycles_only() {
    let dirs = Dirs::new();
    dirs.publish("guam", "001-003", "wx", b"GRIB");
    dirs.publish("guam", "004-007", "wx", b"GRIB");

    let root = dirs.cache.path();
    std::fs::create_dir_all(root.join("static/DC.ndfd/AR.guam")).unwrap();
    std::fs::create_dir_all(root.join("notes")).unwrap();

    let cache = CacheManager::new(dirs.config()).unwrap();
    cache.resolve_for_cycle("wx", "guam", cycle(14, 12)).await.unwrap();
    assert!(root.join("2024-03-14-12").is_dir());

    cache.resolve_for_cycle("wx", "guam", cycle(14, 13)).await.unwrap();
    assert!(!root.join("2024-03-14-12").exists());
    assert!(root.join("2024-03-14-13/DC.ndfd/AR.guam/VP.001-003/ds.wx.bin").is_file());
    assert!(root.join("static/DC.ndfd/AR.guam").is_dir());
    assert!(root.join("notes").is_dir());
}

#[tokio::test]
async fn test_missing_source_file_is_retrieval_failure() {
    let dirs = Dirs::new();
    let cache = CacheManager::new(dirs.config()).unwrap();

    let err = cache
        .resolve_for_cycle("temp", "alaska", cycle(14, 12))
        .await
        .unwrap_err();

    match err {
        NdfdError::RetrievalFailure { path } => {
            assert!(path.ends_with("AR.alaska/VP.001-003/ds.temp.bin"));
            assert!(!path.exists());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unknown_region() {
    let dirs = Dirs::new();
    let cache = CacheManager::new(dirs.config()).unwrap();

    let err = cache
        .resolve_for_cycle("temp", "atlantis", cycle(14, 12))
        .await
        .unwrap_err();
    assert!(matches!(err, NdfdError::InvalidRegion(name) if name == "atlantis"));
}

#[tokio::test]
async fn test_unpublished_variable_resolves_empty() {
    let dirs = Dirs::new();
    let (cache, calls) = counting(dirs.config());

    let paths = cache
        .resolve_for_cycle("snowfall-depth", "conus", cycle(14, 12))
        .await
        .unwrap();
    assert!(paths.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_static_elevation() {
    let dirs = Dirs::new();
    write_source_elevation(dirs.source.path(), "hawaii", &[b"GRIB-elev".to_vec()]).unwrap();

    let cache = CacheManager::new(dirs.config()).unwrap();
    let path = cache.resolve_static("hawaii").await.unwrap();

    assert_eq!(path, dirs.cache.path().join("static/DC.ndfd/AR.hawaii/ds.elev.bin"));
    assert_eq!(std::fs::read(&path).unwrap(), b"GRIB-elev");
}

#[tokio::test]
async fn test_static_elevation_unsupported_region() {
    let dirs = Dirs::new();
    let cache = CacheManager::new(dirs.config()).unwrap();

    let err = cache.resolve_static("puertori").await.unwrap_err();
    assert!(matches!(err, NdfdError::UnsupportedRegion(_)));
}

#[tokio::test]
async fn test_static_elevation_requires_source() {
    let cache_dir = tempfile::tempdir().unwrap();
    let config = NdfdConfig::default().with_cache_root(cache_dir.path());
    let cache = CacheManager::new(config).unwrap();

    let err = cache.resolve_static("conus").await.unwrap_err();
    assert!(matches!(err, NdfdError::Configuration(_)));
}

#[test]
fn test_zero_fetch_timeout_rejected() {
    let config = NdfdConfig::default().with_fetch_timeout(std::time::Duration::ZERO);
    assert!(matches!(CacheManager::new(config), Err(NdfdError::Configuration(_))));
}
