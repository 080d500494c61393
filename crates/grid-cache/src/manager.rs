//! Forecast-cycle keyed cache of NDFD grid files.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/<YYYY-MM-DD-HH>/DC.ndfd/AR.<region>/VP.<period>/ds.<variable>.bin
//! <root>/static/DC.ndfd/AR.<region>/ds.elev.bin
//! ```
//!
//! A cycle directory is created the first time the cycle is seen. Older
//! cycle directories are removed at that point; the static tree is kept.

use std::path::{Path, PathBuf};

use ndfd_common::{ForecastCycle, NdfdConfig, NdfdError, NdfdResult};
use ndfd_tables::find_region;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::fetch::{FetchTarget, Fetcher, SourceFetcher};

const STATIC_DIR: &str = "static";

/// Relative path of a variable file, identical on the source and in a
/// cycle directory.
pub fn variable_path(region: &str, period: &str, variable: &str) -> String {
    format!("DC.ndfd/AR.{}/VP.{}/ds.{}.bin", region, period, variable)
}

/// Relative path of a region's elevation file, identical on the source
/// and under the cache root.
pub fn elevation_path(region: &str) -> String {
    format!("{}/DC.ndfd/AR.{}/ds.elev.bin", STATIC_DIR, region)
}

/// Maps (variable, region) to local files, fetching what is missing.
pub struct CacheManager<F = SourceFetcher> {
    config: NdfdConfig,
    fetcher: F,
}

impl CacheManager<SourceFetcher> {
    pub fn new(config: NdfdConfig) -> NdfdResult<Self> {
        config.validate()?;
        let fetcher = SourceFetcher::new(config.fetch_timeout())
            .map_err(|e| NdfdError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self { config, fetcher })
    }
}

impl<F: Fetcher> CacheManager<F> {
    pub fn with_fetcher(config: NdfdConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &NdfdConfig {
        &self.config
    }

    /// Local files holding `variable` for `region` in the current cycle.
    pub async fn resolve(&self, variable: &str, region: &str) -> NdfdResult<Vec<PathBuf>> {
        self.resolve_for_cycle(variable, region, ForecastCycle::current())
            .await
    }

    /// Local files holding `variable` for `region` in `cycle`, one per
    /// sub-resolution group publishing the variable.
    ///
    /// An empty list means no group of the region publishes the variable.
    #[instrument(skip(self), fields(cycle = %cycle))]
    pub async fn resolve_for_cycle(
        &self,
        variable: &str,
        region: &str,
        cycle: ForecastCycle,
    ) -> NdfdResult<Vec<PathBuf>> {
        let cycle_dir = self.prepare_cycle_dir(&cycle).await?;

        let area = find_region(region).ok_or_else(|| NdfdError::InvalidRegion(region.to_string()))?;

        let mut paths = Vec::new();
        for group in area.groups_for(variable) {
            let relative = variable_path(area.name, group.period, variable);
            let local = cycle_dir.join(&relative);
            self.fetch_if_missing(&relative, &local).await?;
            paths.push(local);
        }

        debug!(files = paths.len(), "Resolved variable files");
        Ok(paths)
    }

    /// Local elevation grid for `region`.
    ///
    /// Elevation is only served by a configured source.
    #[instrument(skip(self))]
    pub async fn resolve_static(&self, region: &str) -> NdfdResult<PathBuf> {
        let area = find_region(region).ok_or_else(|| NdfdError::InvalidRegion(region.to_string()))?;
        if !area.has_elevation {
            return Err(NdfdError::UnsupportedRegion(region.to_string()));
        }
        if self.config.source.is_none() {
            return Err(NdfdError::Configuration(
                "Elevation data requires a configured source".to_string(),
            ));
        }

        let relative = elevation_path(area.name);
        let local = self.config.cache_root.join(&relative);
        self.fetch_if_missing(&relative, &local).await?;
        Ok(local)
    }

    /// Create the cycle directory, clearing older cycles when it is new.
    async fn prepare_cycle_dir(&self, cycle: &ForecastCycle) -> NdfdResult<PathBuf> {
        let cycle_dir = self.config.cache_root.join(cycle.dir_name());
        if fs::metadata(&cycle_dir).await.is_ok_and(|m| m.is_dir()) {
            return Ok(cycle_dir);
        }

        remove_old_cycles(&self.config.cache_root).await;
        fs::create_dir_all(&cycle_dir).await?;
        info!(dir = %cycle_dir.display(), "Started new forecast cycle cache");
        Ok(cycle_dir)
    }

    fn source_target(&self, relative: &str) -> FetchTarget {
        match &self.config.source {
            Some(source) if source.is_local_dir => {
                FetchTarget::File(Path::new(&source.uri).join(relative))
            }
            Some(source) => FetchTarget::Http(join_url(&source.uri, relative)),
            None => FetchTarget::Http(join_url(&self.config.remote_url, relative)),
        }
    }

    /// Fetch `relative` to `local` unless it is already cached.
    ///
    /// A failed transfer is logged; only a file still missing afterwards is
    /// an error.
    async fn fetch_if_missing(&self, relative: &str, local: &Path) -> NdfdResult<()> {
        if is_file(local).await {
            return Ok(());
        }

        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent).await?;
        }

        let target = self.source_target(relative);
        if let Err(e) = self.fetcher.fetch(&target, local).await {
            warn!(error = %e, target = %target, "Fetch failed");
        }

        if !is_file(local).await {
            return Err(NdfdError::RetrievalFailure {
                path: local.to_path_buf(),
            });
        }
        Ok(())
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

fn join_url(base: &str, relative: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), relative)
}

/// Best-effort removal of every cycle directory under `root`.
async fn remove_old_cycles(root: &Path) {
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(_) => return,
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, root = %root.display(), "Failed to list cache root");
                break;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !ForecastCycle::is_cycle_dir_name(name) {
            continue;
        }

        match fs::remove_dir_all(entry.path()).await {
            Ok(()) => debug!(dir = name, "Removed expired cycle"),
            Err(e) => warn!(error = %e, dir = name, "Failed to remove expired cycle"),
        }
    }
}
