//! Caller-owned configuration for forecast retrieval.
//!
//! Configuration is plain data handed to the cache manager and analyzer;
//! nothing here is process-global. It can be built in code, read from the
//! environment (with `.env` support) or loaded from a YAML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NdfdError, NdfdResult};

/// Public upstream distribution point for NDFD GRIB2 files.
pub const DEFAULT_REMOTE_URL: &str = "https://tgftp.nws.noaa.gov/SL.us008001/ST.opnl/DF.gr2/";

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_DECODE_TIMEOUT_MS: u64 = 120_000;

/// An explicitly configured data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL, or a directory path when `is_local_dir` is set.
    pub uri: String,
    /// Copy files from a local directory instead of fetching over HTTP.
    #[serde(default)]
    pub is_local_dir: bool,
}

/// Forecast retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NdfdConfig {
    /// Configured source; `None` means the public remote.
    #[serde(default)]
    pub source: Option<SourceConfig>,

    /// Root of the on-disk cache.
    #[serde(default = "default_cache_root")]
    pub cache_root: PathBuf,

    /// Remote used when no source is configured.
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    /// Upper bound on a single file transfer, in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Upper bound on decoding one grid file, in milliseconds.
    #[serde(default = "default_decode_timeout_ms")]
    pub decode_timeout_ms: u64,
}

fn default_cache_root() -> PathBuf {
    std::env::temp_dir().join("ndfd-cache")
}

fn default_remote_url() -> String {
    DEFAULT_REMOTE_URL.to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

fn default_decode_timeout_ms() -> u64 {
    DEFAULT_DECODE_TIMEOUT_MS
}

impl Default for NdfdConfig {
    fn default() -> Self {
        Self {
            source: None,
            cache_root: default_cache_root(),
            remote_url: default_remote_url(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            decode_timeout_ms: DEFAULT_DECODE_TIMEOUT_MS,
        }
    }
}

impl NdfdConfig {
    /// Use a specific source for grid files.
    pub fn with_source(mut self, uri: impl Into<String>, is_local_dir: bool) -> Self {
        self.source = Some(SourceConfig {
            uri: uri.into(),
            is_local_dir,
        });
        self
    }

    pub fn with_cache_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_root = path.into();
        self
    }

    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = url.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = millis(timeout);
        self
    }

    pub fn with_decode_timeout(mut self, timeout: Duration) -> Self {
        self.decode_timeout_ms = millis(timeout);
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }

    /// Reject settings no retrieval could succeed with.
    pub fn validate(&self) -> NdfdResult<()> {
        if self.fetch_timeout_ms == 0 {
            return Err(NdfdError::Configuration(
                "Fetch timeout must be at least 1 ms".to_string(),
            ));
        }
        if self.decode_timeout_ms == 0 {
            return Err(NdfdError::Configuration(
                "Decode timeout must be at least 1 ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Build configuration from environment variables.
    ///
    /// Reads a `.env` file when present, then:
    /// - `NDFD_SOURCE_URI` / `NDFD_SOURCE_IS_DIR`
    /// - `NDFD_CACHE_ROOT`
    /// - `NDFD_REMOTE_URL`
    /// - `NDFD_FETCH_TIMEOUT_MS` / `NDFD_DECODE_TIMEOUT_MS`
    pub fn from_env() -> NdfdResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> NdfdResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(uri) = lookup("NDFD_SOURCE_URI") {
            let is_local_dir = match lookup("NDFD_SOURCE_IS_DIR") {
                Some(v) => parse_bool("NDFD_SOURCE_IS_DIR", &v)?,
                None => false,
            };
            config = config.with_source(uri, is_local_dir);
        }
        if let Some(root) = lookup("NDFD_CACHE_ROOT") {
            config.cache_root = PathBuf::from(root);
        }
        if let Some(url) = lookup("NDFD_REMOTE_URL") {
            config.remote_url = url;
        }
        if let Some(v) = lookup("NDFD_FETCH_TIMEOUT_MS") {
            config.fetch_timeout_ms = parse_millis("NDFD_FETCH_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("NDFD_DECODE_TIMEOUT_MS") {
            config.decode_timeout_ms = parse_millis("NDFD_DECODE_TIMEOUT_MS", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> NdfdResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            NdfdError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: NdfdConfig = serde_yaml::from_str(&content).map_err(|e| {
            NdfdError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded NDFD configuration");
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> NdfdResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(NdfdError::Configuration(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_millis(key: &str, value: &str) -> NdfdResult<u64> {
    value.trim().parse().map_err(|_| {
        NdfdError::Configuration(format!(
            "{} must be a whole number of milliseconds, got '{}'",
            key, value
        ))
    })
}

fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NdfdConfig::default();
        assert!(config.source.is_none());
        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(120));
        assert!(config.cache_root.ends_with("ndfd-cache"));
    }

    #[test]
    fn test_builders() {
        let config = NdfdConfig::default()
            .with_source("/data/ndfd", true)
            .with_cache_root("/var/cache/ndfd")
            .with_fetch_timeout(Duration::from_secs(5));

        assert_eq!(
            config.source,
            Some(SourceConfig {
                uri: "/data/ndfd".to_string(),
                is_local_dir: true
            })
        );
        assert_eq!(config.cache_root, PathBuf::from("/var/cache/ndfd"));
        assert_eq!(config.fetch_timeout_ms, 5_000);
    }

    #[test]
    fn test_subsecond_timeouts_kept() {
        let config = NdfdConfig::default()
            .with_fetch_timeout(Duration::from_millis(500))
            .with_decode_timeout(Duration::from_millis(1500));

        assert_eq!(config.fetch_timeout(), Duration::from_millis(500));
        assert_eq!(config.decode_timeout(), Duration::from_millis(1500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = NdfdConfig::default().with_fetch_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(NdfdError::Configuration(_))));

        let err = NdfdConfig::from_lookup(lookup_from(&[("NDFD_DECODE_TIMEOUT_MS", "0")]))
            .unwrap_err();
        assert!(matches!(err, NdfdError::Configuration(_)));
    }

    #[test]
    fn test_from_lookup() {
        let config = NdfdConfig::from_lookup(lookup_from(&[
            ("NDFD_SOURCE_URI", "http://mirror.example.com/ndfd/"),
            ("NDFD_CACHE_ROOT", "/srv/ndfd"),
            ("NDFD_DECODE_TIMEOUT_MS", "30000"),
        ]))
        .unwrap();

        let source = config.source.as_ref().unwrap();
        assert_eq!(source.uri, "http://mirror.example.com/ndfd/");
        assert!(!source.is_local_dir);
        assert_eq!(config.cache_root, PathBuf::from("/srv/ndfd"));
        assert_eq!(config.decode_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = NdfdConfig::from_lookup(lookup_from(&[("NDFD_FETCH_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, NdfdError::Configuration(_)));

        let err = NdfdConfig::from_lookup(lookup_from(&[
            ("NDFD_SOURCE_URI", "/data"),
            ("NDFD_SOURCE_IS_DIR", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, NdfdError::Configuration(_)));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "source:\n  uri: /data/ndfd\n  is_local_dir: true\ncache_root: /tmp/ndfd-test\n\
             fetch_timeout_ms: 750\n"
        )
        .unwrap();

        let config = NdfdConfig::from_yaml_file(file.path()).unwrap();
        assert!(config.source.as_ref().unwrap().is_local_dir);
        assert_eq!(config.cache_root, PathBuf::from("/tmp/ndfd-test"));
        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert_eq!(config.fetch_timeout(), Duration::from_millis(750));
        assert_eq!(config.decode_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_from_yaml_file_missing() {
        let err = NdfdConfig::from_yaml_file("/nonexistent/ndfd.yaml").unwrap_err();
        assert!(matches!(err, NdfdError::Configuration(_)));
    }
}
