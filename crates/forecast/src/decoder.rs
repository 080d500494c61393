//! Grid file decoding behind an async seam.

use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grib2_parser::{Grib2Message, Grib2Reader, Grib2Tables};
use ndfd_common::{NdfdError, NdfdResult};
use tokio::task;
use tracing::debug;

/// Access to decoded grid messages.
#[async_trait]
pub trait GridDecoder: Send + Sync {
    /// Every message in the file at `path`, in file order.
    async fn open(&self, path: &Path) -> NdfdResult<Vec<Grib2Message>>;

    /// Field values of `message`, row-major.
    async fn values(&self, message: &Grib2Message) -> NdfdResult<Vec<f32>>;
}

/// Decodes GRIB2 files on the blocking pool with a time limit.
#[derive(Clone)]
pub struct Grib2FileDecoder {
    tables: Arc<Grib2Tables>,
    timeout: Duration,
}

impl Grib2FileDecoder {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tables: Arc::new(Grib2Tables::ndfd()),
            timeout,
        }
    }

    async fn run_blocking<T, F>(&self, what: String, f: F) -> NdfdResult<T>
    where
        F: FnOnce() -> NdfdResult<T> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::time::timeout(self.timeout, task::spawn_blocking(f)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(NdfdError::Decode(format!("Decode task for {} failed: {}", what, e))),
            Err(_) => Err(NdfdError::Timeout(format!("decoding {}", what))),
        }
    }
}

#[async_trait]
impl GridDecoder for Grib2FileDecoder {
    async fn open(&self, path: &Path) -> NdfdResult<Vec<Grib2Message>> {
        let owned = path.to_path_buf();
        let tables = self.tables.clone();
        let messages = self
            .run_blocking(path.display().to_string(), move || {
                Grib2Reader::open(&owned, tables)
                    .and_then(|mut reader| reader.read_all())
                    .map_err(decode_error)
            })
            .await?;

        debug!(path = %path.display(), messages = messages.len(), "Decoded grid file");
        Ok(messages)
    }

    async fn values(&self, message: &Grib2Message) -> NdfdResult<Vec<f32>> {
        let message = message.clone();
        let what = format!("{} field", message.parameter());
        self.run_blocking(what, move || message.values().map_err(decode_error))
            .await
    }
}

pub(crate) fn decode_error(e: impl Display) -> NdfdError {
    NdfdError::Decode(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::Grib2Builder;

    #[tokio::test]
    async fn test_open_and_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ds.apt.bin");
        let message = Grib2Builder::new_conus().with_constant_value(280.0).build();
        std::fs::write(&path, [message.clone(), message].concat()).unwrap();

        let decoder = Grib2FileDecoder::new(Duration::from_secs(10));
        let messages = decoder.open(&path).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].parameter(), "APTMP");

        let values = decoder.values(&messages[0]).await.unwrap();
        assert_eq!(values.len(), 25);
        assert!(values.iter().all(|&v| v == 280.0));
    }

    #[tokio::test]
    async fn test_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = Grib2FileDecoder::new(Duration::from_secs(10));
        let result = decoder.open(&dir.path().join("absent.bin")).await;
        assert!(matches!(result, Err(NdfdError::Decode(_))));
    }
}
