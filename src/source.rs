//! Read-only access to `index.json` and `days/{date}.json`.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DashboardError;
use crate::models::{DayRecord, IndexManifest};

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DashboardError>> + Send + 'a>>;

pub const INDEX_PATH: &str = "index.json";

pub fn day_path(date: &str) -> String {
    format!("days/{date}.json")
}

pub trait DashboardDataSource: Send + Sync + 'static {
    fn fetch_index(&self) -> SourceFuture<'_, IndexManifest>;

    fn fetch_day<'a>(&'a self, date: &'a str) -> SourceFuture<'a, DayRecord>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Fetches the data files over HTTP, always bypassing caches.
#[derive(Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDataSource {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, DashboardError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| DashboardError::Http {
                url: base_url.clone(),
                message: err.to_string(),
            })?;
        Ok(Self { client, base_url })
    }

    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative)
    }

    async fn get_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T, DashboardError> {
        let url = self.url_for(relative);
        debug!(component = "data_source", event = "source.http.get", url = %url);

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|err| DashboardError::Http {
                url: url.clone(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|err| DashboardError::Http {
            url: url.clone(),
            message: err.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| DashboardError::decode(url, err))
    }
}

impl DashboardDataSource for HttpDataSource {
    fn fetch_index(&self) -> SourceFuture<'_, IndexManifest> {
        Box::pin(self.get_json::<IndexManifest>(INDEX_PATH))
    }

    fn fetch_day<'a>(&'a self, date: &'a str) -> SourceFuture<'a, DayRecord> {
        Box::pin(async move { self.get_json::<DayRecord>(&day_path(date)).await })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Reads the same layout from a local directory, e.g. the producer's `site/data`.
#[derive(Debug, Clone)]
pub struct DirDataSource {
    root: PathBuf,
}

impl DirDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T, DashboardError> {
        let path = self.root.join(relative);
        debug!(component = "data_source", event = "source.dir.read", path = %path.display());

        let bytes = tokio::fs::read(&path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                DashboardError::NotFound {
                    resource: path.display().to_string(),
                }
            } else {
                DashboardError::Io {
                    path: path.display().to_string(),
                    message: err.to_string(),
                }
            }
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|err| DashboardError::decode(path.display().to_string(), err))
    }
}

impl DashboardDataSource for DirDataSource {
    fn fetch_index(&self) -> SourceFuture<'_, IndexManifest> {
        Box::pin(self.read_json::<IndexManifest>(INDEX_PATH))
    }

    fn fetch_day<'a>(&'a self, date: &'a str) -> SourceFuture<'a, DayRecord> {
        Box::pin(async move { self.read_json::<DayRecord>(&day_path(date)).await })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[derive(Debug, Default)]
struct InMemoryData {
    manifest: Option<IndexManifest>,
    days: HashMap<String, DayRecord>,
}

/// Test and demo source; a missing manifest or day behaves like a 404.
#[derive(Clone, Default)]
pub struct InMemoryDataSource {
    inner: Arc<RwLock<InMemoryData>>,
}

impl InMemoryDataSource {
    pub fn new(manifest: IndexManifest, days: impl IntoIterator<Item = DayRecord>) -> Self {
        let source = Self::default();
        source.replace_manifest(Some(manifest));
        for day in days {
            source.insert_day(day);
        }
        source
    }

    pub fn replace_manifest(&self, manifest: Option<IndexManifest>) {
        let mut guard = self
            .inner
            .write()
            .expect("in-memory data lock should not be poisoned");
        guard.manifest = manifest;
    }

    pub fn insert_day(&self, day: DayRecord) {
        let mut guard = self
            .inner
            .write()
            .expect("in-memory data lock should not be poisoned");
        guard.days.insert(day.date.clone(), day);
    }

    pub fn remove_day(&self, date: &str) {
        let mut guard = self
            .inner
            .write()
            .expect("in-memory data lock should not be poisoned");
        guard.days.remove(date);
    }

    fn lookup_index(&self) -> Result<IndexManifest, DashboardError> {
        self.inner
            .read()
            .expect("in-memory data lock should not be poisoned")
            .manifest
            .clone()
            .ok_or_else(|| DashboardError::NotFound {
                resource: INDEX_PATH.to_string(),
            })
    }

    fn lookup_day(&self, date: &str) -> Result<DayRecord, DashboardError> {
        self.inner
            .read()
            .expect("in-memory data lock should not be poisoned")
            .days
            .get(date)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound {
                resource: day_path(date),
            })
    }
}

impl DashboardDataSource for InMemoryDataSource {
    fn fetch_index(&self) -> SourceFuture<'_, IndexManifest> {
        let outcome = self.lookup_index();
        Box::pin(async move { outcome })
    }

    fn fetch_day<'a>(&'a self, date: &'a str) -> SourceFuture<'a, DayRecord> {
        let outcome = self.lookup_day(date);
        Box::pin(async move { outcome })
    }

    fn describe(&self) -> String {
        "in_memory".to_string()
    }
}
