//! Coverage data sources.
//!
//! Every taxonomy leaf resolves to exactly one snapshot document. Sources only
//! differ in where that document lives:
//!
//! - `StaticCoverageSource`: snapshots registered in memory
//! - `FileCoverageSource`: JSON documents under a local data directory
//! - `HttpCoverageSource`: JSON documents published under a base URL
//! - `CachedSource`: memoizes any other source for the lifetime of a build
//!
//! A load either yields a complete snapshot or an error; partially decoded
//! documents are never returned.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{MatrixError, Result};
use crate::metrics::{MetricsReport, SourceMetrics};
use crate::retry::RetryConfig;
use crate::snapshot::CoverageSnapshot;
use crate::taxonomy::{self, TaxonomyKey};

/// Keyed, read-only access to coverage snapshots.
pub trait CoverageSource: Sync {
    /// Load the snapshot for one taxonomy leaf.
    ///
    /// Fails with `UnknownContentType` when the source has no document for `key`.
    fn load(&self, key: TaxonomyKey) -> impl Future<Output = Result<CoverageSnapshot>> + Send;
}

/// Validate a raw taxonomy selection and load its snapshot.
///
/// Selections that fail taxonomy validation are rejected with
/// `InvalidTaxonomy` before any source is consulted.
pub async fn fetch<S: CoverageSource>(
    source: &S,
    content_type: &str,
    sub_type: Option<&str>,
) -> Result<CoverageSnapshot> {
    let key = taxonomy::validate(content_type, sub_type)
        .map_err(|e| MatrixError::InvalidTaxonomy(e.to_string()))?;
    fetch_key(source, key).await
}

/// Load the snapshot for an already validated taxonomy leaf.
pub async fn fetch_key<S: CoverageSource>(source: &S, key: TaxonomyKey) -> Result<CoverageSnapshot> {
    match source.load(key).await {
        Ok(snapshot) => {
            info!("Loaded coverage snapshot for {} ({} files)", key, snapshot.len());
            Ok(snapshot)
        }
        Err(e) => {
            warn!("Failed to load coverage snapshot for {}: {}", key, e);
            Err(e)
        }
    }
}

/// Load every taxonomy leaf concurrently.
pub async fn fetch_all<S: CoverageSource>(
    source: &S,
) -> Vec<(TaxonomyKey, Result<CoverageSnapshot>)> {
    let keys = TaxonomyKey::all();
    let results = join_all(keys.iter().map(|key| fetch_key(source, *key))).await;
    keys.into_iter().zip(results).collect()
}

/// Snapshots held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCoverageSource {
    snapshots: HashMap<TaxonomyKey, CoverageSnapshot>,
}

impl StaticCoverageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the snapshot for a leaf.
    pub fn with(mut self, key: TaxonomyKey, snapshot: CoverageSnapshot) -> Self {
        self.snapshots.insert(key, snapshot);
        self
    }

    pub fn is_registered(&self, key: TaxonomyKey) -> bool {
        self.snapshots.contains_key(&key)
    }
}

impl CoverageSource for StaticCoverageSource {
    async fn load(&self, key: TaxonomyKey) -> Result<CoverageSnapshot> {
        self.snapshots
            .get(&key)
            .cloned()
            .ok_or(MatrixError::UnknownContentType(key))
    }
}

/// Snapshot documents stored as `<root>/<leaf path>`.
#[derive(Debug, Clone)]
pub struct FileCoverageSource {
    root: PathBuf,
}

impl FileCoverageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: TaxonomyKey) -> PathBuf {
        self.root.join(key.snapshot_path())
    }
}

impl CoverageSource for FileCoverageSource {
    async fn load(&self, key: TaxonomyKey) -> Result<CoverageSnapshot> {
        let path = self.path_for(key);
        debug!("Reading snapshot document {}", path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MatrixError::UnknownContentType(key))
            }
            Err(e) => return Err(e.into()),
        };

        CoverageSnapshot::from_json(&bytes)
    }
}

/// Snapshot documents published as `<base_url>/<leaf path>`.
#[derive(Debug, Clone)]
pub struct HttpCoverageSource {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpCoverageSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryConfig::snapshot_fetch(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn url_for(&self, key: TaxonomyKey) -> String {
        format!("{}/{}", self.base_url, key.snapshot_path())
    }

    async fn load_once(&self, key: TaxonomyKey, url: &str) -> Result<CoverageSnapshot> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MatrixError::UnknownContentType(key));
        }
        if !status.is_success() {
            return Err(MatrixError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        CoverageSnapshot::from_json(&body)
    }
}

impl CoverageSource for HttpCoverageSource {
    async fn load(&self, key: TaxonomyKey) -> Result<CoverageSnapshot> {
        let url = self.url_for(key);
        self.retry
            .run(&format!("Snapshot fetch {}", key), || self.load_once(key, &url))
            .await
    }
}

/// Memoizes successful loads of an inner source.
///
/// Snapshots are static for a given build, so cached entries never expire;
/// `invalidate` drops them when a new build is published. Failures are not
/// cached.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<HashMap<TaxonomyKey, CoverageSnapshot>>,
    metrics: SourceMetrics,
}

impl<S: CoverageSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
            metrics: SourceMetrics::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    pub fn invalidate(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn cached(&self, key: TaxonomyKey) -> Option<CoverageSnapshot> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }
}

impl<S: CoverageSource + Send> CoverageSource for CachedSource<S> {
    async fn load(&self, key: TaxonomyKey) -> Result<CoverageSnapshot> {
        if let Some(snapshot) = self.cached(key) {
            debug!("Snapshot cache hit for {}", key);
            self.metrics.record_cache_hit();
            return Ok(snapshot);
        }

        self.metrics.record_cache_miss();
        match self.inner.load(key).await {
            Ok(snapshot) => {
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, snapshot.clone());
                Ok(snapshot)
            }
            Err(e) => {
                self.metrics.record_load_failure();
                Err(e)
            }
        }
    }
}
