//! Record-fetch collaborator.
//!
//! [`RegionSource`] is the seam between the navigation core and the backend.
//! [`HttpRegionSource`] talks to the region endpoints over HTTP; tests plug in
//! scripted sources.

use std::future::Future;
use std::pin::Pin;

use foundation::ids::{RegionId, SceneId};

use crate::protocol::{FullRecord, MinimalRecord, RegionsPage, range_path, region_path};
use crate::window::RangeKey;

/// Error type for fetches.
///
/// Fetch failures are recovered where they land (an empty or stale cache
/// window, a minimal record left in place), so this mostly carries context
/// for the log line.
#[derive(Debug)]
pub struct FetchError {
    pub message: String,
    /// HTTP status, when the server answered at all.
    pub status: Option<u16>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }
}

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backend queries the navigation core depends on.
pub trait RegionSource: Send + Sync {
    /// Minimal records for every id in `range`.
    fn fetch_range<'a>(
        &'a self,
        scene: &'a SceneId,
        range: RangeKey,
    ) -> BoxFuture<'a, Result<Vec<MinimalRecord>, FetchError>>;

    /// One complete record.
    fn fetch_region<'a>(
        &'a self,
        scene: &'a SceneId,
        id: RegionId,
    ) -> BoxFuture<'a, Result<FullRecord, FetchError>>;
}

/// Region endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRegionSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRegionSource {
    /// `base_url` is the API root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::with_source("HTTP request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::status(format!("GET {path} failed"), status.as_u16()));
        }

        resp.json::<T>()
            .await
            .map_err(|e| FetchError::with_source("Failed to decode response", e))
    }
}

impl RegionSource for HttpRegionSource {
    fn fetch_range<'a>(
        &'a self,
        scene: &'a SceneId,
        range: RangeKey,
    ) -> BoxFuture<'a, Result<Vec<MinimalRecord>, FetchError>> {
        Box::pin(async move {
            let page: RegionsPage = self.get_json(&range_path(scene, range)).await?;
            Ok(page.items)
        })
    }

    fn fetch_region<'a>(
        &'a self,
        scene: &'a SceneId,
        id: RegionId,
    ) -> BoxFuture<'a, Result<FullRecord, FetchError>> {
        Box::pin(async move { self.get_json(&region_path(scene, id)).await })
    }
}
