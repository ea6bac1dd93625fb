//! Transports that deliver report documents

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetches raw report documents by path relative to the report root
#[allow(async_fn_in_trait)]
pub trait ReportSource {
    /// Fetch the document at `path` (e.g. `reports.json`, `reports/latest.json`)
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Human readable location, used in log messages
    fn describe(&self) -> String;
}

/// Reports served over HTTP(S)
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    /// Create a source rooted at `base`
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("footprint"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base: with_trailing_slash(base),
        })
    }

    /// Resolve a relative document path against the base URL
    pub fn url_for(&self, path: &str) -> Result<Url> {
        // "./" keeps keys such as "a:b.json" from parsing as a URL scheme
        Ok(self.base.join(&format!("./{}", path.trim_start_matches('/')))?)
    }
}

impl ReportSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// Without a trailing slash `Url::join` would replace the last path segment
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Reports stored in a local directory
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ReportSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        debug!("Reading {}", full.display());

        tokio::fs::read(&full)
            .await
            .map_err(|e| Error::FileReadError {
                path: full.display().to_string(),
                source: e,
            })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Either transport, chosen from a location string
pub enum AnySource {
    Http(HttpSource),
    Dir(DirSource),
}

impl AnySource {
    /// `http://` and `https://` locations become HTTP sources, anything else a directory
    pub fn from_location(location: &str, timeout: Option<Duration>) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(Error::ConfigError("Report source cannot be empty".to_string()));
        }

        if location.starts_with("http://") || location.starts_with("https://") {
            let url = Url::parse(location)?;
            Ok(AnySource::Http(HttpSource::new(url, timeout)?))
        } else {
            Ok(AnySource::Dir(DirSource::new(location)))
        }
    }
}

impl ReportSource for AnySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        match self {
            AnySource::Http(source) => source.fetch(path).await,
            AnySource::Dir(source) => source.fetch(path).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            AnySource::Http(source) => source.describe(),
            AnySource::Dir(source) => source.describe(),
        }
    }
}
