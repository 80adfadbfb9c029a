//! Retrieval of the raw dataset payloads.
//!
//! The route engine only needs bytes. This module turns a locator (URL or
//! filesystem path) into those bytes, applying a timeout and HTTP status
//! validation for remote sources.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Default public nodes dataset.
pub const DEFAULT_NODES_URL: &str =
    "https://huggingface.co/datasets/dryroutes/grafo/resolve/main/nodos.json.gz";
/// Default public edges dataset.
pub const DEFAULT_EDGES_URL: &str =
    "https://huggingface.co/datasets/dryroutes/grafo/resolve/main/aristas.json.gz";

const NODES_SOURCE_ENV: &str = "DRYROUTES_NODES_SOURCE";
const EDGES_SOURCE_ENV: &str = "DRYROUTES_EDGES_SOURCE";
const FETCH_TIMEOUT_ENV: &str = "DRYROUTES_FETCH_TIMEOUT_SECS";

/// Timeout applied to remote dataset requests unless configured otherwise.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a dataset payload lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DatasetLocator {
    Url(String),
    Path(PathBuf),
}

impl DatasetLocator {
    /// Interpret `value` as a URL when it has an `http(s)://` scheme and as a
    /// filesystem path otherwise (`file://` prefixes are stripped).
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return DatasetLocator::Url(trimmed.to_string());
        }

        let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
        DatasetLocator::Path(PathBuf::from(path))
    }
}

impl fmt::Display for DatasetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetLocator::Url(url) => f.write_str(url),
            DatasetLocator::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The pair of locators a graph is loaded from. Also the graph cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetSources {
    pub nodes: DatasetLocator,
    pub edges: DatasetLocator,
}

impl DatasetSources {
    pub fn new(nodes: &str, edges: &str) -> Self {
        Self {
            nodes: DatasetLocator::parse(nodes),
            edges: DatasetLocator::parse(edges),
        }
    }

    /// Resolve the locators from explicit values, then the
    /// `DRYROUTES_NODES_SOURCE` / `DRYROUTES_EDGES_SOURCE` environment
    /// variables, then the public default datasets.
    pub fn resolve(nodes: Option<&str>, edges: Option<&str>) -> Self {
        let nodes = nodes
            .map(str::to_string)
            .or_else(|| env_value(NODES_SOURCE_ENV))
            .unwrap_or_else(|| DEFAULT_NODES_URL.to_string());
        let edges = edges
            .map(str::to_string)
            .or_else(|| env_value(EDGES_SOURCE_ENV))
            .unwrap_or_else(|| DEFAULT_EDGES_URL.to_string());
        Self::new(&nodes, &edges)
    }
}

impl Default for DatasetSources {
    fn default() -> Self {
        Self::new(DEFAULT_NODES_URL, DEFAULT_EDGES_URL)
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Fetch timeout from an explicit value, then `DRYROUTES_FETCH_TIMEOUT_SECS`,
/// then [`DEFAULT_FETCH_TIMEOUT`].
pub fn resolve_fetch_timeout(explicit: Option<u64>) -> Duration {
    if let Some(secs) = explicit {
        return Duration::from_secs(secs);
    }

    match env_value(FETCH_TIMEOUT_ENV).map(|value| value.parse::<u64>()) {
        Some(Ok(secs)) => Duration::from_secs(secs),
        Some(Err(error)) => {
            warn!(%error, "ignoring invalid {}", FETCH_TIMEOUT_ENV);
            DEFAULT_FETCH_TIMEOUT
        }
        None => DEFAULT_FETCH_TIMEOUT,
    }
}

/// Retrieves raw dataset payloads.
pub trait DatasetFetcher: Send + Sync {
    fn fetch(&self, locator: &DatasetLocator) -> Result<Vec<u8>>;
}

/// Fetcher backed by a blocking HTTP client for URLs and the filesystem for
/// paths.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(user_agent())
            .build()
            .map_err(Error::Http)
    }

    fn fetch_url(&self, url: &str) -> Result<Vec<u8>> {
        info!(%url, timeout_secs = self.timeout.as_secs(), "downloading dataset");
        let client = self.build_client()?;
        let response = client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes()?;
        debug!(%url, bytes = bytes.len(), "dataset downloaded");
        Ok(bytes.to_vec())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetFetcher for HttpFetcher {
    fn fetch(&self, locator: &DatasetLocator) -> Result<Vec<u8>> {
        match locator {
            DatasetLocator::Url(url) => self.fetch_url(url),
            DatasetLocator::Path(path) => read_file(path),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "read dataset file");
            Ok(bytes)
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        }),
        Err(error) => Err(Error::Io(error)),
    }
}

fn user_agent() -> String {
    format!(
        "dryroutes-lib/{version} ({repo})",
        version = env!("CARGO_PKG_VERSION"),
        repo = "https://github.com/dryroutes/dryroutes-rs"
    )
}
