//! On-disk document cache with retrying acquisition.

use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::stats::ScanStats;
use crate::throttling::RequestPacer;

/// Format of a disclosure document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Html,
}

impl DocumentKind {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }

    pub const fn as_str(self) -> &'static str {
        self.extension()
    }

    /// Servers mislabel PDFs often enough that a `.pdf` URL also counts.
    fn accepts(self, content_type: Option<&str>, url: &str) -> bool {
        match self {
            Self::Pdf => {
                content_type.is_some_and(|value| value.to_ascii_lowercase().contains("pdf"))
                    || strip_query(url).to_ascii_lowercase().ends_with(".pdf")
            }
            Self::Html => true,
        }
    }
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetched document: raw PDF bytes or decoded HTML text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Pdf(Vec<u8>),
    Html(String),
}

impl Document {
    pub fn from_bytes(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        match kind {
            DocumentKind::Pdf => Self::Pdf(bytes),
            DocumentKind::Html => match String::from_utf8(bytes) {
                Ok(text) => Self::Html(text),
                Err(err) => Self::Html(String::from_utf8_lossy(err.as_bytes()).into_owned()),
            },
        }
    }

    pub const fn kind(&self) -> DocumentKind {
        match self {
            Self::Pdf(_) => DocumentKind::Pdf,
            Self::Html(_) => DocumentKind::Html,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Pdf(bytes) => bytes,
            Self::Html(text) => text.as_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// How a cache lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    CacheHit,
    Downloaded { attempts: u32 },
    Failed { attempts: u32 },
}

/// Cache bookkeeping for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub key: String,
    pub path: PathBuf,
    pub byte_len: usize,
    #[serde(flatten)]
    pub outcome: FetchOutcome,
}

/// Result of [`DocumentCache::fetch_entry`]. `document` is `None` on soft failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDocument {
    pub entry: CacheEntry,
    pub document: Option<Document>,
}

/// Deterministic cache file name for a URL.
///
/// The URL's last path segment is used when it already carries the expected
/// extension and is a plain file name; otherwise the first 8 hex characters
/// of the URL's SHA-256 plus the extension.
pub fn cache_key(url: &str, kind: DocumentKind) -> String {
    let suffix = format!(".{}", kind.extension());
    let tail = strip_query(url).rsplit('/').next().unwrap_or_default();

    if tail.len() > suffix.len()
        && tail.to_ascii_lowercase().ends_with(&suffix)
        && is_safe_file_name(tail)
    {
        return tail.to_string();
    }

    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("{}{suffix}", &digest[..8])
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

fn is_safe_file_name(name: &str) -> bool {
    !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Flat-directory cache in front of an HTTP transport.
///
/// A cached copy is served without touching the network; otherwise the
/// document is fetched with bounded retries and written to disk before it is
/// returned. Ordinary network faults never escape as errors.
pub struct DocumentCache {
    dir: PathBuf,
    client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    timeout_ms: u64,
    pacer: Option<RequestPacer>,
    stats: Arc<ScanStats>,
}

impl DocumentCache {
    pub fn new(dir: impl Into<PathBuf>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            dir: dir.into(),
            client,
            retry: RetryConfig::default(),
            timeout_ms: 30_000,
            pacer: None,
            stats: Arc::new(ScanStats::new()),
        }
    }

    /// Cache backed by reqwest, configured from `config`.
    pub fn from_config(config: &ScanConfig) -> Self {
        let client = Arc::new(ReqwestHttpClient::with_user_agent(&config.user_agent));
        Self::with_client_config(config, client)
    }

    pub fn with_client_config(config: &ScanConfig, client: Arc<dyn HttpClient>) -> Self {
        Self {
            retry: config.retry(),
            timeout_ms: config.timeout_ms,
            pacer: config.pacer(),
            ..Self::new(config.cache_dir.clone(), client)
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn with_stats(mut self, stats: Arc<ScanStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stats(&self) -> &Arc<ScanStats> {
        &self.stats
    }

    pub fn path_for(&self, url: &str, kind: DocumentKind) -> PathBuf {
        self.dir.join(cache_key(url, kind))
    }

    /// Fetch a document, returning `None` once every attempt has failed.
    ///
    /// `session` replaces the cache's own transport for this call, e.g. a
    /// client that already carries login cookies.
    pub async fn fetch(
        &self,
        url: &str,
        kind: DocumentKind,
        session: Option<&dyn HttpClient>,
    ) -> Option<Document> {
        self.fetch_entry(url, kind, session).await.document
    }

    /// Same as [`fetch`](Self::fetch) but also reports the cache entry.
    pub async fn fetch_entry(
        &self,
        url: &str,
        kind: DocumentKind,
        session: Option<&dyn HttpClient>,
    ) -> CachedDocument {
        let key = cache_key(url, kind);
        let path = self.dir.join(&key);

        if let Some(bytes) = read_cached(&path).await {
            debug!(url, path = %path.display(), "serving document from cache");
            self.stats.add_cache_hits(1);
            return CachedDocument {
                entry: CacheEntry {
                    url: url.to_string(),
                    key,
                    path,
                    byte_len: bytes.len(),
                    outcome: FetchOutcome::CacheHit,
                },
                document: Some(Document::from_bytes(kind, bytes)),
            };
        }

        let client = session.unwrap_or(self.client.as_ref());
        let (attempts, response) = self.download(client, url).await;

        let Some(response) = response else {
            warn!(url, attempts, "giving up on document");
            self.stats.add_fetch_failures(1);
            return CachedDocument {
                entry: CacheEntry {
                    url: url.to_string(),
                    key,
                    path,
                    byte_len: 0,
                    outcome: FetchOutcome::Failed { attempts },
                },
                document: None,
            };
        };

        if !kind.accepts(response.content_type.as_deref(), url) {
            warn!(
                url,
                content_type = response.content_type.as_deref().unwrap_or("<none>"),
                "unexpected content type for PDF document"
            );
        }

        if let Err(err) = write_atomically(&self.dir, &key, &response.body).await {
            warn!(url, path = %path.display(), error = %err, "failed to write cache entry");
        }

        info!(url, attempts, bytes = response.body.len(), "downloaded document");
        self.stats.add_documents_fetched(1);

        CachedDocument {
            entry: CacheEntry {
                url: url.to_string(),
                key,
                path,
                byte_len: response.body.len(),
                outcome: FetchOutcome::Downloaded { attempts },
            },
            document: Some(Document::from_bytes(kind, response.body)),
        }
    }

    /// Returns the number of attempts made and the successful response, if any.
    async fn download(&self, client: &dyn HttpClient, url: &str) -> (u32, Option<HttpResponse>) {
        let mut attempt = 0;

        loop {
            if let Some(pacer) = &self.pacer {
                pacer.wait().await;
            }

            let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
            let retryable = match client.execute(request).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    return (attempt + 1, Some(response));
                }
                Ok(response) if response.is_success() => {
                    warn!(url, attempt = attempt + 1, "empty response body");
                    true
                }
                Ok(response) => {
                    warn!(url, attempt = attempt + 1, status = response.status, "non-success status");
                    true
                }
                Err(err) => {
                    warn!(url, attempt = attempt + 1, error = %err, "request failed");
                    err.retryable()
                }
            };

            if !retryable || !self.retry.has_next(attempt) {
                return (attempt + 1, None);
            }

            let delay = self.retry.delay_for_attempt(attempt);
            debug!(url, delay_ms = delay.as_millis() as u64, "backing off before retry");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl std::fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("dir", &self.dir)
            .field("retry", &self.retry)
            .field("timeout_ms", &self.timeout_ms)
            .field("pacer", &self.pacer)
            .finish()
    }
}

/// Zero-length and unreadable files count as absent.
async fn read_cached(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => None,
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable cache entry");
            None
        }
    }
}

async fn write_atomically(dir: &Path, key: &str, body: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let temp = dir.join(format!(".{key}.{:08x}.tmp", fastrand::u32(..)));
    tokio::fs::write(&temp, body).await?;
    if let Err(err) = tokio::fs::rename(&temp, dir.join(key)).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(err);
    }
    Ok(())
}
