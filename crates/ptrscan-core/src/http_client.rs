//! Transport seam for document downloads.
//!
//! The cache only sees [`HttpClient`]. Plain downloads go through
//! [`ReqwestHttpClient`]; filings behind a login (the Senate eFD portal)
//! go through a [`SessionClient`] carrying the caller's credentials.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

const DEFAULT_USER_AGENT: &str = concat!("ptrscan/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Credential stamped onto every request of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAuth {
    /// Raw `Cookie` header value, e.g. `sessionid=...; csrftoken=...`.
    Cookie(String),
    /// Any other header the portal checks.
    Header { name: String, value: String },
}

impl SessionAuth {
    fn header(&self) -> (String, String) {
        match self {
            Self::Cookie(cookie) => (String::from("cookie"), cookie.clone()),
            Self::Header { name, value } => (name.to_ascii_lowercase(), value.clone()),
        }
    }
}

/// Document GET handed to a transport. Header names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Raw response: status, declared content type and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: Option<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Transport failure before a status code was received, or while reading the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("request failed: {0}")]
    Other(String),
}

impl HttpError {
    /// A malformed request fails the same way every time.
    pub const fn retryable(&self) -> bool {
        !matches!(self, Self::InvalidRequest(_))
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            Self::Timeout(message)
        } else if err.is_connect() {
            Self::Connect(message)
        } else if err.is_builder() {
            Self::InvalidRequest(message)
        } else if err.is_body() || err.is_decode() {
            Self::Body(message)
        } else {
            Self::Other(message)
        }
    }
}

/// Transport contract used by the document cache.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Production transport over reqwest with a cookie store.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Falls back to reqwest's defaults if the builder rejects the agent string.
    pub fn with_user_agent(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()
            .unwrap_or_default();
        Self::with_client(client)
    }

    /// Wrap a client that already holds a login session.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let builder = request.headers.iter().fold(
                self.client
                    .get(&request.url)
                    .timeout(Duration::from_millis(request.timeout_ms)),
                |builder, (name, value)| builder.header(name, value),
            );

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response.bytes().await?.to_vec();

            Ok(HttpResponse::new(status, content_type, body))
        })
    }
}

/// Pre-authenticated session: stamps its credentials onto every request and
/// delegates to an inner transport.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<dyn HttpClient>,
    credentials: Vec<SessionAuth>,
}

impl SessionClient {
    pub fn new(inner: Arc<dyn HttpClient>) -> Self {
        Self {
            inner,
            credentials: Vec::new(),
        }
    }

    pub fn with_auth(mut self, auth: SessionAuth) -> Self {
        self.credentials.push(auth);
        self
    }

    pub fn credentials(&self) -> &[SessionAuth] {
        &self.credentials
    }
}

impl HttpClient for SessionClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let request = self
            .credentials
            .iter()
            .map(SessionAuth::header)
            .fold(request, |request, (name, value)| request.with_header(name, value));
        self.inner.execute(request)
    }
}
