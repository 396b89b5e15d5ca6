//! Remote transport and address resolution
//!
//! The transport is injected behind [`HttpTransport`] so the sync engine can
//! be exercised without a network. [`ReqwestTransport`] is the production
//! implementation.

use crate::settings::{Preferences, REMOTE_URL_PREFERENCE};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal GET capability used by the sync engine
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch `url`, bypassing any response cache.
    ///
    /// `Err` carries a description of a transport-level failure; any HTTP
    /// status, including errors, is returned as `Ok`.
    async fn get(&self, url: &Url) -> Result<HttpResponse, String>;
}

/// reqwest-backed transport with a bounded timeout and no response caching
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> crate::error::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("estech-loader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| crate::error::LoaderError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| e.to_string())?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Where the remote document is fetched from
///
/// The override preference is consulted on every call to [`resolve`](Self::resolve),
/// so an administrator can repoint the loader without a restart.
#[derive(Clone)]
pub struct RemoteAddress {
    default_url: Url,
    preferences: Arc<dyn Preferences>,
}

impl RemoteAddress {
    pub fn new(default_url: Url, preferences: Arc<dyn Preferences>) -> Self {
        Self {
            default_url,
            preferences,
        }
    }

    /// The override address if present and well-formed, else the default
    pub fn resolve(&self) -> Url {
        match self.preferences.string(REMOTE_URL_PREFERENCE) {
            Some(raw) => match parse_remote_url(&raw) {
                Some(url) => url,
                None => {
                    tracing::warn!(
                        "Ignoring malformed {} override {:?}; using default",
                        REMOTE_URL_PREFERENCE,
                        raw
                    );
                    self.default_url.clone()
                }
            },
            None => self.default_url.clone(),
        }
    }
}

/// Parse an absolute http(s) URL, rejecting anything else
pub fn parse_remote_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{StaticPreferences, DEFAULT_REMOTE_URL};
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn address(override_url: Option<&str>) -> RemoteAddress {
        RemoteAddress::new(
            Url::parse(DEFAULT_REMOTE_URL).unwrap(),
            Arc::new(StaticPreferences::new(override_url.map(str::to_string))),
        )
    }

    #[test]
    fn test_default_when_no_override() {
        assert_eq!(address(None).resolve().as_str(), DEFAULT_REMOTE_URL);
    }

    #[test]
    fn test_well_formed_override_wins() {
        let url = address(Some("https://lab.example.org/loader.json")).resolve();
        assert_eq!(url.as_str(), "https://lab.example.org/loader.json");
    }

    #[test]
    fn test_malformed_override_falls_back() {
        assert_eq!(address(Some("not a url")).resolve().as_str(), DEFAULT_REMOTE_URL);
        assert_eq!(address(Some("")).resolve().as_str(), DEFAULT_REMOTE_URL);
        assert_eq!(
            address(Some("file:///etc/passwd")).resolve().as_str(),
            DEFAULT_REMOTE_URL
        );
    }

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse { status: 204, body: vec![] };
        let missing = HttpResponse { status: 404, body: b"nope".to_vec() };
        assert!(ok.is_success());
        assert!(!missing.is_success());
    }

    /// Accept one connection on a loopback port and return the lowercased
    /// request head. Replies with `reply`, or holds the connection open
    /// without answering when it is `None`.
    async fn serve_once(reply: Option<&'static str>) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url = Url::parse(&format!("http://{addr}/loader-config.json")).unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            match reply {
                Some(reply) => socket.write_all(reply.as_bytes()).await.unwrap(),
                None => tokio::time::sleep(Duration::from_secs(30)).await,
            }
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (url, server)
    }

    #[tokio::test]
    async fn test_reqwest_returns_error_status_as_response() {
        let (url, server) = serve_once(Some(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 9\r\nconnection: close\r\n\r\nnot found",
        ))
        .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport.get(&url).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, b"not found");

        let request = server.await.unwrap();
        assert!(request.starts_with("get /loader-config.json"));
        assert!(request.contains("cache-control: no-cache"));
        assert!(request.contains("pragma: no-cache"));
    }

    #[tokio::test]
    async fn test_reqwest_gives_up_after_timeout() {
        let (url, _server) = serve_once(None).await;

        let transport = ReqwestTransport::new(Duration::from_millis(300)).unwrap();
        let started = Instant::now();
        let result = tokio::time::timeout(Duration::from_secs(5), transport.get(&url))
            .await
            .expect("request outlived its timeout");

        assert!(result.is_err());
        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
