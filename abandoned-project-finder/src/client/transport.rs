//! HTTP transport used by [`GitHubClient`](super::GitHubClient).

use crate::rate_limit::RateLimitInfo;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// A raw API response: status, quota headers and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed `x-ratelimit-*` headers, when present.
    pub rate_limit: Option<RateLimitInfo>,
    /// `retry-after` header in seconds, sent with secondary rate limits.
    pub retry_after: Option<u64>,
    /// Response body.
    pub body: String,
}

/// The request never produced a response.
#[derive(Debug, Clone, Error)]
#[error("Request to {url} failed: {message}")]
pub struct TransportError {
    /// Requested URL.
    pub url: String,
    /// Underlying failure.
    pub message: String,
}

/// Performs GET requests against the GitHub API.
///
/// Implementations must return every status code as an [`ApiResponse`];
/// classification happens in the client.
pub trait Transport: Send + Sync {
    /// Sends a GET request to `url`.
    fn get(&self, url: &Url) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn get(&self, url: &Url) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        self.as_ref().get(url)
    }
}

/// Production transport backed by octocrab.
#[derive(Debug, Clone)]
pub struct OctocrabTransport {
    octocrab: Octocrab,
}

impl OctocrabTransport {
    /// Builds an octocrab client, authenticated when a token is given.
    ///
    /// octocrab's own retry layer is disabled; [`RetryPolicy`](super::RetryPolicy)
    /// is the only place requests are repeated.
    ///
    /// # Errors
    ///
    /// Returns an error if octocrab fails to initialize.
    pub fn new(token: Option<&str>) -> Result<Self, octocrab::Error> {
        let builder = Octocrab::builder().add_retry_config(RetryConfig::None);
        let octocrab = match token {
            Some(token) => builder.personal_token(token.to_string()).build()?,
            None => builder.build()?,
        };
        Ok(Self { octocrab })
    }
}

impl Transport for OctocrabTransport {
    async fn get(&self, url: &Url) -> Result<ApiResponse, TransportError> {
        let failed = |e: octocrab::Error| TransportError {
            url: url.to_string(),
            message: e.to_string(),
        };

        // `_get` hands back the raw response for every status, which keeps
        // the quota headers of error responses visible.
        let response = self.octocrab._get(url.as_str()).await.map_err(failed)?;
        let status = response.status().as_u16();

        let (rate_limit, retry_after) = {
            let headers = response.headers();
            let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
            (
                RateLimitInfo::from_headers(
                    header("x-ratelimit-remaining"),
                    header("x-ratelimit-limit"),
                    header("x-ratelimit-reset"),
                    header("x-ratelimit-resource"),
                ),
                header("retry-after").and_then(|v| v.trim().parse().ok()),
            )
        };

        let body = self
            .octocrab
            .body_to_string(response)
            .await
            .map_err(failed)?;

        Ok(ApiResponse {
            status,
            rate_limit,
            retry_after,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves `status` on every connection and counts connections.
    async fn serve(status: &'static str) -> (Url, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let body = r#"{"message":"upstream failed"}"#;
                    let response = format!(
                        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        let url = Url::parse(&format!("http://{addr}/repos/acme/widgets/commits")).unwrap();
        (url, hits)
    }

    #[tokio::test]
    async fn server_errors_are_returned_after_one_request() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let (url, hits) = serve("502 Bad Gateway").await;

        let transport = OctocrabTransport::new(None).unwrap();
        let response = transport.get(&url).await.unwrap();

        assert_eq!(response.status, 502);
        assert!(response.body.contains("upstream failed"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn secondary_rate_limits_are_returned_after_one_request() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let (url, hits) = serve("429 Too Many Requests").await;

        let transport = OctocrabTransport::new(Some("token")).unwrap();
        let response = transport.get(&url).await.unwrap();

        assert_eq!(response.status, 429);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
