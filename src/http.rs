//! HTTP plumbing: the transport seam used by [`LocalClient`](crate::client::LocalClient)
//! and its reqwest implementation.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

use crate::client::ClientError;
use crate::config::TransportOptions;

/// A GET request: URL, ordered query pairs and headers.
///
/// Query keys are only ever added, never cleared, so a key that was not
/// pushed is absent from the outgoing query string.
#[derive(Debug, Clone)]
pub struct GetRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
}

impl GetRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
        }
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds `key` only when `value` is `Some`.
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Value of the first query pair named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_query(&self, key: &str) -> bool {
        self.query.iter().any(|(k, _)| k == key)
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Performs one GET and hands back status + body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: GetRequest) -> Result<RawResponse, ClientError>;
}

/// [`Transport`] backed by reqwest. A new `reqwest::Client` is built for
/// every call and dropped when the call returns, so no connection outlives it.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    options: TransportOptions,
}

impl ReqwestTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: GetRequest) -> Result<RawResponse, ClientError> {
        let http_client = build_http_client(&self.options)?;

        tracing::debug!(url = %request.url, query = ?request.query, "API request");

        let response = http_client
            .get(&request.url)
            .query(&request.query)
            .headers(request.headers)
            .send()
            .await?;
        let status = response.status();
        let body = response.text_logged().await?;

        Ok(RawResponse { status, body })
    }
}

/// Build a configured HTTP client from transport options.
pub fn build_http_client(options: &TransportOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(t) = options.timeout {
        builder = builder.timeout(t);
    }
    if let Some(proxy_url) = &options.proxy {
        match reqwest::Proxy::all(proxy_url) {
            Ok(p) => builder = builder.proxy(p),
            Err(e) => tracing::warn!("ignoring invalid proxy {}: {}", proxy_url, e),
        }
    }

    builder.build()
}

/// Extension trait for Response that logs response body.
#[async_trait]
pub trait ResponseExt {
    /// Get response text and log it. Consumes the response.
    async fn text_logged(self) -> Result<String, reqwest::Error>;
}

#[async_trait]
impl ResponseExt for reqwest::Response {
    async fn text_logged(self) -> Result<String, reqwest::Error> {
        let status = self.status();
        let text = self.text().await?;
        tracing::debug!("API response {} ({} bytes):\n{}", status, text.len(), text);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_opt_skips_none() {
        let req = GetRequest::new("http://localhost/search")
            .query("query", "coffee")
            .query_opt::<u32>("radius", None)
            .query_opt("page", Some(2));

        assert_eq!(req.query_value("query"), Some("coffee"));
        assert_eq!(req.query_value("page"), Some("2"));
        assert!(!req.has_query("radius"));
        assert_eq!(req.query.len(), 2);
    }
}
