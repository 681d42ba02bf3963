//! Kakao Local API client and its error types.

use std::sync::Arc;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, ORIGIN, REFERER,
    USER_AGENT,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::http::{GetRequest, RawResponse, ReqwestTransport, Transport};
use crate::model::{
    AddressResponse, AddressSearch, CategorySearch, KeywordSearch, LocationSearchResponse,
    PlaceDetailResponse, Validate,
};

const PLACE_ORIGIN: &str = "https://place.map.kakao.com";
const PLACE_REFERER: &str = "https://place.map.kakao.com/";
const PLACE_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Errors that can occur during client operations.
///
/// The first four variants are keyed by HTTP status; match on the variant,
/// not on the message.
#[derive(Error, Debug)]
pub enum ClientError {
    /// 400: malformed query parameters.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401, or no credential configured.
    #[error("Auth error: {0}")]
    Auth(String),

    /// 420: request quota exceeded.
    #[error("Rate limited: {0}")]
    RateLimit(String),

    /// Any other non-200 status.
    #[error("Unexpected error [status_code={status}, error={message}]")]
    Unexpected { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A 200 body that does not match the response schema.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A 200 body that parsed but breaks a response invariant.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Maps a non-200 status to its error kind. Returns `None` for 200.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        match status.as_u16() {
            200 => None,
            400 => Some(ClientError::BadRequest(message)),
            401 => Some(ClientError::Auth(message)),
            420 => Some(ClientError::RateLimit(message)),
            status => Some(ClientError::Unexpected { status, message }),
        }
    }
}

/// Error body returned by the search API.
#[derive(Debug, Deserialize)]
struct KakaoErrorResponse {
    #[serde(rename = "errorType")]
    error_type: Option<String>,
    message: String,
}

/// Client for the Kakao Local search API and the place detail service.
///
/// Every operation issues exactly one GET through the configured
/// [`Transport`]; nothing is cached or retried.
#[derive(Clone)]
pub struct LocalClient {
    auth_header: HeaderValue,
    extra_headers: HeaderMap,
    api_base: String,
    place_api_base: String,
    transport: Arc<dyn Transport>,
}

impl LocalClient {
    /// Creates a client that talks HTTP through reqwest.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let transport = Arc::new(ReqwestTransport::new(config.transport.clone()));
        Self::with_transport(config, transport)
    }

    /// Reads [`Config::from_env`] and creates a client from it.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&Config::from_env()?)
    }

    /// Creates a client over a custom [`Transport`].
    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        if config.rest_api_key.trim().is_empty() {
            return Err(ClientError::Auth("missing REST API key".to_string()));
        }
        let auth_header = HeaderValue::from_str(&format!("KakaoAK {}", config.rest_api_key))
            .map_err(|_| ClientError::Config("Invalid API key".to_string()))?;

        let mut extra_headers = HeaderMap::new();
        for (key, value) in &config.transport.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ClientError::Config(format!("invalid header name {key:?}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::Config(format!("invalid value for header {key:?}")))?;
            extra_headers.insert(name, value);
        }

        Ok(Self {
            auth_header,
            extra_headers,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            place_api_base: config.place_api_base.trim_end_matches('/').to_string(),
            transport,
        })
    }

    /// Geocodes an address (`GET /search/address`).
    pub async fn find_coordinates(
        &self,
        search: &AddressSearch,
    ) -> Result<AddressResponse, ClientError> {
        let request = self
            .search_request("/search/address")
            .query("query", &search.address)
            .query("page", search.page)
            .query("size", search.size);

        self.fetch(request).await
    }

    /// Searches places by keyword (`GET /search/keyword`).
    pub async fn search_by_keyword(
        &self,
        search: &KeywordSearch,
    ) -> Result<LocationSearchResponse, ClientError> {
        let center = search.center.as_ref();
        let request = self
            .search_request("/search/keyword")
            .query("query", &search.keyword)
            .query_opt("category_group_code", search.category_group_code)
            .query_opt("x", center.map(|c| &c.longitude))
            .query_opt("y", center.map(|c| &c.latitude))
            .query_opt("radius", search.radius.filter(|r| *r > 0))
            .query("page", search.page)
            .query("size", search.size)
            .query("sort", search.sort.as_str());

        let response: LocationSearchResponse = self.fetch(request).await?;
        response.validate_distance(center.is_some())?;
        Ok(response)
    }

    /// Searches places in a category around a center (`GET /search/category`).
    pub async fn search_by_category(
        &self,
        search: &CategorySearch,
    ) -> Result<LocationSearchResponse, ClientError> {
        let request = self
            .search_request("/search/category")
            .query("category_group_code", search.category_group_code)
            .query("x", &search.center.longitude)
            .query("y", &search.center.latitude)
            .query("radius", search.radius)
            .query("page", search.page)
            .query("size", search.size)
            .query("sort", search.sort.as_str());

        self.fetch(request).await
    }

    /// Fetches the place panel for `place_id` from the place detail service.
    pub async fn get_place_details(
        &self,
        place_id: u64,
    ) -> Result<PlaceDetailResponse, ClientError> {
        self.fetch(self.place_request(place_id)).await
    }

    /// Request against the credentialed search API, carrying any extra
    /// headers from [`TransportOptions`](crate::config::TransportOptions).
    pub fn search_request(&self, path: &str) -> GetRequest {
        let mut headers = self.extra_headers.clone();
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        GetRequest::new(format!("{}{}", self.api_base, path)).headers(headers)
    }

    /// Request against the place detail service. It takes no API key and
    /// expects the headers a browser on place.map.kakao.com would send.
    pub fn place_request(&self, place_id: u64) -> GetRequest {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
        headers.insert(ORIGIN, HeaderValue::from_static(PLACE_ORIGIN));
        headers.insert(REFERER, HeaderValue::from_static(PLACE_REFERER));
        headers.insert(HeaderName::from_static("pf"), HeaderValue::from_static("web"));
        headers.insert(USER_AGENT, HeaderValue::from_static(PLACE_USER_AGENT));

        GetRequest::new(format!("{}/{}", self.place_api_base, place_id)).headers(headers)
    }

    async fn fetch<T>(&self, request: GetRequest) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Validate,
    {
        let url = request.url.clone();
        let response = self.transport.get(request).await?;

        if let Some(err) = Self::handle_response_status(&response) {
            tracing::debug!(%url, status = %response.status, "API request failed: {}", err);
            return Err(err);
        }

        let parsed: T = serde_json::from_str(&response.body)?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn handle_response_status(response: &RawResponse) -> Option<ClientError> {
        if response.status == StatusCode::OK {
            return None;
        }

        let message = match serde_json::from_str::<KakaoErrorResponse>(&response.body) {
            Ok(KakaoErrorResponse {
                error_type: Some(error_type),
                message,
            }) => format!("{}: {}", error_type, message),
            Ok(KakaoErrorResponse { message, .. }) => message,
            Err(_) if !response.body.trim().is_empty() => response.body.trim().to_string(),
            Err(_) => response
                .status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
        };

        ClientError::from_status(response.status, message)
    }
}
