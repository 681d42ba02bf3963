//! Tool adapter: argument validation and the uniform success/failure result
//! handed back to the MCP host.
//!
//! Every tool returns a [`ToolOutcome`]. Validation errors, client errors and
//! panics inside a call all end up as [`ToolOutcome::Failure`]; nothing
//! propagates to the caller as an `Err`.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::client::{ClientError, LocalClient};
use crate::model::{
    AddressResponse, AddressSearch, CategoryGroupCode, CategorySearch, Coordinate, KeywordSearch,
    LocationSearchResponse, PlaceDetailResponse,
};

/// Error type for tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0} must not be empty")]
    EmptyArgument(&'static str),

    #[error("{field} must be greater than or equal to {min}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        value: i64,
    },

    #[error("{field} is too large, got {value}")]
    TooLarge { field: &'static str, value: i64 },

    #[error("center_coordinate and radius_from_center must be given together")]
    CenterRadiusMismatch,

    #[error("No coordinates found. Check if the address is correct.")]
    NoCoordinatesFound,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Failure half of a [`ToolOutcome`]; always serializes with `"success": false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolFailure {
    success: bool,
    pub error: String,
}

impl ToolFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Result of a tool call. The success variant serializes as the response
/// itself, the failure variant as `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutcome<T> {
    Success(T),
    Failure(ToolFailure),
}

impl<T> ToolOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            ToolOutcome::Success(value) => Some(value),
            ToolOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ToolOutcome::Success(_) => None,
            ToolOutcome::Failure(failure) => Some(&failure.error),
        }
    }
}

impl<T: Serialize> ToolOutcome<T> {
    /// JSON text returned to the host as the tool's content.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "error": e.to_string() }).to_string()
        })
    }
}

impl<T> From<Result<T, ToolError>> for ToolOutcome<T> {
    fn from(result: Result<T, ToolError>) -> Self {
        match result {
            Ok(value) => ToolOutcome::Success(value),
            Err(e) => ToolOutcome::Failure(ToolFailure::new(e.to_string())),
        }
    }
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct FindCoordinatesArgs {
    #[schemars(description = "address to search for", length(min = 1))]
    pub address: String,
    #[serde(default = "default_page")]
    #[schemars(description = "page number of result", range(min = 1))]
    pub page: i64,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SearchByKeywordArgs {
    #[schemars(description = "keyword used to search for places", length(min = 1))]
    pub keyword: String,
    #[serde(default)]
    #[schemars(
        description = "category used for filtering results (CategoryGroupCode resource)"
    )]
    pub category_group_code: Option<CategoryGroupCode>,
    #[serde(default)]
    #[schemars(description = "longitude and latitude of a center")]
    pub center_coordinate: Option<Coordinate>,
    #[serde(default)]
    #[schemars(description = "search radius from the center in meters", range(min = 1))]
    pub radius_from_center: Option<i64>,
    #[serde(default = "default_page")]
    #[schemars(description = "page number of result", range(min = 1))]
    pub page: i64,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SearchByCategoryArgs {
    #[schemars(description = "category used to search for places (CategoryGroupCode resource)")]
    pub category_group_code: CategoryGroupCode,
    #[schemars(description = "longitude and latitude of a center")]
    pub center_coordinate: Coordinate,
    #[schemars(description = "search radius from the center in meters", range(min = 1))]
    pub radius_from_center: i64,
    #[serde(default = "default_page")]
    #[schemars(description = "page number of result", range(min = 1))]
    pub page: i64,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetPlaceArgs {
    #[schemars(
        description = "ID of a place, which is document ID in location search results",
        range(min = 1)
    )]
    pub place_id: i64,
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ToolError> {
    if value.is_empty() {
        return Err(ToolError::EmptyArgument(field));
    }
    Ok(())
}

fn at_least<T: TryFrom<i64>>(field: &'static str, value: i64, min: i64) -> Result<T, ToolError> {
    if value < min {
        return Err(ToolError::OutOfRange { field, min, value });
    }
    T::try_from(value).map_err(|_| ToolError::TooLarge { field, value })
}

impl FindCoordinatesArgs {
    pub fn into_search(self) -> Result<AddressSearch, ToolError> {
        non_empty("address", &self.address)?;
        let page = at_least("page", self.page, 1)?;
        Ok(AddressSearch::new(self.address).with_page(page))
    }
}

impl SearchByKeywordArgs {
    /// Checks arguments, including that center and radius come as a pair.
    pub fn into_search(self) -> Result<KeywordSearch, ToolError> {
        non_empty("keyword", &self.keyword)?;
        let page = at_least("page", self.page, 1)?;

        let mut search = KeywordSearch::new(self.keyword).with_page(page);
        if let Some(code) = self.category_group_code {
            search = search.with_category(code);
        }
        match (self.center_coordinate, self.radius_from_center) {
            (Some(center), Some(radius)) => {
                let radius = at_least("radius_from_center", radius, 1)?;
                search = search.with_center(center, radius);
            }
            (None, None) => {}
            _ => return Err(ToolError::CenterRadiusMismatch),
        }
        Ok(search)
    }
}

impl SearchByCategoryArgs {
    pub fn into_search(self) -> Result<CategorySearch, ToolError> {
        let radius = at_least("radius_from_center", self.radius_from_center, 1)?;
        let page = at_least("page", self.page, 1)?;
        Ok(
            CategorySearch::new(self.category_group_code, self.center_coordinate, radius)
                .with_page(page),
        )
    }
}

impl GetPlaceArgs {
    pub fn place_id(&self) -> Result<u64, ToolError> {
        at_least("place_id", self.place_id, 1)
    }
}

/// The four location tools over a [`LocalClient`].
#[derive(Clone)]
pub struct LocationTools {
    client: LocalClient,
}

impl LocationTools {
    pub fn new(client: LocalClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &LocalClient {
        &self.client
    }

    /// Finds coordinates of an address. A successful call with no documents
    /// is reported as a failure.
    pub async fn find_coordinates(&self, args: FindCoordinatesArgs) -> ToolOutcome<AddressResponse> {
        run("find_coordinates", self.try_find_coordinates(args)).await
    }

    pub async fn search_by_keyword(
        &self,
        args: SearchByKeywordArgs,
    ) -> ToolOutcome<LocationSearchResponse> {
        run("search_by_keyword", self.try_search_by_keyword(args)).await
    }

    pub async fn search_by_category(
        &self,
        args: SearchByCategoryArgs,
    ) -> ToolOutcome<LocationSearchResponse> {
        run("search_by_category", self.try_search_by_category(args)).await
    }

    pub async fn get_place(&self, args: GetPlaceArgs) -> ToolOutcome<PlaceDetailResponse> {
        run("get_place", self.try_get_place(args)).await
    }

    async fn try_find_coordinates(
        &self,
        args: FindCoordinatesArgs,
    ) -> Result<AddressResponse, ToolError> {
        let search = args.into_search()?;
        let response = self.client.find_coordinates(&search).await?;
        if response.documents.is_empty() {
            return Err(ToolError::NoCoordinatesFound);
        }
        Ok(response)
    }

    async fn try_search_by_keyword(
        &self,
        args: SearchByKeywordArgs,
    ) -> Result<LocationSearchResponse, ToolError> {
        let search = args.into_search()?;
        Ok(self.client.search_by_keyword(&search).await?)
    }

    async fn try_search_by_category(
        &self,
        args: SearchByCategoryArgs,
    ) -> Result<LocationSearchResponse, ToolError> {
        let search = args.into_search()?;
        Ok(self.client.search_by_category(&search).await?)
    }

    async fn try_get_place(&self, args: GetPlaceArgs) -> Result<PlaceDetailResponse, ToolError> {
        let place_id = args.place_id()?;
        Ok(self.client.get_place_details(place_id).await?)
    }
}

/// Runs one tool call inside its own span and turns every failure,
/// panics included, into a [`ToolOutcome::Failure`].
async fn run<T, F>(tool: &'static str, call: F) -> ToolOutcome<T>
where
    F: Future<Output = Result<T, ToolError>>,
{
    let span = tracing::info_span!("tool_call", tool, request_id = %Uuid::new_v4());

    async move {
        let outcome = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => ToolOutcome::from(result),
            Err(panic) => ToolOutcome::Failure(ToolFailure::new(format!(
                "Internal error: {}",
                panic_message(&*panic)
            ))),
        };

        match outcome.error() {
            Some(error) => tracing::warn!("tool call failed: {}", error),
            None => tracing::info!("tool call succeeded"),
        }
        outcome
    }
    .instrument(span)
    .await
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("tool panicked")
}
