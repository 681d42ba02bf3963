//! Request and response types for the Kakao Local API.
//!
//! Response types mirror the upstream JSON one-to-one and are validated on
//! ingest (see [`Validate`]). Coordinates stay as decimal strings so that the
//! precision the service returns is never rounded through `f64`.

use std::fmt;
use std::str::FromStr;

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, skip_serializing_none, NoneAsEmptyString};

use crate::client::ClientError;

/// Upper bound the service puts on `meta.pageable_count`.
pub const MAX_PAGEABLE_COUNT: u32 = 45;

/// Longitude/latitude pair in the service's decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Coordinate {
    /// Longitude (x), e.g. "126.9784147".
    #[schemars(description = "longitude (x) as a decimal string")]
    pub longitude: String,
    /// Latitude (y), e.g. "37.5666805".
    #[schemars(description = "latitude (y) as a decimal string")]
    pub latitude: String,
}

impl Coordinate {
    pub fn new(longitude: impl Into<String>, latitude: impl Into<String>) -> Self {
        Self {
            longitude: longitude.into(),
            latitude: latitude.into(),
        }
    }
}

/// Sort order for place searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSortOption {
    Distance,
    #[default]
    Accuracy,
}

impl LocationSortOption {
    /// Value sent in the `sort` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            LocationSortOption::Distance => "distance",
            LocationSortOption::Accuracy => "accuracy",
        }
    }
}

/// Category group codes understood by the service.
///
/// The code (variant name) is what goes on the wire; [`description`](Self::description)
/// is reference text only and is never parsed back into a code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
pub enum CategoryGroupCode {
    MT1,
    CS2,
    PS3,
    SC4,
    AC5,
    PK6,
    OL7,
    SW8,
    BK9,
    CT1,
    AG2,
    PO3,
    AT4,
    AD5,
    FD6,
    CE7,
    HP8,
    PM9,
}

impl CategoryGroupCode {
    pub const ALL: [CategoryGroupCode; 18] = [
        CategoryGroupCode::MT1,
        CategoryGroupCode::CS2,
        CategoryGroupCode::PS3,
        CategoryGroupCode::SC4,
        CategoryGroupCode::AC5,
        CategoryGroupCode::PK6,
        CategoryGroupCode::OL7,
        CategoryGroupCode::SW8,
        CategoryGroupCode::BK9,
        CategoryGroupCode::CT1,
        CategoryGroupCode::AG2,
        CategoryGroupCode::PO3,
        CategoryGroupCode::AT4,
        CategoryGroupCode::AD5,
        CategoryGroupCode::FD6,
        CategoryGroupCode::CE7,
        CategoryGroupCode::HP8,
        CategoryGroupCode::PM9,
    ];

    pub fn code(self) -> &'static str {
        match self {
            CategoryGroupCode::MT1 => "MT1",
            CategoryGroupCode::CS2 => "CS2",
            CategoryGroupCode::PS3 => "PS3",
            CategoryGroupCode::SC4 => "SC4",
            CategoryGroupCode::AC5 => "AC5",
            CategoryGroupCode::PK6 => "PK6",
            CategoryGroupCode::OL7 => "OL7",
            CategoryGroupCode::SW8 => "SW8",
            CategoryGroupCode::BK9 => "BK9",
            CategoryGroupCode::CT1 => "CT1",
            CategoryGroupCode::AG2 => "AG2",
            CategoryGroupCode::PO3 => "PO3",
            CategoryGroupCode::AT4 => "AT4",
            CategoryGroupCode::AD5 => "AD5",
            CategoryGroupCode::FD6 => "FD6",
            CategoryGroupCode::CE7 => "CE7",
            CategoryGroupCode::HP8 => "HP8",
            CategoryGroupCode::PM9 => "PM9",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CategoryGroupCode::MT1 => "대형마트 (Large Mart, Grocery Store)",
            CategoryGroupCode::CS2 => "편의점 (Convenience Store)",
            CategoryGroupCode::PS3 => "어린이집, 유치원 (Daycare, Kindergarten)",
            CategoryGroupCode::SC4 => "학교 (School)",
            CategoryGroupCode::AC5 => "학원 (Academy/Private Institute)",
            CategoryGroupCode::PK6 => "주차장 (Parking Lot)",
            CategoryGroupCode::OL7 => "주유소, 충전소 (Gas Station, Charging Station)",
            CategoryGroupCode::SW8 => "지하철역 (Subway Station)",
            CategoryGroupCode::BK9 => "은행 (Bank)",
            CategoryGroupCode::CT1 => "문화시설 (Cultural Facility)",
            CategoryGroupCode::AG2 => "중개업소 (Agency, e.g. Real Estate)",
            CategoryGroupCode::PO3 => "공공기관 (Public Institution)",
            CategoryGroupCode::AT4 => "관광명소 (Tourist Attraction)",
            CategoryGroupCode::AD5 => "숙박 (Accommodation)",
            CategoryGroupCode::FD6 => "음식점 (Restaurant)",
            CategoryGroupCode::CE7 => "카페 (Cafe)",
            CategoryGroupCode::HP8 => "병원 (Hospital)",
            CategoryGroupCode::PM9 => "약국 (Pharmacy)",
        }
    }

    /// Every code mapped to its description, as served by the
    /// `resource://category_group_code` resource.
    pub fn reference_table() -> Map<String, Value> {
        Self::ALL
            .iter()
            .map(|c| (c.code().to_string(), Value::String(c.description().to_string())))
            .collect()
    }
}

impl fmt::Display for CategoryGroupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CategoryGroupCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == s)
            .ok_or_else(|| format!("unknown category group code: {s}"))
    }
}

// --- Requests ---

/// Parameters for `GET /search/address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSearch {
    pub address: String,
    pub page: u32,
    pub size: u32,
}

impl AddressSearch {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            page: 1,
            size: 10,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

/// Parameters for `GET /search/keyword`. Unset filters are left out of the
/// query string entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSearch {
    pub keyword: String,
    pub category_group_code: Option<CategoryGroupCode>,
    pub center: Option<Coordinate>,
    pub radius: Option<u32>,
    pub page: u32,
    pub size: u32,
    pub sort: LocationSortOption,
}

impl KeywordSearch {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            category_group_code: None,
            center: None,
            radius: None,
            page: 1,
            size: 10,
            sort: LocationSortOption::default(),
        }
    }

    pub fn with_category(mut self, code: CategoryGroupCode) -> Self {
        self.category_group_code = Some(code);
        self
    }

    /// Restrict results to `radius` meters around `center`.
    pub fn with_center(mut self, center: Coordinate, radius: u32) -> Self {
        self.center = Some(center);
        self.radius = Some(radius);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_sort(mut self, sort: LocationSortOption) -> Self {
        self.sort = sort;
        self
    }
}

/// Parameters for `GET /search/category`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySearch {
    pub category_group_code: CategoryGroupCode,
    pub center: Coordinate,
    pub radius: u32,
    pub page: u32,
    pub size: u32,
    pub sort: LocationSortOption,
}

impl CategorySearch {
    pub fn new(category_group_code: CategoryGroupCode, center: Coordinate, radius: u32) -> Self {
        Self {
            category_group_code,
            center,
            radius,
            page: 1,
            size: 10,
            sort: LocationSortOption::default(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_sort(mut self, sort: LocationSortOption) -> Self {
        self.sort = sort;
        self
    }
}

// --- Responses ---

/// Region/keyword split of a keyword query that mentioned a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SameName {
    /// Regions recognised in the query.
    pub region: Vec<String>,
    /// The query with region terms removed.
    pub keyword: String,
    /// Region actually used for the search.
    pub selected_region: String,
}

/// Paging metadata attached to every search response.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub total_count: u64,
    pub pageable_count: u32,
    /// `true` when this is the last page.
    pub is_end: bool,
    #[serde(default)]
    pub same_name: Option<SameName>,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDocument {
    pub id: String,
    pub place_name: String,
    pub category_name: String,
    pub category_group_code: String,
    pub category_group_name: String,
    pub phone: String,
    /// Lot-number (jibun) address.
    pub address_name: String,
    pub road_address_name: String,
    pub x: String,
    pub y: String,
    pub place_url: String,
    /// Meters from the requested center. The service sends `""` when no
    /// center was given; that arrives here as `None`.
    #[serde(default)]
    #[serde_as(deserialize_as = "NoneAsEmptyString")]
    pub distance: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressType {
    Region,
    Road,
    RegionAddr,
    RoadAddr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressDocument {
    pub address_name: String,
    pub address_type: AddressType,
    pub x: String,
    pub y: String,
    /// Lot-number address breakdown, passed through untouched.
    #[serde(default)]
    pub address: Option<Map<String, Value>>,
    /// Road address breakdown, passed through untouched.
    #[serde(default)]
    pub road_address: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSearchResponse {
    pub meta: Meta,
    pub documents: Vec<PlaceDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressResponse {
    pub meta: Meta,
    pub documents: Vec<AddressDocument>,
}

/// Place panel payload from the place detail service. Only required to be a
/// JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceDetailResponse(pub Map<String, Value>);

impl PlaceDetailResponse {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Invariant checks run on a freshly parsed response body.
pub trait Validate {
    fn validate(&self) -> Result<(), ClientError>;
}

impl Meta {
    fn validate_page(&self, documents: usize) -> Result<(), ClientError> {
        if self.pageable_count > MAX_PAGEABLE_COUNT {
            return Err(ClientError::InvalidResponse(format!(
                "pageable_count {} exceeds {MAX_PAGEABLE_COUNT}",
                self.pageable_count
            )));
        }
        if documents as u64 > u64::from(self.pageable_count) {
            return Err(ClientError::InvalidResponse(format!(
                "{documents} documents returned but pageable_count is {}",
                self.pageable_count
            )));
        }
        Ok(())
    }
}

impl Validate for AddressResponse {
    fn validate(&self) -> Result<(), ClientError> {
        self.meta.validate_page(self.documents.len())
    }
}

impl Validate for LocationSearchResponse {
    fn validate(&self) -> Result<(), ClientError> {
        self.meta.validate_page(self.documents.len())
    }
}

impl Validate for PlaceDetailResponse {
    fn validate(&self) -> Result<(), ClientError> {
        Ok(())
    }
}

impl LocationSearchResponse {
    /// Rejects distances on a response to a request that had no center.
    pub(crate) fn validate_distance(&self, had_center: bool) -> Result<(), ClientError> {
        if had_center {
            return Ok(());
        }
        match self.documents.iter().find(|d| d.distance.is_some()) {
            Some(doc) => Err(ClientError::InvalidResponse(format!(
                "place {} has a distance but no center was requested",
                doc.id
            ))),
            None => Ok(()),
        }
    }
}
