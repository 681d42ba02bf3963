//! Integration tests for `LocalClient` against a wiremock stub of the upstream services.

use kakao_local_mcp::model::{
    AddressSearch, CategoryGroupCode, CategorySearch, Coordinate, KeywordSearch,
    LocationSortOption,
};
use kakao_local_mcp::{ClientError, Config, LocalClient, TransportOptions};
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn test_client(server: &MockServer) -> LocalClient {
    let config = Config::new("test-key")
        .with_api_base(format!("{}/v2/local", server.uri()))
        .with_place_api_base(format!("{}/places/panel3", server.uri()));
    LocalClient::new(&config).expect("client construction should not fail")
}

fn place_document(id: &str, distance: &str) -> Value {
    json!({
        "id": id,
        "place_name": "스타벅스 시청점",
        "category_name": "음식점 > 카페 > 커피전문점 > 스타벅스",
        "category_group_code": "CE7",
        "category_group_name": "카페",
        "phone": "1522-3232",
        "address_name": "서울 중구 태평로1가 31",
        "road_address_name": "서울 중구 세종대로 135",
        "x": "126.977113877541",
        "y": "37.5687837495032",
        "place_url": "http://place.map.kakao.com/27290525",
        "distance": distance
    })
}

fn place_search_body(pageable_count: u32, documents: Vec<Value>) -> Value {
    json!({
        "meta": {
            "total_count": documents.len(),
            "pageable_count": pageable_count,
            "is_end": true,
            "same_name": null
        },
        "documents": documents
    })
}

fn query_map(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

async fn single_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.expect("recording is enabled");
    assert_eq!(requests.len(), 1, "exactly one upstream request per call");
    requests.remove(0)
}

#[tokio::test]
async fn test_find_coordinates_returns_parsed_addresses() {
    let server = MockServer::start().await;

    let body = json!({
        "meta": { "total_count": 1, "pageable_count": 1, "is_end": true },
        "documents": [{
            "address_name": "서울 중구 세종대로 110",
            "address_type": "ROAD_ADDR",
            "x": "126.977829174031",
            "y": "37.5663174209601",
            "address": { "address_name": "서울 중구 태평로1가 31", "b_code": "1114010300" },
            "road_address": { "address_name": "서울 중구 세종대로 110", "zone_no": "04524" }
        }]
    });

    Mock::given(method("GET"))
        .and(path("/v2/local/search/address"))
        .and(header("authorization", "KakaoAK test-key"))
        .and(query_param("query", "Seoul City Hall"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let response = client
        .find_coordinates(&AddressSearch::new("Seoul City Hall"))
        .await
        .expect("should parse address response");

    assert!(response.meta.is_end);
    assert_eq!(response.documents.len(), 1);
    assert_eq!(response.documents[0].x, "126.977829174031");
    assert_eq!(
        response.documents[0].road_address.as_ref().unwrap()["zone_no"],
        "04524"
    );
}

#[tokio::test]
async fn test_keyword_search_omits_absent_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/local/search/keyword"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(place_search_body(1, vec![place_document("27290525", "")])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let response = client
        .search_by_keyword(&KeywordSearch::new("스타벅스"))
        .await
        .expect("should parse keyword response");

    assert_eq!(response.documents[0].distance, None);

    let query = query_map(&single_request(&server).await);
    assert_eq!(query.get("query").map(String::as_str), Some("스타벅스"));
    assert_eq!(query.get("sort").map(String::as_str), Some("accuracy"));
    for key in ["category_group_code", "x", "y", "radius"] {
        assert!(!query.contains_key(key), "{key} must not be sent");
    }
}

#[tokio::test]
async fn test_keyword_search_sends_given_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/local/search/keyword"))
        .and(query_param("category_group_code", "CE7"))
        .and(query_param("x", "126.9784147"))
        .and(query_param("y", "37.5666805"))
        .and(query_param("radius", "500"))
        .and(query_param("page", "2"))
        .and(query_param("sort", "distance"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(place_search_body(2, vec![place_document("27290525", "212")])),
        )
        .mount(&server)
        .await;

    let search = KeywordSearch::new("커피")
        .with_category(CategoryGroupCode::CE7)
        .with_center(Coordinate::new("126.9784147", "37.5666805"), 500)
        .with_page(2)
        .with_sort(LocationSortOption::Distance);

    let response = test_client(&server)
        .search_by_keyword(&search)
        .await
        .expect("filters should match the mock");

    assert_eq!(response.documents[0].distance.as_deref(), Some("212"));
}

#[tokio::test]
async fn test_category_search_sends_required_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/local/search/category"))
        .and(query_param("category_group_code", "FD6"))
        .and(query_param("x", "126.9"))
        .and(query_param("y", "37.5"))
        .and(query_param("radius", "500"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .and(query_param("sort", "accuracy"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(place_search_body(1, vec![place_document("1", "87")])),
        )
        .mount(&server)
        .await;

    let search = CategorySearch::new(CategoryGroupCode::FD6, Coordinate::new("126.9", "37.5"), 500);
    let response = test_client(&server)
        .search_by_category(&search)
        .await
        .expect("should parse category response");

    assert_eq!(response.meta.pageable_count, 1);
    assert!(response.documents.len() as u32 <= response.meta.pageable_count);
}

#[tokio::test]
async fn test_category_search_rejects_oversized_pageable_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/local/search/category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(place_search_body(46, vec![])))
        .mount(&server)
        .await;

    let search = CategorySearch::new(CategoryGroupCode::FD6, Coordinate::new("126.9", "37.5"), 500);
    let err = test_client(&server)
        .search_by_category(&search)
        .await
        .expect_err("pageable_count above 45 is malformed");

    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_schema_mismatch_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/local/search/address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": "nope" })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .find_coordinates(&AddressSearch::new("anything"))
        .await
        .expect_err("body does not match the schema");

    assert!(matches!(err, ClientError::Parse(_)));
}

#[tokio::test]
async fn test_statuses_map_to_error_kinds() {
    let cases = [400u16, 401, 420, 500, 503];

    for status in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "errorType": "SomeError",
                "message": "upstream says no"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .find_coordinates(&AddressSearch::new("somewhere"))
            .await
            .expect_err("non-200 must fail");

        match (status, &err) {
            (400, ClientError::BadRequest(msg))
            | (401, ClientError::Auth(msg))
            | (420, ClientError::RateLimit(msg)) => {
                assert_eq!(msg, "SomeError: upstream says no");
            }
            (500 | 503, ClientError::Unexpected { status: got, message }) => {
                assert_eq!(*got, status);
                assert_eq!(message, "SomeError: upstream says no");
            }
            _ => panic!("status {status} mapped to {err:?}"),
        }
    }
}

#[tokio::test]
async fn test_place_details_use_detail_endpoint_and_browser_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/places/panel3/27290525"))
        .and(header("origin", "https://place.map.kakao.com"))
        .and(header("referer", "https://place.map.kakao.com/"))
        .and(header("pf", "web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": { "name": "스타벅스 시청점" },
            "photos": { "counts": { "total": 12 } }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    for _ in 0..2 {
        let detail = client
            .get_place_details(27290525)
            .await
            .expect("should return the place panel");
        assert_eq!(detail.get("summary").unwrap()["name"], "스타벅스 시청점");
    }

    let requests = server.received_requests().await.unwrap();
    for request in requests {
        assert!(request.headers.get("authorization").is_none());
        assert!(request
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ua| ua.starts_with("Mozilla/5.0")));
    }
}

#[tokio::test]
async fn test_place_details_map_statuses_too() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/places/panel3/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .get_place_details(1)
        .await
        .expect_err("404 must fail");

    assert!(matches!(err, ClientError::Unexpected { status: 404, .. }));
}

#[test]
fn test_missing_api_key_is_an_auth_error() {
    let err = LocalClient::new(&Config::new("  ")).err().unwrap();
    assert!(matches!(err, ClientError::Auth(_)));
}

#[tokio::test]
async fn test_extra_headers_only_reach_search_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/local/search/address"))
        .and(header("x-request-source", "integration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "total_count": 0, "pageable_count": 0, "is_end": true },
            "documents": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/places/panel3/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let config = Config::new("test-key")
        .with_api_base(format!("{}/v2/local", server.uri()))
        .with_place_api_base(format!("{}/places/panel3", server.uri()))
        .with_transport(TransportOptions::new().with_header("X-Request-Source", "integration"));
    let client = LocalClient::new(&config).expect("client construction should not fail");

    client
        .find_coordinates(&AddressSearch::new("anywhere"))
        .await
        .expect("search request should carry the extra header");
    client
        .get_place_details(42)
        .await
        .expect("detail request should succeed");

    let requests = server.received_requests().await.unwrap();
    let detail = requests
        .iter()
        .find(|r| r.url.path() == "/places/panel3/42")
        .expect("detail request was sent");
    assert!(detail.headers.get("x-request-source").is_none());
}

#[test]
fn test_invalid_extra_header_is_a_config_error() {
    let config = Config::new("test-key")
        .with_transport(TransportOptions::new().with_header("bad header", "value"));
    let err = LocalClient::new(&config).err().unwrap();
    assert!(matches!(err, ClientError::Config(_)));
}
