#![allow(clippy::unwrap_used)]
// Integration tests for `IntegrationClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roamwatch_api::{
    AssociationSource, ControllerPlatform, Error, IntegrationClient, TransportConfig,
};

const SITE_ID: &str = "3f1c9e52-8a6d-4c5e-9d0a-1b2c3d4e5f60";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, IntegrationClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = IntegrationClient::from_api_key(
        &base_url,
        &secrecy::SecretString::from("test-key".to_string()),
        &TransportConfig::default(),
        ControllerPlatform::Classic,
    )
    .unwrap();
    (server, client)
}

fn page(data: serde_json::Value, total: i64) -> serde_json::Value {
    let count = data.as_array().map_or(0, Vec::len);
    json!({
        "offset": 0,
        "limit": 200,
        "count": count,
        "totalCount": total,
        "data": data,
    })
}

fn mount_sites(server: &MockServer) -> impl Future<Output = ()> {
    Mock::given(method("GET"))
        .and(path("/integration/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": SITE_ID, "name": "Default", "internalReference": "default" }]),
            1,
        )))
        .mount(server)
}

// ── Auth header ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_api_key_header_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/integration/v1/sites"))
        .and(header("X-API-KEY", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]), 0)))
        .mount(&server)
        .await;

    let sites = client.list_sites().await.unwrap();
    assert!(sites.is_empty());
}

#[tokio::test]
async fn test_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

// ── Site resolution ─────────────────────────────────────────────────

#[tokio::test]
async fn test_resolve_site_by_internal_reference() {
    let (server, client) = setup().await;
    mount_sites(&server).await;

    let id = client.resolve_site_id("default").await.unwrap();
    assert_eq!(id, SITE_ID);
}

#[tokio::test]
async fn test_resolve_unknown_site() {
    let (server, client) = setup().await;
    mount_sites(&server).await;

    let result = client.resolve_site_id("warehouse").await;
    assert!(
        matches!(result, Err(Error::SiteNotFound { .. })),
        "expected SiteNotFound, got: {result:?}"
    );
}

// ── Association snapshot ────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_associations_joins_uplink_devices() {
    let (server, client) = setup().await;
    mount_sites(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/integration/v1/sites/{SITE_ID}/clients")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{
                "id": "c-1",
                "name": "Kitchen Tablet",
                "type": "WIRELESS",
                "macAddress": "AA:BB:CC:DD:EE:FF",
                "ipAddress": "10.0.0.21",
                "uplinkDeviceId": "d-1"
            }]),
            1,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/integration/v1/sites/{SITE_ID}/devices")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{
                "id": "d-1",
                "macAddress": "0a:0b:0c:0d:0e:0f",
                "name": "Loft AP",
                "model": "U6LR"
            }]),
            1,
        )))
        .mount(&server)
        .await;

    let snapshot = client.fetch_associations("default").await.unwrap();
    assert_eq!(snapshot.len(), 1);

    let tablet = snapshot.get("aa-bb-cc-dd-ee-ff").unwrap();
    assert_eq!(tablet.mac, "aa:bb:cc:dd:ee:ff");
    assert_eq!(tablet.ap_mac.as_deref(), Some("0a:0b:0c:0d:0e:0f"));
    assert_eq!(tablet.ap_name.as_deref(), Some("Loft AP"));
    assert!(!tablet.is_wired);
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_pagination_follows_offsets() {
    let (server, client) = setup().await;

    let first: Vec<serde_json::Value> = (0..200)
        .map(|i| json!({ "id": format!("s-{i}"), "name": format!("Site {i}") }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/integration/v1/sites"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offset": 0,
            "limit": 200,
            "count": 200,
            "totalCount": 201,
            "data": first,
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/integration/v1/sites"))
        .and(query_param("offset", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offset": 200,
            "limit": 200,
            "count": 1,
            "totalCount": 201,
            "data": [{ "id": "s-200", "name": "Site 200" }],
        })))
        .mount(&server)
        .await;

    let sites = client.list_sites().await.unwrap();
    assert_eq!(sites.len(), 201);
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_integration_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "site does not exist",
            "code": "api.site.not-found"
        })))
        .mount(&server)
        .await;

    let result = client.list_clients("nope").await;

    match result {
        Err(Error::Integration {
            ref message,
            ref code,
            status,
        }) => {
            assert_eq!(message, "site does not exist");
            assert_eq!(code.as_deref(), Some("api.site.not-found"));
            assert_eq!(status, 404);
        }
        other => panic!("expected Integration error, got: {other:?}"),
    }
}
