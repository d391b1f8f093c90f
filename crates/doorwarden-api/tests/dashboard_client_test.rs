#![allow(clippy::unwrap_used)]
// Integration tests for `DashboardClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doorwarden_api::{DashboardClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DashboardClient::with_client(reqwest::Client::new(), &base_url).unwrap();
    (server, client)
}

// ── Snapshot fetch tests ────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_snapshot() {
    let (server, client) = setup().await;

    let body = json!({
        "door_status": "Open",
        "alarm_status": "Inactive",
        "timer_set": "30",
        "total_events": 120,
        "door_open_events": 61,
        "door_close_events": 57,
        "alarm_events": 2,
        "uptime": {
            "uptime_string": "1d 3h 20m",
            "days": 1,
            "hours": 3,
            "minutes": 20,
            "seconds": 11,
            "availability_percent": 99.61,
            "start_time": "2026-08-06T07:12:00"
        },
        "timestamp": "2026-08-07T10:32:11",
        "success": true
    });

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let snapshot = client.fetch_snapshot().await.unwrap();

    assert_eq!(snapshot.door_status.as_deref(), Some("Open"));
    assert_eq!(snapshot.alarm_status.as_deref(), Some("Inactive"));
    assert_eq!(snapshot.timer_set, Some(30));

    let stats = snapshot.statistics.expect("counters repackaged");
    assert_eq!(stats.total_events, Some(120));
    assert_eq!(stats.door_open_events, Some(61));
    assert_eq!(stats.door_close_events, Some(57));
    assert_eq!(stats.alarm_events, Some(2));

    let uptime = snapshot.uptime.expect("uptime present");
    assert_eq!(uptime.uptime_string, "1d 3h 20m");
    assert_eq!(uptime.days, 1);
}

#[tokio::test]
async fn test_fetch_snapshot_partial_body() {
    let (server, client) = setup().await;

    // A body with only door status -- everything else must come back absent.
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "door_status": "Closed"
        })))
        .mount(&server)
        .await;

    let snapshot = client.fetch_snapshot().await.unwrap();

    assert_eq!(snapshot.door_status.as_deref(), Some("Closed"));
    assert!(snapshot.alarm_status.is_none());
    assert!(snapshot.statistics.is_none());
    assert!(snapshot.timer_set.is_none());
    assert!(snapshot.uptime.is_none());
}

#[tokio::test]
async fn test_fetch_snapshot_salvages_malformed_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "door_status": "Open",
            "total_events": "not-a-number",
            "alarm_events": 7
        })))
        .mount(&server)
        .await;

    let snapshot = client.fetch_snapshot().await.unwrap();

    assert_eq!(snapshot.door_status.as_deref(), Some("Open"));
    let stats = snapshot.statistics.expect("well-formed counters kept");
    assert_eq!(stats.total_events, None);
    assert_eq!(stats.alarm_events, Some(7));
}

#[tokio::test]
async fn test_fetch_snapshot_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.fetch_snapshot().await;

    assert!(
        matches!(result, Err(Error::Status { status: 500 })),
        "expected Status error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_endpoint_url_construction() {
    let base_url = Url::parse("http://192.168.1.50:5000").unwrap();
    let client = DashboardClient::with_client(reqwest::Client::new(), &base_url).unwrap();

    assert_eq!(client.endpoint().as_str(), "http://192.168.1.50:5000/api/dashboard");
}
