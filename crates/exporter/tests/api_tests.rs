//! Integration tests for the HTTP surface

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use exporter_lib::{
    models::{FloatingIp, Server, SshKey, Volume},
    ApiError, CloudApi, ExporterBuilder,
};
use hcloud_exporter::api::{create_router, AppState, TEXT_CONTENT_TYPE};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

struct StaticApi {
    fail: bool,
}

fn web1() -> Server {
    serde_json::from_value(json!({
        "id": 42,
        "name": "web1",
        "status": "running",
        "created": "2024-01-30T23:50:00+00:00",
        "private_net": [],
        "server_type": {
            "name": "cx22",
            "cores": 2,
            "memory": 4.0,
            "disk": 40,
            "prices": [{
                "location": "fsn1",
                "price_hourly": {"net": "0.0060", "gross": "0.0071"},
                "price_monthly": {"net": "3.00", "gross": "3.57"}
            }]
        },
        "datacenter": {"name": "fsn1-dc8", "location": {"name": "fsn1"}},
        "backup_window": "22-02",
        "included_traffic": 21990232555520u64,
        "outgoing_traffic": null,
        "ingoing_traffic": null
    }))
    .unwrap()
}

#[async_trait]
impl CloudApi for StaticApi {
    async fn servers(&self) -> Result<Vec<Server>, ApiError> {
        if self.fail {
            return Err(ApiError::Http {
                status: 401,
                body: "unauthorized".to_string(),
            });
        }
        Ok(vec![web1()])
    }

    async fn volumes(&self) -> Result<Vec<Volume>, ApiError> {
        Ok(vec![])
    }

    async fn floating_ips(&self) -> Result<Vec<FloatingIp>, ApiError> {
        Ok(vec![])
    }

    async fn ssh_keys(&self) -> Result<Vec<SshKey>, ApiError> {
        Ok(vec![])
    }
}

fn setup_test_app(web_path: &str, fail: bool) -> Router {
    let exporter = ExporterBuilder::new()
        .client(Arc::new(StaticApi { fail }))
        .build()
        .unwrap();

    create_router(Arc::new(AppState::new(exporter, web_path)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup_test_app("/metrics", false);

    let (status, content_type, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(TEXT_CONTENT_TYPE));
    assert!(body.contains(
        "hcloud_server_running{id=\"42\",name=\"web1\",datacenter=\"fsn1-dc8\",network=\"public\"} 1"
    ));
    assert!(body.contains(
        "hcloud_server_price_hourly{id=\"42\",name=\"web1\",datacenter=\"fsn1-dc8\",network=\"public\",vat=\"net\"} 0.006"
    ));
    assert!(body.contains("hcloud_server_outgoing_traffic_bytes{"));
    assert!(body.contains("hcloud_request_failures_total{collector=\"server\"} 0"));
    assert!(body.contains("hcloud_request_duration_seconds_count{collector=\"server\"} 1"));
}

#[tokio::test]
async fn test_metrics_endpoint_with_failing_api() {
    let app = setup_test_app("/metrics", true);

    let (status, _, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("hcloud_server_running"));
    assert!(body.contains("hcloud_request_failures_total{collector=\"server\"} 1"));
    assert!(body.contains("hcloud_request_failures_total{collector=\"volume\"} 0"));
}

#[tokio::test]
async fn test_custom_metrics_path() {
    let (status, _, _) = get(setup_test_app("/prometheus", false), "/prometheus").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = get(setup_test_app("/prometheus", false), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoints() {
    for uri in ["/healthz", "/readyz"] {
        let (status, _, body) = get(setup_test_app("/metrics", false), uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}

#[tokio::test]
async fn test_index_links_metrics_path() {
    let (status, content_type, body) = get(setup_test_app("/prometheus", false), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("href=\"/prometheus\""));
}

#[tokio::test]
async fn test_accepted_paths_build_router() {
    for path in ["/", "/prometheus", "/healthz/metrics"] {
        let (status, content_type, body) = get(setup_test_app(path, false), path).await;

        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(content_type.as_deref(), Some(TEXT_CONTENT_TYPE));
        assert!(body.contains("hcloud_server_running"));
    }

    let (status, _, body) = get(setup_test_app("/healthz/metrics", false), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}
