//! Integration tests for services talking to a real HTTP server.
//!
//! These tests run a `Service` over `ReqwestTransport` against a wiremock
//! server and verify URI assembly, credentials, interceptors, error mapping,
//! retries and pagination end to end.

use std::sync::Arc;

use cloud_core::clients::{Credentials, HttpError, ReqwestTransport};
use cloud_core::paginator::{extend, Page};
use cloud_core::{
    AccessToken, ApiKey, BaseUrl, Error, GetConfig, HttpMethod, Interceptors, ProjectId,
    RequestOptions, RequestOverrides, Requester, Service, ServiceConfig, ServiceObject,
    SharedMethod,
};
use futures::TryStreamExt;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a project-scoped service pointing at the mock server.
fn create_service(server: &MockServer, credentials: Credentials, tries: u32) -> Arc<Service> {
    create_service_with(server, credentials, tries, Interceptors::new())
}

fn create_service_with(
    server: &MockServer,
    credentials: Credentials,
    tries: u32,
    global: Interceptors,
) -> Arc<Service> {
    let config = ServiceConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .project_id(ProjectId::new("p").unwrap())
        .interceptors(global)
        .build()
        .unwrap();
    let transport = ReqwestTransport::builder()
        .credentials(credentials)
        .tries(tries)
        .build()
        .unwrap();
    Arc::new(Service::new(config, Arc::new(transport)))
}

fn token() -> Credentials {
    Credentials::AccessToken(AccessToken::new("tok").unwrap())
}

// ============================================================================
// Service.request
// ============================================================================

#[tokio::test]
async fn test_request_reaches_project_scoped_path_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "list"})))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server, token(), 1);
    let response = service.request(RequestOptions::new("datasets")).await.unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(response.body, json!({"kind": "list"}));
}

#[tokio::test]
async fn test_api_key_is_sent_as_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets"))
        .and(query_param("key", "k-123"))
        .and(query_param("all", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::ApiKey(ApiKey::new("k-123").unwrap()), 1);
    service
        .request(RequestOptions::new("datasets").query_param("all", "true"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_custom_verb_uri_collapses_colon() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/p/jobs/j1:cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 1);
    service
        .request(RequestOptions::new("jobs/j1/:cancel").method(HttpMethod::Post))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_interceptors_from_every_scope_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets/d1"))
        .and(header("x-global", "1"))
        .and(header("x-service", "1"))
        .and(header("x-object", "1"))
        .and(header("x-call", "1"))
        .and(header("x-order", "call"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d1"})))
        .expect(1)
        .mount(&server)
        .await;

    let global = Interceptors::new();
    global.push(|opts: RequestOptions| opts.header("x-global", "1").header("x-order", "global"));
    let service = create_service_with(&server, Credentials::Anonymous, 1, global);
    service
        .interceptors()
        .push(|opts: RequestOptions| opts.header("x-service", "1").header("x-order", "service"));

    let dataset = ServiceObject::builder(service, "datasets", "d1").build();
    dataset
        .interceptors()
        .push(|opts: RequestOptions| opts.header("x-object", "1").header("x-order", "object"));

    dataset
        .request(
            RequestOptions::new("")
                .interceptor(|opts: RequestOptions| opts.header("x-call", "1").header("x-order", "call")),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_authenticate_request_does_not_send() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service(&server, token(), 1);
    let request = service
        .authenticate_request(RequestOptions::new("datasets"))
        .await
        .unwrap();

    assert_eq!(request.url, format!("{}/projects/p/datasets", server.uri()));
    assert_eq!(
        request.headers.get("Authorization"),
        Some(&"Bearer tok".to_string())
    );
}

// ============================================================================
// Error mapping and retries
// ============================================================================

#[tokio::test]
async fn test_non_2xx_maps_to_response_error_with_reference() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-request-id", "req-1")
                .set_body_json(json!({"error": {"code": 404, "message": "Not found"}})),
        )
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 1);
    let error = service
        .request(RequestOptions::new("datasets/missing"))
        .await
        .unwrap_err();

    assert!(error.is_not_found());
    let raw = error.response().unwrap();
    assert_eq!(raw.code, 404);
    assert_eq!(raw.body["error"]["message"], "Not found");
    assert_eq!(raw.request_id(), Some("req-1"));
    match error {
        Error::Http(HttpError::Response(e)) => {
            assert_eq!(e.code, 404);
            assert_eq!(e.error_reference.as_deref(), Some("req-1"));
            assert!(e.message.contains("Not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 2);
    let response = service.request(RequestOptions::new("datasets")).await.unwrap();

    assert_eq!(response.body, json!({"ok": true}));
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 2);
    let error = service
        .request(RequestOptions::new("datasets"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Http(HttpError::MaxRetries(ref e)) if e.tries == 2 && e.code == 429
    ));
    assert_eq!(error.code(), Some(429));
}

#[tokio::test]
async fn test_core_does_not_retry_without_transport_tries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 1);
    let error = service
        .request(RequestOptions::new("datasets"))
        .await
        .unwrap_err();

    assert_eq!(error.code(), Some(503));
}

// ============================================================================
// ServiceObject over HTTP
// ============================================================================

#[tokio::test]
async fn test_exists_false_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "gone"})))
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 1);
    let dataset = ServiceObject::builder(service, "datasets", "gone").build();

    assert!(!dataset.exists().await.unwrap());
}

#[tokio::test]
async fn test_exists_surfaces_other_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "denied"})))
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 1);
    let dataset = ServiceObject::builder(service, "datasets", "secret").build();

    let error = dataset.exists().await.unwrap_err();
    assert_eq!(error.code(), Some(403));
}

#[tokio::test]
async fn test_set_metadata_with_put_override_sends_merged_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/projects/p/datasets/d1/tables/t1"))
        .and(body_json(json!({"description": "events", "schema": {"fields": []}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "t1", "description": "events"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 1);
    let dataset = ServiceObject::builder(service, "datasets", "d1").build();
    let table = ServiceObject::builder(dataset, "tables", "t1")
        .method(SharedMethod::GetMetadata)
        .method_with(
            SharedMethod::SetMetadata,
            RequestOverrides::new()
                .method(HttpMethod::Put)
                .json(json!({"schema": {"fields": []}})),
        )
        .build();

    table
        .set_metadata(json!({"description": "events"}))
        .await
        .unwrap();

    assert_eq!(table.metadata(), json!({"id": "t1", "description": "events"}));
    assert!(!table.supports(SharedMethod::Delete));
}

#[tokio::test]
async fn test_get_returns_object_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d1", "location": "EU"})))
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 1);
    let dataset = ServiceObject::builder(service, "datasets", "d1").build();

    let (same, metadata) = dataset.get(GetConfig::default()).await.unwrap();

    assert!(Arc::ptr_eq(&same, &dataset));
    assert_eq!(metadata["location"], "EU");
}

// ============================================================================
// Pagination over HTTP
// ============================================================================

#[tokio::test]
async fn test_paginated_list_follows_page_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets"))
        .and(query_param("pageToken", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"datasets": [{"id": "c"}]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/p/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "datasets": [{"id": "a"}, {"id": "b"}],
            "nextPageToken": "t2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server, Credentials::Anonymous, 1);
    let list_datasets = extend(move |query: Value| {
        let service = Arc::clone(&service);
        async move {
            let mut opts = RequestOptions::new("datasets");
            if let Some(token) = query.get("pageToken").and_then(Value::as_str) {
                opts = opts.query_param("pageToken", token);
            }
            let response = service.request(opts).await?;
            Ok::<_, Error>(Page::from_response(
                response,
                &query,
                "datasets",
                "nextPageToken",
                "pageToken",
            ))
        }
    });

    let ids: Vec<Value> = list_datasets
        .stream(json!({}))
        .map_ok(|dataset| dataset["id"].clone())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
}
