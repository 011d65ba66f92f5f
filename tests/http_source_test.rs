use std::sync::Arc;

use accio_workflows::api::client::HttpWorkflowSource;
use accio_workflows::api::WorkflowSource;
use accio_workflows::config::ApiConfig;
use accio_workflows::error::AppError;
use accio_workflows::list::{ListContainer, ListQuery, PageState, ResponseOrdering};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer, token: Option<&str>) -> HttpWorkflowSource {
    let config = ApiConfig {
        base_url: server.uri(),
        token: token.map(str::to_string),
        ..ApiConfig::default()
    };
    HttpWorkflowSource::new(&config, 25).unwrap()
}

fn body(ids: &[&str], total_count: u64) -> serde_json::Value {
    json!({
        "results": ids.iter().map(|id| json!({"id": id, "name": id})).collect::<Vec<_>>(),
        "total_count": total_count,
    })
}

#[tokio::test]
async fn test_list_workflows_parses_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflow"))
        .and(query_param("per_page", "25"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body(&["a", "b"], 2)))
        .expect(1)
        .mount(&server)
        .await;

    let page = source_for(&server, None)
        .list_workflows(&PageState::default())
        .await
        .unwrap();

    assert_eq!(page.total_count, 2);
    assert_eq!(page.results[1].id(), Some("b"));
}

#[tokio::test]
async fn test_filter_values_are_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflow"))
        .and(query_param("a", "x&y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body(&[], 0)))
        .expect(1)
        .mount(&server)
        .await;

    let state = PageState::new(1, ListQuery::new().with("a", "x&y")).unwrap();
    source_for(&server, None).list_workflows(&state).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.query(),
        Some("per_page=25&page=1&a=x%26y")
    );
}

#[tokio::test]
async fn test_bearer_token_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body(&["a"], 1)))
        .expect(1)
        .mount(&server)
        .await;

    source_for(&server, Some("s3cret"))
        .list_workflows(&PageState::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = source_for(&server, None)
        .list_workflows(&PageState::default())
        .await
        .unwrap_err();

    match err {
        AppError::Api(message) => {
            assert!(message.contains("503"));
            assert!(message.contains("maintenance"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = source_for(&server, None)
        .list_workflows(&PageState::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Serialization(_)));
}

#[tokio::test]
async fn test_container_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflow"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body(&["first"], 30)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflow"))
        .and(query_param("page", "2"))
        .and(query_param("status", "done"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body(&["second"], 30)))
        .expect(1)
        .mount(&server)
        .await;

    let container = ListContainer::new(
        Arc::new(source_for(&server, None)),
        ResponseOrdering::LastResolved,
    );

    container.mount().await.unwrap().await.unwrap();
    let props = container.render().await;
    assert_eq!(props.page, 1);
    assert_eq!(props.workflows.as_ref().unwrap()[0].id(), Some("first"));

    let next = PageState::new(2, ListQuery::new().with("status", "done")).unwrap();
    container.on_change(next).unwrap().await.unwrap();

    let props = container.render().await;
    assert_eq!(props.page, 2);
    assert_eq!(props.query.get("status"), Some("done"));
    assert_eq!(props.total_count, 30);
    assert_eq!(props.workflows.unwrap()[0].id(), Some("second"));
}
