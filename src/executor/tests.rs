//! Tests for the view executor module

use super::*;
use crate::error::{Error, ErrorKind};
use crate::http::{HttpClient, HttpClientConfig};
use crate::query::ViewQuery;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor(server: &MockServer) -> HttpViewExecutor {
    let config = HttpClientConfig::builder()
        .max_retries(0)
        .no_rate_limit()
        .build();
    HttpViewExecutor::new(HttpClient::with_config(config).unwrap(), &server.uri(), "music").unwrap()
}

#[test]
fn test_view_url() {
    let client = HttpClient::with_config(HttpClientConfig::builder().no_rate_limit().build())
        .unwrap();
    let executor =
        HttpViewExecutor::new(client, "http://localhost:5984/", "my db").unwrap();

    assert_eq!(
        executor
            .view_url(&ViewName::design("app", "by artist"))
            .unwrap()
            .as_str(),
        "http://localhost:5984/my%20db/_design/app/_view/by%20artist"
    );
    assert_eq!(
        executor.view_url(&ViewName::AllDocs).unwrap().as_str(),
        "http://localhost:5984/my%20db/_all_docs"
    );
    assert_eq!(executor.database(), "my db");
}

#[test]
fn test_view_url_below_prefix() {
    let client = HttpClient::with_config(HttpClientConfig::builder().no_rate_limit().build())
        .unwrap();
    let executor = HttpViewExecutor::new(client, "https://proxy.example.com/couch", "db").unwrap();

    assert_eq!(
        executor.view_url(&ViewName::DesignDocs).unwrap().as_str(),
        "https://proxy.example.com/couch/db/_design_docs"
    );
}

#[test]
fn test_new_rejects_bad_config() {
    let client = || {
        HttpClient::with_config(HttpClientConfig::builder().no_rate_limit().build()).unwrap()
    };
    assert!(matches!(
        HttpViewExecutor::new(client(), "not a url", "db"),
        Err(Error::InvalidUrl(_))
    ));
    assert!(matches!(
        HttpViewExecutor::new(client(), "mailto:admin@example.com", "db"),
        Err(Error::Config { .. })
    ));
    assert!(matches!(
        HttpViewExecutor::new(client(), "http://localhost:5984", ""),
        Err(Error::Config { .. })
    ));
}

#[tokio::test]
async fn test_query_design_view() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/music/_design/app/_view/by_artist"))
        .and(query_param("startkey", "\"Bowie\""))
        .and(query_param("limit", "3"))
        .and(query_param("reduce", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_rows": 10,
            "offset": 4,
            "rows": [
                {"id": "s1", "key": "Bowie", "value": "Heroes"},
                {"id": "s2", "key": "Bowie", "value": "Low"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = ViewQuery::design("app", "by_artist")
        .with_start_key("Bowie")
        .with_limit(3)
        .compile()
        .unwrap();

    let result = executor(&mock_server)
        .query_view(&ViewName::design("app", "by_artist"), &query)
        .await
        .unwrap();

    assert_eq!(result.row_count(), 2);
    assert_eq!(result.total_rows().unwrap(), 10);
    assert_eq!(result.offset().unwrap(), 4);
    assert_eq!(result.query_string(), &query);
}

#[tokio::test]
async fn test_query_ad_hoc_view_posts_functions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/music/_temp_view"))
        .and(body_json(json!({
            "map": "function(doc) { emit(doc.genre, 1); }",
            "reduce": "_count"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [{"key": null, "value": 42}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let view = ViewName::AdHoc {
        map: "function(doc) { emit(doc.genre, 1); }".to_string(),
        reduce: Some("_count".to_string()),
    };
    let query = ViewQuery::new(view.clone()).with_reduce(true).compile().unwrap();

    let result = executor(&mock_server).query_view(&view, &query).await.unwrap();
    assert_eq!(result.row_count(), 1);
    assert!(result.total_rows().is_err());
}

#[tokio::test]
async fn test_query_surfaces_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/music/_design/app/_view/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "reason": "missing_named_view"
        })))
        .mount(&mock_server)
        .await;

    let err = executor(&mock_server)
        .query_view(&ViewName::design("app", "nope"), &QueryString::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Execution);
    assert!(matches!(err, Error::Couch { status: 404, ref error, .. } if error == "not_found"));
}

#[tokio::test]
async fn test_query_rejects_malformed_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/music/_all_docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let err = executor(&mock_server)
        .query_view(&ViewName::AllDocs, &QueryString::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_executor_through_arc_and_box() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/music/_all_docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_rows": 0, "offset": 0, "rows": []
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let shared: Arc<dyn ViewExecutor> = Arc::new(executor(&mock_server));
    let boxed: Box<dyn ViewExecutor> = Box::new(executor(&mock_server));

    for exec in [&shared as &dyn ViewExecutor, &boxed as &dyn ViewExecutor] {
        let result = exec
            .query_view(&ViewName::AllDocs, &QueryString::default())
            .await
            .unwrap();
        assert_eq!(result.row_count(), 0);
    }
}

#[tokio::test]
async fn test_custom_executor_can_propagate_anyhow_errors() {
    struct Offline;

    #[async_trait::async_trait]
    impl ViewExecutor for Offline {
        async fn query_view(&self, _view: &ViewName, _query: &QueryString) -> Result<ViewResult> {
            Err(anyhow::anyhow!("replica offline").into())
        }
    }

    let err = Offline
        .query_view(&ViewName::AllDocs, &QueryString::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Anyhow(_)));
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert_eq!(err.to_string(), "replica offline");
}
