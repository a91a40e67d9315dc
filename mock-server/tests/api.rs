use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_couchdb::{app, DbInfo, DocResult};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    json_request(method, uri, "")
}

/// Send one request through a fresh `ready` service and return the response.
async fn call(
    app: &mut axum::routing::RouterIntoService<String>,
    request: Request<String>,
) -> axum::response::Response {
    use tower::Service;

    ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
}

// --- server ---

#[tokio::test]
async fn welcome_banner() {
    let resp = app().oneshot(empty_request("GET", "/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["couchdb"], "Welcome");
}

// --- databases ---

#[tokio::test]
async fn info_of_missing_database_is_404_with_json_body() {
    let resp = app()
        .oneshot(empty_request("GET", "/database_test"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["reason"], "Database does not exist.");
}

#[tokio::test]
async fn create_database_returns_201() {
    let resp = app()
        .oneshot(empty_request("PUT", "/database_test"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn illegal_database_name_returns_400() {
    let resp = app()
        .oneshot(empty_request("PUT", "/Database_Test"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "illegal_database_name");
}

#[tokio::test]
async fn encoded_slash_in_database_name_returns_400() {
    let resp = app()
        .oneshot(empty_request("PUT", "/team%2Fdocs"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "illegal_database_name");
}

#[tokio::test]
async fn delete_missing_database_returns_404() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/database_test"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_to_missing_database_returns_404() {
    let resp = app()
        .oneshot(json_request("POST", "/database_test/", r#"{"Message":"Hello"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn database_lifecycle() {
    let mut app = app().into_service();

    let resp = call(&mut app, empty_request("PUT", "/database_test")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // second create — already exists
    let resp = call(&mut app, empty_request("PUT", "/database_test")).await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "file_exists");

    let resp = call(&mut app, empty_request("GET", "/database_test")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let info: DbInfo = body_json(resp).await;
    assert_eq!(info.db_name, "database_test");
    assert_eq!(info.doc_count, 0);
    assert_eq!(info.update_seq, 0);

    let resp = call(&mut app, empty_request("DELETE", "/database_test")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = call(&mut app, empty_request("GET", "/database_test")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- documents ---

#[tokio::test]
async fn document_lifecycle() {
    let mut app = app().into_service();

    let resp = call(&mut app, empty_request("PUT", "/database_test")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // create with a generated id, through the trailing-slash collection path
    let resp = call(
        &mut app,
        json_request("POST", "/database_test/", r#"{"Message":"Hello"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: DocResult = body_json(resp).await;
    assert!(created.ok);
    assert_eq!(created.id.len(), 32);
    assert!(created.rev.starts_with("1-"));

    // create with an explicit id, without the trailing slash
    let resp = call(
        &mut app,
        json_request("POST", "/database_test", r#"{"_id":"greeting","Message":"Hi"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let named: DocResult = body_json(resp).await;
    assert_eq!(named.id, "greeting");

    // get
    let resp = call(&mut app, empty_request("GET", "/database_test/greeting")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc: Value = body_json(resp).await;
    assert_eq!(doc["_id"], "greeting");
    assert_eq!(doc["_rev"], named.rev.as_str());
    assert_eq!(doc["Message"], "Hi");

    // update without rev — conflict
    let resp = call(
        &mut app,
        json_request("PUT", "/database_test/greeting", r#"{"Message":"Bye"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // update with rev in the body
    let body = format!(r#"{{"_rev":"{}","Message":"Bye"}}"#, named.rev);
    let resp = call(&mut app, json_request("PUT", "/database_test/greeting", &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let updated: DocResult = body_json(resp).await;
    assert!(updated.rev.starts_with("2-"));

    // delete with stale rev — conflict
    let uri = format!("/database_test/greeting?rev={}", named.rev);
    let resp = call(&mut app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // delete with current rev
    let uri = format!("/database_test/greeting?rev={}", updated.rev);
    let resp = call(&mut app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: DocResult = body_json(resp).await;
    assert!(deleted.rev.starts_with("3-"));

    // get after delete — 404
    let resp = call(&mut app, empty_request("GET", "/database_test/greeting")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["reason"], "missing");

    // info reflects the writes
    let resp = call(&mut app, empty_request("GET", "/database_test")).await;
    let info: DbInfo = body_json(resp).await;
    assert_eq!(info.doc_count, 1);
    assert_eq!(info.doc_del_count, 1);
    assert_eq!(info.update_seq, 4);
}

#[tokio::test]
async fn non_object_document_returns_400() {
    let mut app = app().into_service();
    call(&mut app, empty_request("PUT", "/database_test")).await;

    let resp = call(&mut app, json_request("POST", "/database_test/", "[1,2,3]")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}
