//! Comment creation and the content guard, end to end

mod support;

use axum::{Json, Router, http::StatusCode, middleware, routing::post};
use axum_test::TestServer;
use phono_api::middleware::validate_comment_content_middleware;
use serde_json::{Value, json};
use support::{Authorized, create_record, register, test_server};

async fn setup() -> (TestServer, String, String) {
    let server = test_server();
    let (token, _) = register(&server, "commenter").await;
    let record = create_record(&server, &token, "Blue Train", "John Coltrane").await;
    (server, token, record)
}

#[tokio::test]
async fn test_comment_content_is_trimmed_before_storage() {
    let (server, token, record) = setup().await;

    let response = server
        .post(&format!("/records/{}/comments", record))
        .bearer(&token)
        .json(&json!({ "content": "  hi  " }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let comment: Value = response.json();
    assert_eq!(comment["content"], "hi");
    assert_eq!(comment["record"], record.as_str());

    let listed: Value = server
        .get(&format!("/records/{}/comments", record))
        .await
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["content"], "hi");
}

#[tokio::test]
async fn test_blank_comment_is_rejected() {
    let (server, token, record) = setup().await;

    for body in [
        json!({ "content": "   " }),
        json!({ "content": "" }),
        json!({ "content": null }),
        json!({ "content": 42 }),
        json!({}),
    ] {
        let response = server
            .post(&format!("/records/{}/comments", record))
            .bearer(&token)
            .json(&body)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Comment content is required" }));
    }

    let listed: Value = server
        .get(&format!("/records/{}/comments", record))
        .await
        .json();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_comment_is_rejected() {
    let (server, token, record) = setup().await;
    let too_long = json!({ "message": "Comment content must be less than 1000 characters" });

    let response = server
        .post(&format!("/records/{}/comments", record))
        .bearer(&token)
        .json(&json!({ "content": "a".repeat(1001) }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&too_long);

    // Would fit once trimmed, but the raw length decides
    let padded = format!("     {}     ", "a".repeat(995));
    let response = server
        .post(&format!("/records/{}/comments", record))
        .bearer(&token)
        .json(&json!({ "content": padded }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&too_long);

    let response = server
        .post(&format!("/records/{}/comments", record))
        .bearer(&token)
        .json(&json!({ "content": "a".repeat(1000) }))
        .await;
    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let (server, token, record) = setup().await;

    let response = server
        .post(&format!("/records/{}/comments", record))
        .bearer(&token)
        .json(&json!(["not", "an", "object"]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_authentication_runs_before_content_checks() {
    let (server, _, record) = setup().await;

    let response = server
        .post(&format!("/records/{}/comments", record))
        .json(&json!({ "content": "   " }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_comment_on_unknown_record_is_not_found() {
    let (server, token, _) = setup().await;

    let response = server
        .post(&format!("/records/{}/comments", uuid::Uuid::new_v4()))
        .bearer(&token)
        .json(&json!({ "content": "where is it" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_the_author_can_delete_a_comment() {
    let (server, token, record) = setup().await;
    let (other_token, _) = register(&server, "bystander").await;

    let comment: Value = server
        .post(&format!("/records/{}/comments", record))
        .bearer(&token)
        .json(&json!({ "content": "first pressing sounds best" }))
        .await
        .json();
    let path = format!("/comments/{}", comment["id"].as_str().unwrap());

    server
        .delete(&path)
        .bearer(&other_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .delete(&path)
        .bearer(&token)
        .await
        .assert_status(StatusCode::OK);

    server
        .delete(&path)
        .bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// Router that returns whatever body the content guard forwarded
fn echo_server() -> TestServer {
    let app = Router::new()
        .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
        .layer(middleware::from_fn(validate_comment_content_middleware));
    TestServer::new(app).expect("test server")
}

#[tokio::test]
async fn test_guard_only_rewrites_content() {
    let server = echo_server();

    let response = server
        .post("/echo")
        .json(&json!({
            "content": " x ",
            "extra": 1,
            "nested": { "content": "  untouched  " },
            "tags": ["a", null]
        }))
        .await;

    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({
        "content": "x",
        "extra": 1,
        "nested": { "content": "  untouched  " },
        "tags": ["a", null]
    }));
}

#[tokio::test]
async fn test_guard_rejects_before_the_handler_runs() {
    let server = echo_server();

    let response = server
        .post("/echo")
        .json(&json!({ "content": "  ", "extra": 1 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "message": "Comment content is required" }));
}
