//! Registration, login and the record catalog over HTTP

mod support;

use axum::http::StatusCode;
use serde_json::{Value, json};
use support::{Authorized, PASSWORD, create_record, register, test_server};

#[tokio::test]
async fn test_health_reports_memory_storage() {
    let server = test_server();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({
        "status": "ok",
        "service": "phono-api",
        "storage": "memory",
    }));
}

#[tokio::test]
async fn test_register_and_login() {
    let server = test_server();
    register(&server, "listener").await;

    let response = server
        .post("/auth/login")
        .json(&json!({ "usernameOrEmail": "listener", "password": PASSWORD }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["user"]["username"], "listener");
    assert!(body["user"].get("passwordHash").is_none());

    server
        .post("/auth/login")
        .json(&json!({ "usernameOrEmail": "LISTENER@phono.app", "password": PASSWORD }))
        .await
        .assert_status(StatusCode::OK);

    server
        .post("/auth/login")
        .json(&json!({ "usernameOrEmail": "listener", "password": "Wrong-Pass1" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/auth/login")
        .json(&json!({ "usernameOrEmail": "nobody", "password": PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = test_server();
    register(&server, "listener").await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "listener",
            "email": "someone-else@phono.app",
            "password": PASSWORD,
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({ "message": "Username is already taken" }));
}

#[tokio::test]
async fn test_weak_registration_is_rejected() {
    let server = test_server();

    server
        .post("/auth/register")
        .json(&json!({
            "username": "listener",
            "email": "listener@phono.app",
            "password": "password",
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_writes_require_authentication() {
    let server = test_server();

    server
        .post("/records")
        .json(&json!({ "title": "Blue Train", "artist": "John Coltrane" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server.get("/records").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_record_crud() {
    let server = test_server();
    let (token, _) = register(&server, "curator").await;
    let id = create_record(&server, &token, "  Blue Train ", "John Coltrane").await;
    let path = format!("/records/{}", id);

    let record: Value = server.get(&path).await.json();
    assert_eq!(record["title"], "Blue Train");

    let response = server
        .put(&path)
        .bearer(&token)
        .json(&json!({
            "title": "Blue Train",
            "artist": "John Coltrane",
            "year": 1957,
            "label": "Blue Note"
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["year"], 1957);
    assert_eq!(updated["label"], "Blue Note");

    server
        .put(&path)
        .bearer(&token)
        .json(&json!({ "title": "", "artist": "John Coltrane" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .delete(&path)
        .bearer(&token)
        .await
        .assert_status(StatusCode::OK);
    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_listing_paginates_and_searches() {
    let server = test_server();
    let (token, _) = register(&server, "curator").await;

    for (title, artist) in [
        ("Kind of Blue", "Miles Davis"),
        ("Bitches Brew", "Miles Davis"),
        ("Blue Train", "John Coltrane"),
        ("Mingus Ah Um", "Charles Mingus"),
    ] {
        create_record(&server, &token, title, artist).await;
    }

    let page: Value = server
        .get("/records")
        .add_query_param("limit", 3)
        .await
        .json();
    assert_eq!(page["total"], 4);
    assert_eq!(page["limit"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);

    let page: Value = server
        .get("/records")
        .add_query_param("limit", 3)
        .add_query_param("page", 2)
        .await
        .json();
    assert_eq!(page["page"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let found: Value = server
        .get("/records")
        .add_query_param("search", "miles")
        .await
        .json();
    assert_eq!(found["total"], 2);

    let found: Value = server
        .get("/records")
        .add_query_param("search", "BLUE")
        .await
        .json();
    assert_eq!(found["total"], 2);
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let server = test_server();
    let (token, _) = register(&server, "curator").await;
    create_record(&server, &token, "Kind of Blue", "Miles Davis").await;
    create_record(&server, &token, "100% Dynamite", "Various Artists").await;

    let found: Value = server
        .get("/records")
        .add_query_param("search", "_")
        .await
        .json();
    assert_eq!(found["total"], 0);

    let found: Value = server
        .get("/records")
        .add_query_param("search", "0%")
        .await
        .json();
    assert_eq!(found["total"], 1);
    assert_eq!(found["items"][0]["title"], "100% Dynamite");
}

#[tokio::test]
async fn test_deleting_a_record_removes_it_from_collections() {
    let server = test_server();
    let (token, _) = register(&server, "curator").await;
    let record = create_record(&server, &token, "Kind of Blue", "Miles Davis").await;

    server
        .post("/collection")
        .bearer(&token)
        .json(&json!({ "record": record }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .delete(&format!("/records/{}", record))
        .bearer(&token)
        .await
        .assert_status(StatusCode::OK);

    let listed: Value = server.get("/collection").bearer(&token).await.json();
    assert!(listed.as_array().unwrap().is_empty());
}
