//! Shared helpers for the HTTP tests

#![allow(dead_code)]

use axum::http::{HeaderValue, header::AUTHORIZATION};
use axum_test::{TestRequest, TestServer};
use phono_api::{AppState, jwt::JwtService, routes::create_router};
use serde_json::{Value, json};

pub const SECRET: &str = "integration-test-secret-long-enough-for-hs256";
pub const PASSWORD: &str = "Needle-Drop9";

pub fn test_server() -> TestServer {
    let jwt_service = JwtService::new(SECRET, 3600).expect("valid test secret");
    let app = create_router(AppState::in_memory(jwt_service));
    TestServer::new(app).expect("test server")
}

pub trait Authorized {
    fn bearer(self, token: &str) -> Self;
}

impl Authorized for TestRequest {
    fn bearer(self, token: &str) -> Self {
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).expect("header value");
        self.add_header(AUTHORIZATION, value)
    }
}

/// Register a user and return its access token and id
pub async fn register(server: &TestServer, username: &str) -> (String, String) {
    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{}@phono.app", username),
            "password": PASSWORD,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: Value = response.json();
    (
        body["accessToken"].as_str().expect("token").to_string(),
        body["user"]["id"].as_str().expect("user id").to_string(),
    )
}

/// Create a catalog record and return its id
pub async fn create_record(server: &TestServer, token: &str, title: &str, artist: &str) -> String {
    let response = server
        .post("/records")
        .bearer(token)
        .json(&json!({ "title": title, "artist": artist }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: Value = response.json();
    body["id"].as_str().expect("record id").to_string()
}
