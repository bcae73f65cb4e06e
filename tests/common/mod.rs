#![allow(dead_code)]

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use tokio::net::TcpListener;

pub const DATA_GOV_KEY: &str = "test-key";

/// Serves `router` on an ephemeral local port and returns its base URL
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A stand-in for data.gov.in and for user JSON APIs
pub fn mock_api() -> Router {
    Router::new()
        .route("/resource/:id", get(resource))
        .route("/secure", get(secure))
        .route(
            "/literacy",
            get(|| async {
                Json(json!([
                    { "state": "Kerala", "rate": 93.91 },
                    { "state": "Punjab", "rate": 76.68 }
                ]))
            }),
        )
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/large",
            get(|| async {
                let padding = vec!["x".repeat(100); 64];
                Json(json!({ "data": padding }))
            }),
        )
}

async fn resource(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if id == "broken" {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if params.get("api-key").map(String::as_str) != Some(DATA_GOV_KEY) {
        return StatusCode::FORBIDDEN.into_response();
    }
    Json(json!({
        "total": 2,
        "limit": params.get("limit"),
        "offset": params.get("offset"),
        "records": [
            { "state": "Kerala", "hospitals": 1280 },
            { "state": "Goa", "hospitals": 145 }
        ]
    }))
    .into_response()
}

async fn secure(headers: HeaderMap) -> Response {
    let api_key = headers.get("api-key").and_then(|v| v.to_str().ok());
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    match (api_key, bearer) {
        (Some("k"), Some("Bearer k")) => {
            Json(json!({ "records": [{ "district": "Pune", "yield": 12.5 }] })).into_response()
        }
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}
