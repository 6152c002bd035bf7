use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
