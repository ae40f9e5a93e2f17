use serde::Serialize;
use serde_json::{Map, Value};
use axum::Json;
use axum::http::StatusCode;

use crate::error::ErrorResponse;

/// `{ "<name>": value }` with status 200.
pub fn field(name: &str, value: impl Into<Value>) -> (StatusCode, Json<Value>) {
    let mut body = Map::new();
    body.insert(name.to_string(), value.into());
    (StatusCode::OK, Json(Value::Object(body)))
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
