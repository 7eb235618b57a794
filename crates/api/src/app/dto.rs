//! Request parsing and response shapes.
//!
//! Bodies are taken as raw bytes and parsed here so that malformed JSON gets
//! the same `{"error", "message"}` shape as every other failure.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use warden_core::{RoleId, UserId};
use warden_query::FilterClause;

use crate::app::errors;

pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()))
}

/// List filter body. An empty body, `null` or `{}` means no filter.
pub fn parse_filter(body: &Bytes) -> Result<Vec<FilterClause>, Response> {
    let invalid = |msg: String| errors::json_error(StatusCode::BAD_REQUEST, "invalid_filter", msg);

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| invalid(e.to_string()))?;
    match &value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => return Ok(Vec::new()),
        Value::Array(_) => {}
        _ => return Err(invalid("filter must be an array of clauses".to_string())),
    }
    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub role_id: Option<RoleId>,
}
