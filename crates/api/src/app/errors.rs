use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use warden_core::DomainError;
use warden_infra::StoreError;
use warden_query::{FilterError, PagingError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn not_found(entity: &str) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{entity} not found"))
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(entity) => not_found(entity),
        StoreError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, "conflict", msg),
        StoreError::Filter(e) => filter_error_to_response(e),
        StoreError::InvalidSort(field) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_sort",
            format!("cannot sort by '{field}'"),
        ),
        StoreError::Backend(msg) => {
            error!(error = %msg, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn filter_error_to_response(err: FilterError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_filter", err.to_string())
}

pub fn paging_error_to_response(err: PagingError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_paging", err.to_string())
}
