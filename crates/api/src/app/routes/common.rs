//! Handler building blocks shared by the CRUD resources.

use core::str::FromStr;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use warden_core::DomainError;
use warden_infra::{Repository, Table};
use warden_query::{compile, ListParams, Page, Predicate};

use crate::app::{dto, errors};

pub fn parse_id<I>(raw: &str) -> Result<I, Response>
where
    I: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}

pub fn respond<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

/// Filter body + paging query → one page of rows.
pub async fn list<T>(repo: &dyn Repository<T>, params: ListParams, body: &Bytes) -> Response
where
    T: Table + Serialize,
{
    let clauses = match dto::parse_filter(body) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let predicate = match compile(&clauses) {
        Ok(p) => p,
        Err(e) => return errors::filter_error_to_response(e),
    };
    let page = match params.into_request() {
        Ok(p) => p,
        Err(e) => return errors::paging_error_to_response(e),
    };

    match repo.find_and_count(&predicate, &page).await {
        Ok((rows, total)) => respond(StatusCode::OK, Page::new(rows, total, &page)),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Load a row or produce the 404/500 response.
pub async fn load<T: Table>(repo: &dyn Repository<T>, id: Uuid) -> Result<T, Response> {
    match repo.get(id).await {
        Ok(Some(row)) => Ok(row),
        Ok(None) => Err(errors::not_found(T::ENTITY)),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

/// 404 unless a row with `id` exists.
pub async fn ensure_exists<T: Table>(repo: &dyn Repository<T>, id: Uuid) -> Result<(), Response> {
    load(repo, id).await.map(|_| ())
}

/// 400 while any row of `T` still points at `id` through `field`.
pub async fn ensure_unreferenced<T: Table>(
    repo: &dyn Repository<T>,
    field: &str,
    id: Uuid,
    referenced: &str,
) -> Result<(), Response> {
    match repo.find_one(&Predicate::all().and_eq(field, id.to_string())).await {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "conflict",
            format!("{referenced} is still referenced by a {}", T::ENTITY),
        )),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

pub async fn fetch<T>(repo: &dyn Repository<T>, id: Uuid) -> Response
where
    T: Table + Serialize,
{
    match load(repo, id).await {
        Ok(row) => respond(StatusCode::OK, row),
        Err(resp) => resp,
    }
}

pub async fn create<T>(repo: &dyn Repository<T>, row: T) -> Response
where
    T: Table + Serialize,
{
    match repo.insert(row).await {
        Ok(row) => respond(StatusCode::CREATED, row),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn save<T>(repo: &dyn Repository<T>, row: T) -> Response
where
    T: Table + Serialize,
{
    match repo.update(row).await {
        Ok(row) => respond(StatusCode::OK, row),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn remove<T: Table>(repo: &dyn Repository<T>, id: Uuid) -> Response {
    match repo.delete(id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
