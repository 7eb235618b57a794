//! Paging and sorting for list endpoints.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 1000;
pub const DEFAULT_PAGE: u64 = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PagingError {
    #[error("invalid limit '{0}': expected a positive integer")]
    InvalidLimit(String),

    #[error("invalid page '{0}': expected a positive integer")]
    InvalidPage(String),

    #[error("invalid sortBy '{0}': expected 'field' or 'field:asc|desc'")]
    InvalidSort(String),
}

/// Raw list query parameters. Kept as strings so malformed values surface as
/// [`PagingError`] instead of a generic extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl ListParams {
    pub fn into_request(self) -> Result<PageRequest, PagingError> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => positive(raw).ok_or_else(|| PagingError::InvalidLimit(raw.to_string()))?,
        };
        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PAGE,
            Some(raw) => positive(raw).ok_or_else(|| PagingError::InvalidPage(raw.to_string()))?,
        };
        let sort = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse()?),
        };
        Ok(PageRequest::new(page, limit).with_sort(sort))
    }
}

fn positive(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|n| *n >= 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// `field[:asc|desc]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub field: String,
    pub direction: SortDirection,
}

impl FromStr for SortBy {
    type Err = PagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PagingError::InvalidSort(s.to_string());
        let (field, direction) = match s.split_once(':') {
            None => (s, SortDirection::Asc),
            Some((field, dir)) => {
                let direction = match dir.trim().to_ascii_lowercase().as_str() {
                    "" | "asc" => SortDirection::Asc,
                    "desc" => SortDirection::Desc,
                    _ => return Err(invalid()),
                };
                (field, direction)
            }
        };
        let field = field.trim();
        if field.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Validated paging request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub sort: Option<SortBy>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

impl PageRequest {
    /// Page and limit are floored at 1; limit is capped at [`MAX_LIMIT`].
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: Option<SortBy>) -> Self {
        self.sort = sort;
        self
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_results: u64,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub paging: Paging,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, total_results: u64, request: &PageRequest) -> Self {
        Self {
            results,
            paging: Paging {
                page: request.page,
                limit: request.limit,
                total_pages: total_results.div_ceil(request.limit),
                total_results,
            },
        }
    }
}
