//! DTOs exposed by the JSON API endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::row::Row;
use crate::listing::query::FilterValues;

/// Query parameters accepted by `/api/v1/{resource}`. Anything else is
/// treated as a filter. Numbers stay strings because flattened maps only
/// carry strings.
#[derive(Debug, Default, Deserialize)]
pub struct ListApiQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    #[serde(flatten)]
    pub filters: FilterValues,
}

/// Result payload returned by [`crate::services::api::list_json`].
#[derive(Debug, Serialize)]
pub struct ListApiResponse {
    pub data: Vec<Row>,
    pub total_count: usize,
    pub page: usize,
    pub total_pages: usize,
}
