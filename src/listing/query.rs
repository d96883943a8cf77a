//! Query parameter builder: derives the request descriptor of a list page.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::types::PageSize;

/// Committed or draft filter values keyed by filter name.
pub type FilterValues = BTreeMap<String, String>;

/// Drops blank values and trims the rest so equal filter sets compare equal.
pub fn normalize_filters(values: FilterValues) -> FilterValues {
    values
        .into_iter()
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect()
}

/// Canonical set of parameters that fully determines one list request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryDescriptor {
    pub page: usize,
    pub page_size: PageSize,
    pub search: String,
    pub filters: FilterValues,
    pub sort: Option<String>,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            search: String::new(),
            filters: FilterValues::new(),
            sort: None,
        }
    }
}

impl QueryDescriptor {
    /// Wire parameters: `page_no`, `limit`, optional `search` and `sort`, then filters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page_no".to_string(), self.page.to_string()),
            ("limit".to_string(), self.page_size.get().to_string()),
        ];
        if !self.search.is_empty() {
            params.push(("search".to_string(), self.search.clone()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        params.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        params
    }

    /// Parameters for unpaged requests such as exports.
    pub fn to_unpaged_params(&self) -> Vec<(String, String)> {
        self.to_params()
            .into_iter()
            .filter(|(key, _)| key != "page_no" && key != "limit")
            .collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("page {requested} is outside of 1..={last}")]
pub struct PageOutOfRange {
    pub requested: usize,
    pub last: usize,
}

/// Interactive state a list page derives its [`QueryDescriptor`] from.
///
/// Every setter reports whether the descriptor changed; an unchanged
/// descriptor must not trigger a refetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQueryState {
    page: usize,
    page_size: PageSize,
    search: String,
    filters: FilterValues,
}

impl Default for ListQueryState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            search: String::new(),
            filters: FilterValues::new(),
        }
    }
}

impl ListQueryState {
    /// Console lists keep the backend's order, so `sort` stays unset.
    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            page: self.page.max(1),
            page_size: self.page_size,
            search: self.search.clone(),
            filters: self.filters.clone(),
            sort: None,
        }
    }

    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &FilterValues {
        &self.filters
    }

    /// Folds a (debounced) search term in; a new term goes back to page 1.
    pub fn set_search(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term == self.search {
            return false;
        }
        self.search = term.to_string();
        self.page = 1;
        true
    }

    /// Commits a filter set and goes back to page 1.
    pub fn commit_filters(&mut self, filters: FilterValues) -> bool {
        let before = self.descriptor();
        self.filters = normalize_filters(filters);
        self.page = 1;
        before != self.descriptor()
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> bool {
        if page_size == self.page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }

    /// Moves to `page`, rejecting anything outside `1..=max(1, total_pages)`.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) -> Result<bool, PageOutOfRange> {
        let last = total_pages.max(1);
        if page == 0 || page > last {
            return Err(PageOutOfRange {
                requested: page,
                last,
            });
        }
        let changed = page != self.page;
        self.page = page;
        Ok(changed)
    }

    /// Pulls the current page back inside `1..=max(1, total_pages)`.
    pub fn clamp_to(&mut self, total_pages: usize) -> bool {
        let last = total_pages.max(1);
        if self.page > last {
            self.page = last;
            true
        } else if self.page == 0 {
            self.page = 1;
            true
        } else {
            false
        }
    }
}
