//! OpenSearch query builders.
//!
//! This module provides functions to build the read queries used by the
//! catalog query services: listing, single-field search and nested relation
//! filters, combined with sorting and offset pagination.

use serde_json::{json, Value};

use crate::types::{SearchRequest, SortSpec};

/// Deepest hit reachable with `from`/`size` paging (the engine's default
/// `index.max_result_window`).
pub const MAX_RESULT_WINDOW: usize = 10_000;

/// Offset pagination: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    pub fn new(number: usize, size: usize) -> Self {
        Self { number, size }
    }

    /// Index of the first hit of the page.
    ///
    /// Page numbers below 1 are treated as the first page. Saturates instead
    /// of overflowing; use [`Page::end`] to check the page is reachable.
    pub fn offset(&self) -> usize {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }

    /// Index one past the last hit of the page, `None` on overflow.
    pub fn end(&self) -> Option<usize> {
        self.number.checked_mul(self.size)
    }

    /// Whether the whole page lies within [`MAX_RESULT_WINDOW`].
    pub fn within_result_window(&self) -> bool {
        matches!(self.end(), Some(end) if end <= MAX_RESULT_WINDOW)
    }
}

/// Match every document.
pub fn match_all() -> Value {
    json!({ "match_all": {} })
}

/// Full-text match on a single field.
pub fn field_match(field: &str, text: &str) -> Value {
    json!({
        "match": {
            field: {
                "query": text
            }
        }
    })
}

/// Match documents whose nested relation at `path` has the given id.
///
/// Used for the genre filter on films (`genres.id`).
pub fn nested_id_match(path: &str, id: &str) -> Value {
    json!({
        "nested": {
            "path": path,
            "query": {
                "bool": {
                    "should": [
                        { "match": { format!("{}.id", path): id } }
                    ]
                }
            }
        }
    })
}

/// Build a paginated, optionally sorted search request.
pub fn build_search_request(query: Value, sort: Option<SortSpec>, page: Page) -> SearchRequest {
    SearchRequest {
        query,
        sort,
        from: page.offset(),
        size: page.size,
    }
}

/// Build the film listing request, filtered by genre when one is given.
pub fn build_film_list_request(sort: Option<SortSpec>, genre: Option<&str>, page: Page) -> SearchRequest {
    let query = match genre {
        Some(genre_id) if !genre_id.is_empty() => nested_id_match("genres", genre_id),
        _ => match_all(),
    };
    build_search_request(query, sort, page)
}
