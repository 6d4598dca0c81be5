//! Request and response types for source and search index operations.

use chrono::{DateTime, FixedOffset};
use serde_json::{json, Map, Value};

/// Parameters of one bounded "changed since" fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchParams {
    /// Only rows with `modified > dttm` are returned.
    pub dttm: DateTime<FixedOffset>,
    /// Maximum number of rows in the returned batch.
    pub page_size: usize,
}

impl FetchParams {
    pub fn new(dttm: DateTime<FixedOffset>, page_size: usize) -> Self {
        Self { dttm, page_size }
    }
}

/// Result of a single item within a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResult {
    /// The document id addressed by the item.
    pub id: String,
    /// HTTP-like status reported for the item.
    pub status: u16,
    /// Error reason if the item failed.
    pub error: Option<String>,
}

impl BulkItemResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Parsed response of a bulk upsert request.
///
/// Exposes the engine's top-level error indicator alongside the per-item
/// results so callers can tell full success from partial failure.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResponse {
    /// Time the engine spent on the request, in milliseconds.
    pub took_ms: u64,
    /// Top-level flag set by the engine when any item failed.
    pub errors: bool,
    /// Individual results, in request order.
    pub items: Vec<BulkItemResult>,
}

impl BulkResponse {
    /// Parse the JSON body returned by the bulk endpoint.
    ///
    /// Item entries look like `{"index": {"_id": "...", "status": 201}}`
    /// with an optional `error` object carrying `type` and `reason`.
    pub fn from_json(body: &Value) -> Option<Self> {
        let took_ms = body.get("took").and_then(Value::as_u64).unwrap_or(0);
        let errors = body.get("errors")?.as_bool()?;
        let items = body
            .get("items")?
            .as_array()?
            .iter()
            .filter_map(|item| {
                let action = item.as_object()?.values().next()?;
                let id = action.get("_id")?.as_str()?.to_string();
                let status = action.get("status").and_then(Value::as_u64).unwrap_or(0) as u16;
                let error = action.get("error").map(|err| {
                    let kind = err.get("type").and_then(Value::as_str).unwrap_or("unknown");
                    let reason = err.get("reason").and_then(Value::as_str).unwrap_or("");
                    format!("{}: {}", kind, reason)
                });
                Some(BulkItemResult { id, status, error })
            })
            .collect();

        Some(Self {
            took_ms,
            errors,
            items,
        })
    }

    /// Items that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BulkItemResult> {
        self.items.iter().filter(|item| !item.is_success())
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.is_success()).count()
    }
}

/// Sort order for read queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    /// Parse a `field` / `-field` sort expression.
    pub fn parse(expr: &str) -> Option<Self> {
        let trimmed = expr.trim();
        let (field, descending) = match trimmed.strip_prefix('-') {
            Some(field) => (field, true),
            None => (trimmed, false),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            descending,
        })
    }

    fn to_json(&self) -> Value {
        let order = if self.descending { "desc" } else { "asc" };
        let mut clause = Map::new();
        clause.insert(self.field.clone(), json!(order));
        json!([clause])
    }
}

/// A search request against one index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// The `query` clause.
    pub query: Value,
    pub sort: Option<SortSpec>,
    pub from: usize,
    pub size: usize,
}

impl SearchRequest {
    /// Render the request body sent to the engine.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.clone());
        if let Some(sort) = &self.sort {
            body.insert("sort".to_string(), sort.to_json());
        }
        body.insert("from".to_string(), json!(self.from));
        body.insert("size".to_string(), json!(self.size));
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bulk_response_with_partial_failure() {
        let body = json!({
            "took": 30,
            "errors": true,
            "items": [
                { "index": { "_index": "movies", "_id": "a", "status": 201 } },
                { "index": { "_index": "movies", "_id": "b", "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse field [imdb_rating]" } } },
                { "index": { "_index": "movies", "_id": "c", "status": 200 } }
            ]
        });

        let response = BulkResponse::from_json(&body).unwrap();
        assert_eq!(response.took_ms, 30);
        assert!(response.errors);
        assert_eq!(response.items.len(), 3);
        assert_eq!(response.succeeded(), 2);

        let failures: Vec<_> = response.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, "b");
        assert_eq!(
            failures[0].error.as_deref(),
            Some("mapper_parsing_exception: failed to parse field [imdb_rating]")
        );
    }

    #[test]
    fn test_parse_bulk_response_rejects_unknown_shape() {
        assert!(BulkResponse::from_json(&json!({ "error": "bad request" })).is_none());
    }

    #[test]
    fn test_sort_spec_parse() {
        assert_eq!(
            SortSpec::parse("-imdb_rating"),
            Some(SortSpec {
                field: "imdb_rating".to_string(),
                descending: true
            })
        );
        assert_eq!(SortSpec::parse("imdb_rating").map(|s| s.descending), Some(false));
        assert_eq!(SortSpec::parse("-"), None);
    }

    #[test]
    fn test_search_request_body() {
        let request = SearchRequest {
            query: json!({ "match_all": {} }),
            sort: SortSpec::parse("-imdb_rating"),
            from: 50,
            size: 50,
        };

        let body = request.to_body();
        assert_eq!(body["from"], 50);
        assert_eq!(body["size"], 50);
        assert_eq!(body["sort"][0]["imdb_rating"], "desc");
        assert!(body["query"]["match_all"].is_object());
    }
}
