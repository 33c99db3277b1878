use serde_json::{Map, Value};

/// Builder for equality queries over top-level document fields.
///
/// Every filter must match for a document to be returned. Values are
/// compared as JSON, so `eq("isActive", true)` only matches a boolean `true`.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    /// Field equality filters.
    pub filters: Map<String, Value>,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,

    /// Number of documents to skip.
    pub offset: Option<usize>,
}

impl DocumentQuery {
    /// Creates a query matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips a number of results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the document body satisfies every filter.
    pub fn matches(&self, body: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| body.get(field) == Some(expected))
    }

    /// Returns the filters as a JSON object for containment queries.
    pub fn as_containment(&self) -> Value {
        Value::Object(self.filters.clone())
    }
}
