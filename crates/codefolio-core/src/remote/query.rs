use serde_json::Value;

/// Addressable collections in the remote store. Comments live in a
/// per-project subcollection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Projects,
    Users,
    Comments { project_id: String },
}

impl Collection {
    pub fn comments(project_id: &str) -> Self {
        Collection::Comments {
            project_id: project_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Field equals the given value.
    Eq { field: String, value: Value },
    /// String field is >= the given bound (inclusive).
    Gte { field: String, bound: String },
    /// String field is < the given bound (exclusive).
    Lt { field: String, bound: String },
    /// String-array field shares at least one element with `values`.
    ArrayContainsAny { field: String, values: Vec<String> },
    /// Document id is one of `ids`. Backends cap the list size; see
    /// [`crate::constants::AUTHOR_BATCH_SIZE`].
    IdIn { ids: Vec<String> },
}

/// A composed remote query: filter predicates, one ordering, an optional
/// page limit and an optional start-after cursor (a document id from a
/// previous result set).
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: Collection,
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
    pub start_after: Option<String>,
}

impl Query {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            limit: None,
            start_after: None,
        }
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn where_gte(mut self, field: &str, bound: &str) -> Self {
        self.filters.push(FieldFilter::Gte {
            field: field.to_string(),
            bound: bound.to_string(),
        });
        self
    }

    pub fn where_lt(mut self, field: &str, bound: &str) -> Self {
        self.filters.push(FieldFilter::Lt {
            field: field.to_string(),
            bound: bound.to_string(),
        });
        self
    }

    pub fn where_array_contains_any(mut self, field: &str, values: &[String]) -> Self {
        self.filters.push(FieldFilter::ArrayContainsAny {
            field: field.to_string(),
            values: values.to_vec(),
        });
        self
    }

    pub fn where_id_in(mut self, ids: &[String]) -> Self {
        self.filters.push(FieldFilter::IdIn { ids: ids.to_vec() });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, doc_id: &str) -> Self {
        self.start_after = Some(doc_id.to_string());
        self
    }
}
