use super::{
    Collection, Direction, Document, DocumentStore, FieldFilter, Query, Subscription,
    SERVER_TIMESTAMP,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

struct Watcher {
    query: Query,
    tx: mpsc::UnboundedSender<Vec<Document>>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<Collection, Vec<Document>>,
    watchers: HashMap<u64, Watcher>,
    next_watcher_id: u64,
    clock: u64,
}

/// In-memory document store implementing the full query surface. Used by
/// tests and local development in place of the hosted backend.
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            queries: AtomicUsize::new(0),
        }
    }

    /// Seed or replace a document under a chosen id. Server-timestamp
    /// sentinels are resolved the same way `add` resolves them.
    pub fn insert(&self, collection: &Collection, id: &str, data: Value) {
        let mut inner = self.inner.lock();
        let mut data = data;
        resolve_timestamps(&mut inner, &mut data);
        let docs = inner.collections.entry(collection.clone()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.data = data,
            None => docs.push(Document::new(id, data)),
        }
        notify(&mut inner);
    }

    /// Number of `query` calls issued so far. Batch-size behavior in the
    /// author resolver is asserted against this.
    pub fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &Collection, id: &str) -> Result<Option<Document>> {
        let inner = self.inner.lock();
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        self.queries.fetch_add(1, AtomicOrdering::Relaxed);
        let inner = self.inner.lock();
        Ok(evaluate(&inner, query))
    }

    async fn count(&self, query: &Query) -> Result<u64> {
        let inner = self.inner.lock();
        let docs = match inner.collections.get(&query.collection) {
            Some(docs) => docs.as_slice(),
            None => &[],
        };
        let count = docs
            .iter()
            .filter(|d| query.filters.iter().all(|f| matches(d, f)))
            .count();
        Ok(count as u64)
    }

    async fn add(&self, collection: &Collection, data: Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut inner = self.inner.lock();
        let mut data = data;
        resolve_timestamps(&mut inner, &mut data);
        inner
            .collections
            .entry(collection.clone())
            .or_default()
            .push(Document::new(&id, data));
        notify(&mut inner);
        Ok(id)
    }

    async fn update(&self, collection: &Collection, id: &str, patch: Value) -> Result<()> {
        let patch = match patch {
            Value::Object(map) => map,
            _ => bail!("update patch must be an object"),
        };
        let mut inner = self.inner.lock();
        let doc = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id));
        match doc {
            Some(doc) => {
                for (path, value) in patch {
                    set_path(&mut doc.data, &path, value);
                }
            }
            None => bail!("document {id} not found"),
        }
        notify(&mut inner);
        Ok(())
    }

    fn watch(&self, query: &Query) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        let id = inner.next_watcher_id;
        inner.next_watcher_id += 1;

        let _ = tx.send(evaluate(&inner, query));
        inner.watchers.insert(
            id,
            Watcher {
                query: query.clone(),
                tx,
            },
        );

        let registry = Arc::clone(&self.inner);
        Subscription::new(
            rx,
            Box::new(move || {
                registry.lock().watchers.remove(&id);
            }),
        )
    }
}

/// Strictly increasing server clock: never behind wall time, never
/// repeats, so creation-time ordering is total.
fn next_timestamp(inner: &mut Inner) -> u64 {
    let now = Utc::now().timestamp().max(0) as u64;
    inner.clock = now.max(inner.clock + 1);
    inner.clock
}

fn resolve_timestamps(inner: &mut Inner, data: &mut Value) {
    if let Some(map) = data.as_object_mut() {
        for value in map.values_mut() {
            if value.as_str() == Some(SERVER_TIMESTAMP) {
                *value = Value::from(next_timestamp(inner));
            }
        }
    }
}

/// Re-run every watcher's query against current data and emit the full
/// result set. Watchers whose receiver is gone are pruned.
fn notify(inner: &mut Inner) {
    let snapshots: Vec<(u64, Vec<Document>)> = {
        let inner_ref: &Inner = inner;
        inner_ref
            .watchers
            .iter()
            .map(|(id, w)| (*id, evaluate(inner_ref, &w.query)))
            .collect()
    };
    let mut dead = Vec::new();
    for (id, snapshot) in snapshots {
        if let Some(watcher) = inner.watchers.get(&id) {
            if watcher.tx.send(snapshot).is_err() {
                dead.push(id);
            }
        }
    }
    for id in dead {
        inner.watchers.remove(&id);
    }
}

fn evaluate(inner: &Inner, query: &Query) -> Vec<Document> {
    let docs = match inner.collections.get(&query.collection) {
        Some(docs) => docs.as_slice(),
        None => &[],
    };
    let mut matched: Vec<Document> = docs
        .iter()
        .filter(|d| query.filters.iter().all(|f| matches(d, f)))
        .cloned()
        .collect();

    if let Some((field, direction)) = &query.order_by {
        matched.sort_by(|a, b| {
            let ord = cmp_field(a, b, field);
            match direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });
    }

    // Cursor ids come from an immediately preceding query over the same
    // ordering; an id that no longer matches leaves the page anchored at
    // the start.
    if let Some(after) = &query.start_after {
        if let Some(pos) = matched.iter().position(|d| &d.id == after) {
            matched.drain(..=pos);
        }
    }

    if let Some(limit) = query.limit {
        matched.truncate(limit);
    }
    matched
}

fn matches(doc: &Document, filter: &FieldFilter) -> bool {
    match filter {
        FieldFilter::Eq { field, value } => doc.field(field) == Some(value),
        FieldFilter::Gte { field, bound } => match doc.text(field) {
            Some(text) => text.to_lowercase() >= bound.to_lowercase(),
            None => false,
        },
        FieldFilter::Lt { field, bound } => match doc.text(field) {
            Some(text) => text.to_lowercase() < bound.to_lowercase(),
            None => false,
        },
        FieldFilter::ArrayContainsAny { field, values } => doc
            .text_list(field)
            .iter()
            .any(|tag| values.contains(tag)),
        FieldFilter::IdIn { ids } => ids.contains(&doc.id),
    }
}

fn cmp_field(a: &Document, b: &Document, field: &str) -> Ordering {
    let ord = match (a.field(field), b.field(field)) {
        (Some(x), Some(y)) => cmp_values(x, y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    ord.then_with(|| a.id.cmp(&b.id))
}

fn cmp_values(x: &Value, y: &Value) -> Ordering {
    match (x, y) {
        (Value::String(x), Value::String(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn set_path(data: &mut Value, path: &str, value: Value) {
    let mut value = Some(value);
    let mut parts = path.split('.').peekable();
    let mut current = data;
    while let Some(part) = parts.next() {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        let map = match current.as_object_mut() {
            Some(map) => map,
            None => return,
        };
        if parts.peek().is_none() {
            map.insert(part.to_string(), value.take().unwrap_or(Value::Null));
            return;
        }
        current = map.entry(part.to_string()).or_insert(Value::Null);
    }
}
