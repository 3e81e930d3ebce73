mod memory;
mod query;

pub use memory::MemoryStore;
pub use query::{Collection, Direction, FieldFilter, Query};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// Sentinel value for write payloads: the store replaces any top-level
/// field set to this string with a server-assigned timestamp (seconds).
pub const SERVER_TIMESTAMP: &str = "__server_timestamp__";

/// A raw document as delivered by the remote store: an id plus a loosely
/// typed field map. Typed models coerce out of this at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: &str, data: Value) -> Self {
        Self {
            id: id.to_string(),
            data,
        }
    }

    /// Look up a field by dotted path (e.g. `"metrics.comments"`).
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut current = &self.data;
        for part in path.split('.') {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        self.field(path).and_then(Value::as_str)
    }

    pub fn uint(&self, path: &str) -> Option<u64> {
        self.field(path).and_then(Value::as_u64)
    }

    /// String-array field, dropping non-string elements.
    pub fn text_list(&self, path: &str) -> Vec<String> {
        self.field(path)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Handle for a live query subscription. Every emission is the full
/// current result set for the subscribed query. Dropping or closing the
/// handle detaches the watcher; no further emissions are delivered.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Vec<Document>>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        rx: mpsc::UnboundedReceiver<Vec<Document>>,
        cancel: Box<dyn FnOnce() + Send>,
    ) -> Self {
        Self {
            rx,
            cancel: Some(cancel),
        }
    }

    /// Wait for the next emission. Returns `None` once the subscription
    /// has been released.
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        self.rx.recv().await
    }

    /// Drain all queued emissions without waiting and keep only the most
    /// recent one. Last writer wins per subscription.
    pub fn try_latest(&mut self) -> Option<Vec<Document>> {
        let mut latest = None;
        while let Ok(batch) = self.rx.try_recv() {
            latest = Some(batch);
        }
        latest
    }

    pub fn close(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
        self.rx.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// The remote document store consumed by the query engine and screens.
///
/// String comparisons in range filters and ordering are case-insensitive:
/// the store folds to lowercase before comparing. The feed relies on this
/// for its prefix-range title search.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &Collection, id: &str) -> Result<Option<Document>>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>>;

    /// Matching-document count, applying only the query's filter
    /// predicates (limit and cursor are ignored).
    async fn count(&self, query: &Query) -> Result<u64>;

    /// Append a new document, returning its assigned id. Top-level fields
    /// set to [`SERVER_TIMESTAMP`] are replaced with the store's clock.
    async fn add(&self, collection: &Collection, data: Value) -> Result<String>;

    /// Patch an existing document. Patch keys may be dotted paths into
    /// nested maps (e.g. `"metrics.comments"`).
    async fn update(&self, collection: &Collection, id: &str, patch: Value) -> Result<()>;

    /// Open a live subscription: the current result set is emitted
    /// immediately, then again after every mutation that affects the
    /// collection.
    fn watch(&self, query: &Query) -> Subscription;
}

/// Test double whose every operation fails, for exercising abort paths.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use anyhow::bail;

    pub(crate) struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn get(&self, _: &Collection, _: &str) -> Result<Option<Document>> {
            bail!("offline")
        }
        async fn query(&self, _: &Query) -> Result<Vec<Document>> {
            bail!("offline")
        }
        async fn count(&self, _: &Query) -> Result<u64> {
            bail!("offline")
        }
        async fn add(&self, _: &Collection, _: Value) -> Result<String> {
            bail!("offline")
        }
        async fn update(&self, _: &Collection, _: &str, _: Value) -> Result<()> {
            bail!("offline")
        }
        fn watch(&self, _: &Query) -> Subscription {
            let (_tx, rx) = mpsc::unbounded_channel();
            Subscription::new(rx, Box::new(|| {}))
        }
    }
}
