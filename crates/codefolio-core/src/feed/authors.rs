use crate::constants::AUTHOR_BATCH_SIZE;
use crate::models::AuthorCard;
use crate::remote::{Collection, DocumentStore, Query};
use anyhow::Result;
use std::collections::HashMap;

/// Fetch public display records for a set of author ids. The backend
/// caps id-membership queries at [`AUTHOR_BATCH_SIZE`] ids, so the input
/// is partitioned and the chunk results merged; ids with no matching
/// record are simply absent from the map.
pub async fn resolve_authors<S: DocumentStore>(
    store: &S,
    ids: &[String],
) -> Result<HashMap<String, AuthorCard>> {
    let mut authors = HashMap::new();
    for chunk in ids.chunks(AUTHOR_BATCH_SIZE) {
        let query = Query::new(Collection::Users).where_id_in(chunk);
        for doc in store.query(&query).await? {
            authors.insert(doc.id.clone(), AuthorCard::from_doc(&doc));
        }
    }
    Ok(authors)
}
