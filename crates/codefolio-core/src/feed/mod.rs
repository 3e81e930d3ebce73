mod authors;

pub use authors::resolve_authors;

use crate::constants::TITLE_RANGE_SENTINEL;
use crate::error::CoreError;
use crate::models::{AuthorCard, FilterState, Project};
use crate::remote::{Collection, Direction, DocumentStore, Query};
use anyhow::Result;
use std::collections::HashMap;
use tracing::{instrument, warn};

/// One resolved feed page: the exact page of projects, the author join
/// rows for them, and the authoritative matching total.
#[derive(Debug)]
pub struct FeedPage {
    pub projects: Vec<Project>,
    pub authors: HashMap<String, AuthorCard>,
    pub total: u64,
}

/// Filter predicates and ordering shared by the count, cursor-discovery
/// and page queries. Tags filter with any-of semantics; a search term
/// becomes a half-open prefix range on the title. Title ascending is
/// required by the range and doubles as the stable default order.
fn base_query(filter: &FilterState) -> Query {
    let mut query = Query::new(Collection::Projects);
    if !filter.tags().is_empty() {
        query = query.where_array_contains_any("tags", filter.tags());
    }
    if !filter.search().is_empty() {
        let lower = filter.search();
        let upper = format!("{lower}{TITLE_RANGE_SENTINEL}");
        query = query.where_gte("title", lower).where_lt("title", &upper);
    }
    query.order_by("title", Direction::Ascending)
}

/// Resolve one page of the project feed. The backend has no offsets, so
/// page N is reached by fetching the first (N-1)*page_size documents to
/// discover the cursor, then the page itself strictly after it; page 1
/// skips the cursor step. Any query failure aborts the whole operation.
#[instrument(skip(store, filter))]
pub async fn fetch_feed_page<S: DocumentStore>(
    store: &S,
    filter: &FilterState,
    page: usize,
    page_size: usize,
) -> Result<FeedPage> {
    let total = store.count(&base_query(filter)).await?;

    let skip = page.saturating_sub(1) * page_size;
    let mut page_query = base_query(filter).limit(page_size);
    if skip > 0 {
        let leading = store.query(&base_query(filter).limit(skip)).await?;
        if let Some(last) = leading.last() {
            page_query = page_query.start_after(&last.id);
        }
    }

    let docs = store.query(&page_query).await?;
    let projects: Vec<Project> = docs
        .iter()
        .filter_map(|doc| {
            let parsed = Project::from_doc(doc);
            if parsed.is_none() {
                warn!("skipping malformed project document {}", doc.id);
            }
            parsed
        })
        .collect();

    let mut author_ids: Vec<String> = projects.iter().map(|p| p.author_id.clone()).collect();
    author_ids.sort();
    author_ids.dedup();
    let authors = resolve_authors(store, &author_ids).await?;

    Ok(FeedPage {
        projects,
        authors,
        total,
    })
}

/// Direct single-project fetch for the detail page.
pub async fn fetch_project<S: DocumentStore>(store: &S, id: &str) -> Result<Project, CoreError> {
    match store.get(&Collection::Projects, id).await? {
        Some(doc) => Project::from_doc(&doc).ok_or_else(|| CoreError::Query {
            message: format!("malformed project document {id}"),
        }),
        None => Err(CoreError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::testing::FailingStore;
    use crate::remote::MemoryStore;
    use serde_json::json;

    fn seed_project(store: &MemoryStore, id: &str, title: &str, tags: &[&str], author: &str) {
        store.insert(
            &Collection::Projects,
            id,
            json!({
                "title": title,
                "description": "",
                "image": "",
                "tags": tags,
                "author_id": author,
                "metrics": { "code_views": 0, "comments": 0, "shares": 0 }
            }),
        );
    }

    fn seed_user(store: &MemoryStore, id: &str, handle: &str) {
        store.insert(&Collection::Users, id, json!({ "user": handle }));
    }

    /// Ten projects with titles that sort in id order, all by one author.
    fn seed_ten(store: &MemoryStore) {
        seed_user(store, "u1", "ada");
        for i in 0..10 {
            seed_project(
                store,
                &format!("p{i}"),
                &format!("project {i:02}"),
                &["React"],
                "u1",
            );
        }
    }

    #[tokio::test]
    async fn test_first_page_of_ten() {
        let store = MemoryStore::new();
        seed_ten(&store);

        let page = fetch_feed_page(&store, &FilterState::default(), 1, 4)
            .await
            .unwrap();
        assert_eq!(page.total, 10);
        assert_eq!(page.projects.len(), 4);
        let titles: Vec<&str> = page.projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["project 00", "project 01", "project 02", "project 03"]
        );
        assert_eq!(page.authors["u1"].handle, "ada");
    }

    #[tokio::test]
    async fn test_later_pages_use_cursor() {
        let store = MemoryStore::new();
        seed_ten(&store);

        let page2 = fetch_feed_page(&store, &FilterState::default(), 2, 4)
            .await
            .unwrap();
        let titles: Vec<&str> = page2.projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["project 04", "project 05", "project 06", "project 07"]
        );

        let page3 = fetch_feed_page(&store, &FilterState::default(), 3, 4)
            .await
            .unwrap();
        assert_eq!(page3.projects.len(), 2);
        assert_eq!(page3.total, 10);
    }

    #[tokio::test]
    async fn test_same_page_twice_is_deterministic() {
        let store = MemoryStore::new();
        seed_ten(&store);

        let filter = FilterState::default();
        let first = fetch_feed_page(&store, &filter, 2, 4).await.unwrap();
        let second = fetch_feed_page(&store, &filter, 2, 4).await.unwrap();

        let ids = |page: &FeedPage| {
            page.projects
                .iter()
                .map(|p| p.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.total, second.total);
    }

    #[tokio::test]
    async fn test_search_matches_prefix_case_insensitively() {
        let store = MemoryStore::new();
        seed_user(&store, "u1", "ada");
        seed_project(&store, "p1", "React Starter", &[], "u1");
        seed_project(&store, "p2", "realtime board", &[], "u1");
        seed_project(&store, "p3", "axum service", &[], "u1");

        let mut filter = FilterState::default();
        filter.set_search("Rea");

        let page = fetch_feed_page(&store, &filter, 1, 4).await.unwrap();
        let titles: Vec<&str> = page.projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["React Starter", "realtime board"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_tags_filter_any_of() {
        let store = MemoryStore::new();
        seed_user(&store, "u1", "ada");
        seed_project(&store, "p1", "a", &["React"], "u1");
        seed_project(&store, "p2", "b", &["Back-End"], "u1");
        seed_project(&store, "p3", "c", &["Accessibility", "React"], "u1");

        let mut filter = FilterState::default();
        filter.toggle_tag("React");
        filter.toggle_tag("Accessibility");

        let page = fetch_feed_page(&store, &filter, 1, 10).await.unwrap();
        let ids: Vec<&str> = page.projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn test_tags_and_search_compose_in_one_query() {
        let store = MemoryStore::new();
        seed_user(&store, "u1", "ada");
        seed_project(&store, "p1", "React Starter", &["React"], "u1");
        seed_project(&store, "p2", "React Router demo", &["Back-End"], "u1");
        seed_project(&store, "p3", "realtime board", &["React"], "u1");

        let mut filter = FilterState::default();
        filter.toggle_tag("React");
        filter.set_search("react");

        let page = fetch_feed_page(&store, &filter, 1, 10).await.unwrap();
        let ids: Vec<&str> = page.projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1"]);
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_malformed_documents_skipped() {
        let store = MemoryStore::new();
        seed_user(&store, "u1", "ada");
        seed_project(&store, "p1", "good", &[], "u1");
        store.insert(&Collection::Projects, "p2", json!({ "title": "no author" }));

        let page = fetch_feed_page(&store, &FilterState::default(), 1, 10)
            .await
            .unwrap();
        assert_eq!(page.projects.len(), 1);
        // The count query still sees the raw document
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_fetch_project_not_found() {
        let store = MemoryStore::new();
        let err = fetch_project(&store, "nope").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
    }

    #[tokio::test]
    async fn test_fetch_project_found() {
        let store = MemoryStore::new();
        seed_project(&store, "p1", "React Starter", &["React"], "u1");

        let project = fetch_project(&store, "p1").await.unwrap();
        assert_eq!(project.title, "React Starter");
        assert_eq!(project.author_id, "u1");
    }

    #[tokio::test]
    async fn test_any_query_failure_aborts() {
        let err = fetch_feed_page(&FailingStore, &FilterState::default(), 1, 4)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("offline"));
    }
}
