use crate::feed::{self, FeedPage};
use crate::models::{AuthorCard, FilterState};
use crate::remote::DocumentStore;
use crate::store::ProjectStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Feed screen: owns the filter state and the author join for the
/// current page. The project entity store is the app-level container,
/// passed into each intent; every filter mutation resets pagination to
/// page 1 before refetching.
pub struct FeedScreen<S: DocumentStore> {
    store: Arc<S>,
    filter: FilterState,
    authors: HashMap<String, AuthorCard>,
}

impl<S: DocumentStore> FeedScreen<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            filter: FilterState::default(),
            authors: HashMap::new(),
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn authors(&self) -> &HashMap<String, AuthorCard> {
        &self.authors
    }

    /// Author handle for display. An unresolved author shows its raw id.
    pub fn author_handle<'a>(&'a self, author_id: &'a str) -> &'a str {
        match self.authors.get(author_id) {
            Some(card) if !card.handle.is_empty() => &card.handle,
            _ => author_id,
        }
    }

    pub async fn set_search(&mut self, projects: &mut ProjectStore, term: &str) {
        if self.filter.set_search(term) {
            projects.pagination.reset();
            self.refresh(projects).await;
        }
    }

    pub async fn toggle_tag(&mut self, projects: &mut ProjectStore, tag: &str) {
        self.filter.toggle_tag(tag);
        projects.pagination.reset();
        self.refresh(projects).await;
    }

    pub async fn clear_filters(&mut self, projects: &mut ProjectStore) {
        if self.filter.clear() {
            projects.pagination.reset();
            self.refresh(projects).await;
        }
    }

    pub async fn set_page(&mut self, projects: &mut ProjectStore, page: usize) {
        projects.set_page(page);
        self.refresh(projects).await;
    }

    /// Run the query engine for the current filter and page, committing
    /// the result (or the failure) into the entity store.
    pub async fn refresh(&mut self, projects: &mut ProjectStore) {
        projects.begin_load();
        let page = projects.pagination.current_page;
        let page_size = projects.pagination.page_size;
        match feed::fetch_feed_page(self.store.as_ref(), &self.filter, page, page_size).await {
            Ok(FeedPage {
                projects: rows,
                authors,
                total,
            }) => {
                self.authors = authors;
                projects.commit_page(rows, total);
            }
            Err(err) => projects.fail(format!("failed to load projects: {err}")),
        }
    }
}
