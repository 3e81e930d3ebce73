use crate::comments::{CommentThread, CommentTree};
use crate::error::CoreError;
use crate::feed;
use crate::models::AuthorCard;
use crate::remote::DocumentStore;
use crate::store::ProjectStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Project detail screen: the direct project fetch plus the live comment
/// thread and the author join for its comments. Dropping the screen
/// releases the comment subscription.
pub struct ProjectDetailScreen<S: DocumentStore> {
    store: Arc<S>,
    thread: CommentThread<S>,
    comment_authors: HashMap<String, AuthorCard>,
}

impl<S: DocumentStore> ProjectDetailScreen<S> {
    pub fn open(store: Arc<S>, project_id: &str) -> Self {
        let thread = CommentThread::open(Arc::clone(&store), project_id);
        Self {
            store,
            thread,
            comment_authors: HashMap::new(),
        }
    }

    /// Fetch the project into the entity store. A missing document is a
    /// terminal failure for this fetch.
    pub async fn load(&self, projects: &mut ProjectStore) {
        projects.begin_load();
        match feed::fetch_project(self.store.as_ref(), self.thread.project_id()).await {
            Ok(project) => projects.commit_one(project),
            Err(err) => projects.fail(err.to_string()),
        }
    }

    pub fn tree(&self) -> &CommentTree {
        self.thread.tree()
    }

    pub fn live_comment_count(&self) -> u64 {
        self.thread.live_count()
    }

    /// Comment author handle for display, falling back to the raw id.
    pub fn comment_author_handle<'a>(&'a self, author_id: &'a str) -> &'a str {
        match self.comment_authors.get(author_id) {
            Some(card) if !card.handle.is_empty() => &card.handle,
            _ => author_id,
        }
    }

    /// Wait for the next comment emission, then refresh the author join
    /// and reconcile the stored comment counter against the live count.
    pub async fn next_comment_update(&mut self, projects: &ProjectStore) -> bool {
        if !self.thread.next_update().await {
            return false;
        }
        self.refresh_comment_authors().await;
        if let Some(project) = projects.selected_project() {
            self.thread.reconcile_comment_count(project).await;
        }
        true
    }

    async fn refresh_comment_authors(&mut self) {
        let mut ids: Vec<String> = self
            .thread
            .comments()
            .iter()
            .map(|c| c.author_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            self.comment_authors.clear();
            return;
        }
        match feed::resolve_authors(self.store.as_ref(), &ids).await {
            Ok(authors) => self.comment_authors = authors,
            Err(err) => warn!("failed to resolve comment authors: {err}"),
        }
    }

    pub async fn post_root(&self, author_id: Option<&str>, text: &str) -> Result<(), CoreError> {
        self.thread.post_root(author_id, text).await
    }

    pub async fn post_reply(
        &self,
        author_id: Option<&str>,
        parent_id: &str,
        text: &str,
    ) -> Result<(), CoreError> {
        self.thread.post_reply(author_id, parent_id, text).await
    }

    pub fn close(self) {
        self.thread.close();
    }
}
