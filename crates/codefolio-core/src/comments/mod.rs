use crate::error::CoreError;
use crate::models::{Comment, Project};
use crate::remote::{
    Collection, Direction, Document, DocumentStore, Query, Subscription, SERVER_TIMESTAMP,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Two-level view of a project's comments: roots in creation order, and
/// replies grouped by their direct parent id, also in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTree {
    pub roots: Vec<Comment>,
    pub replies: HashMap<String, Vec<Comment>>,
}

impl CommentTree {
    pub fn replies_for(&self, parent_id: &str) -> &[Comment] {
        self.replies
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total comments across roots and all reply lists.
    pub fn len(&self) -> usize {
        self.roots.len() + self.replies.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition a creation-ordered flat list into the two-level tree. Every
/// comment lands in exactly one place: the root list when it has no
/// parent, its parent's reply list otherwise.
pub fn assemble(comments: &[Comment]) -> CommentTree {
    let mut tree = CommentTree::default();
    for comment in comments {
        match &comment.parent_id {
            None => tree.roots.push(comment.clone()),
            Some(parent) => tree
                .replies
                .entry(parent.clone())
                .or_default()
                .push(comment.clone()),
        }
    }
    tree
}

/// Live comment thread for exactly one project. The subscription is the
/// sole source of truth: every emission fully replaces the flat list and
/// the derived tree, and posted comments become visible only once the
/// subscription re-delivers the updated set.
pub struct CommentThread<S: DocumentStore> {
    store: Arc<S>,
    project_id: String,
    comments: Vec<Comment>,
    tree: CommentTree,
    subscription: Subscription,
}

impl<S: DocumentStore> CommentThread<S> {
    pub fn open(store: Arc<S>, project_id: &str) -> Self {
        let query = Query::new(Collection::comments(project_id))
            .order_by("created_at", Direction::Ascending);
        let subscription = store.watch(&query);
        Self {
            store,
            project_id: project_id.to_string(),
            comments: Vec::new(),
            tree: CommentTree::default(),
            subscription,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn tree(&self) -> &CommentTree {
        &self.tree
    }

    pub fn live_count(&self) -> u64 {
        self.comments.len() as u64
    }

    /// Apply the most recent queued emission, if any. Intermediate
    /// emissions are discarded: last writer wins.
    pub fn sync(&mut self) -> bool {
        match self.subscription.try_latest() {
            Some(docs) => {
                self.apply(docs);
                true
            }
            None => false,
        }
    }

    /// Wait for the next emission and apply it. Returns false once the
    /// subscription has been released.
    pub async fn next_update(&mut self) -> bool {
        match self.subscription.next().await {
            Some(docs) => {
                self.apply(docs);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, docs: Vec<Document>) {
        self.comments = docs.iter().filter_map(Comment::from_doc).collect();
        self.tree = assemble(&self.comments);
    }

    pub async fn post_root(&self, author_id: Option<&str>, text: &str) -> Result<(), CoreError> {
        self.post(author_id, None, text).await
    }

    pub async fn post_reply(
        &self,
        author_id: Option<&str>,
        parent_id: &str,
        text: &str,
    ) -> Result<(), CoreError> {
        self.post(author_id, Some(parent_id), text).await
    }

    /// Append-only write with a server-assigned timestamp. Rejected
    /// locally, before any remote call, when there is no authenticated
    /// identity or the text is blank. Nothing is applied locally on
    /// success either; the emission does that.
    async fn post(
        &self,
        author_id: Option<&str>,
        parent_id: Option<&str>,
        text: &str,
    ) -> Result<(), CoreError> {
        let author_id = author_id.ok_or(CoreError::NotSignedIn)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::EmptyComment);
        }

        self.store
            .add(
                &Collection::comments(&self.project_id),
                json!({
                    "author_id": author_id,
                    "text": text,
                    "parent_id": parent_id,
                    "created_at": SERVER_TIMESTAMP,
                }),
            )
            .await?;
        Ok(())
    }

    /// Correct the denormalized comment counter when the live count has
    /// drifted from the stored metric. Failures are logged, never
    /// retried, never surfaced.
    pub async fn reconcile_comment_count(&self, project: &Project) {
        let live = self.live_count();
        if live == project.metrics.comments {
            return;
        }
        let patch = json!({ "metrics.comments": live });
        if let Err(err) = self
            .store
            .update(&Collection::Projects, &project.id, patch)
            .await
        {
            warn!(
                "failed to reconcile comment count for {}: {err}",
                project.id
            );
        }
    }

    /// Release the live subscription. Dropping the thread does the same.
    pub fn close(mut self) {
        self.subscription.close();
    }
}
