use crate::auth::{resolve_user_id, Identity};
use crate::models::{Project, UserProfile};
use crate::remote::{Collection, Direction, Document, DocumentStore, Query, Subscription};
use anyhow::Result;
use std::sync::Arc;

/// Profile screen: the viewed user's public record plus a live list of
/// their projects. One author-equality subscription; every emission
/// fully replaces the list. Dropping the screen releases it.
pub struct ProfileScreen {
    user_id: String,
    profile: UserProfile,
    projects: Vec<Project>,
    loading: bool,
    subscription: Subscription,
}

impl ProfileScreen {
    /// Resolve the identity to its user record, load the profile (or
    /// synthesize a fallback when no document exists), and open the live
    /// projects subscription.
    pub async fn open<S: DocumentStore>(store: Arc<S>, identity: &Identity) -> Result<Self> {
        let user_id = resolve_user_id(store.as_ref(), identity).await?;
        let profile = match store.get(&Collection::Users, &user_id).await? {
            Some(doc) => UserProfile::from_doc(&doc)
                .unwrap_or_else(|| UserProfile::fallback(&user_id, identity)),
            None => UserProfile::fallback(&user_id, identity),
        };

        let query = Query::new(Collection::Projects)
            .where_eq("author_id", user_id.as_str())
            .order_by("title", Direction::Ascending);
        let subscription = store.watch(&query);

        Ok(Self {
            user_id,
            profile,
            projects: Vec::new(),
            loading: true,
            subscription,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
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

    /// Apply the most recent queued emission, if any.
    pub fn sync(&mut self) -> bool {
        match self.subscription.try_latest() {
            Some(docs) => {
                self.apply(docs);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, docs: Vec<Document>) {
        self.projects = docs.iter().filter_map(Project::from_doc).collect();
        self.loading = false;
    }

    pub fn close(mut self) {
        self.subscription.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;
    use serde_json::json;

    fn identity() -> Identity {
        Identity {
            uid: "provider-uid".to_string(),
            email: Some("ada@example.com".to_string()),
            display_name: Some("Ada".to_string()),
        }
    }

    fn seeded_store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert(
            &Collection::Users,
            "u1",
            json!({ "user": "ada", "name": "Ada Hernández", "email": "ada@example.com" }),
        );
        store.insert(
            &Collection::Projects,
            "p1",
            json!({ "title": "React Starter", "author_id": "u1" }),
        );
        store.insert(
            &Collection::Projects,
            "p2",
            json!({ "title": "axum service", "author_id": "someone-else" }),
        );
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_open_resolves_profile_and_own_projects() {
        let store = seeded_store();
        let mut screen = ProfileScreen::open(Arc::clone(&store), &identity())
            .await
            .unwrap();
        assert_eq!(screen.user_id(), "u1");
        assert_eq!(screen.profile().handle, "ada");
        assert!(screen.is_loading());

        assert!(screen.next_update().await);
        assert!(!screen.is_loading());
        assert_eq!(screen.project_count(), 1);
        assert_eq!(screen.projects()[0].id, "p1");
    }

    #[tokio::test]
    async fn test_missing_user_doc_synthesizes_fallback() {
        let store = Arc::new(MemoryStore::new());
        let screen = ProfileScreen::open(store, &identity()).await.unwrap();

        // No users document: resolution falls back to the provider uid
        assert_eq!(screen.user_id(), "provider-uid");
        assert_eq!(screen.profile().handle, "Ada");
        assert_eq!(screen.profile().display_label(), "Ada");
    }

    #[tokio::test]
    async fn test_live_updates_replace_project_list() {
        let store = seeded_store();
        let mut screen = ProfileScreen::open(Arc::clone(&store), &identity())
            .await
            .unwrap();
        screen.next_update().await;
        assert_eq!(screen.project_count(), 1);

        store.insert(
            &Collection::Projects,
            "p3",
            json!({ "title": "another one", "author_id": "u1" }),
        );
        assert!(screen.next_update().await);
        assert_eq!(screen.project_count(), 2);
    }

    #[tokio::test]
    async fn test_close_releases_subscription() {
        let store = seeded_store();
        let mut screen = ProfileScreen::open(Arc::clone(&store), &identity())
            .await
            .unwrap();
        screen.next_update().await;

        screen.subscription.close();
        store.insert(
            &Collection::Projects,
            "p4",
            json!({ "title": "late", "author_id": "u1" }),
        );
        assert!(!screen.sync());
        assert!(!screen.next_update().await);
    }
}
