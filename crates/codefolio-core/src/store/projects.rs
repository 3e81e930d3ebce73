use super::{Pagination, RequestStatus};
use crate::models::Project;
use std::collections::HashMap;

/// Normalized cache of project entities plus request metadata for the
/// fetch that produced them. Mutated only through the transitions below:
/// a feed fetch replaces the whole page, a single-project fetch upserts.
pub struct ProjectStore {
    entities: HashMap<String, Project>,
    order: Vec<String>,
    pub status: RequestStatus,
    pub error: Option<String>,
    pub selected: Option<String>,
    pub pagination: Pagination,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_PAGE_SIZE)
    }
}

impl ProjectStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            entities: HashMap::new(),
            order: Vec::new(),
            status: RequestStatus::Idle,
            error: None,
            selected: None,
            pagination: Pagination::new(page_size),
        }
    }

    pub fn begin_load(&mut self) {
        self.status = RequestStatus::Loading;
        self.error = None;
    }

    /// Commit a fetched feed page: the cached set becomes exactly this
    /// page, and the count-query total becomes authoritative.
    pub fn commit_page(&mut self, projects: Vec<Project>, total: u64) {
        self.entities.clear();
        self.order.clear();
        for project in projects {
            self.order.push(project.id.clone());
            self.entities.insert(project.id.clone(), project);
        }
        self.pagination.total_items = total;
        self.status = RequestStatus::Succeeded;
        self.error = None;
    }

    /// Commit a direct single-project fetch: upsert without disturbing
    /// the rest of the cache, and mark it selected.
    pub fn commit_one(&mut self, project: Project) {
        let id = project.id.clone();
        if !self.entities.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.entities.insert(id.clone(), project);
        self.selected = Some(id);
        self.status = RequestStatus::Succeeded;
        self.error = None;
    }

    /// Record a failed fetch. Cached entities are left as they were; no
    /// partial results are ever committed.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RequestStatus::Failed;
        self.error = Some(message.into());
    }

    pub fn set_page(&mut self, page: usize) {
        self.pagination.current_page = page.max(1);
    }

    /// Drop everything cached, e.g. when leaving the feed entirely.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
        self.selected = None;
        self.pagination.reset();
        self.pagination.total_items = 0;
        self.status = RequestStatus::Idle;
        self.error = None;
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.entities.get(id)
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected.as_deref().and_then(|id| self.entities.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            title: format!("Project {id}"),
            description: String::new(),
            image: String::new(),
            tags: Vec::new(),
            code: None,
            language: None,
            author_id: "u1".to_string(),
            metrics: Default::default(),
        }
    }

    #[test]
    fn test_commit_page_replaces_everything() {
        let mut store = ProjectStore::new(4);
        store.begin_load();
        assert_eq!(store.status, RequestStatus::Loading);

        store.commit_page(vec![project("a"), project("b")], 10);
        assert_eq!(store.status, RequestStatus::Succeeded);
        assert_eq!(store.len(), 2);
        assert_eq!(store.pagination.total_items, 10);
        assert_eq!(store.pagination.total_pages(), 3);

        store.commit_page(vec![project("c")], 1);
        let ids: Vec<&str> = store.projects().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_commit_one_upserts_and_selects() {
        let mut store = ProjectStore::new(4);
        store.commit_page(vec![project("a")], 1);

        store.commit_one(project("b"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.selected_project().unwrap().id, "b");

        // Upserting an existing id does not duplicate it
        store.commit_one(project("b"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_fail_keeps_previous_entities() {
        let mut store = ProjectStore::new(4);
        store.commit_page(vec![project("a")], 1);

        store.begin_load();
        store.fail("query failed: offline");
        assert_eq!(store.status, RequestStatus::Failed);
        assert_eq!(store.error.as_deref(), Some("query failed: offline"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reload_after_failure() {
        let mut store = ProjectStore::new(4);
        store.fail("boom");

        store.begin_load();
        assert_eq!(store.status, RequestStatus::Loading);
        assert!(store.error.is_none());

        store.commit_page(vec![project("a")], 1);
        assert_eq!(store.status, RequestStatus::Succeeded);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut store = ProjectStore::new(4);
        store.commit_page(vec![project("a"), project("b")], 9);
        store.set_page(3);
        store.commit_one(project("c"));

        store.clear();
        assert!(store.is_empty());
        assert!(store.selected.is_none());
        assert_eq!(store.pagination.current_page, 1);
        assert_eq!(store.pagination.total_items, 0);
        assert_eq!(store.status, RequestStatus::Idle);
    }

    #[test]
    fn test_set_page_floors_at_one() {
        let mut store = ProjectStore::new(4);
        store.set_page(0);
        assert_eq!(store.pagination.current_page, 1);
        store.set_page(3);
        assert_eq!(store.pagination.current_page, 3);
    }
}
