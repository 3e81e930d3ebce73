/// Tags offered by the UI. Fixed so the chip row does not reshuffle as
/// filtering and pagination change the visible result set.
pub const TAG_CATALOG: &[&str] = &["Front-End", "React", "Accessibility"];

/// Active feed filters: a set of tags (any-of semantics) plus a lowercase
/// search string matched as a title prefix. Pagination is reset by the
/// owning screen whenever either part changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    tags: Vec<String>,
    search: String,
}

impl FilterState {
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.search.is_empty()
    }

    /// Add the tag if absent, remove it if present.
    pub fn toggle_tag(&mut self, tag: &str) {
        match self.tags.iter().position(|t| t == tag) {
            Some(pos) => {
                self.tags.remove(pos);
            }
            None => self.tags.push(tag.to_string()),
        }
    }

    /// Store the search term trimmed and lowercased. Returns true when
    /// the normalized term differs from the current one.
    pub fn set_search(&mut self, term: &str) -> bool {
        let normalized = term.trim().to_lowercase();
        if normalized == self.search {
            return false;
        }
        self.search = normalized;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.tags.clear();
        self.search.clear();
        true
    }
}
