use crate::remote::Document;

/// A single comment record. `parent_id` of None marks a root comment;
/// otherwise the comment files under that parent's reply list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub text: String,
    pub parent_id: Option<String>,
    pub created_at: u64,
}

impl Comment {
    pub fn from_doc(doc: &Document) -> Option<Self> {
        Some(Comment {
            id: doc.id.clone(),
            author_id: doc.text("author_id")?.to_string(),
            text: doc.text("text")?.to_string(),
            parent_id: doc.text("parent_id").map(str::to_string),
            created_at: doc.uint("created_at").unwrap_or(0),
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
