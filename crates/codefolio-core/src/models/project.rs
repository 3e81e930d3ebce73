use crate::remote::Document;

/// Denormalized engagement counters stored on the project document.
/// `comments` is kept eventually consistent with the live comment count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectMetrics {
    pub code_views: u64,
    pub comments: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub tags: Vec<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub author_id: String,
    pub metrics: ProjectMetrics,
}

impl Project {
    /// Coerce a raw project document into a typed record. The author
    /// field appears in the wild as a reference-shaped map, a plain
    /// string, or a pre-normalized `author_id`; all three are accepted.
    /// Returns None when the document has no title or no author.
    pub fn from_doc(doc: &Document) -> Option<Self> {
        let title = doc.text("title")?.to_string();
        let author_id = doc
            .text("author_id")
            .or_else(|| doc.text("author.id"))
            .or_else(|| doc.text("author"))?
            .to_string();

        Some(Project {
            id: doc.id.clone(),
            title,
            description: doc.text("description").unwrap_or_default().to_string(),
            image: doc.text("image").unwrap_or_default().to_string(),
            tags: doc.text_list("tags"),
            code: doc.text("code").map(str::to_string),
            language: doc.text("language").map(str::to_string),
            author_id,
            metrics: ProjectMetrics {
                code_views: doc.uint("metrics.code_views").unwrap_or(0),
                comments: doc.uint("metrics.comments").unwrap_or(0),
                shares: doc.uint("metrics.shares").unwrap_or(0),
            },
        })
    }
}
