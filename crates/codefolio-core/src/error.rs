/// Errors surfaced to the view layer by screen operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("project not found")]
    NotFound,
    #[error("not signed in")]
    NotSignedIn,
    #[error("comment text is empty")]
    EmptyComment,
    #[error("query failed: {message}")]
    Query { message: String },
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Query {
            message: err.to_string(),
        }
    }
}
