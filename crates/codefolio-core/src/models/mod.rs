mod comment;
mod filter;
mod profile;
mod project;

pub use comment::Comment;
pub use filter::{FilterState, TAG_CATALOG};
pub use profile::{AuthorCard, UserProfile};
pub use project::{Project, ProjectMetrics};
