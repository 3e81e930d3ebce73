pub mod auth;
pub mod comments;
pub mod constants;
pub mod error;
pub mod feed;
pub mod models;
pub mod remote;
pub mod screens;
pub mod store;

// Re-export the types most embedders touch directly
pub use error::CoreError;
pub use models::{Comment, FilterState, Project, UserProfile};
pub use remote::{DocumentStore, MemoryStore};
pub use store::{Pagination, ProjectStore, RequestStatus};
