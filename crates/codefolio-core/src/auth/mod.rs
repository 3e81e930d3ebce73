mod local;
mod session;

pub use local::LocalIdentityGateway;
pub use session::AuthSession;

use crate::remote::{Collection, DocumentStore, Query};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// What the identity provider knows about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Failures raised by the identity provider, typed at the boundary so
/// the session can map them to human-readable messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("user disabled")]
    UserDisabled,
    #[error("user not found")]
    UserNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("too many requests")]
    TooManyRequests,
    #[error("email already in use")]
    EmailInUse,
    #[error("weak password")]
    WeakPassword,
    #[error("{0}")]
    Other(String),
}

impl AuthError {
    /// Message shown to the user. Unknown provider failures collapse to
    /// a generic line rather than leaking raw codes.
    pub fn friendly_message(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail => "Invalid email address.",
            AuthError::UserDisabled => "This account has been disabled.",
            AuthError::UserNotFound => "No account matches that email.",
            AuthError::WrongPassword => "Wrong password.",
            AuthError::TooManyRequests => "Too many attempts. Try again later.",
            AuthError::EmailInUse => "That email is already registered.",
            AuthError::WeakPassword => "The password is too weak.",
            AuthError::Other(_) => "Something went wrong. Try again.",
        }
    }
}

/// The external identity provider. `subscribe` delivers the current
/// identity, or None, on every auth-state change.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError>;

    async fn sign_out(&self);

    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// Resolve a provider identity to the id of its `users` document,
/// preferring a lookup by email and falling back to the provider uid.
pub async fn resolve_user_id<S: DocumentStore>(store: &S, identity: &Identity) -> Result<String> {
    if let Some(email) = &identity.email {
        let query = Query::new(Collection::Users)
            .where_eq("email", email.as_str())
            .limit(1);
        let docs = store.query(&query).await?;
        if let Some(doc) = docs.first() {
            return Ok(doc.id.clone());
        }
    }
    Ok(identity.uid.clone())
}
