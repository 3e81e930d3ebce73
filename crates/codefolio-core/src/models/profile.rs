use crate::auth::Identity;
use crate::remote::Document;

/// Public projection of a user document. Read-only from this system's
/// perspective; `email` is consulted only for identity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
}

impl UserProfile {
    pub fn from_doc(doc: &Document) -> Option<Self> {
        Some(UserProfile {
            id: doc.id.clone(),
            handle: doc.text("user")?.to_string(),
            display_name: doc.text("name").map(str::to_string),
            avatar: doc.text("image").map(str::to_string),
            bio: doc.text("bio").map(str::to_string),
            email: doc.text("email").map(str::to_string),
        })
    }

    /// Profile shown when the user has no document yet: handle and name
    /// fall back to what the identity provider knows.
    pub fn fallback(user_id: &str, identity: &Identity) -> Self {
        let handle = identity
            .display_name
            .clone()
            .or_else(|| identity.email.clone())
            .unwrap_or_else(|| "user".to_string());
        UserProfile {
            id: user_id.to_string(),
            handle,
            display_name: identity.display_name.clone(),
            avatar: None,
            bio: None,
            email: identity.email.clone(),
        }
    }

    /// Name preferred for display: display name, then handle.
    pub fn display_label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.handle,
        }
    }
}

/// Join row produced by the author batch resolver: just enough to render
/// an author line next to a project or comment.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorCard {
    pub id: String,
    pub handle: String,
    pub avatar: Option<String>,
}

impl AuthorCard {
    pub fn from_doc(doc: &Document) -> Self {
        AuthorCard {
            id: doc.id.clone(),
            handle: doc.text("user").unwrap_or_default().to_string(),
            avatar: doc.text("image").map(str::to_string),
        }
    }
}
