use super::{resolve_user_id, Identity, IdentityGateway};
use crate::remote::DocumentStore;
use crate::store::RequestStatus;
use anyhow::Result;
use std::sync::Arc;

/// Auth slice of application state: the current user plus the status of
/// the last sign-in/registration attempt.
pub struct AuthSession<G: IdentityGateway> {
    gateway: Arc<G>,
    pub user: Option<Identity>,
    pub status: RequestStatus,
    pub error: Option<String>,
}

impl<G: IdentityGateway> AuthSession<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            user: None,
            status: RequestStatus::Idle,
            error: None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) {
        self.status = RequestStatus::Loading;
        self.error = None;
        match self.gateway.sign_in(email, password).await {
            Ok(identity) => {
                self.user = Some(identity);
                self.status = RequestStatus::Succeeded;
            }
            Err(err) => {
                self.status = RequestStatus::Failed;
                self.error = Some(err.friendly_message().to_string());
            }
        }
    }

    pub async fn register(&mut self, name: &str, email: &str, password: &str) {
        self.status = RequestStatus::Loading;
        self.error = None;
        match self.gateway.register(name, email, password).await {
            Ok(identity) => {
                self.user = Some(identity);
                self.status = RequestStatus::Succeeded;
            }
            Err(err) => {
                self.status = RequestStatus::Failed;
                self.error = Some(err.friendly_message().to_string());
            }
        }
    }

    pub async fn sign_out(&mut self) {
        self.gateway.sign_out().await;
        self.user = None;
        self.status = RequestStatus::Idle;
        self.error = None;
    }

    /// Apply an auth-state change delivered by the provider's observer.
    pub fn apply_auth_change(&mut self, identity: Option<Identity>) {
        self.user = identity;
        self.status = RequestStatus::Idle;
        self.error = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Internal user-record id for the signed-in user, or None when
    /// signed out.
    pub async fn resolved_user_id<S: DocumentStore>(&self, store: &S) -> Result<Option<String>> {
        match &self.user {
            Some(identity) => Ok(Some(resolve_user_id(store, identity).await?)),
            None => Ok(None),
        }
    }
}
