use super::{AuthError, Identity, IdentityGateway};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::watch;
use uuid::Uuid;

struct Account {
    password: String,
    identity: Identity,
}

/// In-memory identity provider for tests and local development. Accounts
/// live only as long as the process; auth-state changes go out over a
/// watch channel like the hosted provider's observer.
pub struct LocalIdentityGateway {
    accounts: Mutex<HashMap<String, Account>>,
    state: watch::Sender<Option<Identity>>,
}

impl LocalIdentityGateway {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            state,
        }
    }
}

impl Default for LocalIdentityGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityGateway for LocalIdentityGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let accounts = self.accounts.lock();
        let account = accounts.get(email).ok_or(AuthError::UserNotFound)?;
        if account.password != password {
            return Err(AuthError::WrongPassword);
        }
        let identity = account.identity.clone();
        drop(accounts);
        let _ = self.state.send(Some(identity.clone()));
        Ok(identity)
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword);
        }

        let mut accounts = self.accounts.lock();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }

        let identity = Identity {
            uid: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            display_name: (!name.trim().is_empty()).then(|| name.trim().to_string()),
        };
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        drop(accounts);
        let _ = self.state.send(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) {
        let _ = self.state.send(None);
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_then_sign_in() {
        let gateway = LocalIdentityGateway::new();
        let registered = gateway
            .register("Ada", "ada@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(registered.display_name.as_deref(), Some("Ada"));

        let signed_in = gateway.sign_in("ada@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in.uid, registered.uid);
    }

    #[tokio::test]
    async fn test_sign_in_failures() {
        let gateway = LocalIdentityGateway::new();
        gateway
            .register("Ada", "ada@example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(
            gateway.sign_in("ada@example.com", "nope").await.unwrap_err(),
            AuthError::WrongPassword
        );
        assert_eq!(
            gateway.sign_in("ghost@example.com", "x").await.unwrap_err(),
            AuthError::UserNotFound
        );
    }

    #[tokio::test]
    async fn test_register_validation() {
        let gateway = LocalIdentityGateway::new();
        assert_eq!(
            gateway.register("A", "not-an-email", "secret1").await.unwrap_err(),
            AuthError::InvalidEmail
        );
        assert_eq!(
            gateway.register("A", "a@example.com", "123").await.unwrap_err(),
            AuthError::WeakPassword
        );

        gateway.register("A", "a@example.com", "secret1").await.unwrap();
        assert_eq!(
            gateway.register("B", "a@example.com", "secret2").await.unwrap_err(),
            AuthError::EmailInUse
        );
    }

    #[tokio::test]
    async fn test_auth_state_changes_delivered() {
        let gateway = LocalIdentityGateway::new();
        let mut rx = gateway.subscribe();
        assert!(rx.borrow().is_none());

        gateway
            .register("Ada", "ada@example.com", "secret1")
            .await
            .unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        gateway.sign_out().await;
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
