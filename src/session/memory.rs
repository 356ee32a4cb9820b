//! In-process identity provider for development and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{AuthError, AuthUser, IdentityProvider};

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    uid: String,
    password: String,
    display_name: Option<String>,
}

/// Keeps accounts in memory, keyed by lowercase email.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    reset_requests: RwLock<Vec<String>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails that asked for a password reset, oldest first.
    pub fn reset_requests(&self) -> Vec<String> {
        self.reset_requests
            .read()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn user_for(email: &str, account: &Account) -> AuthUser {
        AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
            display_name: account.display_name.clone(),
            id_token: uuid::Uuid::new_v4().to_string(),
        }
    }
}

fn poisoned<T>(_: T) -> AuthError {
    AuthError::Provider("account store lock poisoned".to_string())
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(format!(
                "must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let key = email.trim().to_lowercase();
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse);
        }

        let account = Account {
            uid: uuid::Uuid::new_v4().to_string(),
            password: password.to_string(),
            display_name: display_name.map(|s| s.to_string()),
        };
        let user = Self::user_for(&key, &account);
        accounts.insert(key, account);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let key = email.trim().to_lowercase();
        let accounts = self.accounts.read().map_err(poisoned)?;
        match accounts.get(&key) {
            Some(account) if account.password == password => Ok(Self::user_for(&key, account)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_out(&self, _user: &AuthUser) -> Result<(), AuthError> {
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let key = email.trim().to_lowercase();
        if !self.accounts.read().map_err(poisoned)?.contains_key(&key) {
            return Err(AuthError::UserNotFound);
        }
        self.reset_requests.write().map_err(poisoned)?.push(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = InMemoryIdentityProvider::new();
        let created = provider
            .sign_up("Ana@Example.com", "hunter22", Some("Ana"))
            .await
            .unwrap();
        assert_eq!(created.email, "ana@example.com");

        let signed_in = provider.sign_in("ana@example.com", "hunter22").await.unwrap();
        assert_eq!(signed_in.uid, created.uid);
        assert_eq!(signed_in.display_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_rejections() {
        let provider = InMemoryIdentityProvider::new();
        assert!(matches!(
            provider.sign_up("a@b.org", "123", None).await,
            Err(AuthError::WeakPassword(_))
        ));

        provider.sign_up("a@b.org", "123456", None).await.unwrap();
        assert_eq!(
            provider.sign_up("a@b.org", "654321", None).await,
            Err(AuthError::EmailInUse)
        );
        assert_eq!(
            provider.sign_in("a@b.org", "wrong!").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            provider.send_password_reset("nobody@b.org").await,
            Err(AuthError::UserNotFound)
        );
    }

    #[tokio::test]
    async fn test_password_reset_is_recorded() {
        let provider = InMemoryIdentityProvider::new();
        provider.sign_up("a@b.org", "123456", None).await.unwrap();
        provider.send_password_reset("A@b.org").await.unwrap();
        assert_eq!(provider.reset_requests(), vec!["a@b.org".to_string()]);
    }
}
