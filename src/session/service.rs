//! Session state with an explicit subscribe/unsubscribe lifecycle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{AuthError, AuthUser, IdentityProvider};

/// Current authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(AuthUser),
}

impl AuthState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            AuthState::SignedOut => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

/// Handle returned by [`SessionService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(uuid::Uuid);

type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Owns the signed-in user and broadcasts changes.
pub struct SessionService {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<AuthState>,
    listeners: RwLock<HashMap<SubscriptionId, Listener>>,
}

impl SessionService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self {
            provider,
            state,
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Register a listener called once per state transition.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(uuid::Uuid::new_v4());
        match self.listeners.write() {
            Ok(mut listeners) => {
                listeners.insert(id, Arc::new(listener));
            }
            Err(_) => warn!("Session listener registry poisoned; listener dropped"),
        }
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners
            .write()
            .map(|mut listeners| listeners.remove(&id).is_some())
            .unwrap_or(false)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    /// Receiver for async consumers that prefer awaiting changes.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        let user = self.provider.sign_up(email, password, display_name).await?;
        info!("Signed up {}", user.email);
        self.transition(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = self.provider.sign_in(email, password).await?;
        info!("Signed in {}", user.email);
        self.transition(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    /// Sign out the current user. A no-op when nobody is signed in.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(user) = self.current().user().cloned() else {
            return Ok(());
        };
        self.provider.sign_out(&user).await?;
        info!("Signed out {}", user.email);
        self.transition(AuthState::SignedOut);
        Ok(())
    }

    /// Ask the provider to send a reset email. Session state is unchanged.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.provider.send_password_reset(email).await?;
        debug!("Password reset requested for {}", email);
        Ok(())
    }

    fn transition(&self, next: AuthState) {
        self.state.send_replace(next.clone());

        // Listeners run outside the registry lock so they may unsubscribe.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .map(|l| l.values().cloned().collect())
            .unwrap_or_default();
        for listener in listeners {
            listener(&next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemoryIdentityProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    async fn service_with_account() -> SessionService {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        provider
            .sign_up("rep@fest.edu", "secret1", Some("Rep"))
            .await
            .unwrap();
        SessionService::new(provider)
    }

    #[tokio::test]
    async fn test_sign_in_and_out_notify_listeners() {
        let service = service_with_account().await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        service.subscribe(move |state| sink.lock().unwrap().push(state.is_signed_in()));

        service.sign_in("rep@fest.edu", "secret1").await.unwrap();
        assert!(service.current().is_signed_in());
        service.sign_out().await.unwrap();
        assert_eq!(service.current(), AuthState::SignedOut);

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_unsubscribed_listener_is_not_called() {
        let service = service_with_account().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = service.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(service.unsubscribe(id));
        assert!(!service.unsubscribe(id));
        assert_eq!(service.subscriber_count(), 0);

        service.sign_in("rep@fest.edu", "secret1").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_state() {
        let service = service_with_account().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        service.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = service.sign_in("rep@fest.edu", "nope!!").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(service.current(), AuthState::SignedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_password_reset_does_not_transition() {
        let service = service_with_account().await;
        let mut rx = service.watch();

        service.send_password_reset("rep@fest.edu").await.unwrap();
        assert!(!rx.has_changed().unwrap());

        service.sign_in("rep@fest.edu", "secret1").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_out_when_signed_out_is_noop() {
        let service = service_with_account().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        service.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        service.sign_out().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_independent_services_do_not_share_state() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        provider.sign_up("a@b.org", "123456", None).await.unwrap();
        let first = SessionService::new(provider.clone());
        let second = SessionService::new(provider);

        first.sign_in("a@b.org", "123456").await.unwrap();
        assert!(first.current().is_signed_in());
        assert!(!second.current().is_signed_in());
    }
}
