//! Identity and session state.
//!
//! [`SessionService`] is an injectable holder of the current authentication
//! state. It talks to an [`IdentityProvider`] and notifies subscribers on
//! every transition. Nothing in here is global; callers create the service
//! and hand it to whatever needs it.

mod identity_toolkit;
mod memory;
mod provider;
mod service;

pub use identity_toolkit::{IdentityToolkitConfig, IdentityToolkitProvider};
pub use memory::InMemoryIdentityProvider;
pub use provider::{AuthError, AuthUser, IdentityProvider};
pub use service::{AuthState, SessionService, SubscriptionId};
