//! HTTP API for form scanning, profiles, events and registrations.

mod handlers;
mod routes;

pub use handlers::ACTOR_HEADER;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::{BootstrapAdmin, Settings};
use crate::models::{ProfileStatus, Role, UserProfile};
use crate::ocr::{FormExtractor, GeminiExtractor, RegistrationFormIntake};
use crate::repository::{DocumentStore, MemoryStore};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub intake: RegistrationFormIntake,
    pub store: Arc<dyn DocumentStore>,
    /// Present only when concurrent scans are capped.
    pub scan_permits: Option<Arc<Semaphore>>,
}

impl AppState {
    pub fn new(
        extractor: Arc<dyn FormExtractor>,
        store: Arc<dyn DocumentStore>,
        max_concurrent_scans: Option<usize>,
    ) -> Self {
        Self {
            intake: RegistrationFormIntake::new(extractor),
            store,
            scan_permits: max_concurrent_scans.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Production wiring: Gemini extraction over an in-process store.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        if !settings.gemini.is_configured() {
            tracing::warn!("GEMINI_API_KEY not set; form scans will report a processing failure");
        }
        let extractor = GeminiExtractor::new(settings.gemini.clone())?;
        Ok(Self::new(
            Arc::new(extractor),
            Arc::new(MemoryStore::new()),
            settings.max_concurrent_scans,
        ))
    }

    /// Write the configured administrator as an approved admin profile.
    pub async fn seed_admin(&self, admin: &BootstrapAdmin) -> anyhow::Result<()> {
        let mut profile = UserProfile::new(
            admin.id.clone(),
            admin.email.clone(),
            admin.display_name.clone(),
            Role::Admin,
        );
        profile.status = ProfileStatus::Approved;
        self.store.put_profile(profile).await?;
        tracing::info!("Seeded admin profile {}", admin.id);
        Ok(())
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    match &settings.bootstrap_admin {
        Some(admin) => state.seed_admin(admin).await?,
        None => tracing::warn!(
            "No bootstrap admin configured; role-gated routes need an approved profile"
        ),
    }
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
