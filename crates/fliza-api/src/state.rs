//! Application state wiring all adapters together.
//!
//! The orchestrator is generic over transport/store/repository/design
//! traits; AppState pins those generics to the concrete infra
//! implementations and keeps one orchestrator per user, created lazily on
//! first contact and fed by a background task subscribed to the message
//! bus.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrecy::SecretString;
use tokio::sync::broadcast;

use fliza_core::agent::gateway::AgentGateway;
use fliza_core::chat::ChatOrchestrator;
use fliza_core::event::MessageBus;
use fliza_infra::agent::HttpAgentTransport;
use fliza_infra::config::load_config;
use fliza_infra::gemini::{GeminiDesignGenerator, GeminiVisionAnalyzer};
use fliza_infra::sqlite::message::SqliteMessageRepository;
use fliza_infra::sqlite::pool::DatabasePool;
use fliza_types::identity::UserId;

use fliza_core::session::InMemorySessionStore;

/// Concrete type aliases pinning the core generics to infra implementations.
pub type ConcreteGateway = AgentGateway<HttpAgentTransport, InMemorySessionStore>;

pub type ConcreteOrchestrator = ChatOrchestrator<
    HttpAgentTransport,
    InMemorySessionStore,
    SqliteMessageRepository,
    GeminiDesignGenerator,
>;

/// Registry size above which idle guest orchestrators are swept.
const REGISTRY_SWEEP_THRESHOLD: usize = 512;

/// How long a guest conversation may sit idle before it is evictable.
/// Guest state is memory-only by design, so eviction loses nothing
/// durable.
const GUEST_IDLE_SECS: i64 = 3600;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ConcreteGateway>,
    pub repository: Arc<SqliteMessageRepository>,
    pub vision: Arc<GeminiVisionAnalyzer>,
    pub design: Arc<GeminiDesignGenerator>,
    pub bus: MessageBus,
    orchestrators: Arc<DashMap<UserId, Arc<ConcreteOrchestrator>>>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the database, wire
    /// adapters, and prepare the per-user orchestrator registry.
    pub async fn init(data_dir: PathBuf) -> anyhow::Result<Self> {
        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join(&config.database.filename).display()
        );
        let db_pool = DatabasePool::new(&db_url, &config.database).await?;

        let bus = MessageBus::new(256);
        let repository = Arc::new(SqliteMessageRepository::new(db_pool.clone(), bus.clone()));

        let gateway = Arc::new(AgentGateway::new(
            HttpAgentTransport::new(&config.agent),
            InMemorySessionStore::with_safety_margin(chrono::Duration::seconds(
                config.agent.expiry_safety_margin_secs as i64,
            )),
        ));

        // Vision and design calls fail with an auth error at request time
        // when the key is absent; chat and history still work.
        let api_key = match std::env::var("GEMINI_API_KEY") {
            Ok(key) => SecretString::from(key),
            Err(_) => {
                tracing::warn!("GEMINI_API_KEY not set; vision and design endpoints will fail");
                SecretString::from(String::new())
            }
        };

        let vision = Arc::new(GeminiVisionAnalyzer::new(&config.gemini, api_key.clone()));
        let design = Arc::new(GeminiDesignGenerator::new(&config.gemini, api_key));

        Ok(Self {
            gateway,
            repository,
            vision,
            design,
            bus,
            orchestrators: Arc::new(DashMap::new()),
            data_dir,
            db_pool,
        })
    }

    /// Get or create the orchestrator for a user.
    ///
    /// On first contact the durable history is loaded (a failure is logged
    /// and leaves the user with an empty local list) and a background task
    /// is spawned that feeds bus events into the orchestrator for dedup
    /// against the direct response path.
    pub async fn orchestrator(&self, user_id: &UserId) -> Arc<ConcreteOrchestrator> {
        if let Some(existing) = self.orchestrators.get(user_id) {
            return existing.clone();
        }

        self.sweep_idle_guests();

        let orchestrator = Arc::new(ChatOrchestrator::new(
            user_id.clone(),
            self.gateway.clone(),
            self.repository.clone(),
            self.design.clone(),
        ));

        if let Err(err) = orchestrator.load_history().await {
            tracing::warn!(user_id = %user_id, error = %err, "failed to load history");
        }

        // Two requests can race here; whoever loses the insert adopts the
        // winner's orchestrator and never starts a pump of its own.
        let entry = self
            .orchestrators
            .entry(user_id.clone())
            .or_insert_with(|| orchestrator.clone())
            .clone();

        if Arc::ptr_eq(&entry, &orchestrator) {
            spawn_event_pump(Arc::downgrade(&entry), &self.bus);
        }

        entry
    }

    /// Evict idle guest orchestrators once the registry grows past the
    /// sweep threshold. Authenticated users are never evicted here; their
    /// orchestrator reloads from durable history anyway, but keeping them
    /// avoids rereading on every request.
    fn sweep_idle_guests(&self) {
        if self.orchestrators.len() < REGISTRY_SWEEP_THRESHOLD {
            return;
        }
        let cutoff = Utc::now() - chrono::Duration::seconds(GUEST_IDLE_SECS);
        self.sweep_idle_guests_before(cutoff);
    }

    /// Remove guest entries with no activity since `cutoff`. A guest with
    /// a send in flight is never removed.
    fn sweep_idle_guests_before(&self, cutoff: DateTime<Utc>) {
        let before = self.orchestrators.len();
        self.orchestrators.retain(|user_id, orchestrator| {
            !user_id.is_guest()
                || orchestrator.is_composing()
                || orchestrator.last_activity() > cutoff
        });
        let evicted = before - self.orchestrators.len();
        if evicted > 0 {
            tracing::info!(evicted, "swept idle guest orchestrators");
        }
    }
}

/// Feed bus events into an orchestrator until it is dropped from the
/// registry or the bus closes. Holding only a weak reference lets the
/// registry sweep actually free evicted orchestrators.
fn spawn_event_pump(orchestrator: Weak<ConcreteOrchestrator>, bus: &MessageBus) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let Some(orchestrator) = orchestrator.upgrade() else {
                        break;
                    };
                    orchestrator.apply_event(&event);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "event pump lagged, skipping {n} events"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Default data directory: `$FLIZA_DATA_DIR`, falling back to `~/.fliza`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FLIZA_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".fliza")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state() -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();
        std::mem::forget(dir);
        AppState::init(data_dir).await.unwrap()
    }

    #[tokio::test]
    async fn orchestrators_are_reused_per_user() {
        let state = test_state().await;
        let a = state.orchestrator(&UserId::new("guest-1")).await;
        let b = state.orchestrator(&UserId::new("guest-1")).await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn idle_guests_are_swept_but_authenticated_users_stay() {
        let state = test_state().await;
        state.orchestrator(&UserId::new("guest-idle")).await;
        state.orchestrator(&UserId::new("auth-user")).await;
        assert_eq!(state.orchestrators.len(), 2);

        // A cutoff in the future makes every idle guest evictable.
        state.sweep_idle_guests_before(Utc::now() + chrono::Duration::seconds(1));

        assert!(state
            .orchestrators
            .get(&UserId::new("guest-idle"))
            .is_none());
        assert!(state.orchestrators.get(&UserId::new("auth-user")).is_some());
    }

    #[tokio::test]
    async fn sweep_below_threshold_keeps_all_entries() {
        let state = test_state().await;
        state.orchestrator(&UserId::new("guest-1")).await;

        state.sweep_idle_guests();

        assert!(state.orchestrators.get(&UserId::new("guest-1")).is_some());
    }
}
