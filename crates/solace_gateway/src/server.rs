use crate::types::{GatewayMessage, GatewayResponse};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use solace_core::SolaceConfig;
use solace_dialogue::DialogueSession;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

type SharedSession = Arc<Mutex<DialogueSession>>;

struct SessionEntry {
    session: SharedSession,
    /// Milliseconds since the registry started, at the last access.
    last_active: AtomicU64,
}

/// Live sessions keyed by id.
///
/// The map lock is held only to look up or insert; each session has its own
/// mutex, so turns of one session are serialized while different sessions
/// proceed in parallel. Sessions idle for `session_idle_secs` are closed by
/// [`evict_idle`](Self::evict_idle), and evicted on demand when the registry
/// is full.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    config: SolaceConfig,
    started: Instant,
}

impl SessionRegistry {
    pub fn new(config: SolaceConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            started: Instant::now(),
        }
    }

    fn now_millis(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn touch(&self, entry: &SessionEntry) -> SharedSession {
        entry.last_active.store(self.now_millis(), Ordering::Relaxed);
        entry.session.clone()
    }

    /// Remove idle sessions from an already locked map. Sessions in the
    /// middle of a turn are skipped.
    fn evict_idle_locked(&self, sessions: &mut HashMap<String, SessionEntry>) -> usize {
        let idle_ms = self.config.gateway.session_idle_secs.saturating_mul(1000);
        let now = self.now_millis();
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let idle = now.saturating_sub(entry.last_active.load(Ordering::Relaxed)) >= idle_ms;
            let busy = entry.session.try_lock().is_err();
            if idle && !busy {
                tracing::info!("Evicting idle session {}", id);
                false
            } else {
                true
            }
        });
        before - sessions.len()
    }

    /// Close every session idle for at least `session_idle_secs`. Returns the
    /// number closed.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_idle_locked(&mut sessions)
    }

    /// Look up `id`, or open a new session. Returns `None` when the registry
    /// is at capacity.
    pub async fn get_or_create(&self, id: Option<String>) -> Option<(String, SharedSession)> {
        if let Some(id) = &id {
            if let Some(entry) = self.sessions.read().await.get(id) {
                return Some((id.clone(), self.touch(entry)));
            }
        }

        let mut sessions = self.sessions.write().await;
        // Another request may have opened it in the meantime.
        if let Some(id) = &id {
            if let Some(entry) = sessions.get(id) {
                return Some((id.clone(), self.touch(entry)));
            }
        }
        if sessions.len() >= self.config.gateway.max_sessions {
            self.evict_idle_locked(&mut sessions);
        }
        if sessions.len() >= self.config.gateway.max_sessions {
            tracing::warn!(
                "Session limit reached ({}), refusing new session",
                self.config.gateway.max_sessions
            );
            return None;
        }

        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let session = Arc::new(Mutex::new(DialogueSession::from_config(
            id.clone(),
            &self.config,
        )));
        sessions.insert(
            id.clone(),
            SessionEntry {
                session: session.clone(),
                last_active: AtomicU64::new(self.now_millis()),
            },
        );
        tracing::info!("Opened session {} ({} live)", id, sessions.len());
        Some((id, session))
    }

    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(id).map(|e| self.touch(e))
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!("Closed session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Shared state for the gateway server.
#[derive(Clone)]
struct AppState {
    registry: Arc<SessionRegistry>,
}

/// The gateway HTTP server.
///
/// - `GET /health`: health check
/// - `POST /message`: one conversation turn
/// - `POST /sessions/:id/reset`: reset a session
/// - `GET /sessions/:id/transcript`: plain-text transcript
/// - `DELETE /sessions/:id`: close a session
pub struct GatewayServer {
    registry: Arc<SessionRegistry>,
    host: String,
    port: u16,
}

impl GatewayServer {
    pub fn new(config: SolaceConfig) -> Self {
        let host = config.gateway.host.clone();
        let port = config.gateway.port;
        Self {
            registry: Arc::new(SessionRegistry::new(config)),
            host,
            port,
        }
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
        };
        Router::new()
            .route("/health", get(health))
            .route("/message", post(handle_message))
            .route("/sessions/:id/reset", post(reset_session))
            .route("/sessions/:id/transcript", get(session_transcript))
            .route("/sessions/:id", delete(close_session))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Periodically close idle sessions in the background.
    fn spawn_idle_sweeper(&self) {
        let registry = self.registry.clone();
        let idle_secs = registry.config.gateway.session_idle_secs;
        let period = Duration::from_secs(idle_secs.clamp(1, 60));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let closed = registry.evict_idle().await;
                if closed > 0 {
                    tracing::debug!("Idle sweep closed {} session(s)", closed);
                }
            }
        });
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        let app = self.router();
        self.spawn_idle_sweeper();
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Gateway failed to bind {}", addr))?;
        tracing::info!("Gateway listening on {}", addr);
        axum::serve(listener, app)
            .await
            .context("Gateway server error")?;
        Ok(())
    }
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

/// POST /message: run one turn through the addressed session.
async fn handle_message(
    State(state): State<AppState>,
    Json(msg): Json<GatewayMessage>,
) -> Result<Json<GatewayResponse>, StatusCode> {
    let (session_id, session) = state
        .registry
        .get_or_create(msg.session_id)
        .await
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let mut session = session.lock().await;
    if let Some(tone) = msg.tone {
        session.set_tone(tone);
    }
    let outcome = session.handle_turn(&msg.body);
    Ok(Json(GatewayResponse::from_outcome(session_id, &outcome)))
}

/// POST /sessions/:id/reset
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let session = state.registry.get(&id).await.ok_or(StatusCode::NOT_FOUND)?;
    session.lock().await.reset();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /sessions/:id/transcript
async fn session_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, StatusCode> {
    let session = state.registry.get(&id).await.ok_or(StatusCode::NOT_FOUND)?;
    let transcript = session.lock().await.transcript();
    Ok(transcript)
}

/// DELETE /sessions/:id
async fn close_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if state.registry.remove(&id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
