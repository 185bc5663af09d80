use crate::error::AppError;
use base64::Engine;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An established session: binds an opaque client-presented id to the Reddit
/// access token, time-bounded by the token's own lifetime.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct AuthState {
    created_at: DateTime<Utc>,
    consumed: bool,
}

/// Process-wide store for pending OAuth states and established sessions.
///
/// The trait boundary keeps call sites ignorant of the backend; swapping the
/// in-memory map for a durable store only requires a new implementation.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a fresh anti-CSRF state token for one authorization attempt.
    async fn create_auth_state(&self) -> String;

    /// Mark a state consumed. Lookup and mark are atomic: of any number of
    /// concurrent callers with the same state, exactly one succeeds and the
    /// rest get `InvalidState`. Unknown and expired states also fail.
    async fn consume_auth_state(&self, id: &str) -> Result<(), AppError>;

    /// Store an access token and return the session id handed to the client.
    async fn create_session(&self, access_token: String, expires_in: u64) -> String;

    /// Look up a session. A record past its expiry is evicted and reported
    /// as `Unauthorized`.
    async fn get_session(&self, id: &str) -> Result<Session, AppError>;

    /// Idempotent removal.
    async fn delete_session(&self, id: &str);

    /// Drop consumed/expired states and expired sessions. Lazy checks keep
    /// the store correct without this; sweeping only bounds its growth.
    async fn sweep(&self);
}

pub struct MemorySessionStore {
    state_ttl: ChronoDuration,
    states: RwLock<HashMap<String, AuthState>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new(state_ttl_secs: i64) -> Self {
        Self {
            state_ttl: ChronoDuration::seconds(state_ttl_secs),
            states: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

/// 256 bits from the thread-local CSPRNG, URL-safe base64 (43 chars).
fn generate_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_auth_state(&self) -> String {
        let id = generate_id();
        let mut states = self.states.write().await;
        states.insert(
            id.clone(),
            AuthState {
                created_at: Utc::now(),
                consumed: false,
            },
        );
        id
    }

    async fn consume_auth_state(&self, id: &str) -> Result<(), AppError> {
        let mut states = self.states.write().await;

        let Some(state) = states.get_mut(id) else {
            return Err(AppError::InvalidState);
        };

        if state.consumed {
            return Err(AppError::InvalidState);
        }

        if Utc::now() > state.created_at + self.state_ttl {
            states.remove(id);
            return Err(AppError::InvalidState);
        }

        state.consumed = true;
        Ok(())
    }

    async fn create_session(&self, access_token: String, expires_in: u64) -> String {
        let id = generate_id();
        let now = Utc::now();
        let session = Session {
            access_token,
            created_at: now,
            expires_at: now + ChronoDuration::seconds(expires_in as i64),
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), session);
        id
    }

    async fn get_session(&self, id: &str) -> Result<Session, AppError> {
        let sessions = self.sessions.read().await;

        let Some(session) = sessions.get(id) else {
            return Err(AppError::Unauthorized("unknown session".to_string()));
        };

        if Utc::now() > session.expires_at {
            drop(sessions);
            let mut sessions = self.sessions.write().await;
            sessions.remove(id);
            return Err(AppError::Unauthorized("session expired".to_string()));
        }

        Ok(session.clone())
    }

    async fn delete_session(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
    }

    async fn sweep(&self) {
        let now = Utc::now();

        {
            let mut states = self.states.write().await;
            states.retain(|_, s| !s.consumed && now <= s.created_at + self.state_ttl);
        }

        {
            let mut sessions = self.sessions.write().await;
            sessions.retain(|_, s| now <= s.expires_at);
        }
    }
}
