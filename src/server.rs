use crate::{
    config::Config,
    error::AppError,
    reddit::RedditClient,
    routes,
    session::{MemorySessionStore, SessionStore},
};
use axum::Router;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::info;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub sessions: Arc<dyn SessionStore>,
    pub reddit: RedditClient,
}

impl Server {
    pub fn new(config: Config) -> Result<Self, AppError> {
        config.validate()?;

        let reddit = RedditClient::new(&config)?;
        let sessions: Arc<dyn SessionStore> =
            Arc::new(MemorySessionStore::new(config.session.state_ttl_secs));

        Ok(Self {
            config: Arc::new(config),
            sessions,
            reddit,
        })
    }

    pub fn create_app(&self) -> Router {
        Router::new()
            .merge(routes::create_health_routes())
            .merge(routes::create_auth_routes())
            .merge(routes::create_api_routes())
            .with_state(self.clone())
    }

    pub async fn run(self) -> Result<(), AppError> {
        self.spawn_sweeper();

        let app = self.create_app();
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("failed to bind {addr}: {e}")))?;

        info!("Server listening on http://{addr}");

        axum::serve(listener, app)
            .await
            .map_err(|e| AppError::Internal(format!("server error: {e}")))
    }

    /// Periodic sweep of stale session-store entries. Correctness never
    /// depends on it; lazy expiry checks already reject stale records.
    fn spawn_sweeper(&self) {
        let interval_secs = self.config.session.sweep_interval_secs;
        if interval_secs == 0 {
            return;
        }

        let store = self.sessions.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            // The first tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.sweep().await;
            }
        });
    }
}
