use crate::{error::AppError, server::Server};
use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

pub fn create_auth_routes() -> Router<Server> {
    Router::new()
        .route("/auth/login", get(login_handler))
        .route("/auth/callback", get(callback_handler))
        .route("/auth/logout", delete(logout_handler))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct LogoutQuery {
    session_id: Option<String>,
}

async fn login_handler(State(server): State<Server>) -> Result<Json<Value>, AppError> {
    let state = server.sessions.create_auth_state().await;
    let auth_url = server.reddit.authorize_url(&state)?;

    Ok(Json(json!({ "auth_url": auth_url, "state": state })))
}

/// Provider redirect target. Every outcome is a 302 back to the frontend;
/// failures carry a coarse error code, never upstream detail.
async fn callback_handler(
    State(server): State<Server>,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let frontend = &server.config.frontend.origin;

    // Provider-reported errors (e.g. the user denied access) pass through.
    if let Some(error) = params.error {
        return frontend_redirect(frontend, &[("error", error.as_str())]);
    }

    let Some(state) = params.state else {
        return frontend_redirect(frontend, &[("error", "invalid_state")]);
    };

    // Atomic consume: a replayed or tampered state loses here.
    if server.sessions.consume_auth_state(&state).await.is_err() {
        return frontend_redirect(frontend, &[("error", "invalid_state")]);
    }

    let Some(code) = params.code else {
        return frontend_redirect(frontend, &[("error", "callback_failed")]);
    };

    match server.reddit.exchange_code(&code).await {
        Ok(grant) => {
            let session_id = server
                .sessions
                .create_session(grant.access_token, grant.expires_in)
                .await;
            frontend_redirect(frontend, &[("session", session_id.as_str())])
        }
        Err(e) => {
            tracing::warn!("authorization code exchange failed: {e}");
            frontend_redirect(frontend, &[("error", "callback_failed")])
        }
    }
}

async fn logout_handler(
    State(server): State<Server>,
    Query(params): Query<LogoutQuery>,
) -> Json<Value> {
    if let Some(session_id) = params.session_id {
        server.sessions.delete_session(&session_id).await;
    }

    Json(json!({ "message": "Logged out successfully" }))
}

/// 302 to `{frontend}/?...` with properly encoded query parameters.
fn frontend_redirect(origin: &str, params: &[(&str, &str)]) -> Response {
    let location = match Url::parse(&format!("{origin}/")) {
        Ok(mut url) => {
            url.query_pairs_mut().extend_pairs(params.iter().copied());
            url.to_string()
        }
        Err(e) => {
            return AppError::Internal(format!("invalid frontend origin: {e}")).into_response();
        }
    };

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
