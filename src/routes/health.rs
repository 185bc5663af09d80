use crate::server::Server;
use axum::{Router, response::Json, routing::get};
use chrono::Utc;
use serde_json::{Value, json};

pub fn create_health_routes() -> Router<Server> {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
}

async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Reddit Stats API!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "login": "/auth/login",
            "profile": "/api/profile",
            "posts": "/api/posts",
            "comments": "/api/comments",
            "health": "/health"
        }
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}
