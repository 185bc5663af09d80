use crate::{
    error::AppError,
    model::{self, Comment, Post, UserProfile},
    reddit::RedditClient,
    reddit::types::RedditCredentials,
    server::Server,
};
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 25;

pub fn create_api_routes() -> Router<Server> {
    Router::new()
        .route("/api/profile", get(profile_handler))
        .route("/api/posts", get(posts_handler))
        .route("/api/comments", get(comments_handler))
        .route(
            "/api/user/stats/with-credentials",
            post(stats_with_credentials_handler),
        )
        .route(
            "/api/user/posts/with-credentials",
            post(posts_with_credentials_handler),
        )
        .route(
            "/api/user/comments/with-credentials",
            post(comments_with_credentials_handler),
        )
}

#[derive(Deserialize)]
struct SessionQuery {
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct SessionListingQuery {
    session_id: Option<String>,
    limit: Option<u32>,
    sort_order: Option<String>,
}

#[derive(Deserialize)]
struct ListingParams {
    limit: Option<u32>,
    sort_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortOrder {
    Newest,
    Oldest,
}

impl SortOrder {
    fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.unwrap_or("newest") {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            _ => Err(AppError::Validation(
                "sort_order must be 'oldest' or 'newest'".to_string(),
            )),
        }
    }
}

#[derive(Clone, Copy)]
enum ListingKind {
    Posts,
    Comments,
}

impl ListingKind {
    fn segment(self) -> &'static str {
        match self {
            ListingKind::Posts => "submitted",
            ListingKind::Comments => "comments",
        }
    }
}

async fn profile_handler(
    State(server): State<Server>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<UserProfile>, AppError> {
    let token = resolve_token(&server, query.session_id).await?;
    Ok(Json(build_profile(&server.reddit, &token).await?))
}

async fn posts_handler(
    State(server): State<Server>,
    Query(query): Query<SessionListingQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let sort = SortOrder::parse(query.sort_order.as_deref())?;
    let limit = clamp_limit(query.limit);
    let token = resolve_token(&server, query.session_id).await?;

    let raw = fetch_listing(&server.reddit, &token, ListingKind::Posts, limit, sort).await?;
    Ok(Json(raw.iter().map(model::assemble_post).collect()))
}

async fn comments_handler(
    State(server): State<Server>,
    Query(query): Query<SessionListingQuery>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let sort = SortOrder::parse(query.sort_order.as_deref())?;
    let limit = clamp_limit(query.limit);
    let token = resolve_token(&server, query.session_id).await?;

    let raw = fetch_listing(&server.reddit, &token, ListingKind::Comments, limit, sort).await?;
    Ok(Json(raw.iter().map(model::assemble_comment).collect()))
}

/// Credentialed variant: password grant per call, no session involved.
async fn stats_with_credentials_handler(
    State(server): State<Server>,
    Json(credentials): Json<RedditCredentials>,
) -> Result<Json<UserProfile>, AppError> {
    let reddit = server.reddit.with_user_agent(&credentials.user_agent);
    let grant = reddit.exchange_password(&credentials).await?;
    Ok(Json(build_profile(&reddit, &grant.access_token).await?))
}

async fn posts_with_credentials_handler(
    State(server): State<Server>,
    Query(params): Query<ListingParams>,
    Json(credentials): Json<RedditCredentials>,
) -> Result<Json<Vec<Post>>, AppError> {
    let sort = SortOrder::parse(params.sort_order.as_deref())?;
    let limit = clamp_limit(params.limit);

    let reddit = server.reddit.with_user_agent(&credentials.user_agent);
    let grant = reddit.exchange_password(&credentials).await?;

    let raw = fetch_listing(&reddit, &grant.access_token, ListingKind::Posts, limit, sort).await?;
    Ok(Json(raw.iter().map(model::assemble_post).collect()))
}

async fn comments_with_credentials_handler(
    State(server): State<Server>,
    Query(params): Query<ListingParams>,
    Json(credentials): Json<RedditCredentials>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let sort = SortOrder::parse(params.sort_order.as_deref())?;
    let limit = clamp_limit(params.limit);

    let reddit = server.reddit.with_user_agent(&credentials.user_agent);
    let grant = reddit.exchange_password(&credentials).await?;

    let raw = fetch_listing(
        &reddit,
        &grant.access_token,
        ListingKind::Comments,
        limit,
        sort,
    )
    .await?;
    Ok(Json(raw.iter().map(model::assemble_comment).collect()))
}

fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

async fn resolve_token(server: &Server, session_id: Option<String>) -> Result<String, AppError> {
    let session_id =
        session_id.ok_or_else(|| AppError::Unauthorized("missing session_id".to_string()))?;
    let session = server.sessions.get_session(&session_id).await?;
    Ok(session.access_token)
}

async fn user_name(reddit: &RedditClient, token: &str) -> Result<String, AppError> {
    let identity = reddit.identity(token).await?;
    user_name_from(&identity)
}

async fn build_profile(reddit: &RedditClient, token: &str) -> Result<UserProfile, AppError> {
    let identity = reddit.identity(token).await?;
    let username = user_name_from(&identity)?;

    let total_posts = reddit
        .count_all(token, &format!("/user/{username}/submitted"))
        .await?;
    let total_comments = reddit
        .count_all(token, &format!("/user/{username}/comments"))
        .await?;

    Ok(model::assemble_profile(
        &identity,
        total_posts,
        total_comments,
    ))
}

fn user_name_from(identity: &Value) -> Result<String, AppError> {
    let name = identity
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::Upstream(
            "identity response carries no user name".to_string(),
        ));
    }
    Ok(name.to_string())
}

async fn fetch_listing(
    reddit: &RedditClient,
    token: &str,
    kind: ListingKind,
    limit: u32,
    sort: SortOrder,
) -> Result<Vec<Value>, AppError> {
    let username = user_name(reddit, token).await?;
    let path = format!("/user/{username}/{}", kind.segment());

    match sort {
        SortOrder::Newest => {
            let mut items = reddit.fetch_newest(token, &path, limit).await?;
            items.truncate(limit as usize);
            Ok(items)
        }
        SortOrder::Oldest => {
            let history = reddit.fetch_all(token, &path).await?;
            Ok(model::oldest_slice(history, limit as usize))
        }
    }
}
