//! Shared harness for integration tests: a wiremock stand-in for Reddit plus
//! a fully configured server and router.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use reddit_stats_api::{Config, Server};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub struct TestHarness {
    pub server: Server,
    pub app: Router,
    pub reddit: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        let reddit = MockServer::start().await;

        let mut config = Config::default();
        config.reddit.client_id = "test-client-id".to_string();
        config.reddit.client_secret = "test-client-secret".to_string();
        config.reddit.redirect_uri = "http://localhost:8000/auth/callback".to_string();
        config.reddit.auth_origin = reddit.uri();
        config.reddit.api_origin = reddit.uri();
        config.frontend.origin = "http://localhost:3000".to_string();
        config.session.sweep_interval_secs = 0;

        let server = Server::new(config).unwrap();
        let app = server.create_app();

        Self {
            server,
            app,
            reddit,
        }
    }

    /// Mock a successful token grant for any flow hitting the token endpoint.
    #[allow(dead_code)]
    pub async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mock-access-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "scope": "identity read history"
            })))
            .mount(&self.reddit)
            .await;
    }

    #[allow(dead_code)]
    pub async fn mock_identity(&self, identity: Value) {
        Mock::given(method("GET"))
            .and(path("/api/v1/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(identity))
            .mount(&self.reddit)
            .await;
    }

    /// Empty listing for both history endpoints of `username`.
    #[allow(dead_code)]
    pub async fn mock_empty_listings(&self, username: &str) {
        for segment in ["submitted", "comments"] {
            Mock::given(method("GET"))
                .and(path(format!("/user/{username}/{segment}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(listing_page(vec![], None)))
                .mount(&self.reddit)
                .await;
        }
    }

    /// Run `/auth/login` and return the issued state.
    #[allow(dead_code)]
    pub async fn login_state(&self) -> String {
        let response = self.get("/auth/login").await;
        assert_eq!(response.status(), 200);
        let body = body_json(response).await;
        body["state"].as_str().unwrap().to_string()
    }

    /// Full login: callback with a valid state and return the session id.
    #[allow(dead_code)]
    pub async fn establish_session(&self) -> String {
        let state = self.login_state().await;
        let response = self
            .get(&format!("/auth/callback?code=valid-code&state={state}"))
            .await;
        let location = location(&response);
        let url = url::Url::parse(&location).unwrap();
        url.query_pairs()
            .find(|(k, _)| k == "session")
            .map(|(_, v)| v.to_string())
            .unwrap_or_else(|| panic!("no session in redirect: {location}"))
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    #[allow(dead_code)]
    pub async fn delete(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    #[allow(dead_code)]
    pub async fn post_json(&self, uri: &str, body: &Value) -> Response<Body> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Reddit `Listing` envelope around raw item payloads.
pub fn listing_page(children: Vec<Value>, after: Option<&str>) -> Value {
    json!({
        "kind": "Listing",
        "data": {
            "after": after,
            "children": children
                .into_iter()
                .map(|data| json!({"kind": "t3", "data": data}))
                .collect::<Vec<_>>()
        }
    })
}

#[allow(dead_code)]
pub fn post_items(count: usize, first_created: f64) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "title": format!("post {i}"),
                "subreddit": "rust",
                "score": i,
                "ups": i,
                "downs": 0,
                "num_comments": 1,
                "created_utc": first_created + i as f64,
                "permalink": format!("/r/rust/comments/p{i}/post_{i}/"),
                "selftext": ""
            })
        })
        .collect()
}
