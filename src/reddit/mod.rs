pub mod types;

use crate::{config::Config, error::AppError};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    ResourceOwnerPassword, ResourceOwnerUsername, Scope, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenResponse},
    reqwest::async_http_client,
};
use reqwest::header;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use types::{Listing, ListingData, RedditCredentials, Thing, TokenGrant};

/// Page size used when walking a listing to exhaustion.
pub const LISTING_PAGE_SIZE: u32 = 100;

/// Reddit omits `expires_in` for some grants; their tokens last an hour.
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

const OAUTH_SCOPES: [&str; 3] = ["identity", "read", "history"];

/// Client for Reddit's OAuth and listing endpoints. Cheap to clone; all
/// requests share one pooled HTTP client with a bounded timeout.
#[derive(Clone)]
pub struct RedditClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    user_agent: String,
    auth_origin: String,
    api_origin: String,
}

impl RedditClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            client_id: config.reddit.client_id.clone(),
            client_secret: config.reddit.client_secret.clone(),
            redirect_uri: config.reddit.redirect_uri.clone(),
            user_agent: config.reddit.user_agent.clone(),
            auth_origin: config.reddit.auth_origin.clone(),
            api_origin: config.reddit.api_origin.clone(),
        })
    }

    /// Clone with a caller-supplied User-Agent, for the credentialed variant.
    pub fn with_user_agent(&self, user_agent: &str) -> Self {
        let mut client = self.clone();
        client.user_agent = user_agent.to_string();
        client
    }

    fn oauth_client(&self, client_id: &str, client_secret: &str) -> Result<BasicClient, AppError> {
        let auth_url = AuthUrl::new(format!("{}/api/v1/authorize", self.auth_origin))
            .map_err(|e| AppError::Internal(format!("invalid authorization URL: {e}")))?;
        let token_url = TokenUrl::new(format!("{}/api/v1/access_token", self.auth_origin))
            .map_err(|e| AppError::Internal(format!("invalid token URL: {e}")))?;
        let redirect_url = RedirectUrl::new(self.redirect_uri.clone())
            .map_err(|e| AppError::Internal(format!("invalid redirect URI: {e}")))?;

        Ok(BasicClient::new(
            ClientId::new(client_id.to_string()),
            Some(ClientSecret::new(client_secret.to_string())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url))
    }

    /// Build the authorization URL for one login attempt bound to `state`.
    pub fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        let client = self.oauth_client(&self.client_id, &self.client_secret)?;

        let (url, _csrf_token) = client
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new((*s).to_string())))
            .add_extra_param("duration", "temporary")
            .url();

        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token. The token endpoint
    /// is called with HTTP Basic client authentication and the standard
    /// `grant_type=authorization_code` form body.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AppError> {
        let client = self.oauth_client(&self.client_id, &self.client_secret)?;

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AppError::TokenExchange(e.to_string()))?;

        Ok(Self::grant_from(&token))
    }

    /// Script-app password grant with caller-supplied client credentials.
    pub async fn exchange_password(
        &self,
        credentials: &RedditCredentials,
    ) -> Result<TokenGrant, AppError> {
        let client = self.oauth_client(&credentials.client_id, &credentials.client_secret)?;

        let token = client
            .exchange_password(
                &ResourceOwnerUsername::new(credentials.username.clone()),
                &ResourceOwnerPassword::new(credentials.password.clone()),
            )
            .request_async(async_http_client)
            .await
            .map_err(|e| AppError::TokenExchange(e.to_string()))?;

        Ok(Self::grant_from(&token))
    }

    fn grant_from(token: &BasicTokenResponse) -> TokenGrant {
        TokenGrant {
            access_token: token.access_token().secret().clone(),
            expires_in: token
                .expires_in()
                .map(|d| d.as_secs())
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// GET /api/v1/me — the authenticated account's identity record.
    pub async fn identity(&self, token: &str) -> Result<Value, AppError> {
        self.get_json(token, "/api/v1/me", &[]).await
    }

    /// One page of a listing endpoint.
    pub async fn listing_page(
        &self,
        token: &str,
        path: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<ListingData, AppError> {
        let mut query = vec![
            ("limit", limit.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let value = self.get_json(token, path, &query).await?;
        let listing: Listing = serde_json::from_value(value)
            .map_err(|e| AppError::Upstream(format!("unexpected listing shape from {path}: {e}")))?;
        Ok(listing.data)
    }

    /// Fetch a single page of at most `limit` items in provider order.
    pub async fn fetch_newest(
        &self,
        token: &str,
        path: &str,
        limit: u32,
    ) -> Result<Vec<Value>, AppError> {
        let page = self.listing_page(token, path, limit, None).await?;
        Ok(page.children.into_iter().map(|t| t.data).collect())
    }

    /// Count every item reachable through the cursor chain.
    pub async fn count_all(&self, token: &str, path: &str) -> Result<u64, AppError> {
        let mut count = 0u64;
        self.walk_listing(token, path, |children| count += children.len() as u64)
            .await?;
        Ok(count)
    }

    /// Collect every item reachable through the cursor chain. Unbounded, like
    /// the counting walk; used for the oldest-N path.
    pub async fn fetch_all(&self, token: &str, path: &str) -> Result<Vec<Value>, AppError> {
        let mut items = Vec::new();
        self.walk_listing(token, path, |children| {
            items.extend(children.into_iter().map(|t| t.data));
        })
        .await?;
        Ok(items)
    }

    /// Walk a cursor-paginated listing to exhaustion. Terminates on an empty
    /// page, a missing/empty cursor, or a cursor seen before (malformed
    /// providers must not cause an infinite loop). The cursor sent upstream
    /// is always exactly the one the provider returned.
    async fn walk_listing<F>(&self, token: &str, path: &str, mut visit: F) -> Result<(), AppError>
    where
        F: FnMut(Vec<Thing>),
    {
        let mut after: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let page = self
                .listing_page(token, path, LISTING_PAGE_SIZE, after.as_deref())
                .await?;

            let page_was_empty = page.children.is_empty();
            visit(page.children);

            if page_was_empty {
                break;
            }

            match page.after {
                Some(cursor) if !cursor.is_empty() => {
                    if !seen.insert(cursor.clone()) {
                        break;
                    }
                    after = Some(cursor);
                }
                _ => break,
            }
        }

        Ok(())
    }

    async fn get_json(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, AppError> {
        let url = format!("{}{}", self.api_origin, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(header::USER_AGENT, &self.user_agent)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "{path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid JSON from {path}: {e}")))
    }
}
