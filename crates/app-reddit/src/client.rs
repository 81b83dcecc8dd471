use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    credentials::RedditCredentials,
    listing::{submissions_from_json, Submission},
    session::{now_unix, Session, SessionStore, SessionStoreError},
};

pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";

/// Reddit caps listings at 100 entries per request
pub const MAX_LISTING_LIMIT: u32 = 100;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to reach reddit: {0}")]
    Http(#[from] reqwest::Error),
    #[error("reddit rejected the credentials: {0}")]
    Rejected(String),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("failed to fetch listing: {0}")]
    Http(#[from] reqwest::Error),
    #[error("listing returned {0}")]
    Status(StatusCode),
    #[error("failed to parse listing: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Authenticated Reddit API handle.
///
/// Sessions go through the injected [`SessionStore`]: a stored, unexpired
/// token is reused, anything else triggers a password-grant token request.
pub struct RedditClient {
    http: reqwest::Client,
    credentials: RedditCredentials,
    store: Arc<dyn SessionStore>,
    token_url: String,
    api_base: String,
}

impl RedditClient {
    pub fn new(
        credentials: RedditCredentials,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            credentials,
            store,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Point the client at different endpoints. Only useful for tests.
    #[must_use]
    pub fn with_endpoints<T, A>(mut self, token_url: T, api_base: A) -> Self
    where
        T: Into<String>,
        A: Into<String>,
    {
        self.token_url = token_url.into();
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Load-or-create a usable session.
    pub async fn authenticate(&self) -> Result<Session, AuthError> {
        if let Some(session) = self.store.load()? {
            if !session.is_expired() {
                debug!("Reusing stored session");
                return Ok(session);
            }

            self.store.invalidate()?;
        }

        self.request_session().await
    }

    async fn request_session(&self) -> Result<Session, AuthError> {
        info!("Requesting new session token");

        let resp = self
            .http
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await?;

        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(AuthError::Rejected(format!(
                "token endpoint returned {}",
                resp.status()
            )));
        }

        let token = resp.error_for_status()?.json::<TokenResponse>().await?;

        // Bad user credentials come back as 200 with an error field
        if let Some(error) = token.error {
            return Err(AuthError::Rejected(error.to_string()));
        }

        let access_token = token.access_token.ok_or_else(|| {
            AuthError::Rejected("token endpoint returned no access_token".to_string())
        })?;

        let session = Session {
            access_token,
            expires_at: now_unix() + token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        };

        self.store.store(&session)?;

        Ok(session)
    }

    /// Newest posts of a subreddit, in listing order.
    pub async fn list_new(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<Submission>, ListingError> {
        self.list(&format!("/r/{subreddit}/new"), limit).await
    }

    /// Newest submissions of a user, in listing order.
    pub async fn list_user_submitted(
        &self,
        user: &str,
        limit: u32,
    ) -> Result<Vec<Submission>, ListingError> {
        self.list(&format!("/user/{user}/submitted"), limit).await
    }

    async fn list(&self, path: &str, limit: u32) -> Result<Vec<Submission>, ListingError> {
        let limit = limit.min(MAX_LISTING_LIMIT);
        let session = self.authenticate().await?;

        let mut resp = self.listing_request(path, limit, &session).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            // The stored token went stale server-side
            warn!("Stored session rejected, re-authenticating");
            self.store.invalidate().map_err(AuthError::from)?;

            let session = self.request_session().await?;
            resp = self.listing_request(path, limit, &session).await?;
        }

        if !resp.status().is_success() {
            return Err(ListingError::Status(resp.status()));
        }

        let body = resp.text().await?;

        Ok(submissions_from_json(&body)?)
    }

    async fn listing_request(
        &self,
        path: &str,
        limit: u32,
        session: &Session,
    ) -> Result<reqwest::Response, ListingError> {
        self.http
            .get(format!("{}{}", self.api_base, path))
            .query(&[
                ("limit", limit.to_string()),
                ("raw_json", "1".to_string()),
            ])
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(ListingError::Http)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}
