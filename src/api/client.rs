//! HTTP client for the events API.
//!
//! Every request carries the stored access token. A 401 triggers one refresh
//! through `/users/refresh-token`; when that succeeds the request is sent once
//! more with the new token, otherwise the original 401 is returned.
//! Refreshes are serialized, so concurrent 401s spend the refresh token once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::tokens::{TokenStore, Tokens};
use crate::error::{ApiError, ApiResult};
use crate::model::{Block, Event, EventsPayload};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const REFRESH_PATH: &str = "/users/refresh-token";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: TokenStore,
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: TokenStore, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            tokens,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.access().is_some()
    }

    // --- Auth ---

    /// Ask the API to mail a login code to `email`.
    pub async fn send_code(&self, email: &str) -> ApiResult<()> {
        let body = json!({ "email": email });
        let response = self.send(Method::POST, "/users/send-code", Some(&body)).await?;
        check_status(response).await?;
        info!(email, "login code sent");
        Ok(())
    }

    /// Exchange the mailed code for tokens and store them.
    pub async fn verify_code(&self, email: &str, code: &str) -> ApiResult<Tokens> {
        let body = json!({ "email": email, "code": code });
        let response = self.send(Method::POST, "/users/verify-code", Some(&body)).await?;
        let tokens: Tokens = read_json(response).await?;
        self.tokens.set(tokens.clone());
        info!(email, "login verified");
        Ok(tokens)
    }

    /// Drop the stored tokens.
    pub fn logout(&self) {
        self.tokens.clear();
        info!("logged out");
    }

    // --- Events ---

    pub async fn current_events(&self) -> ApiResult<Vec<Event>> {
        let response = self.send(Method::GET, "/users/current-events", None).await?;
        let payload: EventsPayload = read_json(response).await?;
        Ok(payload.events)
    }

    pub async fn all_events(&self) -> ApiResult<Vec<Event>> {
        let response = self.send(Method::GET, "/users/all-events", None).await?;
        let payload: EventsPayload = read_json(response).await?;
        Ok(payload.events)
    }

    pub async fn event(&self, id: i64) -> ApiResult<Event> {
        let path = format!("/users/event/{id}");
        let response = self.send(Method::GET, &path, None).await?;
        read_json(response).await
    }

    pub async fn block(&self, id: i64) -> ApiResult<Block> {
        let path = format!("/users/block/{id}");
        let response = self.send(Method::GET, &path, None).await?;
        read_json(response).await
    }

    // --- Transport ---

    #[tracing::instrument(skip(self, body), fields(base = %self.base_url))]
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Response> {
        let used = self.tokens.access();
        let response = self
            .send_once(method.clone(), path, body, used.clone())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let _guard = self.refresh_lock.lock().await;
        let current = self.tokens.access();
        if current.is_some() && current != used {
            debug!("tokens refreshed by another request, retrying");
            return self.send_once(method, path, body, current).await;
        }

        let Some(refresh) = self.tokens.refresh() else {
            debug!("401 without refresh token");
            return Ok(response);
        };

        match self.refresh_tokens(&refresh).await {
            Ok(tokens) => {
                self.tokens.set(tokens);
                debug!("tokens refreshed, retrying request");
                self.send_once(method, path, body, self.tokens.access()).await
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                Ok(response)
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        access: Option<String>,
    ) -> ApiResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = access.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn refresh_tokens(&self, refresh: &str) -> ApiResult<Tokens> {
        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "refresh_token": refresh }))
            .send()
            .await?;
        read_json(response).await
    }
}

async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}
