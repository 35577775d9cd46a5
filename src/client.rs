use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::Error;
use crate::request::{RequestExecutor, RequestOptions};
use crate::response::{self, ApiReply};
use crate::session::{Renewal, SessionManager};
use crate::telemetry::refresh::RefreshTelemetry;
use crate::token::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::types::{RefreshRequest, RefreshResponse};

pub const REFRESH_ENDPOINT: &str = "/token/refresh/";

/// Authenticated client for the storefront REST backend.
///
/// Cloning is cheap; clones share one `SessionManager`, so the single-refresh
/// guarantee spans every clone.
#[derive(Clone)]
pub struct ApiClient {
    executor: RequestExecutor,
    session: Arc<SessionManager>,
}

impl ApiClient {
    /// Builds a client, persisting tokens to `config.token_file` when set.
    pub fn new(config: Config) -> Result<Self, Error> {
        let store: Arc<dyn TokenStore> = match config.token_file.as_ref() {
            Some(path) => Arc::new(FileTokenStore::open(path)?),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn TokenStore>) -> Result<Self, Error> {
        Self::with_session(config, Arc::new(SessionManager::new(store)))
    }

    pub fn with_session(config: Config, session: Arc<SessionManager>) -> Result<Self, Error> {
        Ok(Self {
            executor: RequestExecutor::new(&config)?,
            session,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Issues one request with the stored access token, recovering from a 401
    /// by refreshing (or joining a refresh in flight) and replaying once.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiReply<T>, Error> {
        let bearer = self.session.access_token();
        let response = self
            .executor
            .execute(endpoint, &options, bearer.as_deref())
            .await?;
        let response = if response.status() == StatusCode::UNAUTHORIZED {
            self.recover_unauthorized(endpoint, &options, bearer.as_deref())
                .await?
        } else {
            response
        };
        response::interpret(response).await
    }

    /// `request` for endpoints that always return a body.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, Error> {
        self.request(endpoint, options).await?.into_data()
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        self.fetch(endpoint, RequestOptions::get()).await
    }

    async fn recover_unauthorized(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        rejected: Option<&str>,
    ) -> Result<Response, Error> {
        warn!(
            endpoint,
            method = %options.method,
            authenticated = rejected.is_some(),
            "request.unauthorized: received 401"
        );
        let telemetry = RefreshTelemetry::new(endpoint);
        let renewal = self
            .session
            .renew(rejected, |refresh| self.refresh_access(refresh), &telemetry)
            .await?;
        match renewal {
            Renewal::Bearer(token) => {
                debug!(endpoint, attempt_id = %telemetry.attempt_id(), "replaying with renewed token");
                self.executor.execute(endpoint, options, Some(&token)).await
            }
            Renewal::Anonymous => {
                debug!(endpoint, attempt_id = %telemetry.attempt_id(), "replaying without credentials");
                // The anonymous replay carries no credentials, caller-supplied ones included.
                let mut anonymous = options.clone();
                anonymous.headers.remove(AUTHORIZATION);
                self.executor.execute(endpoint, &anonymous, None).await
            }
        }
    }

    /// The refresh call itself. Never routed through 401 recovery.
    async fn refresh_access(&self, refresh: String) -> Result<String, Error> {
        let options = RequestOptions::post().json(&RefreshRequest { refresh: &refresh })?;
        let response = self
            .executor
            .execute(REFRESH_ENDPOINT, &options, None)
            .await?;
        let renewed: RefreshResponse = response::interpret(response).await?.into_data()?;
        debug!(access_len = renewed.access.len(), "refresh.token_received");
        Ok(renewed.access)
    }
}
