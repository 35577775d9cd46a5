use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::Error;
use crate::telemetry::refresh::RefreshTelemetry;
use crate::token::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SessionTokens, TokenStore};
use crate::types::TokenPair;

use super::coordinator::{Admission, RefreshCoordinator, RefreshResolution, RefreshRole};

/// How the caller that saw a 401 should replay its request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Renewal {
    /// Retry with this access token.
    Bearer(String),
    /// Retry once without an authorization header.
    Anonymous,
}

/// Owns the token store and the refresh coordination state for one
/// application instance. Share it by reference (or `Arc`) between callers.
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    coordinator: RefreshCoordinator,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            coordinator: RefreshCoordinator::new(),
        }
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn tokens(&self) -> SessionTokens {
        SessionTokens::read(self.store.as_ref())
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn store_pair(&self, pair: &TokenPair) {
        self.store.set(ACCESS_TOKEN_KEY, &pair.access);
        self.store.set(REFRESH_TOKEN_KEY, &pair.refresh);
        debug!(
            access_len = pair.access.len(),
            refresh_len = pair.refresh.len(),
            "session.stored"
        );
    }

    pub fn set_access(&self, access: &str) {
        self.store.set(ACCESS_TOKEN_KEY, access);
    }

    pub fn clear(&self) {
        clear_store(self.store.as_ref());
    }

    /// Resolves a 401 into a replay decision.
    ///
    /// `rejected` is the access token the failed request carried. The first
    /// caller to get here while idle becomes the leader and runs `refresh_cb`
    /// with the stored refresh token; callers arriving during that refresh
    /// wait for its outcome. On refresh failure the leader clears the session
    /// and replays anonymously, while waiters get `Error::SessionExpired`.
    pub async fn renew<F, Fut>(
        &self,
        rejected: Option<&str>,
        refresh_cb: F,
        telemetry: &RefreshTelemetry,
    ) -> Result<Renewal, Error>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<String, Error>>,
    {
        let store = self.store.as_ref();
        let role = self.coordinator.enter(|| {
            let Some(refresh_token) = store.get(REFRESH_TOKEN_KEY) else {
                return Admission::NoRefreshToken;
            };
            match store.get(ACCESS_TOKEN_KEY) {
                Some(current) if Some(current.as_str()) != rejected => Admission::Rotated(current),
                _ => Admission::Refresh(refresh_token),
            }
        });

        match role {
            RefreshRole::NoRefreshToken => {
                debug!(context = telemetry.context(), "no refresh token; replaying anonymously");
                Ok(Renewal::Anonymous)
            }
            RefreshRole::Rotated(token) => {
                debug!(
                    context = telemetry.context(),
                    "access token already rotated; replaying with stored token"
                );
                Ok(Renewal::Bearer(token))
            }
            RefreshRole::Waiter(id, rx) => {
                telemetry.emit_waiting(id);
                match rx.await {
                    Ok(RefreshResolution::Renewed(token)) => Ok(Renewal::Bearer(token)),
                    Ok(RefreshResolution::Expired) => Err(Error::SessionExpired),
                    Ok(RefreshResolution::Abandoned) | Err(_) => Err(Error::RefreshInterrupted),
                }
            }
            RefreshRole::Leader(ticket, refresh_token) => {
                telemetry.emit_start();
                match refresh_cb(refresh_token).await {
                    Ok(access) => {
                        let resumed = ticket.resolve(
                            RefreshResolution::Renewed(access.clone()),
                            || store.set(ACCESS_TOKEN_KEY, &access),
                        );
                        telemetry.emit_success(resumed.len());
                        Ok(Renewal::Bearer(access))
                    }
                    Err(err) => {
                        let resumed =
                            ticket.resolve(RefreshResolution::Expired, || clear_store(store));
                        telemetry.emit_failure(&err, resumed.len());
                        warn!(
                            context = telemetry.context(),
                            "session cleared after refresh failure"
                        );
                        Ok(Renewal::Anonymous)
                    }
                }
            }
        }
    }
}

fn clear_store(store: &dyn TokenStore) {
    store.remove(ACCESS_TOKEN_KEY);
    store.remove(REFRESH_TOKEN_KEY);
    info!("session.cleared");
}
