//! Login state on top of `ApiClient`: tokens in, profile out.

use serde_json::Value;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::errors::Error;
use crate::request::{FormPart, RequestOptions};
use crate::types::{Credentials, Registration, TokenPair, UserProfile};

pub const LOGIN_ENDPOINT: &str = "/token/";
pub const REGISTER_ENDPOINT: &str = "/user/register/";
pub const PROFILE_ENDPOINT: &str = "/user/profile/";
pub const AVATAR_ENDPOINT: &str = "/user/upload-avatar/";

impl ApiClient {
    /// Exchanges credentials for a token pair, stores it, and loads the profile.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, Error> {
        let pair: TokenPair = self
            .fetch(LOGIN_ENDPOINT, RequestOptions::post().json(credentials)?)
            .await?;
        self.session().store_pair(&pair);
        info!("account.login");
        self.current_user().await
    }

    /// Creates the account, then logs in with its email and password.
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, Error> {
        self.request::<Value>(REGISTER_ENDPOINT, RequestOptions::post().json(registration)?)
            .await?;
        info!("account.registered");
        self.login(&Credentials::new(
            registration.email.clone(),
            registration.password.clone(),
        ))
        .await
    }

    pub fn logout(&self) {
        self.session().clear();
        info!("account.logout");
    }

    pub async fn current_user(&self) -> Result<UserProfile, Error> {
        self.get(PROFILE_ENDPOINT).await
    }

    /// Loads the profile for a previously stored session.
    ///
    /// Without a stored access token no call is made. Any failure drops the
    /// stored tokens and yields `None`.
    pub async fn restore_session(&self) -> Option<UserProfile> {
        if !self.session().is_authenticated() {
            return None;
        }
        match self.current_user().await {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "account.restore_failed");
                self.session().clear();
                None
            }
        }
    }

    pub async fn upload_avatar(&self, avatar: FormPart) -> Result<Value, Error> {
        let options = RequestOptions::post().form(vec![avatar]);
        self.request(AVATAR_ENDPOINT, options)
            .await
            .map(|reply| reply.into_option().unwrap_or(Value::Null))
    }
}
