use reqwest::header::{
    AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue, PRAGMA, USER_AGENT,
};
use reqwest::{Client, Response};
use tracing::debug;

use crate::config::Config;
use crate::errors::Error;

use super::body::{RequestBody, build_form};
use super::options::RequestOptions;

/// Performs exactly one HTTP call against the configured base URL.
///
/// Status codes are not interpreted here.
#[derive(Clone, Debug)]
pub struct RequestExecutor {
    http: Client,
    base_url: String,
    user_agent: HeaderValue,
}

impl RequestExecutor {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let base_url = config.normalized_base_url()?;
        let user_agent = HeaderValue::from_str(config.user_agent())
            .map_err(|e| Error::Config(format!("Invalid user agent: {}", e)))?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
            user_agent,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Headers for one attempt: content type (JSON unless the body is a form),
    /// no-store cache directives, the bearer credential, then caller headers.
    pub fn headers_for(
        &self,
        options: &RequestOptions,
        bearer: Option<&str>,
    ) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        if !options.body.is_form() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        if let Some(token) = bearer {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::InvalidHeader("access token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        for name in options.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in options.headers.iter() {
            headers.append(name.clone(), value.clone());
        }
        Ok(headers)
    }

    pub async fn execute(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        bearer: Option<&str>,
    ) -> Result<Response, Error> {
        let url = self.url(endpoint);
        let headers = self.headers_for(options, bearer)?;
        let builder = self
            .http
            .request(options.method.clone(), &url)
            .headers(headers);
        let builder = match &options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(value)?),
            RequestBody::Text(text) => builder.body(text.clone()),
            RequestBody::Form(parts) => builder.multipart(build_form(parts)?),
        };
        debug!(
            method = %options.method,
            url = %url,
            authenticated = bearer.is_some(),
            "request.send"
        );
        let response = builder.send().await?;
        debug!(method = %options.method, url = %url, status = %response.status(), "request.done");
        Ok(response)
    }
}
