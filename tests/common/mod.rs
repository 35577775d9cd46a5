#![allow(dead_code)]

use std::sync::Arc;

use storefront_client::{ApiClient, Config, MemoryTokenStore, REFRESH_ENDPOINT};
use wiremock::{MockServer, Request};

pub fn config(server: &MockServer) -> Config {
    Config::from_values(format!("{}/api", server.uri()), Some(5), None)
}

pub fn client_with_tokens(
    server: &MockServer,
    access: Option<&str>,
    refresh: Option<&str>,
) -> ApiClient {
    ApiClient::with_store(
        config(server),
        Arc::new(MemoryTokenStore::with_tokens(access, refresh)),
    )
    .expect("client")
}

pub fn bearer(req: &Request) -> Option<String> {
    req.headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

pub async fn requests_to(server: &MockServer, http_method: &str, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|req| req.method.as_str() == http_method && req.url.path() == route)
        .collect()
}

pub async fn refresh_calls(server: &MockServer) -> Vec<Request> {
    requests_to(server, "POST", &format!("/api{}", REFRESH_ENDPOINT)).await
}
