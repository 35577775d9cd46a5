mod common;

use reqwest::StatusCode;
use serde_json::{Value, json};
use storefront_client::{ApiReply, Config, Error, FormPart, RequestOptions};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use common::{bearer, client_with_tokens, refresh_calls, requests_to};

fn products() -> Value {
    json!([{"id": 1, "slug": "lamp"}, {"id": 2, "slug": "desk"}])
}

#[tokio::test]
async fn valid_token_fetches_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .and(header("Authorization", "Bearer valid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("valid"), Some("r"));
    let list: Vec<Value> = client.get("/products/").await.expect("products");

    assert_eq!(list.len(), 2);
    assert!(refresh_calls(&server).await.is_empty());
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(|req: &Request| match bearer(req).as_deref() {
            Some("Bearer fresh") => ResponseTemplate::new(200).set_body_json(products()),
            _ => ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})),
        })
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({"refresh": "refresh-ok"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("expired"), Some("refresh-ok"));
    let list: Vec<Value> = client.get("/products/").await.expect("products");

    assert_eq!(list.len(), 2);
    assert_eq!(client.session().access_token().as_deref(), Some("fresh"));
    assert_eq!(
        client.session().refresh_token().as_deref(),
        Some("refresh-ok")
    );

    let gets = requests_to(&server, "GET", "/api/products/").await;
    let headers: Vec<_> = gets.iter().map(bearer).collect();
    assert_eq!(
        headers,
        vec![Some("Bearer expired".into()), Some("Bearer fresh".into())]
    );
}

#[tokio::test]
async fn without_refresh_token_401_is_retried_once_anonymously() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(|req: &Request| match bearer(req) {
            Some(_) => ResponseTemplate::new(401),
            None => ResponseTemplate::new(200).set_body_json(products()),
        })
        .expect(2)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("expired"), None);
    let list: Vec<Value> = client.get("/products/").await.expect("public listing");

    assert_eq!(list.len(), 2);
    assert!(refresh_calls(&server).await.is_empty());
    let gets = requests_to(&server, "GET", "/api/products/").await;
    assert_eq!(bearer(&gets[0]).as_deref(), Some("Bearer expired"));
    assert_eq!(bearer(&gets[1]), None);
}

#[tokio::test]
async fn anonymous_retry_surfaces_its_own_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Authentication credentials were not provided."})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("expired"), None);
    let err = client.get::<Value>("/orders/").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(
        err.to_string(),
        "Authentication credentials were not provided."
    );
}

#[tokio::test]
async fn anonymous_retry_drops_caller_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("expired"), None);
    let options = RequestOptions::get()
        .header("Authorization", "Token custom")
        .unwrap();
    let err = client.request::<Value>("/orders/", options).await.unwrap_err();

    assert!(err.is_unauthorized());
    let gets = requests_to(&server, "GET", "/api/orders/").await;
    assert_eq!(gets.len(), 2);
    assert_eq!(bearer(&gets[0]).as_deref(), Some("Token custom"));
    assert_eq!(bearer(&gets[1]), None);
}

#[tokio::test]
async fn failed_refresh_clears_session_and_replays_anonymously() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(|req: &Request| match bearer(req) {
            Some(_) => ResponseTemplate::new(401),
            None => ResponseTemplate::new(200).set_body_json(products()),
        })
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is invalid or expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("expired"), Some("revoked"));
    let list: Vec<Value> = client.get("/products/").await.expect("public listing");

    assert_eq!(list.len(), 2);
    assert!(client.session().tokens().is_empty());
    let gets = requests_to(&server, "GET", "/api/products/").await;
    assert_eq!(bearer(&gets[1]), None);
}

#[tokio::test]
async fn failed_refresh_on_private_endpoint_yields_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/profile/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Authentication credentials were not provided."})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("expired"), Some("revoked"));
    let err = client.current_user().await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(client.session().tokens().is_empty());
}

#[tokio::test]
async fn no_content_yields_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/products/lamp/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("valid"), None);
    let reply = client
        .request::<Value>("/products/lamp/", RequestOptions::delete())
        .await
        .expect("delete");

    assert_eq!(reply, ApiReply::Empty);
}

#[tokio::test]
async fn error_body_message_fallbacks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/detail/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/empty/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/garbage/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, None, None);
    let detail = client.get::<Value>("/detail/").await.unwrap_err();
    let empty = client.get::<Value>("/empty/").await.unwrap_err();
    let garbage = client.get::<Value>("/garbage/").await.unwrap_err();

    assert_eq!(detail.to_string(), "Invalid credentials");
    assert_eq!(empty.to_string(), "API error: 404");
    assert_eq!(garbage.to_string(), "API error: 503");
}

#[tokio::test]
async fn success_with_invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, None, None);
    let err = client.get::<Value>("/products/").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let config = Config::from_values("http://127.0.0.1:1/api", Some(2), None);
    let client = storefront_client::ApiClient::new(config).expect("client");
    let err = client.get::<Value>("/products/").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn json_and_form_bodies_set_content_type_accordingly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, Some("valid"), None);
    let _: Value = client
        .fetch(
            "/categories/",
            RequestOptions::post().json(&json!({"name": "Lamps"})).unwrap(),
        )
        .await
        .expect("json post");
    let _: Value = client
        .fetch(
            "/products/",
            RequestOptions::post().form(vec![
                FormPart::text("name", "Lamp"),
                FormPart::file("image", "lamp.png", vec![0x89, 0x50]).with_mime("image/png"),
            ]),
        )
        .await
        .expect("form post");

    let json_req = &requests_to(&server, "POST", "/api/categories/").await[0];
    assert_eq!(
        json_req.headers.get("Content-Type").unwrap(),
        "application/json"
    );
    assert_eq!(json_req.headers.get("Cache-Control").unwrap(), "no-store");
    assert_eq!(
        serde_json::from_slice::<Value>(&json_req.body).unwrap(),
        json!({"name": "Lamps"})
    );

    let form_req = &requests_to(&server, "POST", "/api/products/").await[0];
    let content_type = form_req
        .headers
        .get("Content-Type")
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert_eq!(bearer(form_req).as_deref(), Some("Bearer valid"));
    let body = String::from_utf8_lossy(&form_req.body);
    assert!(body.contains("name=\"image\"; filename=\"lamp.png\""));
}
