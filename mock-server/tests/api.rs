use axum::http::{self, Request, StatusCode};
use axum::response::Response;
use axum::routing::RouterIntoService;
use http_body_util::BodyExt;
use mock_server::{app, Card, ADMIN_EMAIL, ADMIN_PASSWORD, SESSION_HEADER};
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(SESSION_HEADER, token)
        .body(body.to_string())
        .unwrap()
}

async fn send(app: &mut RouterIntoService<String>, request: Request<String>) -> Response {
    ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
}

async fn login(app: &mut RouterIntoService<String>) -> String {
    let body = format!(r#"{{"email":"{ADMIN_EMAIL}","password":"{ADMIN_PASSWORD}"}}"#);
    let resp = send(app, json_request("POST", "/api/session", &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let session: Value = body_json(resp).await;
    session["id"].as_str().unwrap().to_string()
}

// --- session ---

#[tokio::test]
async fn login_returns_session_id() {
    let mut app = app().into_service();
    let id = login(&mut app).await;
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/session",
            r#"{"email":"admin@example.com","password":"wrong"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert!(body["errors"].is_object());
}

#[tokio::test]
async fn login_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/session", r#"{"email":"a"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- auth guard ---

#[tokio::test]
async fn list_cards_without_session_returns_401_text() {
    let resp = app()
        .oneshot(Request::builder().uri("/api/card").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_bytes(resp).await, "Unauthenticated");
}

#[tokio::test]
async fn create_card_with_unknown_session_returns_401() {
    let resp = app()
        .oneshot(authed(
            "POST",
            "/api/card",
            "00000000-0000-0000-0000-000000000000",
            r#"{"name":"Nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- cards ---

#[tokio::test]
async fn get_card_not_found() {
    let mut app = app().into_service();
    let token = login(&mut app).await;
    let resp = send(&mut app, authed("GET", "/api/card/42", &token, "")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_card_bad_id_returns_400() {
    let mut app = app().into_service();
    let token = login(&mut app).await;
    let resp = send(&mut app, authed("GET", "/api/card/not-a-number", &token, "")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn card_lifecycle() {
    let mut app = app().into_service();
    let token = login(&mut app).await;

    // create
    let resp = send(&mut app, authed("POST", "/api/card", &token, r#"{"name":"My Card"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Card = body_json(resp).await;
    assert_eq!(created.id, 1);
    assert_eq!(created.name, "My Card");
    assert!(!created.archived);

    // ids keep counting
    let resp = send(&mut app, authed("POST", "/api/card", &token, r#"{"name":"Second"}"#)).await;
    let second: Card = body_json(resp).await;
    assert_eq!(second.id, 2);

    // list
    let resp = send(&mut app, authed("GET", "/api/card", &token, "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cards: Vec<Card> = body_json(resp).await;
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].id, 1);

    // update, partial
    let resp = send(&mut app, authed("PUT", "/api/card/1", &token, r#"{"archived":true}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Card = body_json(resp).await;
    assert_eq!(updated.name, "My Card");
    assert!(updated.archived);

    // delete
    let resp = send(&mut app, authed("DELETE", "/api/card/1", &token, "")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = send(&mut app, authed("GET", "/api/card/1", &token, "")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await, "Not found.");
}

// --- misc ---

#[tokio::test]
async fn echo_reflects_query() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/echo?q=a+b%26c&limit=5")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["raw"], "q=a+b%26c&limit=5");
    assert_eq!(body["params"]["q"], "a b&c");
    assert_eq!(body["params"]["limit"], "5");
}

#[tokio::test]
async fn health_is_plain_text() {
    let resp = app()
        .oneshot(Request::builder().uri("/api/health").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "ok");
}
