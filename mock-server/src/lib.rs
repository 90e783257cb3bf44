use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-metabase-session";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "password";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateCard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub archived: Option<bool>,
}

#[derive(Debug, Default)]
pub struct Store {
    cards: BTreeMap<u64, Card>,
    last_id: u64,
    sessions: HashSet<Uuid>,
}

pub type Db = Arc<RwLock<Store>>;

/// Non-JSON error answers, mirroring the plain-text bodies real servers send.
#[derive(Debug, PartialEq, Eq)]
pub enum Failure {
    Unauthenticated,
    NotFound,
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        match self {
            Failure::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthenticated").into_response(),
            Failure::NotFound => (StatusCode::NOT_FOUND, "Not found.").into_response(),
        }
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/session", post(login))
        .route("/api/card", get(list_cards).post(create_card))
        .route("/api/card/{id}", get(get_card).put(update_card).delete(delete_card))
        .route("/api/echo", get(echo))
        .route("/api/health", get(health))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

fn require_session(store: &Store, headers: &HeaderMap) -> Result<(), Failure> {
    let token = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or(Failure::Unauthenticated)?;
    if store.sessions.contains(&token) {
        Ok(())
    } else {
        Err(Failure::Unauthenticated)
    }
}

async fn login(State(db): State<Db>, Json(input): Json<Login>) -> Response {
    if input.email != ADMIN_EMAIL || input.password != ADMIN_PASSWORD {
        debug!(email = %input.email, "rejected login");
        let errors = json!({"errors": {"password": "did not match stored password"}});
        return (StatusCode::UNAUTHORIZED, Json(errors)).into_response();
    }
    let id = Uuid::new_v4();
    db.write().await.sessions.insert(id);
    Json(json!({"id": id})).into_response()
}

async fn list_cards(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<Card>>, Failure> {
    let store = db.read().await;
    require_session(&store, &headers)?;
    Ok(Json(store.cards.values().cloned().collect()))
}

async fn create_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateCard>,
) -> Result<Json<Card>, Failure> {
    let mut store = db.write().await;
    require_session(&store, &headers)?;
    store.last_id += 1;
    let card = Card {
        id: store.last_id,
        name: input.name,
        description: input.description,
        archived: false,
    };
    store.cards.insert(card.id, card.clone());
    Ok(Json(card))
}

async fn get_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Card>, Failure> {
    let store = db.read().await;
    require_session(&store, &headers)?;
    store.cards.get(&id).cloned().map(Json).ok_or(Failure::NotFound)
}

async fn update_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(input): Json<UpdateCard>,
) -> Result<Json<Card>, Failure> {
    let mut store = db.write().await;
    require_session(&store, &headers)?;
    let card = store.cards.get_mut(&id).ok_or(Failure::NotFound)?;
    if let Some(name) = input.name {
        card.name = name;
    }
    if let Some(description) = input.description {
        card.description = Some(description);
    }
    if let Some(archived) = input.archived {
        card.archived = archived;
    }
    Ok(Json(card.clone()))
}

async fn delete_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    require_session(&store, &headers)?;
    store
        .cards
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(Failure::NotFound)
}

/// Reflects the query string back, raw and decoded.
async fn echo(RawQuery(raw): RawQuery, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({"raw": raw, "params": params}))
}

async fn health() -> &'static str {
    "ok"
}
