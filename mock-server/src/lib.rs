use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_username: String,
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

#[derive(Default)]
pub struct Store {
    /// username -> password
    users: HashMap<String, String>,
    /// token -> username
    tokens: HashMap<String, String>,
    posts: BTreeMap<i64, Post>,
    next_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub fn app() -> Router {
    let db: Db = Db::default();
    let api = Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).put(update_post).delete(delete_post));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reject(status: StatusCode, message: &str) -> (StatusCode, String) {
    (status, message.to_string())
}

/// Resolve the bearer token to a username.
fn caller(store: &Store, headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| store.tokens.get(token))
        .cloned()
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Authentication required"))
}

async fn register(State(db): State<Db>, Json(input): Json<Credentials>) -> ApiResult<&'static str> {
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Username and password are required"));
    }
    let mut store = db.write().await;
    if store.users.contains_key(&input.username) {
        return Err(reject(StatusCode::CONFLICT, "Username already exists"));
    }
    tracing::info!(username = %input.username, "registered user");
    store.users.insert(input.username, input.password);
    Ok("User registered successfully")
}

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> ApiResult<Json<LoginResponse>> {
    let mut store = db.write().await;
    if store.users.get(&input.username) != Some(&input.password) {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid username or password"));
    }
    let token = Uuid::new_v4().to_string();
    store.tokens.insert(token.clone(), input.username);
    Ok(Json(LoginResponse { token }))
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(store.posts.values().rev().cloned().collect())
}

async fn get_post(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Post>, StatusCode> {
    let store = db.read().await;
    store.posts.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

fn require_title(input: &PostInput) -> ApiResult<()> {
    if input.title.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Title is required"));
    }
    Ok(())
}

async fn create_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<PostInput>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let mut store = db.write().await;
    let author = caller(&store, &headers)?;
    require_title(&input)?;
    store.next_id += 1;
    let post = Post {
        id: store.next_id,
        title: input.title,
        content: input.content,
        author_username: author,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    tracing::info!(id = post.id, author = %post.author_username, "created post");
    store.posts.insert(post.id, post.clone());
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<PostInput>,
) -> ApiResult<Json<Post>> {
    let mut store = db.write().await;
    let username = caller(&store, &headers)?;
    let post = store
        .posts
        .get_mut(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Post not found"))?;
    if post.author_username != username {
        return Err(reject(StatusCode::FORBIDDEN, "Not the author of this post"));
    }
    require_title(&input)?;
    post.title = input.title;
    post.content = input.content;
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let username = caller(&store, &headers)?;
    let post = store
        .posts
        .get(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Post not found"))?;
    if post.author_username != username {
        return Err(reject(StatusCode::FORBIDDEN, "Not the author of this post"));
    }
    store.posts.remove(&id);
    tracing::info!(id, %username, "deleted post");
    Ok(StatusCode::NO_CONTENT)
}
