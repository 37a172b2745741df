use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, LoginResponse, Post};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str, token: Option<&str>) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(String::new()).unwrap()
}

async fn send(app: &mut Router, request: Request<String>) -> axum::response::Response {
    ServiceExt::<Request<String>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap()
}

/// Register and log in `username`, returning the bearer token.
async fn sign_up(app: &mut Router, username: &str) -> String {
    let creds = format!(r#"{{"username":"{username}","password":"pw"}}"#);
    let resp = send(app, json_request("POST", "/api/users/register", &creds, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(app, json_request("POST", "/api/users/login", &creds, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json::<LoginResponse>(resp).await.token
}

// --- users ---

#[tokio::test]
async fn register_returns_confirmation_text() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            r#"{"username":"alice","password":"pw"}"#,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "User registered successfully");
}

#[tokio::test]
async fn register_duplicate_returns_409_with_text() {
    let mut app = app();
    let creds = r#"{"username":"alice","password":"pw"}"#;
    send(&mut app, json_request("POST", "/api/users/register", creds, None)).await;
    let resp = send(&mut app, json_request("POST", "/api/users/register", creds, None)).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(resp).await, "Username already exists");
}

#[tokio::test]
async fn register_blank_username_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            r#"{"username":" ","password":"pw"}"#,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_wrong_password_returns_401_with_text() {
    let mut app = app();
    sign_up(&mut app, "alice").await;
    let resp = send(
        &mut app,
        json_request(
            "POST",
            "/api/users/login",
            r#"{"username":"alice","password":"nope"}"#,
            None,
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "Invalid username or password");
}

// --- posts ---

#[tokio::test]
async fn list_posts_empty() {
    let resp = app().oneshot(bare_request("GET", "/api/posts", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Post> = body_json(resp).await;
    assert!(posts.is_empty());
}

#[tokio::test]
async fn get_post_not_found() {
    let resp = app().oneshot(bare_request("GET", "/api/posts/1", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_post_bad_id_returns_400() {
    let resp = app()
        .oneshot(bare_request("GET", "/api/posts/not-a-number", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_post_without_token_returns_401() {
    let resp = app()
        .oneshot(json_request("POST", "/api/posts", r#"{"title":"t","content":"c"}"#, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_post_malformed_json_returns_422() {
    let mut app = app();
    let token = sign_up(&mut app, "alice").await;
    let resp = send(
        &mut app,
        json_request("POST", "/api/posts", r#"{"headline":"t"}"#, Some(&token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete() {
    let mut app = app();
    let alice = sign_up(&mut app, "alice").await;
    let bob = sign_up(&mut app, "bob").await;

    let resp = send(
        &mut app,
        json_request("POST", "/api/posts", r#"{"title":"Mine","content":"c"}"#, Some(&alice)),
    )
    .await;
    let post: Post = body_json(resp).await;

    let resp = send(
        &mut app,
        json_request(
            "PUT",
            &format!("/api/posts/{}", post.id),
            r#"{"title":"Hijacked","content":"c"}"#,
            Some(&bob),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&mut app, bare_request("DELETE", &format!("/api/posts/{}", post.id), Some(&bob))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&mut app, bare_request("GET", &format!("/api/posts/{}", post.id), None)).await;
    let unchanged: Post = body_json(resp).await;
    assert_eq!(unchanged.title, "Mine");
}

#[tokio::test]
async fn update_post_blank_title_returns_400() {
    let mut app = app();
    let token = sign_up(&mut app, "alice").await;
    let resp = send(
        &mut app,
        json_request("POST", "/api/posts", r#"{"title":"Kept","content":"c"}"#, Some(&token)),
    )
    .await;
    let post: Post = body_json(resp).await;

    let resp = send(
        &mut app,
        json_request(
            "PUT",
            &format!("/api/posts/{}", post.id),
            r#"{"title":"   ","content":"new"}"#,
            Some(&token),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "Title is required");

    let resp = send(&mut app, bare_request("GET", &format!("/api/posts/{}", post.id), None)).await;
    let unchanged: Post = body_json(resp).await;
    assert_eq!(unchanged.title, "Kept");
    assert_eq!(unchanged.content, "c");
}

// --- full lifecycle ---

#[tokio::test]
async fn post_lifecycle() {
    let mut app = app();
    let token = sign_up(&mut app, "alice").await;

    // create
    let resp = send(
        &mut app,
        json_request("POST", "/api/posts", r#"{"title":"First","content":"Hello"}"#, Some(&token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let first: Post = body_json(resp).await;
    assert_eq!(first.title, "First");
    assert_eq!(first.author_username, "alice");
    assert!(first.created_at.ends_with('Z'));

    let resp = send(
        &mut app,
        json_request("POST", "/api/posts", r#"{"title":"Second","content":"Again"}"#, Some(&token)),
    )
    .await;
    let second: Post = body_json(resp).await;
    assert!(second.id > first.id);

    // list is newest first
    let resp = send(&mut app, bare_request("GET", "/api/posts", None)).await;
    let posts: Vec<Post> = body_json(resp).await;
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, second.id);

    // update replaces title and content
    let resp = send(
        &mut app,
        json_request(
            "PUT",
            &format!("/api/posts/{}", first.id),
            r#"{"title":"Edited","content":"Changed"}"#,
            Some(&token),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Post = body_json(resp).await;
    assert_eq!(updated.title, "Edited");
    assert_eq!(updated.content, "Changed");
    assert_eq!(updated.created_at, first.created_at);

    // delete
    let resp = send(&mut app, bare_request("DELETE", &format!("/api/posts/{}", first.id), Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_text(resp).await.is_empty());

    // get after delete
    let resp = send(&mut app, bare_request("GET", &format!("/api/posts/{}", first.id), None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // delete again
    let resp = send(&mut app, bare_request("DELETE", &format!("/api/posts/{}", first.id), Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
