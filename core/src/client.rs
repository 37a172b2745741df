//! Stateless HTTP request builder and response parser for the blog API.
//!
//! # Design
//! `BlogClient` holds the `base_url` and a handle to the session store.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the round-trip, keeping the client deterministic and
//! free of I/O.
//!
//! Success means any 2xx status. Login and register surface the server's
//! error text when there is one; the post operations always use their fixed
//! failure message.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::SessionStore;
use crate::types::{Credentials, LoginResponse, Post, PostInput};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const FETCH_POSTS_FAILED: &str = "Failed to fetch posts";
const FETCH_POST_FAILED: &str = "Failed to fetch post";
const CREATE_POST_FAILED: &str = "Failed to create post";
const UPDATE_POST_FAILED: &str = "Failed to update post";
const DELETE_POST_FAILED: &str = "Failed to delete post";

/// Where the error message for a failed response comes from.
#[derive(Clone, Copy)]
enum Failure {
    /// Server body text if non-empty, else the fallback.
    ServerText(&'static str),
    /// Always the fixed message.
    Fixed(&'static str),
}

/// Synchronous request builder and response parser for the blog API.
#[derive(Debug, Clone)]
pub struct BlogClient {
    base_url: String,
    session: SessionStore,
}

impl BlogClient {
    pub fn new(base_url: &str, session: SessionStore) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/users/login", credentials, false)
    }

    pub fn build_register(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/users/register", credentials, false)
    }

    pub fn build_list_posts(&self) -> HttpRequest {
        self.bare_request(HttpMethod::Get, "/posts".to_string(), false)
    }

    pub fn build_get_post(&self, id: i64) -> HttpRequest {
        self.bare_request(HttpMethod::Get, format!("/posts/{id}"), false)
    }

    /// Attaches the session's bearer header when one is stored. Without a
    /// session the request is still built; the server decides.
    pub fn build_create_post(&self, input: &PostInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/posts", input, true)
    }

    pub fn build_update_post(&self, id: i64, input: &PostInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/posts/{id}"), input, true)
    }

    pub fn build_delete_post(&self, id: i64) -> HttpRequest {
        self.bare_request(HttpMethod::Delete, format!("/posts/{id}"), true)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        check_status(&response, Failure::ServerText(LOGIN_FAILED))?;
        let login: LoginResponse = decode(&response.body)?;
        if login.token.trim().is_empty() {
            return Err(ApiError::Decode("login response has an empty token".to_string()));
        }
        Ok(login)
    }

    /// Returns the server's confirmation text.
    pub fn parse_register(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, Failure::ServerText(REGISTRATION_FAILED))?;
        Ok(response.body)
    }

    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response, Failure::Fixed(FETCH_POSTS_FAILED))?;
        let posts: Vec<Post> = decode(&response.body)?;
        posts.iter().try_for_each(Post::validate)?;
        Ok(posts)
    }

    pub fn parse_get_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, Failure::Fixed(FETCH_POST_FAILED))?;
        decode_post(&response.body)
    }

    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, Failure::Fixed(CREATE_POST_FAILED))?;
        decode_post(&response.body)
    }

    pub fn parse_update_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, Failure::Fixed(UPDATE_POST_FAILED))?;
        decode_post(&response.body)
    }

    pub fn parse_delete_post(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Failure::Fixed(DELETE_POST_FAILED))
    }

    fn bare_request(&self, method: HttpMethod, path: String, auth: bool) -> HttpRequest {
        let headers = if auth {
            self.session.auth_header()
        } else {
            Vec::new()
        };
        let request = HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body: None,
        };
        tracing::debug!(method = %request.method, url = %request.path, "built request");
        request
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &T,
        auth: bool,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Encode(e.to_string()))?;
        let mut request = self.bare_request(method, path.to_string(), auth);
        request
            .headers
            .insert(0, ("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

/// Map non-2xx status codes to the matching `ApiError` variant.
fn check_status(response: &HttpResponse, failure: Failure) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = match failure {
        Failure::ServerText(fallback) if response.body.trim().is_empty() => fallback.to_string(),
        Failure::ServerText(_) => response.body.clone(),
        Failure::Fixed(message) => message.to_string(),
    };
    tracing::debug!(status = response.status, %message, "request failed");
    if response.status == 404 {
        return Err(ApiError::NotFound { message });
    }
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode_post(body: &str) -> Result<Post, ApiError> {
    let post: Post = decode(body)?;
    post.validate()?;
    Ok(post)
}
