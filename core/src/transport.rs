//! Executing requests: the `Transport` seam and the one-call `BlogApi`.
//!
//! # Design
//! `BlogClient` never does I/O. A `Transport` takes one `HttpRequest` and
//! returns the `HttpResponse`, reporting only failures where no response
//! came back. Status interpretation stays in the client's `parse_*`
//! methods. `BlogApi` chains build, execute and parse so each operation is
//! one call with no retry.

use crate::access;
use crate::client::BlogClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::{Session, SessionStore};
use crate::types::{Credentials, Post, PostInput, Registration};

/// Performs one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// 4xx/5xx responses come back as data rather than `Err`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&path), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&path), &headers).call(),
            HttpMethod::Post => send_with_body(with_headers(self.agent.post(&path), &headers), body),
            HttpMethod::Put => send_with_body(with_headers(self.agent.put(&path), &headers), body),
        };
        let mut response = result.map_err(|e| {
            tracing::warn!(%method, url = %path, error = %e, "request did not complete");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        tracing::debug!(%method, url = %path, status, "request completed");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// `BlogClient` plus a transport: every operation is a single call.
#[derive(Debug, Clone)]
pub struct BlogApi<T = UreqTransport> {
    client: BlogClient,
    transport: T,
}

impl BlogApi<UreqTransport> {
    pub fn with_ureq(base_url: &str, session: SessionStore) -> Self {
        Self::new(BlogClient::new(base_url, session), UreqTransport::new())
    }
}

impl<T: Transport> BlogApi<T> {
    pub fn new(client: BlogClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &BlogClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    pub fn current_user(&self) -> Option<Session> {
        self.session().get()
    }

    /// Log in and store the resulting session.
    pub fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let request = self.client.build_login(credentials)?;
        let login = self.client.parse_login(self.transport.execute(request)?)?;
        let session = Session::new(credentials.username.clone(), login.token);
        self.session().set(&session)?;
        tracing::info!(username = %session.username, "logged in");
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Returns the server's confirmation text.
    pub fn register(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let request = self.client.build_register(credentials)?;
        self.client.parse_register(self.transport.execute(request)?)
    }

    /// Validate the form, then register. Nothing is sent on a mismatch.
    pub fn register_form(&self, form: Registration) -> Result<String, ApiError> {
        let credentials = form.into_credentials()?;
        self.register(&credentials)
    }

    pub fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let request = self.client.build_list_posts();
        self.client.parse_list_posts(self.transport.execute(request)?)
    }

    pub fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        let request = self.client.build_get_post(id);
        self.client.parse_get_post(self.transport.execute(request)?)
    }

    pub fn create_post(&self, input: &PostInput) -> Result<Post, ApiError> {
        let request = self.client.build_create_post(input)?;
        self.client.parse_create_post(self.transport.execute(request)?)
    }

    pub fn update_post(&self, id: i64, input: &PostInput) -> Result<Post, ApiError> {
        let request = self.client.build_update_post(id, input)?;
        self.client.parse_update_post(self.transport.execute(request)?)
    }

    pub fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        let request = self.client.build_delete_post(id);
        self.client.parse_delete_post(self.transport.execute(request)?)
    }

    /// Fetch a post for the edit form, refusing posts the session does not own.
    pub fn load_post_for_edit(&self, id: i64) -> Result<Post, ApiError> {
        let session = self.current_user().ok_or(ApiError::Unauthenticated)?;
        let post = self.get_post(id)?;
        access::ensure_can_modify(Some(&session), &post)?;
        Ok(post)
    }

    /// Delete `post` after the ownership check passes.
    pub fn delete_own_post(&self, post: &Post) -> Result<(), ApiError> {
        access::ensure_can_modify(self.current_user().as_ref(), post)?;
        self.delete_post(post.id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    const POST_JSON: &str = r#"{"id":1,"title":"t","content":"c","authorUsername":"u","createdAt":"2024-01-01T00:00:00Z"}"#;

    /// Replays canned responses and records what was sent.
    #[derive(Default)]
    struct Scripted {
        responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.responses.borrow_mut().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(ApiError::Network(message.to_string())));
            self
        }
    }

    impl Transport for &Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    fn api(transport: &Scripted) -> BlogApi<&Scripted> {
        BlogApi::new(
            BlogClient::new("http://api.test", SessionStore::in_memory()),
            transport,
        )
    }

    #[test]
    fn get_post_resolves_exact_fields() {
        let transport = Scripted::default().reply(200, POST_JSON);
        let post = api(&transport).get_post(1).unwrap();
        assert_eq!(post.id, 1);
        assert_eq!(post.title, "t");
        assert_eq!(post.content, "c");
        assert_eq!(post.author_username, "u");
        assert_eq!(post.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(transport.sent.borrow()[0].path, "http://api.test/posts/1");
    }

    #[test]
    fn get_post_404_rejects_with_message() {
        let transport = Scripted::default().reply(404, "");
        let err = api(&transport).get_post(1).unwrap_err();
        assert!(err.to_string().contains("Failed to fetch post"));
    }

    #[test]
    fn network_failure_is_surfaced_once() {
        let transport = Scripted::default().fail("connection refused");
        let err = api(&transport).list_posts().unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(transport.sent.borrow().len(), 1);
    }

    #[test]
    fn login_stores_session_and_logout_clears_it() {
        let transport = Scripted::default().reply(200, r#"{"token":"abc"}"#);
        let api = api(&transport);

        let session = api.login(&Credentials::new("alice", "pw")).unwrap();
        assert_eq!(session, Session::new("alice", "abc"));
        assert_eq!(api.current_user(), Some(session));

        api.logout().unwrap();
        assert!(api.current_user().is_none());
    }

    #[test]
    fn failed_login_keeps_previous_state() {
        let transport = Scripted::default().reply(401, "Invalid username or password");
        let api = api(&transport);
        let err = api.login(&Credentials::new("alice", "bad")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
        assert!(api.current_user().is_none());
    }

    #[test]
    fn create_after_login_sends_bearer() {
        let transport = Scripted::default()
            .reply(200, r#"{"token":"abc"}"#)
            .reply(201, POST_JSON);
        let api = api(&transport);
        api.login(&Credentials::new("u", "pw")).unwrap();
        api.create_post(&PostInput::new("t", "c")).unwrap();

        let sent = transport.sent.borrow();
        assert!(sent[0].header("authorization").is_none());
        assert_eq!(sent[1].header("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn anonymous_update_still_fires() {
        let transport = Scripted::default().reply(401, "");
        let err = api(&transport)
            .update_post(1, &PostInput::new("t", "c"))
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].header("authorization").is_none());
    }

    #[test]
    fn register_form_mismatch_sends_nothing() {
        let transport = Scripted::default();
        let form = Registration {
            username: "alice".to_string(),
            password: "a".to_string(),
            confirm_password: "b".to_string(),
        };
        let err = api(&transport).register_form(form).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn load_post_for_edit_checks_owner_after_fetch() {
        let transport = Scripted::default().reply(200, POST_JSON).reply(200, POST_JSON);
        let api = api(&transport);

        api.session().set(&Session::new("someone-else", "t")).unwrap();
        let err = api.load_post_for_edit(1).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        api.session().set(&Session::new("u", "t")).unwrap();
        assert_eq!(api.load_post_for_edit(1).unwrap().id, 1);
    }

    #[test]
    fn load_post_for_edit_requires_login_before_fetch() {
        let transport = Scripted::default();
        let err = api(&transport).load_post_for_edit(1).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn delete_own_post_refuses_foreign_post_without_request() {
        let transport = Scripted::default().reply(204, "");
        let api = api(&transport);
        let post: Post = serde_json::from_str(POST_JSON).unwrap();

        api.session().set(&Session::new("alice", "t")).unwrap();
        assert!(matches!(api.delete_own_post(&post), Err(ApiError::Forbidden(_))));
        assert!(transport.sent.borrow().is_empty());

        api.session().set(&Session::new("u", "t")).unwrap();
        api.delete_own_post(&post).unwrap();
        assert_eq!(transport.sent.borrow()[0].method, HttpMethod::Delete);
    }

    #[test]
    fn closures_are_transports() {
        let transport = |req: HttpRequest| -> Result<HttpResponse, ApiError> {
            assert_eq!(req.method, HttpMethod::Get);
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: "[]".to_string(),
            })
        };
        let api = BlogApi::new(
            BlogClient::new("http://api.test", SessionStore::in_memory()),
            transport,
        );
        assert!(api.list_posts().unwrap().is_empty());
    }
}
