//! C-ABI wrapper around `blog-core`.
//!
//! # Overview
//! Exposes the blog client through `extern "C"` functions so a UI host in
//! any language with a C FFI can build and parse HTTP exchanges, and manage
//! the persisted session, without linking Rust's HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `blog_build_*` / `blog_parse_*` mirror the core API 1:1.
//! - A single `FfiBlogResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `blog_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use blog_core::access;
use blog_core::http::HttpResponse;
use blog_core::{BlogClient, Credentials, FileStorage, PostInput, Session, SessionStore};

use types::*;

/// Copy a C string into an owned `String`. Null yields `None`; invalid
/// UTF-8 is replaced lossily.
fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`.
///
/// `session_dir` selects file-backed session storage in that directory; pass
/// null to keep the session in memory. Returns null if `base_url` is null or
/// if an internal panic occurs. Free with `blog_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn blog_client_new(
    base_url: *const c_char,
    session_dir: *const c_char,
) -> *mut FfiBlogClient {
    catch_unwind(|| {
        let Some(url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        let session = match read_str(session_dir) {
            Some(dir) => SessionStore::new(FileStorage::new(dir)),
            None => SessionStore::in_memory(),
        };
        let client = BlogClient::new(&url, session);
        Box::into_raw(Box::new(FfiBlogClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `blog_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn blog_client_free(client: *mut FfiBlogClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Store `{username, token}` as the current session. Returns false on a
/// null argument or a storage failure.
#[unsafe(no_mangle)]
pub extern "C" fn blog_session_set(
    client: *const FfiBlogClient,
    username: *const c_char,
    token: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let (Some(username), Some(token)) = (read_str(username), read_str(token)) else {
            return false;
        };
        let client = unsafe { &*client };
        client.inner.session().set(&Session::new(username, token)).is_ok()
    }))
    .unwrap_or(false)
}

/// Remove the current session. Idempotent.
#[unsafe(no_mangle)]
pub extern "C" fn blog_session_clear(client: *const FfiBlogClient) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        client.inner.session().clear().is_ok()
    }))
    .unwrap_or(false)
}

/// Username of the current session, or null when logged out.
/// Free with `blog_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn blog_session_username(client: *const FfiBlogClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.session().get() {
            Some(session) => into_c_string(session.username),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Whether the current session may edit or delete a post by `author_username`.
///
/// For UI gating only; the server makes the real decision.
#[unsafe(no_mangle)]
pub extern "C" fn blog_can_modify(
    client: *const FfiBlogClient,
    author_username: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let Some(author) = read_str(author_username) else {
            return false;
        };
        let client = unsafe { &*client };
        let session = client.inner.session().get();
        access::can_modify_author(session.as_ref(), &author)
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run `build` against the client, returning null on a null client, a
/// build error, or a panic.
fn build_with(
    client: *const FfiBlogClient,
    build: impl FnOnce(&BlogClient) -> Option<blog_core::HttpRequest>,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Some(req) => FfiHttpRequest::from_core(req),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

fn credentials(username: *const c_char, password: *const c_char) -> Option<Credentials> {
    Some(Credentials::new(read_str(username)?, read_str(password)?))
}

fn post_input(title: *const c_char, content: *const c_char) -> Option<PostInput> {
    Some(PostInput::new(read_str(title)?, read_str(content)?))
}

/// Build a login request. Returns null if any argument is null.
/// Free with `blog_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn blog_build_login(
    client: *const FfiBlogClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| c.build_login(&credentials(username, password)?).ok())
}

/// Build a registration request. Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn blog_build_register(
    client: *const FfiBlogClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| c.build_register(&credentials(username, password)?).ok())
}

/// Build a request listing all posts.
#[unsafe(no_mangle)]
pub extern "C" fn blog_build_list_posts(client: *const FfiBlogClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_list_posts()))
}

/// Build a request fetching one post.
#[unsafe(no_mangle)]
pub extern "C" fn blog_build_get_post(client: *const FfiBlogClient, id: i64) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_get_post(id)))
}

/// Build a create request carrying the session's bearer header, if any.
#[unsafe(no_mangle)]
pub extern "C" fn blog_build_create_post(
    client: *const FfiBlogClient,
    title: *const c_char,
    content: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| c.build_create_post(&post_input(title, content)?).ok())
}

/// Build an update request carrying the session's bearer header, if any.
#[unsafe(no_mangle)]
pub extern "C" fn blog_build_update_post(
    client: *const FfiBlogClient,
    id: i64,
    title: *const c_char,
    content: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| c.build_update_post(id, &post_input(title, content)?).ok())
}

/// Build a delete request carrying the session's bearer header, if any.
#[unsafe(no_mangle)]
pub extern "C" fn blog_build_delete_post(client: *const FfiBlogClient, id: i64) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_delete_post(id)))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as the empty string.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: read_str(resp.body).unwrap_or_default(),
    }
}

/// Null-check both handles, then hand the converted response to `parse`.
fn parse_with(
    client: *const FfiBlogClient,
    response: *const FfiHttpResponse,
    op: &str,
    parse: impl FnOnce(&BlogClient, HttpResponse) -> *mut FfiBlogResult,
) -> *mut FfiBlogResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiBlogResult::null_arg("client");
        }
        if response.is_null() {
            return FfiBlogResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        parse(&client.inner, ffi_response_to_core(resp))
    }))
    .unwrap_or_else(|_| FfiBlogResult::panic(&format!("panic in {op}")))
}

/// Parse a login response and store `{username, token}` as the session.
///
/// Returns `data_tag = Text` (the token) on success.
#[unsafe(no_mangle)]
pub extern "C" fn blog_parse_login(
    client: *const FfiBlogClient,
    username: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiBlogResult {
    let Some(username) = read_str(username) else {
        return FfiBlogResult::null_arg("username");
    };
    parse_with(client, response, "blog_parse_login", |c, resp| {
        let login = match c.parse_login(resp) {
            Ok(login) => login,
            Err(e) => return FfiBlogResult::from_error(e),
        };
        let session = Session::new(username, login.token);
        match c.session().set(&session) {
            Ok(()) => FfiBlogResult::ok_text(session.token),
            Err(e) => FfiBlogResult::from_error(e.into()),
        }
    })
}

/// Parse a registration response. Returns `data_tag = Text` on success.
#[unsafe(no_mangle)]
pub extern "C" fn blog_parse_register(
    client: *const FfiBlogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBlogResult {
    parse_with(client, response, "blog_parse_register", |c, resp| {
        match c.parse_register(resp) {
            Ok(text) => FfiBlogResult::ok_text(text),
            Err(e) => FfiBlogResult::from_error(e),
        }
    })
}

/// Parse a list-posts response. Returns `data_tag = PostList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn blog_parse_list_posts(
    client: *const FfiBlogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBlogResult {
    parse_with(client, response, "blog_parse_list_posts", |c, resp| {
        match c.parse_list_posts(resp) {
            Ok(posts) => FfiBlogResult::ok_post_list(posts),
            Err(e) => FfiBlogResult::from_error(e),
        }
    })
}

/// Parse a get-post response. Returns `data_tag = Post` on success.
#[unsafe(no_mangle)]
pub extern "C" fn blog_parse_get_post(
    client: *const FfiBlogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBlogResult {
    parse_with(client, response, "blog_parse_get_post", |c, resp| {
        match c.parse_get_post(resp) {
            Ok(post) => FfiBlogResult::ok_post(post),
            Err(e) => FfiBlogResult::from_error(e),
        }
    })
}

/// Parse a create-post response. Returns `data_tag = Post` on success.
#[unsafe(no_mangle)]
pub extern "C" fn blog_parse_create_post(
    client: *const FfiBlogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBlogResult {
    parse_with(client, response, "blog_parse_create_post", |c, resp| {
        match c.parse_create_post(resp) {
            Ok(post) => FfiBlogResult::ok_post(post),
            Err(e) => FfiBlogResult::from_error(e),
        }
    })
}

/// Parse an update-post response. Returns `data_tag = Post` on success.
#[unsafe(no_mangle)]
pub extern "C" fn blog_parse_update_post(
    client: *const FfiBlogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBlogResult {
    parse_with(client, response, "blog_parse_update_post", |c, resp| {
        match c.parse_update_post(resp) {
            Ok(post) => FfiBlogResult::ok_post(post),
            Err(e) => FfiBlogResult::from_error(e),
        }
    })
}

/// Parse a delete-post response. Returns `data_tag = None` on success.
#[unsafe(no_mangle)]
pub extern "C" fn blog_parse_delete_post(
    client: *const FfiBlogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBlogResult {
    parse_with(client, response, "blog_parse_delete_post", |c, resp| {
        match c.parse_delete_post(resp) {
            Ok(()) => FfiBlogResult::ok_empty(),
            Err(e) => FfiBlogResult::from_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `blog_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn blog_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }));
}

/// Free an `FfiBlogResult` returned by any `blog_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn blog_free_result(result: *mut FfiBlogResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Post => {
                let post = unsafe { Box::from_raw(result.data as *mut FfiPost) };
                free_ffi_post_fields(&post);
            }
            FfiDataTag::PostList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiPostList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    items.iter().for_each(free_ffi_post_fields);
                }
            }
            FfiDataTag::Text => free_c_string(result.data as *mut c_char),
            FfiDataTag::None => {}
        }
    }));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free the C-string fields of an `FfiPost` (but not the struct itself).
fn free_ffi_post_fields(post: &FfiPost) {
    free_c_string(post.title);
    free_c_string(post.content);
    free_c_string(post.author_username);
    free_c_string(post.created_at);
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn blog_free_string(s: *mut c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| free_c_string(s)));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
