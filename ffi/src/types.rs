//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use blog_core::error::ApiError;
use blog_core::http::HttpMethod;
use blog_core::Post;

/// Opaque handle to a `BlogClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiBlogClient {
    pub(crate) inner: blog_core::BlogClient,
}

/// Move a Rust string into a heap C string. Interior NULs yield "".
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `blog_build_*` functions. The C caller executes the request
/// and passes the response back through `blog_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: blog_core::HttpRequest) -> *mut Self {
        let path = into_c_string(req.path);
        let body = req.body.map_or(std::ptr::null_mut(), into_c_string);

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `blog_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiBlogResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Network = 3,
    Decode = 4,
    Encode = 5,
    Unauthenticated = 6,
    Forbidden = 7,
    Validation = 8,
    Storage = 9,
    Panic = 10,
    NullArg = 11,
}

/// Tag that tells `blog_free_result` what `FfiBlogResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Post = 1,
    PostList = 2,
    /// `data` is a `char*` (login token or register confirmation).
    Text = 3,
}

/// A single post exposed to C.
#[repr(C)]
pub struct FfiPost {
    pub id: i64,
    pub title: *mut c_char,
    pub content: *mut c_char,
    pub author_username: *mut c_char,
    pub created_at: *mut c_char,
}

impl FfiPost {
    fn from_core(post: Post) -> Self {
        FfiPost {
            id: post.id,
            title: into_c_string(post.title),
            content: into_c_string(post.content),
            author_username: into_c_string(post.author_username),
            created_at: into_c_string(post.created_at),
        }
    }
}

/// A list of posts exposed to C.
#[repr(C)]
pub struct FfiPostList {
    pub items: *mut FfiPost,
    pub len: u32,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// display-ready C string, and `data` is null.
#[repr(C)]
pub struct FfiBlogResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiBlogResult {
    fn boxed(error_code: FfiErrorCode, error_message: *mut c_char, http_status: u16, data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiBlogResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, data_tag, data)
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Self::boxed(error_code, into_c_string(msg), http_status, FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build a success result carrying a single `FfiPost`.
    pub(crate) fn ok_post(post: Post) -> *mut Self {
        let ffi_post = Box::new(FfiPost::from_core(post));
        Self::ok(FfiDataTag::Post, Box::into_raw(ffi_post) as *mut c_void)
    }

    /// Build a success result carrying a `FfiPostList`.
    pub(crate) fn ok_post_list(posts: Vec<Post>) -> *mut Self {
        let len = posts.len() as u32;
        let items = if posts.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_posts: Box<[FfiPost]> = posts.into_iter().map(FfiPost::from_core).collect();
            Box::into_raw(ffi_posts) as *mut FfiPost
        };
        let ffi_list = Box::new(FfiPostList { items, len });
        Self::ok(FfiDataTag::PostList, Box::into_raw(ffi_list) as *mut c_void)
    }

    /// Build a success result carrying a C string.
    pub(crate) fn ok_text(text: String) -> *mut Self {
        Self::ok(FfiDataTag::Text, into_c_string(text) as *mut c_void)
    }

    /// Build a success result with no data payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::NotFound { .. } => FfiErrorCode::NotFound,
            ApiError::Http { .. } => FfiErrorCode::Http,
            ApiError::Network(_) => FfiErrorCode::Network,
            ApiError::Decode(_) => FfiErrorCode::Decode,
            ApiError::Encode(_) => FfiErrorCode::Encode,
            ApiError::Unauthenticated => FfiErrorCode::Unauthenticated,
            ApiError::Forbidden(_) => FfiErrorCode::Forbidden,
            ApiError::Validation(_) => FfiErrorCode::Validation,
            ApiError::Storage(_) => FfiErrorCode::Storage,
        };
        Self::error(code, err.status().unwrap_or(0), err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
