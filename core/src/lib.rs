//! Client core for the blog API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `BlogApi` pairs the client
//! with a `Transport` for hosts that want one-call operations.
//!
//! # Design
//! - `BlogClient` holds `base_url` and an explicit `SessionStore`; there is
//!   no global session.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the FFI crate can mirror it 1:1.
//! - Responses decode into typed DTOs and are validated before use.
//! - Ownership checks in `access` gate UI affordances only; the server is
//!   the authority.

pub mod access;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod state;
pub mod transport;
pub mod types;

pub use access::{can_modify, can_modify_author, ensure_can_modify};
pub use client::BlogClient;
pub use config::ClientConfig;
pub use error::{ApiError, StorageError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{FileStorage, MemoryStorage, Session, SessionStorage, SessionStore};
pub use state::RequestState;
pub use transport::{BlogApi, Transport, UreqTransport};
pub use types::{Credentials, LoginResponse, Post, PostInput, Registration};
