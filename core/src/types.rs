//! Domain DTOs for the blog API.
//!
//! # Design
//! These types mirror the wire schema but are defined independently from
//! the mock-server crate; integration tests catch schema drift. Field names
//! are camelCase on the wire.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A blog post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_username: String,
    pub created_at: String,
}

impl Post {
    /// Parse `created_at` as RFC 3339 or as a zone-less ISO datetime.
    /// Offsets are normalized to UTC.
    pub fn created_at_naive(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }

    /// First `max_chars` characters of the content, with an ellipsis when cut.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}…")
        } else {
            head
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.created_at_naive().is_none() {
            return Err(ApiError::Decode(format!(
                "post {} has an invalid createdAt: {:?}",
                self.id, self.created_at
            )));
        }
        Ok(())
    }
}

/// ISO 8601 local datetimes with seconds optional and a `T` or space separator.
const ZONELESS_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ZONELESS_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Request payload for creating or updating a post. Both fields are always
/// sent; the update replaces title and content wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

impl PostInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Request payload for login and registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful login body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
}

/// Registration form input, including the repeated password.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    /// Check the form and turn it into the request payload.
    pub fn into_credentials(self) -> Result<Credentials, ApiError> {
        if self.password != self.confirm_password {
            return Err(ApiError::Validation("Passwords do not match".to_string()));
        }
        Ok(Credentials {
            username: self.username,
            password: self.password,
        })
    }
}
