//! Ownership gating for edit and delete affordances.
//!
//! This only decides what the UI offers. The server owns the real check and
//! rejects foreign edits on its own.

use crate::error::ApiError;
use crate::session::Session;
use crate::types::Post;

const NOT_OWNER: &str = "You do not have permission to modify this post.";

pub fn can_modify(session: Option<&Session>, post: &Post) -> bool {
    can_modify_author(session, &post.author_username)
}

/// The ownership rule on its own, for callers that only hold the author name.
pub fn can_modify_author(session: Option<&Session>, author_username: &str) -> bool {
    session.is_some_and(|s| s.username == author_username)
}

/// Like `can_modify`, but with an error a caller can display.
pub fn ensure_can_modify(session: Option<&Session>, post: &Post) -> Result<(), ApiError> {
    match session {
        None => Err(ApiError::Unauthenticated),
        Some(s) if can_modify_author(Some(s), &post.author_username) => Ok(()),
        Some(_) => Err(ApiError::Forbidden(NOT_OWNER.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_by(author: &str) -> Post {
        Post {
            id: 1,
            title: "t".to_string(),
            content: "c".to_string(),
            author_username: author.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn owner_may_modify() {
        let alice = Session::new("alice", "t");
        assert!(can_modify(Some(&alice), &post_by("alice")));
        assert!(ensure_can_modify(Some(&alice), &post_by("alice")).is_ok());
    }

    #[test]
    fn other_user_may_not_modify() {
        let alice = Session::new("alice", "t");
        assert!(!can_modify(Some(&alice), &post_by("bob")));
        let err = ensure_can_modify(Some(&alice), &post_by("bob")).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn anonymous_may_not_modify() {
        assert!(!can_modify(None, &post_by("bob")));
        assert!(matches!(
            ensure_can_modify(None, &post_by("bob")),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let alice = Session::new("Alice", "t");
        assert!(!can_modify(Some(&alice), &post_by("alice")));
        assert!(!can_modify_author(Some(&alice), "alice"));
    }

    #[test]
    fn author_rule_agrees_with_post_rule() {
        let alice = Session::new("alice", "t");
        for (session, author) in [(Some(&alice), "alice"), (Some(&alice), "bob"), (None, "alice")] {
            assert_eq!(can_modify_author(session, author), can_modify(session, &post_by(author)));
        }
        assert!(can_modify_author(Some(&alice), "alice"));
    }
}
