use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::DomainError;

/// Titles are capped at 100 characters, bodies at 200.
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_CONTENT_LEN: usize = 200;

/// Handle to an uploaded file, decoupled from its bytes. The filename is
/// stored exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub media: Option<MediaRef>,
    pub created_at: DateTime<Utc>,
    /// Sole deletion credential, set once at creation. Absent on boards
    /// configured without deletion.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub content: String,
    pub media: Option<MediaRef>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub id: u64,
    pub comment_id: u64,
    pub content: String,
    pub media: Option<MediaRef>,
    pub created_at: DateTime<Utc>,
}

/// A comment together with its replies, in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Reply>,
}

/// Full snapshot of one post's subtree, as handed to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<CommentThread>,
}

pub fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.is_empty() {
        return Err(DomainError::MissingField("title"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::TooLong {
            field: "title",
            limit: MAX_TITLE_LEN,
        });
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.is_empty() {
        return Err(DomainError::MissingField("content"));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(DomainError::TooLong {
            field: "content",
            limit: MAX_CONTENT_LEN,
        });
    }
    Ok(())
}
