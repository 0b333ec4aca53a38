//! # Views
//!
//! Caller-facing projections produced by the thread-detail pipeline. They are
//! built fresh per request and serialized as-is by the HTTP layer.

use serde::{Deserialize, Serialize};

/// Content shown in place of a deleted comment.
pub const REDACTED_COMMENT: &str = "**komentar telah dihapus**";

/// Content shown in place of a deleted reply.
pub const REDACTED_REPLY: &str = "**balasan telah dihapus**";

/// A thread with its comments and their replies.
///
/// Scalar fields the normalizer could not resolve serialize as `null`; the
/// keys themselves are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadView {
    pub id: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub date: Option<String>,
    pub username: Option<String>,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: String,
    pub username: Option<String>,
    pub date: String,
    pub content: String,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyView {
    pub id: String,
    pub username: Option<String>,
    pub date: String,
    pub content: String,
    pub is_delete: bool,
}
