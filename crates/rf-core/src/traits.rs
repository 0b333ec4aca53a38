//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AddedComment, AddedReply, AddedThread, NewComment, NewReply, NewThread, RegisterUser,
    RegisteredUser, TokenPayload,
};
use crate::raw::{Envelope, RawComment, RawReply, ThreadEnvelope};

/// Account persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with a validation error when the username is taken.
    async fn verify_available_username(&self, username: &str) -> Result<()>;
    /// Stores a user whose `password` is already hashed.
    async fn add_user(&self, user: RegisterUser) -> Result<RegisteredUser>;
    async fn get_password_by_username(&self, username: &str) -> Result<String>;
    async fn get_id_by_username(&self, username: &str) -> Result<String>;
}

/// Refresh tokens currently considered live.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthenticationRepo: Send + Sync {
    async fn add_token(&self, token: &str) -> Result<()>;
    async fn check_availability_token(&self, token: &str) -> Result<()>;
    async fn delete_token(&self, token: &str) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn add_thread(&self, thread: NewThread) -> Result<AddedThread>;
    /// Fails with `NotFound` when no thread has this id.
    async fn verify_available_thread(&self, thread_id: &str) -> Result<()>;
    /// Fails with `NotFound` when no thread has this id.
    async fn get_thread_by_id(&self, thread_id: &str) -> Result<ThreadEnvelope>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn add_comment(&self, comment: NewComment) -> Result<AddedComment>;
    async fn verify_available_comment(&self, comment_id: &str) -> Result<()>;
    /// Fails with `Forbidden` unless `owner` wrote the comment.
    async fn verify_comment_owner(&self, comment_id: &str, owner: &str) -> Result<()>;
    async fn soft_delete_comment(&self, comment_id: &str) -> Result<()>;
    /// Comments of a thread, oldest first. Empty when there are none.
    async fn get_comments_by_thread_id(&self, thread_id: &str) -> Result<Vec<Envelope<RawComment>>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReplyRepo: Send + Sync {
    async fn add_reply(&self, reply: NewReply) -> Result<AddedReply>;
    /// Fails with `NotFound` for unknown or already deleted replies.
    async fn verify_available_reply(&self, reply_id: &str) -> Result<()>;
    /// Fails with `Forbidden` unless `owner` wrote the reply.
    async fn verify_reply_owner(&self, reply_id: &str, owner: &str) -> Result<()>;
    async fn soft_delete_reply(&self, reply_id: &str) -> Result<()>;
    /// Replies under every comment of a thread. Empty when there are none.
    async fn get_replies_by_thread_id(&self, thread_id: &str) -> Result<Vec<Envelope<RawReply>>>;
}

/// Password hashing and token issuance contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a plain password against a stored hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool;

    fn create_access_token(&self, payload: &TokenPayload) -> Result<String>;
    fn create_refresh_token(&self, payload: &TokenPayload) -> Result<String>;

    /// Fails with `Unauthorized` for a bad signature or an expired token.
    fn verify_access_token(&self, token: &str) -> Result<TokenPayload>;
    /// Fails with a validation error for a bad signature or an expired token.
    fn verify_refresh_token(&self, token: &str) -> Result<TokenPayload>;
}
