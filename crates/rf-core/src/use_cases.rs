//! # Use Cases
//!
//! Write-side operations of the forum. Each use case holds the ports it needs
//! and exposes a single `execute`.

use std::sync::Arc;

use log::info;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{
    AddedComment, AddedReply, AddedThread, CommentRef, NewAuth, NewComment, NewReply, NewThread,
    RefreshToken, RegisterUser, RegisteredUser, ReplyRef, TokenPayload, UserLogin,
};
use crate::traits::{AuthProvider, AuthenticationRepo, CommentRepo, ReplyRepo, ThreadRepo, UserRepo};

pub const WRONG_CREDENTIALS: &str = "kredensial yang Anda masukkan salah";

#[derive(Clone)]
pub struct AddUserUseCase {
    users: Arc<dyn UserRepo>,
    auth: Arc<dyn AuthProvider>,
}

impl AddUserUseCase {
    pub fn new(users: Arc<dyn UserRepo>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { users, auth }
    }

    pub async fn execute(&self, payload: &Value) -> Result<RegisteredUser> {
        let mut user = RegisterUser::from_payload(payload)?;
        self.users.verify_available_username(&user.username).await?;
        user.password = self.auth.hash_password(&user.password).await?;
        let registered = self.users.add_user(user).await?;
        info!("registered user {}", registered.id);
        Ok(registered)
    }
}

#[derive(Clone)]
pub struct LoginUserUseCase {
    users: Arc<dyn UserRepo>,
    authentications: Arc<dyn AuthenticationRepo>,
    auth: Arc<dyn AuthProvider>,
}

impl LoginUserUseCase {
    pub fn new(
        users: Arc<dyn UserRepo>,
        authentications: Arc<dyn AuthenticationRepo>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self { users, authentications, auth }
    }

    pub async fn execute(&self, payload: &Value) -> Result<NewAuth> {
        let login = UserLogin::from_payload(payload)?;
        let hash = self.users.get_password_by_username(&login.username).await?;
        if !self.auth.verify_password(&login.password, &hash).await {
            return Err(AppError::unauthorized(WRONG_CREDENTIALS));
        }

        let id = self.users.get_id_by_username(&login.username).await?;
        let claims = TokenPayload { id, username: login.username };
        let access_token = self.auth.create_access_token(&claims)?;
        let refresh_token = self.auth.create_refresh_token(&claims)?;
        self.authentications.add_token(&refresh_token).await?;

        Ok(NewAuth { access_token, refresh_token })
    }
}

#[derive(Clone)]
pub struct RefreshAuthenticationUseCase {
    authentications: Arc<dyn AuthenticationRepo>,
    auth: Arc<dyn AuthProvider>,
}

impl RefreshAuthenticationUseCase {
    pub fn new(authentications: Arc<dyn AuthenticationRepo>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { authentications, auth }
    }

    /// Returns a fresh access token for a live refresh token.
    pub async fn execute(&self, payload: &Value) -> Result<String> {
        let RefreshToken(token) = RefreshToken::for_refresh(payload)?;
        let claims = self.auth.verify_refresh_token(&token)?;
        self.authentications.check_availability_token(&token).await?;
        self.auth.create_access_token(&claims)
    }
}

#[derive(Clone)]
pub struct LogoutUserUseCase {
    authentications: Arc<dyn AuthenticationRepo>,
}

impl LogoutUserUseCase {
    pub fn new(authentications: Arc<dyn AuthenticationRepo>) -> Self {
        Self { authentications }
    }

    pub async fn execute(&self, payload: &Value) -> Result<()> {
        let RefreshToken(token) = RefreshToken::for_logout(payload)?;
        self.authentications.check_availability_token(&token).await?;
        self.authentications.delete_token(&token).await
    }
}

#[derive(Clone)]
pub struct AddThreadUseCase {
    threads: Arc<dyn ThreadRepo>,
}

impl AddThreadUseCase {
    pub fn new(threads: Arc<dyn ThreadRepo>) -> Self {
        Self { threads }
    }

    pub async fn execute(&self, payload: &Value, owner: &str) -> Result<AddedThread> {
        let thread = NewThread::from_payload(payload, owner)?;
        self.threads.add_thread(thread).await
    }
}

#[derive(Clone)]
pub struct AddCommentUseCase {
    threads: Arc<dyn ThreadRepo>,
    comments: Arc<dyn CommentRepo>,
}

impl AddCommentUseCase {
    pub fn new(threads: Arc<dyn ThreadRepo>, comments: Arc<dyn CommentRepo>) -> Self {
        Self { threads, comments }
    }

    pub async fn execute(&self, payload: &Value, thread_id: &str, owner: &str) -> Result<AddedComment> {
        let comment = NewComment::from_payload(payload, thread_id, owner)?;
        self.threads.verify_available_thread(&comment.thread_id).await?;
        self.comments.add_comment(comment).await
    }
}

#[derive(Clone)]
pub struct DeleteCommentUseCase {
    threads: Arc<dyn ThreadRepo>,
    comments: Arc<dyn CommentRepo>,
}

impl DeleteCommentUseCase {
    pub fn new(threads: Arc<dyn ThreadRepo>, comments: Arc<dyn CommentRepo>) -> Self {
        Self { threads, comments }
    }

    pub async fn execute(&self, thread_id: &str, comment_id: &str, owner: &str) -> Result<()> {
        let target = CommentRef::new(thread_id, comment_id, owner)?;
        self.threads.verify_available_thread(&target.thread_id).await?;
        self.comments.verify_available_comment(&target.comment_id).await?;
        self.comments.verify_comment_owner(&target.comment_id, &target.owner).await?;
        self.comments.soft_delete_comment(&target.comment_id).await?;
        info!("comment {} soft-deleted by {}", target.comment_id, target.owner);
        Ok(())
    }
}

#[derive(Clone)]
pub struct AddReplyUseCase {
    threads: Arc<dyn ThreadRepo>,
    comments: Arc<dyn CommentRepo>,
    replies: Arc<dyn ReplyRepo>,
}

impl AddReplyUseCase {
    pub fn new(
        threads: Arc<dyn ThreadRepo>,
        comments: Arc<dyn CommentRepo>,
        replies: Arc<dyn ReplyRepo>,
    ) -> Self {
        Self { threads, comments, replies }
    }

    pub async fn execute(
        &self,
        payload: &Value,
        thread_id: &str,
        comment_id: &str,
        owner: &str,
    ) -> Result<AddedReply> {
        let reply = NewReply::from_payload(payload, thread_id, comment_id, owner)?;
        self.threads.verify_available_thread(&reply.thread_id).await?;
        self.comments.verify_available_comment(&reply.comment_id).await?;
        self.replies.add_reply(reply).await
    }
}

#[derive(Clone)]
pub struct DeleteReplyUseCase {
    threads: Arc<dyn ThreadRepo>,
    comments: Arc<dyn CommentRepo>,
    replies: Arc<dyn ReplyRepo>,
}

impl DeleteReplyUseCase {
    pub fn new(
        threads: Arc<dyn ThreadRepo>,
        comments: Arc<dyn CommentRepo>,
        replies: Arc<dyn ReplyRepo>,
    ) -> Self {
        Self { threads, comments, replies }
    }

    pub async fn execute(
        &self,
        thread_id: &str,
        comment_id: &str,
        reply_id: &str,
        owner: &str,
    ) -> Result<()> {
        let target = ReplyRef::new(thread_id, comment_id, reply_id, owner)?;
        self.threads.verify_available_thread(&target.thread_id).await?;
        self.comments.verify_available_comment(&target.comment_id).await?;
        self.replies.verify_available_reply(&target.reply_id).await?;
        self.replies.verify_reply_owner(&target.reply_id, &target.owner).await?;
        self.replies.soft_delete_reply(&target.reply_id).await?;
        info!("reply {} soft-deleted by {}", target.reply_id, target.owner);
        Ok(())
    }
}
