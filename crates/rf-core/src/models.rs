//! # Domain Models
//!
//! Write-side entities of the forum. Each payload-backed entity is built with
//! `from_payload`, which checks presence and type of every required field
//! before anything reaches a repository.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;

/// Longest username accepted at registration.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Identity carried inside access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub id: String,
    pub username: String,
}

/// Outcome of reading one string field out of a JSON payload.
enum Field<'a> {
    Missing,
    Text(&'a str),
    WrongType,
}

fn field<'a>(payload: &'a Value, key: &str) -> Field<'a> {
    match payload.get(key) {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(s)) if s.is_empty() => Field::Missing,
        Some(Value::String(s)) => Field::Text(s),
        Some(_) => Field::WrongType,
    }
}

/// Reads `keys` from `payload`, failing with `missing` if any key is absent
/// and with `wrong_type` if any present key is not a string.
fn string_fields<const N: usize>(
    payload: &Value,
    keys: [&str; N],
    missing: DomainError,
    wrong_type: DomainError,
) -> Result<[String; N], DomainError> {
    let fields = keys.map(|key| field(payload, key));
    if fields.iter().any(|f| matches!(f, Field::Missing)) {
        return Err(missing);
    }
    if fields.iter().any(|f| matches!(f, Field::WrongType)) {
        return Err(wrong_type);
    }
    Ok(fields.map(|f| match f {
        Field::Text(s) => s.to_string(),
        Field::Missing | Field::WrongType => String::new(),
    }))
}

/// Registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub fullname: String,
}

impl RegisterUser {
    pub fn from_payload(payload: &Value) -> Result<Self, DomainError> {
        let [username, password, fullname] = string_fields(
            payload,
            ["username", "password", "fullname"],
            DomainError::RegisterUserMissingProperty,
            DomainError::RegisterUserInvalidType,
        )?;

        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(DomainError::RegisterUserUsernameTooLong);
        }
        if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::RegisterUserUsernameRestricted);
        }

        Ok(Self { username, password, fullname })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub fullname: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLogin {
    pub username: String,
    pub password: String,
}

impl UserLogin {
    pub fn from_payload(payload: &Value) -> Result<Self, DomainError> {
        let [username, password] = string_fields(
            payload,
            ["username", "password"],
            DomainError::UserLoginMissingProperty,
            DomainError::UserLoginInvalidType,
        )?;
        Ok(Self { username, password })
    }
}

/// Token pair handed out at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuth {
    pub access_token: String,
    pub refresh_token: String,
}

/// Body of `PUT /authentications` and `DELETE /authentications`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken(pub String);

impl RefreshToken {
    pub fn for_refresh(payload: &Value) -> Result<Self, DomainError> {
        let [token] = string_fields(
            payload,
            ["refreshToken"],
            DomainError::RefreshAuthMissingToken,
            DomainError::RefreshAuthInvalidType,
        )?;
        Ok(Self(token))
    }

    pub fn for_logout(payload: &Value) -> Result<Self, DomainError> {
        let [token] = string_fields(
            payload,
            ["refreshToken"],
            DomainError::DeleteAuthMissingToken,
            DomainError::DeleteAuthInvalidType,
        )?;
        Ok(Self(token))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThread {
    pub title: String,
    pub body: String,
    pub owner: String,
}

impl NewThread {
    pub fn from_payload(payload: &Value, owner: &str) -> Result<Self, DomainError> {
        let [title, body] = string_fields(
            payload,
            ["title", "body"],
            DomainError::AddThreadMissingProperty,
            DomainError::AddThreadInvalidType,
        )?;
        Ok(Self { title, body, owner: owner.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedThread {
    pub id: String,
    pub title: String,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub thread_id: String,
    pub content: String,
    pub owner: String,
}

impl NewComment {
    pub fn from_payload(payload: &Value, thread_id: &str, owner: &str) -> Result<Self, DomainError> {
        let [content] = string_fields(
            payload,
            ["content"],
            DomainError::AddCommentMissingProperty,
            DomainError::AddCommentInvalidType,
        )?;
        Ok(Self {
            thread_id: thread_id.to_string(),
            content,
            owner: owner.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedComment {
    pub id: String,
    pub content: String,
    pub owner: String,
}

/// Addresses one comment for deletion on behalf of `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRef {
    pub thread_id: String,
    pub comment_id: String,
    pub owner: String,
}

impl CommentRef {
    pub fn new(thread_id: &str, comment_id: &str, owner: &str) -> Result<Self, DomainError> {
        if [thread_id, comment_id, owner].iter().any(|s| s.is_empty()) {
            return Err(DomainError::DeleteCommentMissingProperty);
        }
        Ok(Self {
            thread_id: thread_id.to_string(),
            comment_id: comment_id.to_string(),
            owner: owner.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    pub thread_id: String,
    pub comment_id: String,
    pub content: String,
    pub owner: String,
}

impl NewReply {
    pub fn from_payload(
        payload: &Value,
        thread_id: &str,
        comment_id: &str,
        owner: &str,
    ) -> Result<Self, DomainError> {
        let [content] = string_fields(
            payload,
            ["content"],
            DomainError::AddReplyMissingProperty,
            DomainError::AddReplyInvalidType,
        )?;
        Ok(Self {
            thread_id: thread_id.to_string(),
            comment_id: comment_id.to_string(),
            content,
            owner: owner.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedReply {
    pub id: String,
    pub content: String,
    pub owner: String,
}

/// Addresses one reply for deletion on behalf of `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRef {
    pub thread_id: String,
    pub comment_id: String,
    pub reply_id: String,
    pub owner: String,
}

impl ReplyRef {
    pub fn new(
        thread_id: &str,
        comment_id: &str,
        reply_id: &str,
        owner: &str,
    ) -> Result<Self, DomainError> {
        if [thread_id, comment_id, reply_id, owner].iter().any(|s| s.is_empty()) {
            return Err(DomainError::DeleteReplyMissingProperty);
        }
        Ok(Self {
            thread_id: thread_id.to_string(),
            comment_id: comment_id.to_string(),
            reply_id: reply_id.to_string(),
            owner: owner.to_string(),
        })
    }
}
