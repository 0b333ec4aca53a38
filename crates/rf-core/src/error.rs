//! # AppError
//!
//! Centralized error handling for the rusty-forum ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all rf-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Thread, Comment, Reply)
    #[error("{0}")]
    NotFound(String),

    /// Invariant failure (e.g., incomplete payload, username taken)
    #[error("{0}")]
    ValidationError(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not the owner of the resource
    #[error("{0}")]
    Forbidden(String),

    /// Infrastructure failure (e.g., DB down, signing key rejected)
    #[error("internal service error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

/// A specialized Result type for rusty-forum logic.
pub type Result<T> = std::result::Result<T, AppError>;

/// Machine-readable payload violations raised by entity constructors.
///
/// The `Display` form is the stable code (`ENTITY.REASON`); the client-facing
/// message comes from the `From<DomainError> for AppError` translation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    #[error("REGISTER_USER.NOT_CONTAIN_NEEDED_PROPERTY")]
    RegisterUserMissingProperty,
    #[error("REGISTER_USER.NOT_MEET_DATA_TYPE_SPECIFICATION")]
    RegisterUserInvalidType,
    #[error("REGISTER_USER.USERNAME_LIMIT_CHAR")]
    RegisterUserUsernameTooLong,
    #[error("REGISTER_USER.USERNAME_CONTAIN_RESTRICTED_CHARACTER")]
    RegisterUserUsernameRestricted,
    #[error("USER_LOGIN.NOT_CONTAIN_NEEDED_PROPERTY")]
    UserLoginMissingProperty,
    #[error("USER_LOGIN.NOT_MEET_DATA_TYPE_SPECIFICATION")]
    UserLoginInvalidType,
    #[error("REFRESH_AUTHENTICATION_USE_CASE.NOT_CONTAIN_REFRESH_TOKEN")]
    RefreshAuthMissingToken,
    #[error("REFRESH_AUTHENTICATION_USE_CASE.PAYLOAD_NOT_MEET_DATA_TYPE_SPECIFICATION")]
    RefreshAuthInvalidType,
    #[error("DELETE_AUTHENTICATION_USE_CASE.NOT_CONTAIN_REFRESH_TOKEN")]
    DeleteAuthMissingToken,
    #[error("DELETE_AUTHENTICATION_USE_CASE.PAYLOAD_NOT_MEET_DATA_TYPE_SPECIFICATION")]
    DeleteAuthInvalidType,
    #[error("ADD_THREAD.NOT_CONTAIN_NEEDED_PROPERTY")]
    AddThreadMissingProperty,
    #[error("ADD_THREAD.NOT_MEET_DATA_TYPE_SPECIFICATION")]
    AddThreadInvalidType,
    #[error("ADD_COMMENT.NOT_CONTAIN_NEEDED_PROPERTY")]
    AddCommentMissingProperty,
    #[error("ADD_COMMENT.NOT_MEET_DATA_TYPE_SPECIFICATION")]
    AddCommentInvalidType,
    #[error("DELETE_COMMENT.NOT_CONTAIN_NEEDED_PROPERTY")]
    DeleteCommentMissingProperty,
    #[error("DELETE_COMMENT.NOT_MEET_DATA_TYPE_SPECIFICATION")]
    DeleteCommentInvalidType,
    #[error("ADD_REPLY.NOT_CONTAIN_NEEDED_PROPERTY")]
    AddReplyMissingProperty,
    #[error("ADD_REPLY.NOT_MEET_DATA_TYPE_SPECIFICATION")]
    AddReplyInvalidType,
    #[error("DELETE_REPLY.NOT_CONTAIN_NEEDED_PROPERTY")]
    DeleteReplyMissingProperty,
    #[error("DELETE_REPLY.NOT_MEET_DATA_TYPE_SPECIFICATION")]
    DeleteReplyInvalidType,
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        use DomainError::*;

        let msg = match err {
            RegisterUserMissingProperty => {
                "tidak dapat membuat user baru karena properti yang dibutuhkan tidak ada"
            }
            RegisterUserInvalidType => "tidak dapat membuat user baru karena tipe data tidak sesuai",
            RegisterUserUsernameTooLong => {
                "tidak dapat membuat user baru karena karakter username melebihi batas limit"
            }
            RegisterUserUsernameRestricted => {
                "tidak dapat membuat user baru karena username mengandung karakter terlarang"
            }
            UserLoginMissingProperty => "harus mengirimkan username dan password",
            UserLoginInvalidType => "username dan password harus string",
            RefreshAuthMissingToken | DeleteAuthMissingToken => "harus mengirimkan token refresh",
            RefreshAuthInvalidType | DeleteAuthInvalidType => "refresh token harus string",
            AddThreadMissingProperty => {
                "tidak dapat membuat thread baru karena properti yang dibutuhkan tidak lengkap"
            }
            AddThreadInvalidType => "tidak dapat membuat thread baru karena tipe data tidak sesuai",
            AddCommentMissingProperty => {
                "tidak dapat membuat komentar karena properti yang dibutuhkan tidak lengkap"
            }
            AddCommentInvalidType => "tidak dapat membuat komentar karena tipe data tidak sesuai",
            DeleteCommentMissingProperty => {
                "tidak dapat menghapus komentar karena properti yang dibutuhkan tidak lengkap"
            }
            DeleteCommentInvalidType => "tidak dapat menghapus komentar karena tipe data tidak sesuai",
            AddReplyMissingProperty => {
                "tidak dapat menambahkan reply comment, request payload tidak lengkap"
            }
            AddReplyInvalidType => "ADD_REPLY.NOT_MEET_DATA_TYPE_SPECIFICATION",
            DeleteReplyMissingProperty => {
                "tidak dapat menghapus balasan karena properti yang dibutuhkan tidak lengkap"
            }
            DeleteReplyInvalidType => "tidak dapat menghapus balasan karena tipe data tidak sesuai",
        };

        AppError::ValidationError(msg.to_string())
    }
}
