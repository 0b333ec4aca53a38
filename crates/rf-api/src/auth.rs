//! Bearer-token extractor for protected routes.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use anyhow::anyhow;
use futures_util::future::{ready, Ready};
use rf_core::error::AppError;
use rf_core::models::TokenPayload;

use crate::error::ApiError;
use crate::handlers::AppState;

pub const MISSING_AUTHENTICATION: &str = "Missing authentication";

/// The caller identified by a valid access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenPayload);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal(anyhow!("application state is not registered")))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized(MISSING_AUTHENTICATION))?;

    Ok(AuthUser(state.auth.verify_access_token(token)?))
}
