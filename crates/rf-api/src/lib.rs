//! # rf-api
//!
//! The web routing and orchestration layer for Rusty-Forum.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;
use rf_core::error::AppError;

use crate::error::ApiError;

pub const INVALID_JSON: &str = "request payload harus berupa JSON yang valid";

/// Configures the routes for the forum.
///
/// Malformed or non-JSON bodies answer 400 in the usual `fail` envelope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("rejected body: {err}");
        ApiError(AppError::validation(INVALID_JSON)).into()
    }))
    .route("/", web::get().to(handlers::hello))
    .service(
        web::resource("/users").route(web::post().to(handlers::post_user)),
    )
    .service(
        web::resource("/authentications")
            .route(web::post().to(handlers::post_authentication))
            .route(web::put().to(handlers::put_authentication))
            .route(web::delete().to(handlers::delete_authentication)),
    )
    .service(
        web::scope("/threads")
            .route("", web::post().to(handlers::post_thread))
            .route("/{thread_id}", web::get().to(handlers::get_thread))
            .route("/{thread_id}/comments", web::post().to(handlers::post_comment))
            .route(
                "/{thread_id}/comments/{comment_id}",
                web::delete().to(handlers::delete_comment),
            )
            .route(
                "/{thread_id}/comments/{comment_id}/replies",
                web::post().to(handlers::post_reply),
            )
            .route(
                "/{thread_id}/comments/{comment_id}/replies/{reply_id}",
                web::delete().to(handlers::delete_reply),
            ),
    );
}
