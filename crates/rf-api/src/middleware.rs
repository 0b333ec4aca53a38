//! rusty-forum/crates/rf-api/src/middleware.rs Middleware
//!
//! Access logging and cross-origin policy for the forum API.

use actix_cors::Cors;
use actix_web::middleware::Logger;

/// Access log in the default format:
/// remote-ip "request-line" status-code response-size "referrer" "user-agent" time
pub fn standard_middleware() -> Logger {
    Logger::default()
}

// Any origin may call the API; bearer tokens travel in the Authorization header.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_any_header()
        .max_age(3600)
}
