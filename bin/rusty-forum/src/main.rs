//! # Rusty-Forum Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use rf_api::configure_routes;
use rf_api::handlers::{AppState, Ports};
use rf_api::middleware::{cors_policy, standard_middleware};
use rf_config::Settings;

// Feature-gated imports: each port is served by whichever plugin was compiled in
#[cfg(feature = "db-sqlite")]
use rf_db_sqlite::{
    uuid_id_generator, Database, SqliteAuthenticationRepo, SqliteCommentRepo, SqliteReplyRepo,
    SqliteThreadRepo, SqliteUserRepo,
};

#[cfg(feature = "auth-simple")]
use rf_auth_simple::SimpleAuthProvider;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("rusty-forum needs a storage plugin; enable the `db-sqlite` feature");

#[cfg(not(feature = "auth-simple"))]
compile_error!("rusty-forum needs an auth plugin; enable the `auth-simple` feature");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(settings.log_level.as_str()));

    // 1. Initialize Database Implementation
    let db = Database::connect(&settings.database).await?;
    db.authenticate().await?;
    db.migrate().await?;

    // 2. Initialize Auth Implementation
    let auth = SimpleAuthProvider::from_settings(&settings.auth);

    // 3. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let ids = uuid_id_generator();
    let state = web::Data::new(AppState::new(Ports {
        users: Arc::new(SqliteUserRepo::new(&db, ids.clone())),
        authentications: Arc::new(SqliteAuthenticationRepo::new(&db)),
        threads: Arc::new(SqliteThreadRepo::new(&db, ids.clone())),
        comments: Arc::new(SqliteCommentRepo::new(&db, ids.clone())),
        replies: Arc::new(SqliteReplyRepo::new(&db, ids)),
        auth: Arc::new(auth),
    }));

    let addr = (settings.server.host.clone(), settings.server.port);
    log::info!("Rusty-Forum starting on http://{}:{}", addr.0, addr.1);

    let served = HttpServer::new(move || {
        App::new()
            .wrap(cors_policy())
            .wrap(standard_middleware())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(addr)?
    .run()
    .await;

    db.close().await;
    served?;
    Ok(())
}
