use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};

use identity_admin::auth::session::{session_key, session_middleware};
use identity_admin::config::AppConfig;
use identity_admin::identity::{IdentityStore, MemoryIdentityStore, PgIdentityStore};
use identity_admin::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!("Running in {:?} mode", config.environment);

    // Initialize the identity store
    let store: Arc<dyn IdentityStore> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("Failed to connect to database");
            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            Arc::new(PgIdentityStore::new(pool))
        }
        None => {
            log::warn!("No DATABASE_URL set, using in-memory identity store (data lost on restart)");
            Arc::new(MemoryIdentityStore::new())
        }
    };

    db::seed_admin(
        store.as_ref(),
        &config.admin_username,
        &config.admin_password,
        &config.admin_email,
    )
    .await
        .expect("Failed to seed admin account");

    let secret_key = session_key(config.session_key.as_deref());
    let bind_addr = config.bind_addr.clone();
    let store = web::Data::from(store);
    let config = web::Data::new(config);

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(secret_key.clone()))
            .wrap(middleware::Logger::default())
            .app_data(store.clone())
            .app_data(config.clone())
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            .configure(handlers::routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
