use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::identity::{ADMIN_ROLE, IdentityStore, NewUser, StoreResult};

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Make sure the Admin role and the configured admin account exist and the
/// account is a member of the role. Safe to run on every start-up.
pub async fn seed_admin(
    store: &dyn IdentityStore,
    username: &str,
    password: &str,
    email: &str,
) -> StoreResult<()> {
    if store.find_role_by_name(ADMIN_ROLE).await?.is_none() {
        let result = store.create_role(ADMIN_ROLE).await?;
        if !result.succeeded() {
            log::warn!("Could not create {ADMIN_ROLE} role: {:?}", result.descriptions());
        }
    }

    let admin = match store.find_user_by_name(username).await? {
        Some(user) => user,
        None => {
            let result = store
                .create_user(NewUser {
                    user_name: username.to_string(),
                    full_name: "Administrator".to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .await?;
            if !result.succeeded() {
                log::warn!("Could not create admin user '{username}': {:?}", result.descriptions());
                return Ok(());
            }
            log::info!("Created admin user '{username}'");
            match store.find_user_by_name(username).await? {
                Some(user) => user,
                None => return Ok(()),
            }
        }
    };

    if !store.is_in_role(&admin, ADMIN_ROLE).await? {
        store.add_to_role(&admin, ADMIN_ROLE).await?;
        log::info!("Granted {ADMIN_ROLE} to '{username}'");
    }
    Ok(())
}
