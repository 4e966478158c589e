use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    IdentityError, IdentityResult, IdentityStore, NewUser, Role, StoreError, StoreResult, User,
    check_role_name, check_user_name, normalize, password,
};

const SELECT_USER: &str =
    "SELECT id, user_name, full_name, email, password_hash, created_at FROM users";

/// Identity store backed by the `users`, `roles` and `user_roles` tables.
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Foreign-key violations mean the row is still referenced.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return StoreError::InUse(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY normalized_user_name COLLATE \"C\", id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_name(&self, user_name: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE normalized_user_name = $1"))
            .bind(normalize(user_name))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<IdentityResult> {
        if let Some(err) = check_user_name(&user.user_name) {
            return Ok(IdentityResult::failed(err));
        }
        if self.find_user_by_name(&user.user_name).await?.is_some() {
            return Ok(IdentityResult::failed(IdentityError::duplicate_user_name(&user.user_name)));
        }
        let password_hash = password::hash_password(&user.password)?;

        let inserted = sqlx::query(
            "INSERT INTO users (id, user_name, normalized_user_name, full_name, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user.user_name.trim())
        .bind(normalize(&user.user_name))
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(IdentityResult::success()),
            // Lost a race with a concurrent insert of the same name.
            Err(e) if is_unique_violation(&e) => Ok(IdentityResult::failed(
                IdentityError::duplicate_user_name(&user.user_name),
            )),
            Err(e) => Err(classify(e)),
        }
    }

    async fn update_user(&self, user: &User) -> StoreResult<IdentityResult> {
        if let Some(err) = check_user_name(&user.user_name) {
            return Ok(IdentityResult::failed(err));
        }
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE normalized_user_name = $1 AND id <> $2)",
        )
        .bind(normalize(&user.user_name))
        .bind(&user.id)
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Ok(IdentityResult::failed(IdentityError::duplicate_user_name(&user.user_name)));
        }

        let updated = sqlx::query(
            "UPDATE users SET user_name = $1, normalized_user_name = $2, full_name = $3, \
             email = $4, updated_at = now() WHERE id = $5",
        )
        .bind(user.user_name.trim())
        .bind(normalize(&user.user_name))
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.id)
        .execute(&self.pool)
        .await;

        match updated {
            Ok(done) if done.rows_affected() == 0 => {
                Ok(IdentityResult::failed(IdentityError::concurrency_failure()))
            }
            Ok(_) => Ok(IdentityResult::success()),
            Err(e) if is_unique_violation(&e) => Ok(IdentityResult::failed(
                IdentityError::duplicate_user_name(&user.user_name),
            )),
            Err(e) => Err(classify(e)),
        }
    }

    async fn delete_user(&self, user: &User) -> StoreResult<IdentityResult> {
        // user_roles rows go with the user (ON DELETE CASCADE).
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(&user.id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        if done.rows_affected() == 0 {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }
        Ok(IdentityResult::success())
    }

    async fn roles_of(&self, user: &User) -> StoreResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT r.name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 \
             ORDER BY r.normalized_name COLLATE \"C\", r.id",
        )
        .bind(&user.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn is_in_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        let member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_roles ur \
             JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = $1 AND r.normalized_name = $2)",
        )
        .bind(&user.id)
        .bind(normalize(role_name))
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }

    async fn add_to_role(&self, user: &User, role_name: &str) -> StoreResult<IdentityResult> {
        let Some(role) = self.find_role_by_name(role_name).await? else {
            return Ok(IdentityResult::failed(IdentityError::role_not_found(role_name)));
        };
        let inserted = sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(&user.id)
        .bind(&role.id)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(done) if done.rows_affected() == 0 => Ok(IdentityResult::failed(
                IdentityError::user_already_in_role(role_name),
            )),
            Ok(_) => Ok(IdentityResult::success()),
            // The user vanished between lookup and insert.
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Ok(IdentityResult::failed(IdentityError::concurrency_failure()))
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn remove_from_role(&self, user: &User, role_name: &str) -> StoreResult<IdentityResult> {
        let Some(role) = self.find_role_by_name(role_name).await? else {
            return Ok(IdentityResult::failed(IdentityError::role_not_found(role_name)));
        };
        let done = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(&user.id)
            .bind(&role.id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Ok(IdentityResult::failed(IdentityError::user_not_in_role(role_name)));
        }
        Ok(IdentityResult::success())
    }

    async fn roles(&self) -> StoreResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY normalized_name COLLATE \"C\", id")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    async fn find_role_by_id(&self, id: &str) -> StoreResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE normalized_name = $1")
            .bind(normalize(name))
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn create_role(&self, name: &str) -> StoreResult<IdentityResult> {
        if let Some(err) = check_role_name(name) {
            return Ok(IdentityResult::failed(err));
        }
        let inserted = sqlx::query("INSERT INTO roles (id, name, normalized_name) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4().to_string())
            .bind(name.trim())
            .bind(normalize(name))
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => Ok(IdentityResult::success()),
            Err(e) if is_unique_violation(&e) => {
                Ok(IdentityResult::failed(IdentityError::duplicate_role_name(name)))
            }
            Err(e) => Err(classify(e)),
        }
    }

    async fn update_role(&self, role: &Role) -> StoreResult<IdentityResult> {
        if let Some(err) = check_role_name(&role.name) {
            return Ok(IdentityResult::failed(err));
        }
        let updated = sqlx::query("UPDATE roles SET name = $1, normalized_name = $2 WHERE id = $3")
            .bind(role.name.trim())
            .bind(normalize(&role.name))
            .bind(&role.id)
            .execute(&self.pool)
            .await;

        match updated {
            Ok(done) if done.rows_affected() == 0 => {
                Ok(IdentityResult::failed(IdentityError::concurrency_failure()))
            }
            Ok(_) => Ok(IdentityResult::success()),
            Err(e) if is_unique_violation(&e) => {
                Ok(IdentityResult::failed(IdentityError::duplicate_role_name(&role.name)))
            }
            Err(e) => Err(classify(e)),
        }
    }

    async fn delete_role(&self, role: &Role) -> StoreResult<IdentityResult> {
        // user_roles.role_id is ON DELETE RESTRICT: members make this fail
        // with a foreign-key violation, surfaced as StoreError::InUse.
        let done = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(&role.id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        if done.rows_affected() == 0 {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }
        Ok(IdentityResult::success())
    }
}
