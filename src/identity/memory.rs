use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    IdentityError, IdentityResult, IdentityStore, NewUser, Role, StoreError, StoreResult, User,
    check_role_name, check_user_name, normalize, password,
};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<String, User>,
    roles: BTreeMap<String, Role>,
    /// (user id, role id)
    memberships: BTreeSet<(String, String)>,
}

impl State {
    fn user_name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        let key = normalize(name);
        self.users
            .values()
            .any(|u| normalize(&u.user_name) == key && Some(u.id.as_str()) != except_id)
    }

    fn role_name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        let key = normalize(name);
        self.roles
            .values()
            .any(|r| normalize(&r.name) == key && Some(r.id.as_str()) != except_id)
    }

    fn role_by_name(&self, name: &str) -> Option<&Role> {
        let key = normalize(name);
        self.roles.values().find(|r| normalize(&r.name) == key)
    }
}

/// Process-local identity store. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryIdentityStore {
    state: Arc<RwLock<State>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn users(&self) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_cached_key(|u| (normalize(&u.user_name), u.id.clone()));
        Ok(users)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_user_by_name(&self, user_name: &str) -> StoreResult<Option<User>> {
        let key = normalize(user_name);
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| normalize(&u.user_name) == key)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<IdentityResult> {
        if let Some(err) = check_user_name(&user.user_name) {
            return Ok(IdentityResult::failed(err));
        }
        // Hash outside the lock; argon2 is slow on purpose.
        let password_hash = password::hash_password(&user.password)?;

        let mut state = self.state.write().await;
        if state.user_name_taken(&user.user_name, None) {
            return Ok(IdentityResult::failed(IdentityError::duplicate_user_name(&user.user_name)));
        }
        let id = Uuid::new_v4().to_string();
        state.users.insert(
            id.clone(),
            User {
                id,
                user_name: user.user_name.trim().to_string(),
                full_name: user.full_name,
                email: user.email,
                password_hash,
                created_at: Utc::now(),
            },
        );
        Ok(IdentityResult::success())
    }

    async fn update_user(&self, user: &User) -> StoreResult<IdentityResult> {
        if let Some(err) = check_user_name(&user.user_name) {
            return Ok(IdentityResult::failed(err));
        }
        let mut state = self.state.write().await;
        if state.user_name_taken(&user.user_name, Some(&user.id)) {
            return Ok(IdentityResult::failed(IdentityError::duplicate_user_name(&user.user_name)));
        }
        match state.users.get_mut(&user.id) {
            Some(stored) => {
                stored.user_name = user.user_name.trim().to_string();
                stored.full_name = user.full_name.clone();
                stored.email = user.email.clone();
                Ok(IdentityResult::success())
            }
            None => Ok(IdentityResult::failed(IdentityError::concurrency_failure())),
        }
    }

    async fn delete_user(&self, user: &User) -> StoreResult<IdentityResult> {
        let mut state = self.state.write().await;
        if state.users.remove(&user.id).is_none() {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }
        state.memberships.retain(|(user_id, _)| user_id != &user.id);
        Ok(IdentityResult::success())
    }

    async fn roles_of(&self, user: &User) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .memberships
            .iter()
            .filter(|(user_id, _)| user_id == &user.id)
            .filter_map(|(_, role_id)| state.roles.get(role_id))
            .map(|r| r.name.clone())
            .collect();
        names.sort_by_cached_key(|name| normalize(name));
        Ok(names)
    }

    async fn is_in_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(match state.role_by_name(role_name) {
            Some(role) => state.memberships.contains(&(user.id.clone(), role.id.clone())),
            None => false,
        })
    }

    async fn add_to_role(&self, user: &User, role_name: &str) -> StoreResult<IdentityResult> {
        let mut state = self.state.write().await;
        let Some(role_id) = state.role_by_name(role_name).map(|r| r.id.clone()) else {
            return Ok(IdentityResult::failed(IdentityError::role_not_found(role_name)));
        };
        if !state.users.contains_key(&user.id) {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }
        if state.memberships.insert((user.id.clone(), role_id)) {
            Ok(IdentityResult::success())
        } else {
            Ok(IdentityResult::failed(IdentityError::user_already_in_role(role_name)))
        }
    }

    async fn remove_from_role(&self, user: &User, role_name: &str) -> StoreResult<IdentityResult> {
        let mut state = self.state.write().await;
        let Some(role_id) = state.role_by_name(role_name).map(|r| r.id.clone()) else {
            return Ok(IdentityResult::failed(IdentityError::role_not_found(role_name)));
        };
        if state.memberships.remove(&(user.id.clone(), role_id)) {
            Ok(IdentityResult::success())
        } else {
            Ok(IdentityResult::failed(IdentityError::user_not_in_role(role_name)))
        }
    }

    async fn roles(&self) -> StoreResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state.roles.values().cloned().collect();
        roles.sort_by_cached_key(|r| (normalize(&r.name), r.id.clone()));
        Ok(roles)
    }

    async fn find_role_by_id(&self, id: &str) -> StoreResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(self.state.read().await.role_by_name(name).cloned())
    }

    async fn create_role(&self, name: &str) -> StoreResult<IdentityResult> {
        if let Some(err) = check_role_name(name) {
            return Ok(IdentityResult::failed(err));
        }
        let mut state = self.state.write().await;
        if state.role_name_taken(name, None) {
            return Ok(IdentityResult::failed(IdentityError::duplicate_role_name(name)));
        }
        let id = Uuid::new_v4().to_string();
        state.roles.insert(id.clone(), Role { id, name: name.trim().to_string() });
        Ok(IdentityResult::success())
    }

    async fn update_role(&self, role: &Role) -> StoreResult<IdentityResult> {
        if let Some(err) = check_role_name(&role.name) {
            return Ok(IdentityResult::failed(err));
        }
        let mut state = self.state.write().await;
        if state.role_name_taken(&role.name, Some(&role.id)) {
            return Ok(IdentityResult::failed(IdentityError::duplicate_role_name(&role.name)));
        }
        match state.roles.get_mut(&role.id) {
            Some(stored) => {
                stored.name = role.name.trim().to_string();
                Ok(IdentityResult::success())
            }
            None => Ok(IdentityResult::failed(IdentityError::concurrency_failure())),
        }
    }

    async fn delete_role(&self, role: &Role) -> StoreResult<IdentityResult> {
        let mut state = self.state.write().await;
        let members = state
            .memberships
            .iter()
            .filter(|(_, role_id)| role_id == &role.id)
            .count();
        if members > 0 {
            return Err(StoreError::InUse(format!(
                "role '{}' still has {members} member(s)",
                role.name
            )));
        }
        if state.roles.remove(&role.id).is_none() {
            return Ok(IdentityResult::failed(IdentityError::concurrency_failure()));
        }
        Ok(IdentityResult::success())
    }
}
