use serde::Deserialize;

use crate::identity::{IdentityStore, StoreResult, User};

/// What the user screens show. Roles are looked up on every read.
#[derive(Debug, Clone)]
pub struct UserDto {
    pub id: String,
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: String,
}

impl UserDto {
    pub async fn load(store: &dyn IdentityStore, user: User) -> StoreResult<Self> {
        let roles = store.roles_of(&user).await?;
        Ok(Self {
            created_at: user.created_at.format("%Y-%m-%d %H:%M").to_string(),
            id: user.id,
            user_name: user.user_name,
            full_name: user.full_name,
            email: user.email,
            roles,
        })
    }

    /// Rebuild from a submitted edit form so the form can be shown again.
    pub fn from_form(form: &UserEditForm) -> Self {
        Self {
            id: form.id.clone(),
            user_name: form.user_name.clone(),
            full_name: form.full_name.clone(),
            email: form.email.clone(),
            roles: vec![],
            created_at: String::new(),
        }
    }

    pub fn roles_label(&self) -> String {
        self.roles.join(", ")
    }
}

#[derive(Debug, Deserialize)]
pub struct UserEditForm {
    pub id: String,
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    pub csrf_token: String,
}

impl UserEditForm {
    /// Copy the editable fields onto the stored record.
    pub fn apply_to(&self, user: &mut User) {
        user.user_name = self.user_name.trim().to_string();
        user.full_name = self.full_name.trim().to_string();
        user.email = self.email.trim().to_string();
    }
}

#[derive(Debug, Deserialize)]
pub struct UserCreateForm {
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

/// Values echoed back into the create form.
#[derive(Debug, Clone, Default)]
pub struct UserDraft {
    pub user_name: String,
    pub full_name: String,
    pub email: String,
}

impl From<&UserCreateForm> for UserDraft {
    fn from(form: &UserCreateForm) -> Self {
        Self {
            user_name: form.user_name.clone(),
            full_name: form.full_name.clone(),
            email: form.email.clone(),
        }
    }
}
