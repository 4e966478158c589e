use crate::auth::validate;
use crate::errors::AppError;
use crate::identity::{ADMIN_ROLE, IdentityStore, Role, normalize};

pub const ROLE_NOT_FOUND: &str = "Role is not found";
pub const DUPLICATE_ROLE: &str = "A role with this name already exists";
pub const ADMIN_RENAME: &str = "The Admin role cannot be renamed";
pub const ADMIN_SELF_REMOVAL: &str = "You cannot remove yourself from the Admin role";

pub async fn find_role(store: &dyn IdentityStore, id: &str) -> Result<Role, AppError> {
    store
        .find_role_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(ROLE_NOT_FOUND.to_string()))
}

pub fn validate_role_name(name: &str) -> Vec<String> {
    validate::validate_required(name, "Name", 256).into_iter().collect()
}

pub fn edit_action(id: &str) -> String {
    format!("/roles/{id}/edit")
}

/// The role every admin screen requires.
pub fn is_admin_role(name: &str) -> bool {
    normalize(name) == normalize(ADMIN_ROLE)
}
