use serde::Deserialize;

use crate::identity::Role;

#[derive(Debug, Clone, Default)]
pub struct RoleDto {
    pub id: String,
    pub name: String,
}

impl From<Role> for RoleDto {
    fn from(role: Role) -> Self {
        Self { id: role.id, name: role.name }
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleCreateForm {
    pub name: String,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleEditForm {
    pub id: String,
    pub name: String,
    pub csrf_token: String,
}
