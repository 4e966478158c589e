use askama::Template;

use crate::models::membership::UserInRole;
use crate::models::role::RoleDto;
use super::PageContext;

#[derive(Template)]
#[template(path = "roles/index.html")]
pub struct RoleIndexTemplate {
    pub ctx: PageContext,
    pub roles: Vec<RoleDto>,
    pub search: String,
}

#[derive(Template)]
#[template(path = "roles/details.html")]
pub struct RoleDetailsTemplate {
    pub ctx: PageContext,
    pub role: RoleDto,
}

/// Create and edit share one form; `role.id` is empty when creating.
#[derive(Template)]
#[template(path = "roles/form.html")]
pub struct RoleFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub role: RoleDto,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "roles/delete.html")]
pub struct RoleDeleteTemplate {
    pub ctx: PageContext,
    pub id: String,
    pub name: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "roles/members.html")]
pub struct RoleMembersTemplate {
    pub ctx: PageContext,
    pub role: RoleDto,
    pub rows: Vec<UserInRole>,
    pub errors: Vec<String>,
}
