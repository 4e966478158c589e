use askama::Template;

use crate::models::user::{UserDraft, UserDto};
use super::PageContext;

#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UserIndexTemplate {
    pub ctx: PageContext,
    pub users: Vec<UserDto>,
    pub search: String,
}

#[derive(Template)]
#[template(path = "users/details.html")]
pub struct UserDetailsTemplate {
    pub ctx: PageContext,
    pub user: UserDto,
}

#[derive(Template)]
#[template(path = "users/create.html")]
pub struct UserCreateTemplate {
    pub ctx: PageContext,
    pub user: UserDraft,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "users/edit.html")]
pub struct UserEditTemplate {
    pub ctx: PageContext,
    pub user: UserDto,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "users/delete.html")]
pub struct UserDeleteTemplate {
    pub ctx: PageContext,
    pub id: String,
    pub name: String,
    pub errors: Vec<String>,
}
