use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{Roles, get_roles, get_username};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::identity::ADMIN_ROLE;

pub mod common;
pub mod role;
pub mod user;

pub use common::*;
pub use role::*;
pub use user::*;

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.csrf_token`, etc.
pub struct PageContext {
    pub username: String,
    pub roles: Roles,
    pub app_name: String,
    pub csrf_token: String,
    pub current_path: String,
}

impl PageContext {
    pub fn build(session: &Session, config: &AppConfig, current_path: &str) -> Result<Self, AppError> {
        let username = get_username(session)
            .map_err(|e| AppError::Session(format!("Failed to get username: {}", e)))?;
        let roles = get_roles(session)
            .map_err(|e| AppError::Session(format!("Failed to get roles: {}", e)))?;
        let csrf_token = csrf::get_or_create_token(session);
        Ok(Self {
            username,
            roles,
            app_name: config.app_name.clone(),
            csrf_token,
            current_path: current_path.to_string(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.roles.has(ADMIN_ROLE)
    }
}
