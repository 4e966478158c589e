use actix_session::{Session, SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::errors::AppError;
use crate::identity::User;

/// Cookie-backed session layer shared by the server and the test app.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .cookie_http_only(true)
        .build()
}

/// Session key from `SESSION_KEY`, or a random one when unset or too short.
pub fn session_key(configured: Option<&str>) -> Key {
    match configured {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    }
}

/// Role names of the signed-in user, as captured at login.
#[derive(Debug, Clone, Default)]
pub struct Roles(pub Vec<String>);

impl Roles {
    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|r| r.eq_ignore_ascii_case(name))
    }
}

/// Record a successful login. The session is renewed first so a
/// pre-login session id is never reused.
pub fn sign_in(session: &Session, user: &User, roles: Vec<String>) -> Result<(), AppError> {
    session.renew();
    session
        .insert("user_id", &user.id)
        .and_then(|_| session.insert("username", &user.user_name))
        .and_then(|_| session.insert("roles", roles))
        .map_err(|e| AppError::Session(format!("Failed to store login: {e}")))
}

pub fn get_user_id(session: &Session) -> Option<String> {
    session.get::<String>("user_id").unwrap_or(None)
}

pub fn get_username(session: &Session) -> Result<String, String> {
    match session.get::<String>("username") {
        Ok(Some(username)) => Ok(username),
        Ok(None) => Err("No username in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

pub fn get_roles(session: &Session) -> Result<Roles, String> {
    match session.get::<Vec<String>>("roles") {
        Ok(Some(roles)) => Ok(Roles(roles)),
        Ok(None) => Err("No roles in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

/// Check role membership; returns Err(AppError) if denied.
pub fn require_role(session: &Session, role: &str) -> Result<(), AppError> {
    let roles = get_roles(session)
        .map_err(|e| AppError::Session(format!("Failed to get roles: {}", e)))?;

    if roles.has(role) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(role.to_string()))
    }
}
