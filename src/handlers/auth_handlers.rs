use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::csrf;
use crate::auth::session::{get_user_id, sign_in};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::identity::IdentityStore;
use crate::templates_structs::LoginTemplate;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn login_view(
    session: &Session,
    config: &AppConfig,
    error: Option<String>,
    username: &str,
) -> Result<HttpResponse, AppError> {
    let tmpl = LoginTemplate {
        error,
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
        username: username.to_string(),
    };
    render(tmpl)
}

fn rejected(session: &Session, config: &AppConfig, username: &str) -> Result<HttpResponse, AppError> {
    log::warn!("Failed login for '{username}'");
    let error = Some("Invalid username or password".to_string());
    login_view(session, config, error, username)
}

pub async fn login_page(
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if get_user_id(&session).is_some() {
        return Ok(redirect("/users"));
    }
    login_view(&session, &config, None, "")
}

pub async fn login_submit(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let username = form.username.trim();
    let user = match store.find_user_by_name(username).await? {
        Some(user) => user,
        None => return rejected(&session, &config, username),
    };
    if !store.check_password(&user, &form.password).await? {
        return rejected(&session, &config, username);
    }

    let roles = store.roles_of(&user).await?;
    sign_in(&session, &user, roles)?;
    log::info!("User '{}' signed in", user.user_name);

    Ok(redirect("/users"))
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(redirect("/login"))
}
