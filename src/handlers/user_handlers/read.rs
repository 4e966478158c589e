use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::require_role;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::handlers::helpers::route_id;
use crate::identity::{ADMIN_ROLE, IdentityStore};
use crate::models::user::UserDto;
use crate::templates_structs::{PageContext, UserDeleteTemplate, UserDetailsTemplate, UserEditTemplate};
use super::helpers::find_user;

async fn load(store: &dyn IdentityStore, raw_id: &str) -> Result<UserDto, AppError> {
    let id = route_id(raw_id)?;
    let user = find_user(store, id).await?;
    Ok(UserDto::load(store, user).await?)
}

pub async fn details(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let user = load(store.get_ref(), &path).await?;
    let ctx = PageContext::build(&session, &config, "/users")?;
    render(UserDetailsTemplate { ctx, user })
}

pub async fn edit_form(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let user = load(store.get_ref(), &path).await?;
    let ctx = PageContext::build(&session, &config, "/users")?;
    render(UserEditTemplate { ctx, user, errors: vec![] })
}

pub async fn delete_form(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let id = route_id(&path)?;
    let user = find_user(store.get_ref(), id).await?;
    let ctx = PageContext::build(&session, &config, "/users")?;
    render(UserDeleteTemplate {
        ctx,
        id: user.id,
        name: user.user_name,
        errors: vec![],
    })
}
