use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::require_role;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::identity::{ADMIN_ROLE, IdentityStore};
use crate::models::role::RoleDto;
use crate::models::{SearchQuery, matches_search};
use crate::templates_structs::{PageContext, RoleIndexTemplate};

pub async fn index(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let term = query.term();
    let roles: Vec<RoleDto> = store
        .roles()
        .await?
        .into_iter()
        .filter(|role| matches_search(&role.name, term))
        .map(RoleDto::from)
        .collect();

    let ctx = PageContext::build(&session, &config, "/roles")?;
    render(RoleIndexTemplate {
        ctx,
        roles,
        search: term.unwrap_or_default().to_string(),
    })
}
