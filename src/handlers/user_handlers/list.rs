use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::require_role;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::identity::{ADMIN_ROLE, IdentityStore};
use crate::models::user::UserDto;
use crate::models::{SearchQuery, matches_search};
use crate::templates_structs::{PageContext, UserIndexTemplate};

/// GET /users?search= filters on full name, then resolves roles per user.
pub async fn index(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let term = query.term();
    let mut users = Vec::new();
    for user in store.users().await? {
        if matches_search(&user.full_name, term) {
            users.push(UserDto::load(store.get_ref(), user).await?);
        }
    }

    let ctx = PageContext::build(&session, &config, "/users")?;
    let tmpl = UserIndexTemplate {
        ctx,
        users,
        search: term.unwrap_or_default().to_string(),
    };
    render(tmpl)
}
