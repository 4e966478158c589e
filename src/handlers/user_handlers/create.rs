use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::csrf;
use crate::auth::session::require_role;
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::helpers::store_failure;
use crate::identity::{ADMIN_ROLE, IdentityStore, NewUser};
use crate::models::user::{UserCreateForm, UserDraft};
use crate::templates_structs::{PageContext, UserCreateTemplate};
use super::helpers::validate_create_form;

pub async fn new_form(
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let ctx = PageContext::build(&session, &config, "/users")?;
    render(UserCreateTemplate { ctx, user: UserDraft::default(), errors: vec![] })
}

pub async fn create(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<UserCreateForm>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let reshow = |errors: Vec<String>| -> Result<HttpResponse, AppError> {
        let ctx = PageContext::build(&session, &config, "/users")?;
        render(UserCreateTemplate { ctx, user: UserDraft::from(&*form), errors })
    };

    let errors = validate_create_form(&form);
    if !errors.is_empty() {
        return reshow(errors);
    }

    let user_name = form.user_name.trim();
    match store.find_user_by_name(user_name).await {
        Ok(None) => {}
        Ok(Some(_)) => return reshow(vec!["Username already exists".to_string()]),
        Err(e) => return store_failure(&config, e, reshow),
    }

    let new = NewUser {
        user_name: user_name.to_string(),
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    };

    match store.create_user(new).await {
        Ok(result) if result.succeeded() => {
            log::info!("Created user '{user_name}'");
            Ok(redirect("/users"))
        }
        Ok(result) => reshow(result.descriptions()),
        Err(e) => store_failure(&config, e, reshow),
    }
}
