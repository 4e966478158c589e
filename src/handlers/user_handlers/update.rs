use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::csrf;
use crate::auth::session::require_role;
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::helpers::{check_form_id, store_failure};
use crate::identity::{ADMIN_ROLE, IdentityStore};
use crate::models::user::{UserDto, UserEditForm};
use crate::templates_structs::{PageContext, UserEditTemplate};
use super::helpers::{USER_NOT_FOUND, validate_edit_form};

pub async fn update(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<UserEditForm>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;
    let id = check_form_id(&path, &form.id)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let reshow = |errors: Vec<String>| -> Result<HttpResponse, AppError> {
        let ctx = PageContext::build(&session, &config, "/users")?;
        render(UserEditTemplate { ctx, user: UserDto::from_form(&form), errors })
    };

    let errors = validate_edit_form(&form);
    if !errors.is_empty() {
        return reshow(errors);
    }

    let mut user = match store.find_user_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AppError::NotFound(USER_NOT_FOUND.to_string())),
        Err(e) => return store_failure(&config, e, reshow),
    };
    form.apply_to(&mut user);

    match store.update_user(&user).await {
        Ok(result) if result.succeeded() => {
            log::info!("Updated user '{}' ({id})", user.user_name);
            Ok(redirect("/users"))
        }
        Ok(result) => {
            log::info!("Update of user {id} refused: {:?}", result.descriptions());
            reshow(vec!["User is not updated successfully".to_string()])
        }
        Err(e) => store_failure(&config, e, reshow),
    }
}
