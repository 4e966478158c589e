use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::csrf;
use crate::auth::session::{get_user_id, require_role};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::helpers::{cannot_delete, check_form_id, store_failure};
use crate::identity::{ADMIN_ROLE, IdentityStore, StoreError};
use crate::models::DeleteForm;
use crate::templates_structs::{PageContext, UserDeleteTemplate};
use super::helpers::USER_NOT_FOUND;

pub async fn delete(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<DeleteForm>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;
    let id = check_form_id(&path, &form.id)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let reshow = |errors: Vec<String>| -> Result<HttpResponse, AppError> {
        let ctx = PageContext::build(&session, &config, "/users")?;
        render(UserDeleteTemplate {
            ctx,
            id: form.id.clone(),
            name: form.name.clone(),
            errors,
        })
    };

    // Self-deletion protection
    if get_user_id(&session).as_deref() == Some(id) {
        return reshow(vec!["You cannot delete your own account".to_string()]);
    }

    let user = match store.find_user_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AppError::NotFound(USER_NOT_FOUND.to_string())),
        Err(e) => return store_failure(&config, e, reshow),
    };

    match store.delete_user(&user).await {
        Ok(result) if result.succeeded() => {
            log::info!("Deleted user '{}' ({id})", user.user_name);
            Ok(redirect("/users"))
        }
        Ok(result) => {
            log::info!("Delete of user {id} refused: {:?}", result.descriptions());
            reshow(vec!["User is not deleted successfully".to_string()])
        }
        Err(StoreError::InUse(reason)) => {
            log::warn!("User '{}' is still referenced: {reason}", user.user_name);
            cannot_delete(&config, "user", &user.user_name, "/users")
        }
        Err(e) => store_failure(&config, e, reshow),
    }
}
