use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::csrf;
use crate::auth::session::require_role;
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::helpers::{cannot_delete, check_form_id, route_id, store_failure};
use crate::identity::{ADMIN_ROLE, IdentityStore, StoreError};
use crate::models::DeleteForm;
use crate::models::role::{RoleCreateForm, RoleDto, RoleEditForm};
use crate::templates_structs::{PageContext, RoleDeleteTemplate, RoleDetailsTemplate, RoleFormTemplate};
use super::helpers::{
    ADMIN_RENAME, DUPLICATE_ROLE, ROLE_NOT_FOUND, edit_action, find_role, is_admin_role, validate_role_name,
};

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

pub async fn details(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let role = find_role(store.get_ref(), route_id(&path)?).await?;
    let ctx = PageContext::build(&session, &config, "/roles")?;
    render(RoleDetailsTemplate { ctx, role: role.into() })
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

pub async fn new_form(
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let ctx = PageContext::build(&session, &config, "/roles")?;
    render(RoleFormTemplate {
        ctx,
        form_action: "/roles".to_string(),
        form_title: "New Role".to_string(),
        role: RoleDto::default(),
        errors: vec![],
    })
}

pub async fn create(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<RoleCreateForm>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let reshow = |errors: Vec<String>| -> Result<HttpResponse, AppError> {
        let ctx = PageContext::build(&session, &config, "/roles")?;
        render(RoleFormTemplate {
            ctx,
            form_action: "/roles".to_string(),
            form_title: "New Role".to_string(),
            role: RoleDto { id: String::new(), name: form.name.clone() },
            errors,
        })
    };

    let errors = validate_role_name(&form.name);
    if !errors.is_empty() {
        return reshow(errors);
    }

    let name = form.name.trim();
    match store.find_role_by_name(name).await {
        Ok(None) => {}
        Ok(Some(_)) => return reshow(vec![DUPLICATE_ROLE.to_string()]),
        Err(e) => return store_failure(&config, e, reshow),
    }

    match store.create_role(name).await {
        Ok(result) if result.succeeded() => {
            log::info!("Created role '{name}'");
            Ok(redirect("/roles"))
        }
        Ok(result) => reshow(result.descriptions()),
        Err(e) => store_failure(&config, e, reshow),
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

pub async fn edit_form(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let role = find_role(store.get_ref(), route_id(&path)?).await?;
    let ctx = PageContext::build(&session, &config, "/roles")?;
    render(RoleFormTemplate {
        ctx,
        form_action: edit_action(&role.id),
        form_title: "Edit Role".to_string(),
        role: role.into(),
        errors: vec![],
    })
}

pub async fn update(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<RoleEditForm>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;
    let id = check_form_id(&path, &form.id)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let reshow = |errors: Vec<String>| -> Result<HttpResponse, AppError> {
        let ctx = PageContext::build(&session, &config, "/roles")?;
        render(RoleFormTemplate {
            ctx,
            form_action: edit_action(id),
            form_title: "Edit Role".to_string(),
            role: RoleDto { id: id.to_string(), name: form.name.clone() },
            errors,
        })
    };

    let errors = validate_role_name(&form.name);
    if !errors.is_empty() {
        return reshow(errors);
    }

    let mut role = match store.find_role_by_id(id).await {
        Ok(Some(role)) => role,
        Ok(None) => return Err(AppError::NotFound(ROLE_NOT_FOUND.to_string())),
        Err(e) => return store_failure(&config, e, reshow),
    };
    // Admin keeps its name.
    if is_admin_role(&role.name) && !is_admin_role(&form.name) {
        log::warn!("Refused rename of role '{}' to '{}'", role.name, form.name.trim());
        return reshow(vec![ADMIN_RENAME.to_string()]);
    }
    let old_name = std::mem::replace(&mut role.name, form.name.trim().to_string());

    match store.update_role(&role).await {
        Ok(result) if result.succeeded() => {
            log::info!("Renamed role '{old_name}' to '{}'", role.name);
            Ok(redirect("/roles"))
        }
        Ok(result) => {
            log::info!("Update of role {id} refused: {:?}", result.descriptions());
            reshow(vec!["Role is not updated successfully".to_string()])
        }
        Err(e) => store_failure(&config, e, reshow),
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

pub async fn delete_form(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let role = find_role(store.get_ref(), route_id(&path)?).await?;
    let ctx = PageContext::build(&session, &config, "/roles")?;
    render(RoleDeleteTemplate { ctx, id: role.id, name: role.name, errors: vec![] })
}

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
        let ctx = PageContext::build(&session, &config, "/roles")?;
        render(RoleDeleteTemplate {
            ctx,
            id: form.id.clone(),
            name: form.name.clone(),
            errors,
        })
    };

    let role = match store.find_role_by_id(id).await {
        Ok(Some(role)) => role,
        Ok(None) => return Err(AppError::NotFound(ROLE_NOT_FOUND.to_string())),
        Err(e) => return store_failure(&config, e, reshow),
    };

    match store.delete_role(&role).await {
        Ok(result) if result.succeeded() => {
            log::info!("Deleted role '{}' ({id})", role.name);
            Ok(redirect("/roles"))
        }
        Ok(result) => {
            log::info!("Delete of role {id} refused: {:?}", result.descriptions());
            reshow(vec!["Role is not deleted successfully".to_string()])
        }
        Err(StoreError::InUse(reason)) => {
            log::warn!("Role '{}' still has members: {reason}", role.name);
            cannot_delete(&config, "role", &role.name, "/roles")
        }
        Err(e) => store_failure(&config, e, reshow),
    }
}
