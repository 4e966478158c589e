//! Pieces shared by the user and role handlers: identifier checks and the
//! environment-gated handling of store failures.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;

use crate::config::AppConfig;
use crate::errors::{AppError, render_status};
use crate::identity::StoreError;
use crate::templates_structs::{CannotDeleteTemplate, ErrorTemplate};

pub const INVALID_OPERATION: &str = "Invalid operation";

/// Identifier taken from the route. Blank is a bad request.
pub fn route_id(raw: &str) -> Result<&str, AppError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest(INVALID_OPERATION.to_string()));
    }
    Ok(id)
}

/// The identifier in the URL must match the one posted with the form.
pub fn check_form_id<'a>(route: &'a str, submitted: &str) -> Result<&'a str, AppError> {
    let id = route_id(route)?;
    if id != submitted.trim() {
        log::warn!("Route id '{id}' does not match form id '{submitted}'");
        return Err(AppError::BadRequest(INVALID_OPERATION.to_string()));
    }
    Ok(id)
}

/// A store call failed outright. Development shows the raw message on the
/// form via `reshow`; everything else logs it and renders the error page.
pub fn store_failure<F>(config: &AppConfig, err: StoreError, reshow: F) -> Result<HttpResponse, AppError>
where
    F: FnOnce(Vec<String>) -> Result<HttpResponse, AppError>,
{
    if config.environment.is_development() {
        log::warn!("{err}");
        return reshow(vec![err.to_string()]);
    }
    log::error!("{err}");
    error_page(config)
}

pub fn error_page(config: &AppConfig) -> Result<HttpResponse, AppError> {
    let tmpl = ErrorTemplate { app_name: config.app_name.clone() };
    render_status(StatusCode::INTERNAL_SERVER_ERROR, tmpl)
}

/// The store refused a delete because the record is still referenced.
pub fn cannot_delete(config: &AppConfig, kind: &str, name: &str, back_url: &str) -> Result<HttpResponse, AppError> {
    let tmpl = CannotDeleteTemplate {
        app_name: config.app_name.clone(),
        kind: kind.to_string(),
        name: name.to_string(),
        back_url: back_url.to_string(),
    };
    render_status(StatusCode::CONFLICT, tmpl)
}
