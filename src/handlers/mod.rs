use actix_web::{HttpResponse, middleware::from_fn, web};

use crate::auth::middleware::require_auth;
use crate::errors::redirect;

pub mod auth_handlers;
pub mod helpers;
pub mod role_handlers;
pub mod user_handlers;

/// The full route table. Static files, when served, must be registered
/// before this: the protected scope matches every path.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/", web::get().to(|| async { redirect("/users") }))
        // Protected routes
        .service(
            web::scope("")
                .wrap(from_fn(require_auth))
                .route("/logout", web::post().to(auth_handlers::logout))
                // Users: /users/new BEFORE /users/{id}
                .route("/users", web::get().to(user_handlers::index))
                .route("/users", web::post().to(user_handlers::create))
                .route("/users/new", web::get().to(user_handlers::new_form))
                .route("/users/{id}", web::get().to(user_handlers::details))
                .route("/users/{id}/edit", web::get().to(user_handlers::edit_form))
                .route("/users/{id}/edit", web::post().to(user_handlers::update))
                .route("/users/{id}/delete", web::get().to(user_handlers::delete_form))
                .route("/users/{id}/delete", web::post().to(user_handlers::delete))
                // Roles: /roles/new BEFORE /roles/{id}
                .route("/roles", web::get().to(role_handlers::index))
                .route("/roles", web::post().to(role_handlers::create))
                .route("/roles/new", web::get().to(role_handlers::new_form))
                .route("/roles/{id}", web::get().to(role_handlers::details))
                .route("/roles/{id}/edit", web::get().to(role_handlers::edit_form))
                .route("/roles/{id}/edit", web::post().to(role_handlers::update))
                .route("/roles/{id}/delete", web::get().to(role_handlers::delete_form))
                .route("/roles/{id}/delete", web::post().to(role_handlers::delete))
                .route("/roles/{id}/members", web::get().to(role_handlers::members_form))
                .route("/roles/{id}/members", web::post().to(role_handlers::update_members))
                .default_service(web::to(not_found)),
        );
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../../templates/errors/404.html"))
}
