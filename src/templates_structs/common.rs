use askama::Template;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
    pub username: String,
}

/// Generic failure page shown outside development mode.
#[derive(Template)]
#[template(path = "errors/error.html")]
pub struct ErrorTemplate {
    pub app_name: String,
}

/// Shown when a delete is refused because the record is still referenced.
#[derive(Template)]
#[template(path = "errors/cannot_delete.html")]
pub struct CannotDeleteTemplate {
    pub app_name: String,
    pub kind: String,
    pub name: String,
    pub back_url: String,
}
