//! Display records and form payloads for the admin screens.

use serde::Deserialize;

pub mod membership;
pub mod role;
pub mod user;

/// `?search=` on the listing pages.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    /// The search term, or `None` when missing or blank.
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Delete confirmation post-back. `name` is only echoed back into views.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub csrf_token: String,
}

/// Case-insensitive substring match; no term matches everything.
pub fn matches_search(value: &str, term: Option<&str>) -> bool {
    match term {
        None => true,
        Some(term) => value.to_lowercase().contains(&term.to_lowercase()),
    }
}
