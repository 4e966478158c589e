//! Role membership selection rows and the reconciliation decision.

use std::collections::HashSet;

/// One row of the "users in role" checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInRole {
    pub user_id: String,
    pub user_name: String,
    pub is_selected: bool,
}

/// The single store call needed to move a user from its current membership
/// to the submitted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Add,
    Remove,
}

impl MembershipChange {
    /// `None` when the user is already where the form wants it.
    pub fn between(selected: bool, is_member: bool) -> Option<Self> {
        match (selected, is_member) {
            (true, false) => Some(MembershipChange::Add),
            (false, true) => Some(MembershipChange::Remove),
            _ => None,
        }
    }
}

/// Parsed body of the membership form.
///
/// Each row posts a hidden `user_id` and `user_name`; a checked box posts
/// `selected` with the user id as its value. Unchecked boxes post nothing.
#[derive(Debug, Default)]
pub struct MembershipSubmission {
    pub csrf_token: String,
    pub rows: Vec<UserInRole>,
}

impl MembershipSubmission {
    pub fn parse(body: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)?;

        let mut csrf_token = String::new();
        let mut ids = Vec::new();
        let mut names = Vec::new();
        let mut selected = HashSet::new();
        for (key, value) in pairs {
            match key.as_str() {
                "csrf_token" => csrf_token = value,
                "user_id" => ids.push(value),
                "user_name" => names.push(value),
                "selected" => {
                    selected.insert(value);
                }
                _ => {}
            }
        }

        let mut seen = HashSet::new();
        let rows = ids
            .into_iter()
            .enumerate()
            .filter(|(_, id)| seen.insert(id.clone()))
            .map(|(i, user_id)| UserInRole {
                is_selected: selected.contains(&user_id),
                user_name: names.get(i).cloned().unwrap_or_default(),
                user_id,
            })
            .collect();

        Ok(Self { csrf_token, rows })
    }
}
