//! Role membership page: one checkbox per user, reconciled against the store
//! on submit.

use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::csrf;
use crate::auth::session::{get_user_id, require_role};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::helpers::{INVALID_OPERATION, route_id, store_failure};
use crate::identity::{ADMIN_ROLE, IdentityStore, Role, StoreResult};
use crate::models::membership::{MembershipChange, MembershipSubmission, UserInRole};
use crate::models::role::RoleDto;
use crate::templates_structs::{PageContext, RoleMembersTemplate};
use super::helpers::{ADMIN_SELF_REMOVAL, ROLE_NOT_FOUND, edit_action, find_role, is_admin_role};

/// Counts of what a reconciliation pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Bring the role's membership in line with the submitted rows.
///
/// Users that no longer exist are skipped. At most one store mutation is
/// issued per row. A refused mutation is logged and counted; a store error
/// stops the pass and leaves earlier changes applied.
pub async fn reconcile(
    store: &dyn IdentityStore,
    role: &Role,
    rows: &[UserInRole],
) -> StoreResult<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();

    for row in rows {
        let Some(user) = store.find_user_by_id(&row.user_id).await? else {
            log::debug!("Skipping unknown user {} for role '{}'", row.user_id, role.name);
            continue;
        };

        let is_member = store.is_in_role(&user, &role.name).await?;
        let Some(change) = MembershipChange::between(row.is_selected, is_member) else {
            continue;
        };

        let result = match change {
            MembershipChange::Add => store.add_to_role(&user, &role.name).await?,
            MembershipChange::Remove => store.remove_from_role(&user, &role.name).await?,
        };

        if result.succeeded() {
            match change {
                MembershipChange::Add => summary.added += 1,
                MembershipChange::Remove => summary.removed += 1,
            }
        } else {
            summary.failed += 1;
            log::warn!(
                "{change:?} '{}' for role '{}' failed: {}",
                user.user_name,
                role.name,
                result.descriptions().join("; ")
            );
        }
    }

    Ok(summary)
}

pub async fn members_form(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;

    let role = find_role(store.get_ref(), route_id(&path)?).await?;

    let mut rows = Vec::new();
    for user in store.users().await? {
        let is_selected = store.is_in_role(&user, &role.name).await?;
        rows.push(UserInRole { user_id: user.id, user_name: user.user_name, is_selected });
    }

    let ctx = PageContext::build(&session, &config, "/roles")?;
    render(RoleMembersTemplate { ctx, role: role.into(), rows, errors: vec![] })
}

/// The body is read raw: repeated `user_id` / `selected` fields do not fit a
/// flat `web::Form` struct.
pub async fn update_members(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
    body: String,
) -> Result<HttpResponse, AppError> {
    require_role(&session, ADMIN_ROLE)?;
    let id = route_id(&path)?;

    let submission = MembershipSubmission::parse(&body).map_err(|e| {
        log::warn!("Unreadable membership form for role {id}: {e}");
        AppError::BadRequest(INVALID_OPERATION.to_string())
    })?;
    csrf::validate_csrf(&session, &submission.csrf_token)?;

    let role = match store.find_role_by_id(id).await? {
        Some(role) => role,
        None => return Err(AppError::NotFound(ROLE_NOT_FOUND.to_string())),
    };

    let reshow = |errors: Vec<String>| -> Result<HttpResponse, AppError> {
        let ctx = PageContext::build(&session, &config, "/roles")?;
        render(RoleMembersTemplate {
            ctx,
            role: RoleDto { id: role.id.clone(), name: role.name.clone() },
            rows: submission.rows.clone(),
            errors,
        })
    };

    if is_admin_role(&role.name) {
        let me = get_user_id(&session);
        let drops_self = submission
            .rows
            .iter()
            .any(|row| !row.is_selected && Some(&row.user_id) == me.as_ref());
        if drops_self {
            log::warn!("Refused self-removal from role '{}'", role.name);
            return reshow(vec![ADMIN_SELF_REMOVAL.to_string()]);
        }
    }

    match reconcile(store.get_ref(), &role, &submission.rows).await {
        Ok(summary) => {
            log::info!(
                "Role '{}' membership updated: {} added, {} removed, {} failed",
                role.name,
                summary.added,
                summary.removed,
                summary.failed
            );
            Ok(redirect(&edit_action(&role.id)))
        }
        Err(e) => store_failure(&config, e, reshow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{MemoryIdentityStore, NewUser};

    async fn seeded() -> (MemoryIdentityStore, Role, Vec<String>) {
        let store = MemoryIdentityStore::new();
        store.create_role("Editors").await.expect("role");
        let mut ids = Vec::new();
        for name in ["alice", "bob", "carol"] {
            store
                .create_user(NewUser {
                    user_name: name.to_string(),
                    full_name: name.to_string(),
                    email: format!("{name}@example.com"),
                    password: "password123".to_string(),
                })
                .await
                .expect("user");
            let user = store.find_user_by_name(name).await.expect("query").expect("user");
            ids.push(user.id);
        }
        let role = store.find_role_by_name("Editors").await.expect("query").expect("role");
        (store, role, ids)
    }

    fn row(id: &str, is_selected: bool) -> UserInRole {
        UserInRole { user_id: id.to_string(), user_name: String::new(), is_selected }
    }

    #[tokio::test]
    async fn adds_and_removes_only_changed_rows() {
        let (store, role, ids) = seeded().await;
        let bob = store.find_user_by_id(&ids[1]).await.expect("query").expect("bob");
        store.add_to_role(&bob, "Editors").await.expect("add");

        let rows = vec![row(&ids[0], true), row(&ids[1], false), row(&ids[2], false)];
        let summary = reconcile(&store, &role, &rows).await.expect("reconcile");

        assert_eq!(summary, ReconcileSummary { added: 1, removed: 1, failed: 0 });
        let alice = store.find_user_by_id(&ids[0]).await.expect("query").expect("alice");
        assert!(store.is_in_role(&alice, "Editors").await.expect("check"));
        assert!(!store.is_in_role(&bob, "Editors").await.expect("check"));
    }

    #[tokio::test]
    async fn unchanged_submission_is_a_no_op() {
        let (store, role, ids) = seeded().await;
        let rows: Vec<UserInRole> = ids.iter().map(|id| row(id, false)).collect();
        let summary = reconcile(&store, &role, &rows).await.expect("reconcile");
        assert_eq!(summary, ReconcileSummary::default());
    }

    #[tokio::test]
    async fn unknown_users_are_skipped() {
        let (store, role, ids) = seeded().await;
        let rows = vec![row("missing", true), row(&ids[0], true)];
        let summary = reconcile(&store, &role, &rows).await.expect("reconcile");
        assert_eq!(summary.added, 1);
    }
}
