//! Role screens over HTTP: search, create, rename, delete.

#[macro_use]
mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;

use common::*;
use identity_admin::identity::IdentityStore;

#[actix_web::test]
async fn search_matches_role_name_case_insensitively() {
    let store = seeded_store().await;
    add_role(&store, "Editors").await;
    add_role(&store, "Auditors").await;
    add_role(&store, "Viewers").await;
    let app = test_app!(Arc::new(store) as Arc<dyn IdentityStore>, prod_config());
    let mut jar = CookieJar::default();
    login!(app, jar, ADMIN_USER, ADMIN_PASS);

    let reply = send!(app, jar, TestRequest::get().uri("/roles?search=ITOR"));
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Editors"));
    assert!(reply.body.contains("Auditors"));
    assert!(!reply.body.contains("Viewers"));
}

#[actix_web::test]
async fn missing_role_is_not_found() {
    let store: Arc<dyn IdentityStore> = Arc::new(seeded_store().await);
    let app = test_app!(store, prod_config());
    let mut jar = CookieJar::default();
    let token = login!(app, jar, ADMIN_USER, ADMIN_PASS);

    for uri in ["/roles/nope", "/roles/nope/edit", "/roles/nope/delete", "/roles/nope/members"] {
        let reply = send!(app, jar, TestRequest::get().uri(uri));
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(reply.body, "Role is not found");
    }

    let reply = send!(
        app,
        jar,
        TestRequest::post().uri("/roles/nope/delete").set_form(vec![
            ("id", "nope"),
            ("name", "Nope"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, "Role is not found");
}

#[actix_web::test]
async fn create_rejects_existing_name() {
    let store = seeded_store().await;
    add_role(&store, "Editors").await;
    let probe = ProbeStore::new(store);
    let app = test_app!(probe.clone() as Arc<dyn IdentityStore>, prod_config());
    let mut jar = CookieJar::default();
    let token = login!(app, jar, ADMIN_USER, ADMIN_PASS);

    let reply = send!(
        app,
        jar,
        TestRequest::post().uri("/roles").set_form(vec![
            ("name", "editors"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("A role with this name already exists"));
    assert!(probe.calls().is_empty());

    let reply = send!(
        app,
        jar,
        TestRequest::post().uri("/roles").set_form(vec![
            ("name", "Auditors"),
            ("csrf_token", token.as_str()),
        ])
    );
    reply.assert_redirect("/roles");
    assert_eq!(probe.calls(), vec!["create_role:Auditors".to_string()]);
}

#[actix_web::test]
async fn rename_role() {
    let store = seeded_store().await;
    let id = add_role(&store, "Editors").await;
    let store: Arc<dyn IdentityStore> = Arc::new(store);
    let app = test_app!(store.clone(), prod_config());
    let mut jar = CookieJar::default();
    let token = login!(app, jar, ADMIN_USER, ADMIN_PASS);

    let reply = send!(
        app,
        jar,
        TestRequest::post().uri(&format!("/roles/{id}/edit")).set_form(vec![
            ("id", id.as_str()),
            ("name", "Writers"),
            ("csrf_token", token.as_str()),
        ])
    );
    reply.assert_redirect("/roles");
    let role = store.find_role_by_id(&id).await.expect("query").expect("role");
    assert_eq!(role.name, "Writers");

    // Clashing with the Admin role is refused by the store.
    let reply = send!(
        app,
        jar,
        TestRequest::post().uri(&format!("/roles/{id}/edit")).set_form(vec![
            ("id", id.as_str()),
            ("name", "admin"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Role is not updated successfully"));
}

#[actix_web::test]
async fn mismatched_role_id_is_rejected() {
    let store = seeded_store().await;
    let id = add_role(&store, "Editors").await;
    let app = test_app!(Arc::new(store) as Arc<dyn IdentityStore>, prod_config());
    let mut jar = CookieJar::default();
    let token = login!(app, jar, ADMIN_USER, ADMIN_PASS);

    let reply = send!(
        app,
        jar,
        TestRequest::post().uri(&format!("/roles/{id}/edit")).set_form(vec![
            ("id", "other"),
            ("name", "Writers"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, "Invalid operation");
}

#[actix_web::test]
async fn role_with_members_cannot_be_deleted() {
    let store = seeded_store().await;
    let role_id = add_role(&store, "Editors").await;
    let user_id = add_user(&store, "alice", "Alice Liddell").await;
    let alice = store.find_user_by_id(&user_id).await.expect("query").expect("alice");
    store.add_to_role(&alice, "Editors").await.expect("add");
    let store: Arc<dyn IdentityStore> = Arc::new(store);
    let app = test_app!(store.clone(), prod_config());
    let mut jar = CookieJar::default();
    let token = login!(app, jar, ADMIN_USER, ADMIN_PASS);

    let reply = send!(
        app,
        jar,
        TestRequest::post().uri(&format!("/roles/{role_id}/delete")).set_form(vec![
            ("id", role_id.as_str()),
            ("name", "Editors"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert!(reply.body.contains("Cannot delete role"));
    assert!(store.find_role_by_id(&role_id).await.expect("query").is_some());

    store.remove_from_role(&alice, "Editors").await.expect("remove");
    let reply = send!(
        app,
        jar,
        TestRequest::post().uri(&format!("/roles/{role_id}/delete")).set_form(vec![
            ("id", role_id.as_str()),
            ("name", "Editors"),
            ("csrf_token", token.as_str()),
        ])
    );
    reply.assert_redirect("/roles");
    assert!(store.find_role_by_id(&role_id).await.expect("query").is_none());
}

#[actix_web::test]
async fn admin_role_cannot_be_renamed() {
    let store: Arc<dyn IdentityStore> = Arc::new(seeded_store().await);
    let admin_role = store.find_role_by_name("Admin").await.expect("query").expect("role");
    let app = test_app!(store.clone(), prod_config());
    let mut jar = CookieJar::default();
    let token = login!(app, jar, ADMIN_USER, ADMIN_PASS);

    let reply = send!(
        app,
        jar,
        TestRequest::post().uri(&format!("/roles/{}/edit", admin_role.id)).set_form(vec![
            ("id", admin_role.id.as_str()),
            ("name", "Staff"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("The Admin role cannot be renamed"));
    let role = store.find_role_by_id(&admin_role.id).await.expect("query").expect("role");
    assert_eq!(role.name, "Admin");

    // A fresh login still reaches the admin screens.
    let reply = send!(
        app,
        jar,
        TestRequest::post().uri("/logout").set_form(vec![("csrf_token", token.as_str())])
    );
    reply.assert_redirect("/login");
    login!(app, jar, ADMIN_USER, ADMIN_PASS);
    let reply = send!(app, jar, TestRequest::get().uri("/users"));
    assert_eq!(reply.status, StatusCode::OK);
}

#[actix_web::test]
async fn admin_role_accepts_a_case_only_rename() {
    let store: Arc<dyn IdentityStore> = Arc::new(seeded_store().await);
    let admin_role = store.find_role_by_name("Admin").await.expect("query").expect("role");
    let app = test_app!(store.clone(), prod_config());
    let mut jar = CookieJar::default();
    let token = login!(app, jar, ADMIN_USER, ADMIN_PASS);

    let reply = send!(
        app,
        jar,
        TestRequest::post().uri(&format!("/roles/{}/edit", admin_role.id)).set_form(vec![
            ("id", admin_role.id.as_str()),
            ("name", "ADMIN"),
            ("csrf_token", token.as_str()),
        ])
    );
    reply.assert_redirect("/roles");
    let role = store.find_role_by_id(&admin_role.id).await.expect("query").expect("role");
    assert_eq!(role.name, "ADMIN");
}
