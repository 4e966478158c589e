//! Shared test infrastructure for the HTTP-level tests.
//!
//! Every test builds the real route table over a `MemoryIdentityStore`,
//! signs in through the login form and carries the session cookie by hand.
//!
//! - `test_app!(store, config)` builds the service
//! - `send!(app, jar, request)` sends a request with the jar's cookies
//! - `login!(app, jar, user, pass)` signs in and returns the CSRF token
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::test;
use async_trait::async_trait;

use identity_admin::config::{AppConfig, Environment};
use identity_admin::db::seed_admin;
use identity_admin::identity::{
    IdentityResult, IdentityStore, MemoryIdentityStore, NewUser, Role, StoreError, StoreResult, User,
};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin123";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const TEST_PASS: &str = "password123";

// ============================================================================
// HTTP PLUMBING
// ============================================================================

/// Cookies set by the server, replayed on the next request.
#[derive(Default)]
pub struct CookieJar {
    cookies: BTreeMap<String, Cookie<'static>>,
}

impl CookieJar {
    pub fn absorb<B>(&mut self, resp: &ServiceResponse<B>) {
        for cookie in resp.response().cookies() {
            if cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies.insert(cookie.name().to_string(), cookie.into_owned());
            }
        }
    }

    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.cookies.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }
}

/// What a test needs from a response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl Reply {
    pub async fn read<B: MessageBody>(resp: ServiceResponse<B>) -> Self {
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = test::read_body(resp).await;
        Self {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

/// The CSRF token embedded in a rendered form.
pub fn csrf_token(html: &str) -> String {
    let re = regex::Regex::new(r#"name="csrf_token" value="([0-9a-f]{64})""#).expect("regex");
    re.captures(html)
        .map(|c| c[1].to_string())
        .expect("page has no csrf token")
}

macro_rules! test_app {
    ($store:expr, $config:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(identity_admin::auth::session::session_middleware(
                    actix_web::cookie::Key::generate(),
                ))
                .app_data(actix_web::web::Data::from($store))
                .app_data(actix_web::web::Data::new($config))
                .configure(identity_admin::handlers::routes),
        )
        .await
    };
}

macro_rules! send {
    ($app:expr, $jar:expr, $req:expr) => {{
        let mut req = $req;
        for cookie in $jar.cookies() {
            req = req.cookie(cookie);
        }
        let resp = actix_web::test::call_service(&$app, req.to_request()).await;
        $jar.absorb(&resp);
        crate::common::Reply::read(resp).await
    }};
}

macro_rules! login {
    ($app:expr, $jar:expr, $user:expr, $pass:expr) => {{
        let page = send!($app, $jar, actix_web::test::TestRequest::get().uri("/login"));
        let token = crate::common::csrf_token(&page.body);
        let reply = send!(
            $app,
            $jar,
            actix_web::test::TestRequest::post().uri("/login").set_form(vec![
                ("username", $user),
                ("password", $pass),
                ("csrf_token", token.as_str()),
            ])
        );
        reply.assert_redirect("/users");
        token
    }};
}

// ============================================================================
// STORE SETUP
// ============================================================================

pub fn dev_config() -> AppConfig {
    AppConfig { environment: Environment::Development, ..AppConfig::default() }
}

pub fn prod_config() -> AppConfig {
    AppConfig { environment: Environment::Production, ..AppConfig::default() }
}

/// Memory store with the seeded admin account.
pub async fn seeded_store() -> MemoryIdentityStore {
    let store = MemoryIdentityStore::new();
    seed_admin(&store, ADMIN_USER, ADMIN_PASS, ADMIN_EMAIL).await.expect("seed admin");
    store
}

/// Create a user and return its id.
pub async fn add_user(store: &dyn IdentityStore, user_name: &str, full_name: &str) -> String {
    let result = store
        .create_user(NewUser {
            user_name: user_name.to_string(),
            full_name: full_name.to_string(),
            email: format!("{user_name}@example.com"),
            password: TEST_PASS.to_string(),
        })
        .await
        .expect("create user");
    assert!(result.succeeded(), "{:?}", result.descriptions());
    store
        .find_user_by_name(user_name)
        .await
        .expect("find user")
        .expect("user exists")
        .id
}

/// Create a role and return its id.
pub async fn add_role(store: &dyn IdentityStore, name: &str) -> String {
    let result = store.create_role(name).await.expect("create role");
    assert!(result.succeeded(), "{:?}", result.descriptions());
    store
        .find_role_by_name(name)
        .await
        .expect("find role")
        .expect("role exists")
        .id
}

pub async fn is_member(store: &dyn IdentityStore, user_id: &str, role: &str) -> bool {
    let user = store
        .find_user_by_id(user_id)
        .await
        .expect("find user")
        .expect("user exists");
    store.is_in_role(&user, role).await.expect("membership")
}

// ============================================================================
// PROBE STORE
// ============================================================================

/// Wraps the memory store, records every mutation and can be told to fail
/// them with a database error.
#[derive(Default)]
pub struct ProbeStore {
    pub inner: MemoryIdentityStore,
    calls: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl ProbeStore {
    pub fn new(inner: MemoryIdentityStore) -> Arc<Self> {
        Arc::new(Self { inner, ..Self::default() })
    }

    /// Recorded mutations as `op:user_name:role`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn reset(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: String) -> StoreResult<()> {
        self.calls.lock().expect("calls lock").push(call);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for ProbeStore {
    async fn users(&self) -> StoreResult<Vec<User>> {
        self.inner.users().await
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_id(id).await
    }

    async fn find_user_by_name(&self, user_name: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_name(user_name).await
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<IdentityResult> {
        self.record(format!("create_user:{}", user.user_name))?;
        self.inner.create_user(user).await
    }

    async fn update_user(&self, user: &User) -> StoreResult<IdentityResult> {
        self.record(format!("update_user:{}", user.user_name))?;
        self.inner.update_user(user).await
    }

    async fn delete_user(&self, user: &User) -> StoreResult<IdentityResult> {
        self.record(format!("delete_user:{}", user.user_name))?;
        self.inner.delete_user(user).await
    }

    async fn roles_of(&self, user: &User) -> StoreResult<Vec<String>> {
        self.inner.roles_of(user).await
    }

    async fn is_in_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        self.inner.is_in_role(user, role_name).await
    }

    async fn add_to_role(&self, user: &User, role_name: &str) -> StoreResult<IdentityResult> {
        self.record(format!("add:{}:{role_name}", user.user_name))?;
        self.inner.add_to_role(user, role_name).await
    }

    async fn remove_from_role(&self, user: &User, role_name: &str) -> StoreResult<IdentityResult> {
        self.record(format!("remove:{}:{role_name}", user.user_name))?;
        self.inner.remove_from_role(user, role_name).await
    }

    async fn roles(&self) -> StoreResult<Vec<Role>> {
        self.inner.roles().await
    }

    async fn find_role_by_id(&self, id: &str) -> StoreResult<Option<Role>> {
        self.inner.find_role_by_id(id).await
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        self.inner.find_role_by_name(name).await
    }

    async fn create_role(&self, name: &str) -> StoreResult<IdentityResult> {
        self.record(format!("create_role:{name}"))?;
        self.inner.create_role(name).await
    }

    async fn update_role(&self, role: &Role) -> StoreResult<IdentityResult> {
        self.record(format!("update_role:{}", role.name))?;
        self.inner.update_role(role).await
    }

    async fn delete_role(&self, role: &Role) -> StoreResult<IdentityResult> {
        self.record(format!("delete_role:{}", role.name))?;
        self.inner.delete_role(role).await
    }
}
