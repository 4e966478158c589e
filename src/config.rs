/// Runtime mode. Only `Development` shows raw store errors to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse an `APP_ENV` value. Anything unrecognised is treated as production.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "staging" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Postgres URL. `None` runs against the in-memory identity store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub environment: Environment,
    pub app_name: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Address given to the seeded account; must pass the edit form's email check.
    pub admin_email: String,
    pub session_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: None,
            db_max_connections: 8,
            environment: Environment::Production,
            app_name: "Identity Admin".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            admin_email: "admin@example.com".to_string(),
            session_key: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let db_max_connections = match get("DB_MAX_CONNECTIONS").map(|v| v.parse::<u32>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                log::warn!(
                    "Invalid DB_MAX_CONNECTIONS, using {}",
                    defaults.db_max_connections
                );
                defaults.db_max_connections
            }
            None => defaults.db_max_connections,
        };

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: get("DATABASE_URL"),
            db_max_connections,
            environment: get("APP_ENV")
                .map(|v| Environment::from_name(&v))
                .unwrap_or(defaults.environment),
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            admin_username: get("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: get("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            admin_email: get("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            session_key: get("SESSION_KEY"),
        }
    }
}
