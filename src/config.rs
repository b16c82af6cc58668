use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variables the server reads, matched case-insensitively onto [`Config`] fields.
pub const ENV_KEYS: &[&str] = &[
    "DB_PATH",
    "ADMIN_USERNAME",
    "ADMIN_PASSWORD",
    "SESSION_SECRET",
    "PORT",
    "STATIC_DIR",
    "SESSION_TTL_HOURS",
    "INSECURE_COOKIE",
    "LOGLEVEL",
];

/// Upper bound on `SESSION_TTL_HOURS`, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file path, or a full `sqlite:` URL.
    pub db_path: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Master key for the encrypted session cookie; at least 64 bytes.
    pub session_secret: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub session_ttl_hours: i64,
    /// Drop the `Secure` cookie attribute when serving plain HTTP.
    pub insecure_cookie: bool,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./portfolio.db".to_string(),
            admin_username: String::new(),
            admin_password: String::new(),
            session_secret: String::new(),
            port: 3000,
            static_dir: PathBuf::from("./frontend"),
            session_ttl_hours: 24,
            insecure_cookie: false,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::raw().only(ENV_KEYS))
    }

    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            self.db_path.clone()
        } else {
            format!("sqlite:{}", self.db_path)
        }
    }

    /// Session lifetime, clamped to between one hour and [`MAX_SESSION_TTL_HOURS`].
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}
