use std::path::PathBuf;

use anyhow::Context;

use crate::auth::Users;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_SECRET: &str = "hexa-secret";
pub const DEFAULT_STORE_FILE: &str = "chat_store.json";
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 60;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Selects the Postgres backend when present.
    pub database_url: Option<String>,
    pub db_ssl: bool,
    pub session_secret: String,
    pub session_idle: time::Duration,
    pub store_file: PathBuf,
    pub users: Users,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Config> {
        Config::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        // blank counts as unset
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {port:?}"))?,
            None => DEFAULT_PORT,
        };

        let db_ssl = var("DB_SSL").as_deref() == Some("true")
            || var("APP_ENV").as_deref() == Some("production");

        let session_idle_minutes: i64 = match var("SESSION_IDLE_MINUTES") {
            Some(minutes) => minutes
                .trim()
                .parse()
                .ok()
                .filter(|minutes| *minutes > 0)
                .with_context(|| {
                    format!("SESSION_IDLE_MINUTES must be a positive integer, got {minutes:?}")
                })?,
            None => DEFAULT_SESSION_IDLE_MINUTES,
        };

        let users = match var("CHAT_USERS") {
            Some(list) => Users::parse(&list).context("invalid CHAT_USERS")?,
            None => Users::demo(),
        };

        Ok(Config {
            port,
            database_url: var("DATABASE_URL"),
            db_ssl,
            session_secret: var("SESSION_SECRET")
                .unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_owned()),
            session_idle: time::Duration::minutes(session_idle_minutes),
            store_file: var("STORE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE)),
            users,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.session_secret == DEFAULT_SESSION_SECRET
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_select_file_store() {
        let config = config(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, None);
        assert!(!config.db_ssl);
        assert!(config.uses_default_secret());
        assert_eq!(config.store_file, PathBuf::from("chat_store.json"));
        assert_eq!(config.session_idle, time::Duration::hours(1));
        assert!(config.users.authenticate("vishnu", "pass123").is_ok());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://chat@localhost/chat"),
            ("SESSION_SECRET", "s3cret"),
            ("SESSION_IDLE_MINUTES", "5"),
            ("STORE_FILE", "/tmp/store.json"),
            ("CHAT_USERS", "ana:pw"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://chat@localhost/chat"));
        assert!(!config.uses_default_secret());
        assert_eq!(config.session_idle, time::Duration::minutes(5));
        assert_eq!(config.store_file, PathBuf::from("/tmp/store.json"));
        assert!(config.users.authenticate("ana", "pw").is_ok());
        assert!(config.users.authenticate("vishnu", "pass123").is_err());
    }

    #[test]
    fn blank_database_url_means_file_store() {
        let config = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn ssl_from_flag_or_production() {
        assert!(config(&[("DB_SSL", "true")]).unwrap().db_ssl);
        assert!(config(&[("APP_ENV", "production")]).unwrap().db_ssl);
        assert!(!config(&[("DB_SSL", "1")]).unwrap().db_ssl);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(config(&[("PORT", "http")]).is_err());
        assert!(config(&[("SESSION_IDLE_MINUTES", "0")]).is_err());
    }
}
