//! Message persistence.
//!
//! The backend is picked once at startup: Postgres when a database URL is configured,
//! otherwise a single JSON document on disk. Handlers only ever see [`Store`].

mod file;
mod postgres;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::Config;

pub use file::FileStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub chat_name: String,
    pub sender: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store file i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is not a valid chat store: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Postgres,
    File,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Postgres => "postgres",
            Mode::File => "file",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    File(FileStore),
}

impl Store {
    /// Builds the backend named by the config without touching it. The Postgres pool
    /// connects lazily, so an unreachable database only surfaces on first use.
    pub fn from_config(config: &Config) -> Result<Store, StoreError> {
        match &config.database_url {
            Some(url) => Ok(Store::Postgres(PgStore::connect_lazy(url, config.db_ssl)?)),
            None => Ok(Store::File(FileStore::new(&config.store_file))),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Store::Postgres(_) => Mode::Postgres,
            Store::File(_) => Mode::File,
        }
    }

    /// Creates the messages table or the store file if missing. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        match self {
            Store::Postgres(store) => store.initialize().await,
            Store::File(store) => store.initialize().await,
        }
    }

    /// All messages of one room, oldest first. Ties keep insertion order.
    pub async fn list_messages(&self, chat_name: &str) -> Result<Vec<Message>, StoreError> {
        match self {
            Store::Postgres(store) => store.list_messages(chat_name).await,
            Store::File(store) => store.list_messages(chat_name).await,
        }
    }

    pub async fn append_message(
        &self,
        chat_name: &str,
        sender: &str,
        text: &str,
    ) -> Result<Message, StoreError> {
        match self {
            Store::Postgres(store) => store.append_message(chat_name, sender, text).await,
            Store::File(store) => store.append_message(chat_name, sender, text).await,
        }
    }

    /// Diagnostics only; nothing else waits on this.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        match self {
            Store::Postgres(store) => store.health_check().await,
            Store::File(store) => store.health_check().await,
        }
    }
}
