use std::{str::FromStr, time::Duration};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use tracing::info;

use super::{Message, StoreError};

fn connect_options(database_url: &str, ssl: bool) -> Result<PgConnectOptions, StoreError> {
    let options = PgConnectOptions::from_str(database_url)?;
    if ssl {
        return Ok(options.ssl_mode(PgSslMode::Require));
    }
    Ok(options)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// `ssl` turns on TLS without certificate verification, for hosted databases
    /// that hand out self-signed certs.
    pub fn connect_lazy(database_url: &str, ssl: bool) -> Result<PgStore, StoreError> {
        let options = connect_options(database_url, ssl)?;
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(options);

        Ok(PgStore { pool })
    }

    pub fn from_pool(pool: PgPool) -> PgStore {
        PgStore { pool }
    }

    pub(super) async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id BIGSERIAL PRIMARY KEY,
                chat_name TEXT NOT NULL,
                sender TEXT NOT NULL,
                text TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS messages_chat_name_timestamp ON messages (chat_name, timestamp)",
        )
        .execute(&self.pool)
        .await?;

        info!("connected to postgres, messages table ready");
        Ok(())
    }

    pub(super) async fn list_messages(&self, chat_name: &str) -> Result<Vec<Message>, StoreError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, chat_name, sender, text, timestamp FROM messages WHERE chat_name = $1 ORDER BY timestamp ASC, id ASC",
        )
        .bind(chat_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub(super) async fn append_message(
        &self,
        chat_name: &str,
        sender: &str,
        text: &str,
    ) -> Result<Message, StoreError> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (chat_name, sender, text) VALUES ($1, $2, $3) RETURNING id, chat_name, sender, text, timestamp",
        )
        .bind(chat_name)
        .bind(sender)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub(super) async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
