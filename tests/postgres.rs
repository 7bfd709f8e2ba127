//! Relational backend tests. These only run when `TEST_DATABASE_URL` points at a
//! Postgres database the tests may create tables in.

use nexa_chat::store::{Mode, PgStore, Store};
use sqlx::postgres::PgPoolOptions;
use time::OffsetDateTime;

async fn store() -> Option<Store> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("failed to connect to TEST_DATABASE_URL");
    let store = Store::Postgres(PgStore::from_pool(pool));
    store.initialize().await.expect("failed to create messages table");
    Some(store)
}

/// Room names unique to one test run, so reruns against the same database don't see
/// each other's rows.
fn room(name: &str) -> String {
    format!("{name}-{}", OffsetDateTime::now_utc().unix_timestamp_nanos())
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let Some(store) = store().await else { return };

    store.initialize().await.unwrap();
    store.initialize().await.unwrap();

    assert_eq!(store.mode(), Mode::Postgres);
    store.health_check().await.unwrap();
}

#[tokio::test]
async fn append_then_list_round_trips() {
    let Some(store) = store().await else { return };
    let room1 = room("room1");
    let room2 = room("room2");

    let first = store.append_message(&room1, "vishnu", "hi").await.unwrap();
    let other = store.append_message(&room2, "alan", "elsewhere").await.unwrap();
    let second = store.append_message(&room1, "sarath", "hello").await.unwrap();

    assert!(first.id < other.id && other.id < second.id);
    assert_eq!(first.chat_name, room1);
    assert_eq!(first.sender, "vishnu");
    assert_eq!(first.text, "hi");

    let listed = store.list_messages(&room1).await.unwrap();
    assert_eq!(listed, vec![first, second]);
    assert_eq!(listed, store.list_messages(&room1).await.unwrap());
}

#[tokio::test]
async fn unknown_room_is_empty() {
    let Some(store) = store().await else { return };

    assert!(store.list_messages(&room("empty")).await.unwrap().is_empty());
}
