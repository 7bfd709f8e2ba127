use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use super::{Message, StoreError};

/// On-disk layout: `{"lastId": n, "messages": [...]}`, every room in one array.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default)]
    last_id: i64,
    #[serde(default)]
    messages: Vec<Message>,
}

/// JSON file backend. The whole document is rewritten on every append.
///
/// Appends hold a process-wide lock across read-modify-write so two concurrent posts
/// can't drop each other's message. Writes go through a temp file and a rename, which
/// lets readers skip the lock.
#[derive(Clone)]
pub struct FileStore {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> FileStore {
        FileStore {
            path: Arc::new(path.as_ref().to_path_buf()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) async fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        if fs::try_exists(&*self.path).await? {
            debug!(path = %self.path.display(), "file store already present");
            return Ok(());
        }

        self.write(&Document::default()).await?;
        info!(path = %self.path.display(), "initialized file-based chat store");
        Ok(())
    }

    pub(super) async fn list_messages(&self, chat_name: &str) -> Result<Vec<Message>, StoreError> {
        let document = self.read().await?;

        let mut messages: Vec<Message> = document
            .messages
            .into_iter()
            .filter(|message| message.chat_name == chat_name)
            .collect();
        // stable: equal timestamps stay in file order
        messages.sort_by_key(|message| message.timestamp);

        Ok(messages)
    }

    pub(super) async fn append_message(
        &self,
        chat_name: &str,
        sender: &str,
        text: &str,
    ) -> Result<Message, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.read().await?;
        let Some(id) = document.last_id.checked_add(1) else {
            return Err(StoreError::Unavailable(format!(
                "store file has no ids left after lastId {}",
                document.last_id
            )));
        };
        let message = Message {
            id,
            chat_name: chat_name.to_owned(),
            sender: sender.to_owned(),
            text: text.to_owned(),
            timestamp: OffsetDateTime::now_utc(),
        };

        document.last_id = id;
        document.messages.push(message.clone());
        self.write(&document).await?;

        Ok(message)
    }

    pub(super) async fn health_check(&self) -> Result<(), StoreError> {
        match fs::metadata(&*self.path).await {
            Ok(_) => Ok(()),
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "file store not accessible");
                Err(StoreError::Unavailable("File store not accessible".to_owned()))
            }
        }
    }

    async fn read(&self) -> Result<Document, StoreError> {
        let raw = fs::read_to_string(&*self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write(&self, document: &Document) -> Result<(), StoreError> {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_string_pretty(document)?).await?;
        fs::rename(&tmp, &*self.path).await?;
        Ok(())
    }
}
