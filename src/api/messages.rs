use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    AppError, AppResult, AppState,
    auth::CurrentUser,
    body::{BodyRejection, JsonOrForm},
    store::{Message, Store},
};

#[derive(Deserialize)]
pub(crate) struct SendMessageBody {
    chat_name: Option<String>,
    text: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct MessageList {
    messages: Vec<Message>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SentMessage {
    ok: bool,
    message: &'static str,
    message_row: Message,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_messages(
    CurrentUser(username): CurrentUser,
    State(store): State<Store>,
    Path(chat_name): Path<String>,
) -> AppResult<Json<MessageList>> {
    debug!(%chat_name, %username, "listing messages");
    let messages = store.list_messages(&chat_name).await?;
    Ok(Json(MessageList { messages }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_message(
    CurrentUser(sender): CurrentUser,
    State(store): State<Store>,
    body: Result<JsonOrForm<SendMessageBody>, BodyRejection>,
) -> AppResult<Json<SentMessage>> {
    let missing = || AppError::Validation("Missing chat_name or text".to_owned());

    let JsonOrForm(SendMessageBody { chat_name, text }) = body.map_err(|rejection| {
        warn!(error = %rejection, "unreadable message body");
        missing()
    })?;
    let chat_name = chat_name.filter(|s| !s.is_empty()).ok_or_else(missing)?;
    let text = text.filter(|s| !s.is_empty()).ok_or_else(missing)?;

    let message = store.append_message(&chat_name, &sender, &text).await?;
    info!(%chat_name, %sender, id = message.id, mode = %store.mode(), "saved message");

    Ok(Json(SentMessage {
        ok: true,
        message: "Message saved",
        message_row: message,
    }))
}
