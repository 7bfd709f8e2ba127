mod debug;
mod messages;

use axum::{
    Json, Router, debug_handler,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::{AppState, auth::CurrentUser};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current-user", get(current_user))
        .route("/messages", post(messages::send_message))
        .route("/messages/{chat_name}", get(messages::list_messages))
        .route("/debug", get(debug::debug_status))
}

#[debug_handler]
pub(crate) async fn current_user(CurrentUser(username): CurrentUser) -> Json<Value> {
    Json(json!({ "username": username }))
}
