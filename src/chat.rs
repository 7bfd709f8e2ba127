use axum::{
    debug_handler,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{AppResult, include_res, session};

#[debug_handler]
pub async fn chat_page(session: Session) -> AppResult<Response> {
    if session::current_user(&session).await?.is_none() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Html(include_res!(str, "/pages/chat.html")).into_response())
}
