use axum::{debug_handler, response::Redirect};
use tower_sessions::Session;
use tracing::info;

use crate::{AppResult, session};

#[debug_handler]
pub(crate) async fn logout(session: Session) -> AppResult<Redirect> {
    if let Some(username) = session::current_user(&session).await? {
        info!(%username, "logout");
    }
    session::sign_out(&session).await?;
    Ok(Redirect::to("/"))
}
