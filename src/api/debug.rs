use axum::{Json, debug_handler, extract::State};
use serde::Serialize;
use tower_sessions::Session;
use tracing::warn;

use crate::{
    AppState, session,
    store::{Mode, Store},
};

/// Session and backend status, reachable without logging in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DebugReport {
    session_user: Option<String>,
    db_ok: bool,
    db_error: Option<String>,
    mode: Mode,
}

#[debug_handler(state = AppState)]
pub(crate) async fn debug_status(State(store): State<Store>, session: Session) -> Json<DebugReport> {
    let session_user = session::current_user(&session).await.ok().flatten();

    let db_error = match store.health_check().await {
        Ok(()) => None,
        Err(err) => {
            warn!(error = %err, mode = %store.mode(), "health check failed");
            Some(err.to_string())
        }
    };

    Json(DebugReport {
        session_user,
        db_ok: db_error.is_none(),
        db_error,
        mode: store.mode(),
    })
}
