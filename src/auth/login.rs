use axum::{
    Json, debug_handler,
    extract::State,
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{
    AppError, AppResult, AppState,
    body::{BodyRejection, JsonOrForm},
    include_res, session,
};

use super::Users;

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
pub(crate) struct LoginOk {
    ok: bool,
    message: &'static str,
}

#[debug_handler]
pub(crate) async fn login_page() -> impl IntoResponse {
    Html(include_res!(str, "/pages/index.html"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(users): State<Users>,
    session: Session,
    form: Result<JsonOrForm<LoginForm>, BodyRejection>,
) -> AppResult<Json<LoginOk>> {
    let LoginForm { username, password } = match form {
        Ok(JsonOrForm(form)) => form,
        Err(rejection) => {
            warn!(error = %rejection, "unreadable login body");
            return Err(AppError::InvalidCredentials);
        }
    };

    info!(%username, "login attempt");
    let username = users
        .authenticate(&username, &password)
        .inspect_err(|_| warn!(%username, "login failed"))?;

    session::sign_in(&session, &username).await?;
    info!(%username, "login successful");

    Ok(Json(LoginOk {
        ok: true,
        message: "Login successful",
    }))
}
