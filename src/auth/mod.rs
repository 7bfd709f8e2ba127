use std::{collections::HashMap, fmt, sync::Arc};

use anyhow::{anyhow, bail};
use axum::{
    Router,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::{AppError, AppResult, AppState, session};

mod login;
mod logout;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login::login_page))
        .route("/login", post(login::login))
        .route("/logout", get(logout::logout))
}

/// Username to password table, fixed for the life of the process.
///
/// Passwords are compared as plain text. This is a demo gate and nothing more.
#[derive(Clone)]
pub struct Users(Arc<HashMap<String, String>>);

impl Users {
    pub fn new<I, U, P>(entries: I) -> Users
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Users(Arc::new(
            entries
                .into_iter()
                .map(|(username, password)| (username.into(), password.into()))
                .collect(),
        ))
    }

    pub fn demo() -> Users {
        Users::new([
            ("vishnu", "pass123"),
            ("sarath", "pass234"),
            ("devadath", "pass345"),
            ("alan", "pass456"),
            ("abhishek", "pass567"),
        ])
    }

    /// Parses `name:password,name:password`.
    pub fn parse(list: &str) -> anyhow::Result<Users> {
        let mut users = HashMap::new();
        for entry in list.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let Some((username, password)) = entry.split_once(':') else {
                bail!("expected name:password, got {entry:?}");
            };
            let username = username.trim();
            if username.is_empty() {
                bail!("empty username in {entry:?}");
            }
            if users.insert(username.to_owned(), password.to_owned()).is_some() {
                bail!("duplicate user {username:?}");
            }
        }

        if users.is_empty() {
            return Err(anyhow!("no users given"));
        }
        Ok(Users(Arc::new(users)))
    }

    /// Exact, case-sensitive match on both fields. Hands back the username to store in
    /// the session.
    pub fn authenticate(&self, username: &str, password: &str) -> AppResult<String> {
        match self.0.get(username) {
            Some(expected) if expected == password => Ok(username.to_owned()),
            _ => Err(AppError::InvalidCredentials),
        }
    }
}

impl fmt::Debug for Users {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names: Vec<&String> = self.0.keys().collect();
        names.sort();
        f.debug_tuple("Users").field(&names).finish()
    }
}

/// The logged-in username. Extracting it rejects anonymous requests with 401, before
/// the handler body runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow!(msg)))?;

        session::current_user(&session)
            .await?
            .map(CurrentUser)
            .ok_or(AppError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_users_log_in() {
        let users = Users::demo();
        for (name, password) in [
            ("vishnu", "pass123"),
            ("sarath", "pass234"),
            ("devadath", "pass345"),
            ("alan", "pass456"),
            ("abhishek", "pass567"),
        ] {
            assert_eq!(users.authenticate(name, password).unwrap(), name);
        }
    }

    #[test]
    fn rejects_wrong_password_and_case() {
        let users = Users::demo();
        assert!(matches!(users.authenticate("vishnu", "pass234"), Err(AppError::InvalidCredentials)));
        assert!(matches!(users.authenticate("Vishnu", "pass123"), Err(AppError::InvalidCredentials)));
        assert!(matches!(users.authenticate("nobody", ""), Err(AppError::InvalidCredentials)));
        assert!(matches!(users.authenticate("", ""), Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn parses_user_list() {
        let users = Users::parse("ana:pw1, bo:p:w2").unwrap();
        assert!(users.authenticate("ana", "pw1").is_ok());
        assert!(users.authenticate("bo", "p:w2").is_ok());
        assert!(users.authenticate("vishnu", "pass123").is_err());
    }

    #[test]
    fn rejects_bad_user_lists() {
        assert!(Users::parse("ana").is_err());
        assert!(Users::parse(":pw").is_err());
        assert!(Users::parse("ana:1,ana:2").is_err());
        assert!(Users::parse(" , ").is_err());
    }

    #[test]
    fn debug_hides_passwords() {
        let shown = format!("{:?}", Users::parse("ana:hunter2").unwrap());
        assert!(shown.contains("ana"));
        assert!(!shown.contains("hunter2"));
    }
}
