pub mod api;
pub mod appresult;
pub mod auth;
pub mod body;
pub mod chat;
pub mod config;
pub mod res;
pub mod session;
pub mod store;

use axum::{Router, extract::FromRef, routing::get};
use tower_http::trace::TraceLayer;

pub use appresult::{AppError, AppResult};

use crate::{auth::Users, session::SessionLayer, store::Store};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub users: Users,
}

/// Every route, with sessions and request tracing applied.
pub fn app(state: AppState, sessions: SessionLayer) -> Router {
    Router::new()
        .route("/chat", get(chat::chat_page))
        .merge(auth::router())
        .nest("/api", api::router())
        .with_state(state)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
}
