//! Cookie sessions. The only thing ever stored is the logged-in username.

use sha2::{Digest, Sha512};
use tower_sessions::{
    Expiry, MemoryStore, Session, SessionManagerLayer,
    cookie::{Key, SameSite},
    service::SignedCookie,
};

use crate::{AppResult, config::Config};

pub const USER: &str = "user";

pub type SessionLayer = SessionManagerLayer<MemoryStore, SignedCookie>;

/// Signed cookies over an in-process store. Sessions live until logout or until they
/// sit idle past `session_idle`.
pub fn layer(config: &Config) -> SessionLayer {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name("nexa.sid")
        .with_secure(false)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(config.session_idle))
        .with_signed(signing_key(&config.session_secret))
}

/// Stretches any secret to the 64 bytes cookie signing needs.
fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

pub async fn current_user(session: &Session) -> AppResult<Option<String>> {
    Ok(session.get::<String>(USER).await?)
}

/// Fresh session id on every login, then record the user.
pub async fn sign_in(session: &Session, username: &str) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER, username).await?;
    Ok(())
}

/// Drops the whole session, not just the user field.
pub async fn sign_out(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}
