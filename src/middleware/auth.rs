use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use time::Duration;

use crate::error::PortfolioError;
use crate::router::PortfolioState;
use crate::service::session::AdminSession;

pub const SESSION_COOKIE: &str = "admin_session";

/// Opaque session token carried by the request, if any.
pub fn session_token(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_owned())
}

pub fn build_cookie(
    name: &'static str,
    value: String,
    max_age: Duration,
    insecure: bool,
) -> Cookie<'static> {
    Cookie::build(Cookie::new(name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!insecure)
        .max_age(max_age)
        .build()
}

pub fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(Cookie::new(name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Admin gate: extracting this rejects with 401 unless the request carries a live session.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminSession);

impl FromRequestParts<PortfolioState> for RequireAdmin {
    type Rejection = PortfolioError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortfolioState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        let token = session_token(&jar);
        state
            .sessions
            .require_authenticated(token.as_deref())
            .await
            .map(Self)
    }
}
