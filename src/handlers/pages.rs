use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::PortfolioError;
use crate::middleware::auth::session_token;
use crate::router::PortfolioState;

const ADMIN_PAGE: &str = "admin.html";
const LOGIN_PAGE: &str = "login.html";

/// GET /admin -> dashboard for signed-in admins, login page for everyone else.
pub async fn admin_page(
    State(state): State<PortfolioState>,
    jar: PrivateCookieJar,
) -> Result<Response, PortfolioError> {
    let token = session_token(&jar);
    if !state.sessions.check_status(token.as_deref()).await.authenticated {
        return Ok(Redirect::to("/admin-login").into_response());
    }
    Ok(serve_page(state.static_dir(), ADMIN_PAGE).await?.into_response())
}

pub async fn admin_login_page(
    State(state): State<PortfolioState>,
) -> Result<Html<String>, PortfolioError> {
    serve_page(state.static_dir(), LOGIN_PAGE).await
}

async fn serve_page(dir: &Path, name: &str) -> Result<Html<String>, PortfolioError> {
    match tokio::fs::read_to_string(dir.join(name)).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(PortfolioError::NotFound("Page")),
        Err(e) => Err(e.into()),
    }
}
