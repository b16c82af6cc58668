use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::db::{DailyDownloads, RecentContact, SiteStats};
use crate::error::PortfolioError;
use crate::middleware::auth::{RequireAdmin, SESSION_COOKIE, clear_cookie, session_token};
use crate::router::PortfolioState;

const RECENT_MESSAGES: u32 = 10;
const DOWNLOAD_HISTORY_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_messages: i64,
    pub unread_messages: i64,
    pub total_downloads: i64,
    pub recent_messages: Vec<RecentContact>,
    pub downloads_by_date: Vec<DailyDownloads>,
    pub site_stats: SiteStats,
    pub last_updated: String,
}

/// POST /api/admin/login -> opens a session and sets the session cookie.
pub async fn admin_login(
    State(state): State<PortfolioState>,
    jar: PrivateCookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PortfolioError> {
    let Json(req) = body.map_err(|_| PortfolioError::validation("Invalid request body"))?;

    let grant = state
        .sessions
        .login(req.username.as_deref(), req.password.as_deref())
        .await?;

    let login_time = grant.login_time.to_rfc3339();
    let body = json!({
        "success": true,
        "message": "Login successful",
        "user": grant.username,
        "loginTime": login_time,
    });
    let jar = jar.add(state.session_cookie(grant.token));
    Ok((jar, Json(body)))
}

/// GET /api/admin/check -> reports whether the caller holds a live session.
pub async fn admin_check(State(state): State<PortfolioState>, jar: PrivateCookieJar) -> Json<Value> {
    let token = session_token(&jar);
    let status = state.sessions.check_status(token.as_deref()).await;

    if status.authenticated {
        Json(json!({
            "success": true,
            "authenticated": true,
            "user": status.username,
            "loginTime": status.login_time.map(|t| t.to_rfc3339()),
        }))
    } else {
        Json(json!({ "success": true, "authenticated": false }))
    }
}

pub async fn admin_logout(
    RequireAdmin(session): RequireAdmin,
    State(state): State<PortfolioState>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, PortfolioError> {
    state.sessions.logout(&session).await?;
    let jar = jar.remove(clear_cookie(SESSION_COOKIE));
    Ok((
        jar,
        Json(json!({ "success": true, "message": "Logged out successfully" })),
    ))
}

/// GET /api/admin/stats -> dashboard aggregate.
pub async fn admin_stats(
    RequireAdmin(_session): RequireAdmin,
    State(state): State<PortfolioState>,
) -> Result<Json<Value>, PortfolioError> {
    let store = &state.store;
    let data = DashboardData {
        total_messages: store.count_contacts().await?,
        unread_messages: store.count_unread().await?,
        total_downloads: store.count_downloads().await?,
        recent_messages: store.recent_contacts(RECENT_MESSAGES).await?,
        downloads_by_date: store.downloads_by_day(DOWNLOAD_HISTORY_DAYS).await?,
        site_stats: state.stats.read().await,
        last_updated: Utc::now().to_rfc3339(),
    };
    Ok(Json(json!({ "success": true, "data": data })))
}

pub async fn mark_read(
    RequireAdmin(session): RequireAdmin,
    State(state): State<PortfolioState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortfolioError> {
    let id = parse_message_id(&id)?;
    if !state.store.mark_read(id).await? {
        return Err(PortfolioError::NotFound("Message"));
    }
    info!(id, by = %session.username, "message marked as read");
    Ok(Json(
        json!({ "success": true, "message": "Message marked as read" }),
    ))
}

pub async fn delete_message(
    RequireAdmin(session): RequireAdmin,
    State(state): State<PortfolioState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortfolioError> {
    let id = parse_message_id(&id)?;
    if !state.store.delete_contact(id).await? {
        return Err(PortfolioError::NotFound("Message"));
    }
    info!(id, by = %session.username, "message deleted");
    Ok(Json(
        json!({ "success": true, "message": "Message deleted successfully" }),
    ))
}

fn parse_message_id(raw: &str) -> Result<i64, PortfolioError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PortfolioError::validation("Message id must be an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_must_be_integers() {
        assert_eq!(parse_message_id("42").unwrap(), 42);
        assert!(matches!(
            parse_message_id("4x2"),
            Err(PortfolioError::Validation(_))
        ));
        assert!(parse_message_id("").is_err());
    }
}
