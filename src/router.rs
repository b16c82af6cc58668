use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{delete, get, post};
use axum::{Json, Router, http::StatusCode, response::IntoResponse, response::Redirect};
use axum_extra::extract::cookie::{Cookie, Key};
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::db::PortfolioStore;
use crate::handlers::{admin, pages, public};
use crate::middleware::auth::{SESSION_COOKIE, build_cookie};
use crate::service::credentials::ConfiguredAdmin;
use crate::service::session::SessionAuthority;
use crate::service::stats::StatsAggregator;

const BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone)]
pub struct PortfolioState {
    pub store: PortfolioStore,
    pub stats: StatsAggregator,
    pub sessions: Arc<SessionAuthority>,
    static_dir: Arc<PathBuf>,
    cookie_key: Key,
    insecure_cookie: bool,
}

impl PortfolioState {
    pub fn new(store: PortfolioStore, cfg: &Config) -> Self {
        let admin = ConfiguredAdmin::new(cfg.admin_username.clone(), cfg.admin_password.clone());
        if !admin.is_configured() {
            warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set; admin login is disabled");
        }
        let sessions = SessionAuthority::new(store.clone(), Arc::new(admin), cfg.session_ttl());

        Self {
            stats: StatsAggregator::new(store.clone()),
            store,
            sessions: Arc::new(sessions),
            static_dir: Arc::new(cfg.static_dir.clone()),
            cookie_key: cookie_key(&cfg.session_secret),
            insecure_cookie: cfg.insecure_cookie,
        }
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let ttl = time::Duration::seconds(self.sessions.ttl().num_seconds());
        build_cookie(SESSION_COOKIE, token, ttl, self.insecure_cookie)
    }

    pub fn long_lived_cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        build_cookie(name, value, time::Duration::days(365), self.insecure_cookie)
    }
}

impl FromRef<PortfolioState> for Key {
    fn from_ref(state: &PortfolioState) -> Self {
        state.cookie_key.clone()
    }
}

fn cookie_key(secret: &str) -> Key {
    match Key::try_from(secret.as_bytes()) {
        Ok(key) => key,
        Err(_) => {
            warn!("SESSION_SECRET shorter than 64 bytes; using a random key, sessions end on restart");
            Key::generate()
        }
    }
}

pub fn portfolio_router(state: PortfolioState) -> Router {
    let api = Router::new()
        .route("/contact", post(public::submit_contact))
        .route("/download/resume", get(public::download_resume))
        .route("/track/pageview", post(public::track_page_view))
        .route("/health", get(public::health))
        .route("/admin/login", post(admin::admin_login))
        .route("/admin/check", get(admin::admin_check))
        .route("/admin/logout", post(admin::admin_logout))
        .route("/admin/stats", get(admin::admin_stats))
        .route("/admin/mark-read/{id}", post(admin::mark_read))
        .route("/admin/message/{id}", delete(admin::delete_message))
        .fallback(api_not_found);

    let assets = ServeDir::new(state.static_dir());

    Router::new()
        .nest("/api", api)
        .route("/admin", get(pages::admin_page))
        .route("/admin-login", get(pages::admin_login_page))
        .route("/login", get(|| async { Redirect::permanent("/admin-login") }))
        .fallback_service(assets)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Endpoint not found" })),
    )
}
