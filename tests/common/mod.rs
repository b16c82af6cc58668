#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use folio_backend::config::Config;
use folio_backend::db::PortfolioStore;
use folio_backend::router::{PortfolioState, portfolio_router};
use serde_json::Value;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct horse battery staple";

/// Scratch directory holding the SQLite file and static assets; removed on drop.
pub struct TestEnv {
    pub dir: PathBuf,
    pub store: PortfolioStore,
    pub cfg: Config,
}

impl TestEnv {
    pub async fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut dir = std::env::temp_dir();
        dir.push(format!("folio-{tag}-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("failed to create temp dir");

        let mut cfg = Config::default();
        cfg.db_path = dir.join("portfolio.db").display().to_string();
        cfg.admin_username = ADMIN_USER.to_string();
        cfg.admin_password = ADMIN_PASS.to_string();
        cfg.session_secret = "k".repeat(64);
        cfg.static_dir = dir.clone();
        cfg.insecure_cookie = true;

        let store = PortfolioStore::open(&cfg.database_url())
            .await
            .expect("failed to open store");
        store.init_schema().await.expect("failed to init schema");

        Self { dir, store, cfg }
    }

    pub fn app(&self) -> Router {
        portfolio_router(PortfolioState::new(self.store.clone(), &self.cfg))
    }

    pub fn write_asset(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.dir.join(name), contents).expect("failed to write asset");
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

pub fn json_request(method: &str, uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not json")
}

/// `name=value` pair of the first `Set-Cookie` header named `name`.
pub fn cookie_pair(resp: &Response<Body>, name: &str) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{name}=")))
        .map(str::to_string)
}

/// Log in with the configured admin and return the session cookie.
pub async fn login(app: &Router) -> String {
    let body = format!(r#"{{"username":"{ADMIN_USER}","password":"{ADMIN_PASS}"}}"#);
    let resp = send(app, json_request("POST", "/api/admin/login", &body, None)).await;
    assert_eq!(resp.status(), 200);
    cookie_pair(&resp, "admin_session").expect("login did not set a session cookie")
}

pub async fn submit_contact(app: &Router, name: &str, email: &str, message: &str) -> i64 {
    let body = serde_json::json!({ "name": name, "email": email, "message": message }).to_string();
    let resp = send(app, json_request("POST", "/api/contact", &body, None)).await;
    assert_eq!(resp.status(), 201);
    body_json(resp).await["id"].as_i64().expect("id missing")
}
