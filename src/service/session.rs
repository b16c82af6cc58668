use crate::db::{AdminSessionRecord, PortfolioStore};
use crate::error::PortfolioError;
use crate::service::credentials::CredentialVerifier;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

const TOKEN_BYTES: usize = 32;

/// Backing storage for admin sessions.
pub trait SessionStore: Send + Sync {
    fn insert(
        &self,
        record: &AdminSessionRecord,
    ) -> impl Future<Output = Result<(), PortfolioError>> + Send;

    /// Active session with `session_id` expiring after `now`.
    fn find_active(
        &self,
        session_id: &str,
        now: NaiveDateTime,
    ) -> impl Future<Output = Result<Option<AdminSessionRecord>, PortfolioError>> + Send;

    /// `Ok(false)` when no active session matched.
    fn deactivate(&self, session_id: &str)
    -> impl Future<Output = Result<bool, PortfolioError>> + Send;

    fn deactivate_expired(
        &self,
        now: NaiveDateTime,
    ) -> impl Future<Output = Result<u64, PortfolioError>> + Send;
}

impl SessionStore for PortfolioStore {
    async fn insert(&self, record: &AdminSessionRecord) -> Result<(), PortfolioError> {
        self.insert_session(record).await
    }

    async fn find_active(
        &self,
        session_id: &str,
        now: NaiveDateTime,
    ) -> Result<Option<AdminSessionRecord>, PortfolioError> {
        self.find_active_session(session_id, now).await
    }

    async fn deactivate(&self, session_id: &str) -> Result<bool, PortfolioError> {
        self.deactivate_session(session_id).await
    }

    async fn deactivate_expired(&self, now: NaiveDateTime) -> Result<u64, PortfolioError> {
        self.deactivate_expired_sessions(now).await
    }
}

/// Process-local session map.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, AdminSessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_sessions<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, AdminSessionRecord>) -> T,
    ) -> Result<T, PortfolioError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| PortfolioError::Session("session map poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

impl SessionStore for MemorySessionStore {
    async fn insert(&self, record: &AdminSessionRecord) -> Result<(), PortfolioError> {
        self.with_sessions(|m| {
            m.insert(record.session_id.clone(), record.clone());
        })
    }

    async fn find_active(
        &self,
        session_id: &str,
        now: NaiveDateTime,
    ) -> Result<Option<AdminSessionRecord>, PortfolioError> {
        self.with_sessions(|m| {
            m.get(session_id)
                .filter(|r| r.is_active && r.expires_at > now)
                .cloned()
        })
    }

    async fn deactivate(&self, session_id: &str) -> Result<bool, PortfolioError> {
        self.with_sessions(|m| match m.get_mut(session_id) {
            Some(r) if r.is_active => {
                r.is_active = false;
                true
            }
            _ => false,
        })
    }

    async fn deactivate_expired(&self, now: NaiveDateTime) -> Result<u64, PortfolioError> {
        self.with_sessions(|m| {
            let mut closed = 0;
            for r in m.values_mut().filter(|r| r.is_active && r.expires_at <= now) {
                r.is_active = false;
                closed += 1;
            }
            closed
        })
    }
}

/// Issued on successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: String,
    pub username: String,
    pub login_time: DateTime<Utc>,
}

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSession {
    pub token: String,
    pub username: String,
    pub login_time: DateTime<Utc>,
}

impl From<AdminSessionRecord> for AdminSession {
    fn from(r: AdminSessionRecord) -> Self {
        Self {
            token: r.session_id,
            username: r.user_id,
            login_time: r.created_at.and_utc(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub username: Option<String>,
    pub login_time: Option<DateTime<Utc>>,
}

/// Gate for every admin-only operation.
pub struct SessionAuthority<S = PortfolioStore> {
    store: S,
    verifier: Arc<dyn CredentialVerifier>,
    ttl: Duration,
}

impl<S: SessionStore> SessionAuthority<S> {
    pub fn new(store: S, verifier: Arc<dyn CredentialVerifier>, ttl: Duration) -> Self {
        Self {
            store,
            verifier,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check credentials and open a session.
    ///
    /// Missing or blank fields are a validation error; anything else that does not
    /// match is `Unauthorized`, without saying which half was wrong. There is no
    /// lockout, every attempt is judged on its own.
    pub async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<LoginGrant, PortfolioError> {
        let (Some(username), Some(password)) = (
            username.filter(|u| !u.trim().is_empty()),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(PortfolioError::validation(
                "Username and password are required",
            ));
        };

        if !self.verifier.verify(username, password) {
            warn!(%username, "invalid admin credentials");
            return Err(PortfolioError::Unauthorized("Invalid username or password"));
        }

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| PortfolioError::Session("session lifetime out of range".to_string()))?;
        match self.store.deactivate_expired(now.naive_utc()).await {
            Ok(0) => {}
            Ok(closed) => info!(closed, "expired admin sessions closed"),
            Err(e) => warn!(error = %e, "failed to close expired sessions"),
        }

        let record = AdminSessionRecord {
            session_id: new_token(),
            user_id: username.to_string(),
            created_at: now.naive_utc(),
            expires_at: expires_at.naive_utc(),
            is_active: true,
        };
        self.store.insert(&record).await?;

        info!(%username, "admin login successful");
        Ok(LoginGrant {
            token: record.session_id,
            username: record.user_id,
            login_time: now,
        })
    }

    /// Never fails: anything short of a live session reads as anonymous.
    pub async fn check_status(&self, token: Option<&str>) -> SessionStatus {
        let Some(token) = token else {
            return SessionStatus::default();
        };
        match self.store.find_active(token, Utc::now().naive_utc()).await {
            Ok(Some(record)) => {
                let session = AdminSession::from(record);
                SessionStatus {
                    authenticated: true,
                    username: Some(session.username),
                    login_time: Some(session.login_time),
                }
            }
            Ok(None) => SessionStatus::default(),
            Err(e) => {
                warn!(error = %e, "session lookup failed; reporting anonymous");
                SessionStatus::default()
            }
        }
    }

    pub async fn require_authenticated(
        &self,
        token: Option<&str>,
    ) -> Result<AdminSession, PortfolioError> {
        let token = token.ok_or(PortfolioError::Unauthorized("Unauthorized"))?;
        self.store
            .find_active(token, Utc::now().naive_utc())
            .await?
            .map(AdminSession::from)
            .ok_or(PortfolioError::Unauthorized("Unauthorized"))
    }

    /// End `session`. Any failure to do so is a server-side error.
    pub async fn logout(&self, session: &AdminSession) -> Result<(), PortfolioError> {
        match self.store.deactivate(&session.token).await {
            Ok(true) => {
                info!(username = %session.username, "admin logout");
                Ok(())
            }
            Ok(false) => Err(PortfolioError::Session(
                "session already ended".to_string(),
            )),
            Err(e) => Err(PortfolioError::Session(e.to_string())),
        }
    }
}

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
