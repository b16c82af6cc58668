use crate::db::models::AdminSessionRecord;
use crate::db::sqlite::PortfolioStore;
use crate::error::PortfolioError;
use chrono::NaiveDateTime;
use sqlx::FromRow;

impl PortfolioStore {
    pub async fn insert_session(&self, record: &AdminSessionRecord) -> Result<(), PortfolioError> {
        self.execute(
            r#"INSERT INTO admin_sessions (session_id, user_id, created_at, expires_at, is_active)
               VALUES (?, ?, ?, ?, ?)"#,
            &[
                record.session_id.as_str().into(),
                record.user_id.as_str().into(),
                record.created_at.into(),
                record.expires_at.into(),
                i64::from(record.is_active).into(),
            ],
        )
        .await?;
        Ok(())
    }

    /// Active session for `session_id` whose expiry is after `now`.
    pub async fn find_active_session(
        &self,
        session_id: &str,
        now: NaiveDateTime,
    ) -> Result<Option<AdminSessionRecord>, PortfolioError> {
        let row = self
            .query_one(
                r#"SELECT session_id, user_id, created_at, expires_at, is_active
                   FROM admin_sessions
                   WHERE session_id = ? AND is_active = 1 AND expires_at > ?"#,
                &[session_id.into(), now.into()],
            )
            .await?;
        Ok(row.map(|r| AdminSessionRecord::from_row(&r)).transpose()?)
    }

    /// Returns `false` when there was no active session to end.
    pub async fn deactivate_session(&self, session_id: &str) -> Result<bool, PortfolioError> {
        let out = self
            .execute(
                "UPDATE admin_sessions SET is_active = 0 WHERE session_id = ? AND is_active = 1",
                &[session_id.into()],
            )
            .await?;
        Ok(out.rows_affected > 0)
    }

    /// Mark every session past its expiry as inactive. Returns how many were closed.
    pub async fn deactivate_expired_sessions(
        &self,
        now: NaiveDateTime,
    ) -> Result<u64, PortfolioError> {
        let out = self
            .execute(
                "UPDATE admin_sessions SET is_active = 0 WHERE is_active = 1 AND expires_at <= ?",
                &[now.into()],
            )
            .await?;
        Ok(out.rows_affected)
    }
}
