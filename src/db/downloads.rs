use crate::db::models::{DailyDownloads, DownloadLog};
use crate::db::sqlite::PortfolioStore;
use crate::error::PortfolioError;
use sqlx::FromRow;

pub const RESUME_FILE: &str = "resume.pdf";

impl PortfolioStore {
    /// Append a download log entry. Returns the row id.
    pub async fn log_download(
        &self,
        ip_address: Option<String>,
        user_agent: Option<String>,
        file_name: &str,
    ) -> Result<i64, PortfolioError> {
        let out = self
            .execute(
                "INSERT INTO download_logs (ip_address, user_agent, file_name) VALUES (?, ?, ?)",
                &[ip_address.into(), user_agent.into(), file_name.into()],
            )
            .await?;
        Ok(out.last_insert_id)
    }

    pub async fn count_downloads(&self) -> Result<i64, PortfolioError> {
        self.count("SELECT COUNT(*) AS count FROM download_logs", &[])
            .await
    }

    pub async fn list_downloads(&self, limit: u32) -> Result<Vec<DownloadLog>, PortfolioError> {
        let rows = self
            .query_all(
                r#"SELECT id, ip_address, user_agent, downloaded_at, file_name
                   FROM download_logs ORDER BY downloaded_at DESC, id DESC LIMIT ?"#,
                &[i64::from(limit).into()],
            )
            .await?;
        rows.iter()
            .map(|row| DownloadLog::from_row(row).map_err(PortfolioError::from))
            .collect()
    }

    /// Downloads per calendar day over the last `days` days, newest day first.
    pub async fn downloads_by_day(&self, days: u32) -> Result<Vec<DailyDownloads>, PortfolioError> {
        let window = format!("-{days} days");
        let rows = self
            .query_all(
                r#"SELECT DATE(downloaded_at) AS date, COUNT(*) AS count
                   FROM download_logs
                   WHERE downloaded_at >= datetime('now', ?)
                   GROUP BY DATE(downloaded_at)
                   ORDER BY date DESC
                   LIMIT ?"#,
                &[window.into(), i64::from(days).into()],
            )
            .await?;
        rows.iter()
            .map(|row| DailyDownloads::from_row(row).map_err(PortfolioError::from))
            .collect()
    }
}
