use crate::db::models::{ContactMessage, MessageStatus, NewContact, RecentContact};
use crate::db::sqlite::{PortfolioStore, SqlParam};
use crate::error::PortfolioError;

const CONTACT_COLUMNS: &str =
    "id, name, email, message, created_at, status, ip_address, user_agent";

impl PortfolioStore {
    /// Store a new contact message as `unread`. Returns the row id.
    pub async fn insert_contact(&self, contact: NewContact) -> Result<i64, PortfolioError> {
        let out = self
            .execute(
                r#"INSERT INTO contacts (name, email, message, status, ip_address, user_agent)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
                &[
                    contact.name.into(),
                    contact.email.into(),
                    contact.message.into(),
                    MessageStatus::Unread.as_str().into(),
                    contact.ip_address.into(),
                    contact.user_agent.into(),
                ],
            )
            .await?;
        Ok(out.last_insert_id)
    }

    pub async fn get_contact(&self, id: i64) -> Result<Option<ContactMessage>, PortfolioError> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?");
        self.query_one(&sql, &[id.into()])
            .await?
            .map(|row| ContactMessage::from_sqlite_row(&row))
            .transpose()
            .map_err(Into::into)
    }

    pub async fn count_contacts(&self) -> Result<i64, PortfolioError> {
        self.count("SELECT COUNT(*) AS count FROM contacts", &[]).await
    }

    pub async fn count_unread(&self) -> Result<i64, PortfolioError> {
        self.count(
            "SELECT COUNT(*) AS count FROM contacts WHERE status = ?",
            &[MessageStatus::Unread.as_str().into()],
        )
        .await
    }

    /// Newest messages first, at most `limit` of them.
    pub async fn recent_contacts(&self, limit: u32) -> Result<Vec<RecentContact>, PortfolioError> {
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC, id DESC LIMIT ?"
        );
        let rows = self.query_all(&sql, &[i64::from(limit).into()]).await?;
        rows.iter()
            .map(|row| {
                ContactMessage::from_sqlite_row(row)
                    .map(RecentContact::from)
                    .map_err(PortfolioError::from)
            })
            .collect()
    }

    /// Returns `false` when no message has this id.
    pub async fn mark_read(&self, id: i64) -> Result<bool, PortfolioError> {
        let out = self
            .execute(
                "UPDATE contacts SET status = ? WHERE id = ?",
                &[MessageStatus::Read.as_str().into(), id.into()],
            )
            .await?;
        Ok(out.rows_affected > 0)
    }

    /// Returns `false` when no message has this id.
    pub async fn delete_contact(&self, id: i64) -> Result<bool, PortfolioError> {
        let out = self
            .execute("DELETE FROM contacts WHERE id = ?", &[SqlParam::Integer(id)])
            .await?;
        Ok(out.rows_affected > 0)
    }
}
