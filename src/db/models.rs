use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;

/// Messages longer than this many characters get a truncated preview.
pub const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Read,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Unread => "unread",
            MessageStatus::Read => "read",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown message status `{0}`")]
pub struct UnknownStatus(String);

impl FromStr for MessageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" => Ok(MessageStatus::Unread),
            "read" => Ok(MessageStatus::Read),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// Stored timestamps are UTC without an offset; emit them as `...Z`.
fn as_utc<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    value.and_utc().serialize(s)
}

fn as_utc_opt<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
    value.map(|v| v.and_utc()).serialize(s)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(serialize_with = "as_utc")]
    pub created_at: NaiveDateTime,
    pub status: MessageStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ContactMessage {
    pub(crate) fn from_sqlite_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status_str: String = row.try_get("status")?;
        let status = status_str
            .parse::<MessageStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(ContactMessage {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            message: row.try_get("message")?,
            created_at: row.try_get("created_at")?,
            status,
            ip_address: row.try_get("ip_address")?,
            user_agent: row.try_get("user_agent")?,
        })
    }
}

/// Fields supplied by a public contact-form submission.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Row shape of the admin dashboard's recent-messages list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecentContact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub preview: String,
    pub message: String,
    #[serde(serialize_with = "as_utc")]
    pub created_at: NaiveDateTime,
    pub status: MessageStatus,
    pub ip_address: Option<String>,
}

impl From<ContactMessage> for RecentContact {
    fn from(c: ContactMessage) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            preview: preview_of(&c.message),
            message: c.message,
            created_at: c.created_at,
            status: c.status,
            ip_address: c.ip_address,
        }
    }
}

/// First [`PREVIEW_CHARS`] characters followed by `...`, or the whole message if it is short enough.
pub fn preview_of(message: &str) -> String {
    match message.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct DownloadLog {
    pub id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(serialize_with = "as_utc")]
    pub downloaded_at: NaiveDateTime,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct DailyDownloads {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AdminSessionRecord {
    pub session_id: String,
    pub user_id: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, FromRow)]
pub struct SiteStats {
    pub page_views: i64,
    pub unique_visitors: i64,
    pub total_contacts: i64,
    pub total_downloads: i64,
    #[serde(serialize_with = "as_utc_opt")]
    pub last_updated: Option<NaiveDateTime>,
}
