//! Database module: models, schema and queries for the portfolio store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: pool ownership and the raw execute/query primitives
//! - `contacts.rs`, `downloads.rs`, `sessions.rs`: typed queries per table

mod contacts;
mod downloads;
pub mod models;
pub mod schema;
mod sessions;
pub mod sqlite;

pub use downloads::RESUME_FILE;
pub use models::{
    AdminSessionRecord, ContactMessage, DailyDownloads, DownloadLog, MessageStatus, NewContact,
    RecentContact, SiteStats,
};
pub use sqlite::{ExecOutcome, HealthReport, PortfolioStore, SqlParam, SqlitePool};
