//! SQL DDL for initializing the portfolio store.
//! Every statement is create-if-absent so the whole script can run on each startup.

/// SQLite schema with:
/// - `contacts`: inbound contact-form messages, `status` is `unread` or `read`
/// - `download_logs`: append-only resume download log
/// - `admin_sessions`: server-side admin sessions keyed by opaque token
/// - `site_stats`: singleton counter row, `id` pinned to 1
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    status TEXT NOT NULL DEFAULT 'unread',
    ip_address TEXT NULL,
    user_agent TEXT NULL
);

CREATE TABLE IF NOT EXISTS download_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ip_address TEXT NULL,
    user_agent TEXT NULL,
    downloaded_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    file_name TEXT NOT NULL DEFAULT 'resume.pdf'
);

CREATE TABLE IF NOT EXISTS admin_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    expires_at DATETIME NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS site_stats (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    page_views INTEGER NOT NULL DEFAULT 0,
    unique_visitors INTEGER NOT NULL DEFAULT 0,
    total_contacts INTEGER NOT NULL DEFAULT 0,
    total_downloads INTEGER NOT NULL DEFAULT 0,
    last_updated DATETIME DEFAULT CURRENT_TIMESTAMP
);

INSERT OR IGNORE INTO site_stats (id, page_views, unique_visitors, total_contacts, total_downloads)
VALUES (1, 0, 0, 0, 0);

CREATE INDEX IF NOT EXISTS idx_contacts_status ON contacts(status);
CREATE INDEX IF NOT EXISTS idx_contacts_created ON contacts(created_at);
CREATE INDEX IF NOT EXISTS idx_downloads_date ON download_logs(downloaded_at);
CREATE INDEX IF NOT EXISTS idx_sessions_active ON admin_sessions(is_active);
"#;

/// Individual statements of [`SQLITE_INIT`], in order, without blanks.
pub fn init_statements() -> impl Iterator<Item = &'static str> {
    SQLITE_INIT
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
