use crate::db::{PortfolioStore, SiteStats};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// The counters kept on the `site_stats` singleton row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsField {
    PageViews,
    UniqueVisitors,
    TotalContacts,
    TotalDownloads,
}

impl StatsField {
    pub const ALL: [StatsField; 4] = [
        StatsField::PageViews,
        StatsField::UniqueVisitors,
        StatsField::TotalContacts,
        StatsField::TotalDownloads,
    ];

    pub fn column(self) -> &'static str {
        match self {
            StatsField::PageViews => "page_views",
            StatsField::UniqueVisitors => "unique_visitors",
            StatsField::TotalContacts => "total_contacts",
            StatsField::TotalDownloads => "total_downloads",
        }
    }

    fn increment_sql(self) -> &'static str {
        match self {
            StatsField::PageViews => {
                "UPDATE site_stats SET page_views = page_views + ?, last_updated = datetime('now') WHERE id = 1"
            }
            StatsField::UniqueVisitors => {
                "UPDATE site_stats SET unique_visitors = unique_visitors + ?, last_updated = datetime('now') WHERE id = 1"
            }
            StatsField::TotalContacts => {
                "UPDATE site_stats SET total_contacts = total_contacts + ?, last_updated = datetime('now') WHERE id = 1"
            }
            StatsField::TotalDownloads => {
                "UPDATE site_stats SET total_downloads = total_downloads + ?, last_updated = datetime('now') WHERE id = 1"
            }
        }
    }
}

impl fmt::Display for StatsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown stats field `{0}`")]
pub struct UnknownStatsField(String);

impl FromStr for StatsField {
    type Err = UnknownStatsField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatsField::ALL
            .into_iter()
            .find(|f| f.column() == s)
            .ok_or_else(|| UnknownStatsField(s.to_string()))
    }
}

/// Best-effort counters over the `site_stats` singleton.
#[derive(Clone)]
pub struct StatsAggregator {
    store: PortfolioStore,
}

impl StatsAggregator {
    pub fn new(store: PortfolioStore) -> Self {
        Self { store }
    }

    /// Add `amount` to `field`. Failures are logged and dropped.
    pub async fn increment(&self, field: StatsField, amount: u32) {
        match self
            .store
            .execute(field.increment_sql(), &[i64::from(amount).into()])
            .await
        {
            Ok(out) if out.rows_affected == 0 => {
                warn!(%field, "site_stats singleton row missing; increment dropped");
            }
            Ok(_) => debug!(%field, amount, "stats incremented"),
            Err(e) => warn!(%field, error = %e, "stats increment failed"),
        }
    }

    /// Current counters, or all zeros if they cannot be read.
    pub async fn read(&self) -> SiteStats {
        let row = self
            .store
            .query_one(
                r#"SELECT page_views, unique_visitors, total_contacts, total_downloads, last_updated
                   FROM site_stats WHERE id = 1"#,
                &[],
            )
            .await;

        match row {
            Ok(Some(row)) => SiteStats::from_row(&row).unwrap_or_else(|e| {
                warn!(error = %e, "site_stats row undecodable; using defaults");
                SiteStats::default()
            }),
            Ok(None) => SiteStats::default(),
            Err(e) => {
                warn!(error = %e, "site_stats read failed; using defaults");
                SiteStats::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_fields_parse() {
        for field in StatsField::ALL {
            assert_eq!(field.column().parse::<StatsField>().ok(), Some(field));
        }
        assert!("page_views = 0; DROP TABLE contacts".parse::<StatsField>().is_err());
        assert!("PAGE_VIEWS".parse::<StatsField>().is_err());
        assert!("id".parse::<StatsField>().is_err());
    }

    #[test]
    fn each_field_updates_only_its_own_column() {
        for field in StatsField::ALL {
            let sql = field.increment_sql();
            let col = field.column();
            assert!(sql.contains(&format!("SET {col} = {col} + ?")));
            for other in StatsField::ALL.into_iter().filter(|f| *f != field) {
                assert!(!sql.contains(other.column()));
            }
        }
    }

    #[tokio::test]
    async fn read_falls_back_to_zero_without_schema() {
        let store = PortfolioStore::open("sqlite::memory:").await.unwrap();
        let stats = StatsAggregator::new(store.clone());

        // no tables yet: both paths must swallow the failure
        stats.increment(StatsField::PageViews, 1).await;
        assert_eq!(stats.read().await, SiteStats::default());

        store.init_schema().await.unwrap();
        stats.increment(StatsField::PageViews, 3).await;
        let current = stats.read().await;
        assert_eq!(current.page_views, 3);
        assert!(current.last_updated.is_some());
    }
}
