pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use db::PortfolioStore;
pub use error::PortfolioError;
pub use service::session::SessionAuthority;
pub use service::stats::{StatsAggregator, StatsField};
