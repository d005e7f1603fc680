// Service exports
pub mod backend;
pub mod cache;
pub mod postgres;

pub use backend::{BackendClient, BackendError};
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats, CatalogSnapshot};
pub use postgres::{PostgresClient, PostgresError, SearchLogRecord};
