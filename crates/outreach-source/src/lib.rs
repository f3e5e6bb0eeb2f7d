pub mod auth;
pub mod cache;
pub mod error;
pub mod graphql;
pub mod memory;
pub mod models;
pub mod queries;

use std::sync::Arc;

use async_trait::async_trait;
use outreach_types::HistoryEntry;
use outreach_types::api::GlobalStats;

pub use cache::CachedSource;
pub use error::{Result, SourceError};
pub use graphql::{GraphqlSource, SourceConfig};
pub use memory::StaticSource;

/// Shared, immutable snapshot of the owner's history, newest first.
pub type History = Arc<Vec<HistoryEntry>>;

/// Read-only access to the outreach data API.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Every history entry of the configured owner, newest first.
    async fn fetch_history(&self) -> Result<History>;

    /// Pre-aggregated counts for the tracked channels.
    async fn fetch_global_stats(&self) -> Result<GlobalStats>;

    /// Forget anything held locally so the next fetch hits the API.
    async fn invalidate(&self) {}
}

#[async_trait]
impl<S: HistorySource + ?Sized> HistorySource for Arc<S> {
    async fn fetch_history(&self) -> Result<History> {
        (**self).fetch_history().await
    }

    async fn fetch_global_stats(&self) -> Result<GlobalStats> {
        (**self).fetch_global_stats().await
    }

    async fn invalidate(&self) {
        (**self).invalidate().await
    }
}
