use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use outreach_types::HistoryEntry;
use outreach_types::api::GlobalStats;

use crate::error::{Result, SourceError};
use crate::{History, HistorySource};

/// In-memory history, for demos and tests.
pub struct StaticSource {
    entries: History,
    failure: Option<String>,
    history_fetches: AtomicUsize,
    global_fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new(mut entries: Vec<HistoryEntry>) -> Self {
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            entries: Arc::new(entries),
            failure: None,
            history_fetches: AtomicUsize::new(0),
            global_fetches: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(Vec::new())
        }
    }

    pub fn history_fetches(&self) -> usize {
        self.history_fetches.load(Ordering::Relaxed)
    }

    pub fn global_fetches(&self) -> usize {
        self.global_fetches.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(SourceError::GraphQl(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HistorySource for StaticSource {
    async fn fetch_history(&self) -> Result<History> {
        self.history_fetches.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        Ok(self.entries.clone())
    }

    async fn fetch_global_stats(&self) -> Result<GlobalStats> {
        self.global_fetches.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        let tracked: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.kind.is_tracked())
            .map(|e| (e.kind.clone(), e.is_replied()))
            .collect();
        Ok(outreach_stats::global::global_stats(tracked.len() as u64, tracked))
    }
}
