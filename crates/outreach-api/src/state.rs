use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};

use outreach_source::HistorySource;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub source: Arc<dyn HistorySource>,
    /// Offset used to decide which calendar day an instant falls on.
    pub offset: FixedOffset,
    /// When set, every route but `/api/health` wants `Authorization: Bearer <token>`.
    pub access_token: Option<String>,
}

impl AppStateInner {
    pub fn new(source: Arc<dyn HistorySource>, offset: FixedOffset) -> Self {
        Self {
            source,
            offset,
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}
