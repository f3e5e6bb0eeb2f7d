//! The filtered slice of history every dashboard endpoint starts from.

use chrono::FixedOffset;
use serde::Deserialize;

use outreach_stats::filter::{
    DateRange, WeekRange, filter_entries, filter_entries_by_label, filter_info, filter_weeks,
    filter_weeks_by_label, week_filter_info,
};
use outreach_stats::weekly::aggregate_weekly;
use outreach_types::HistoryEntry;
use outreach_types::api::{FilterInfo, WeekFilterInfo, WeeklyStats};

use crate::error::ApiError;

/// Query parameters shared by every filtered endpoint. Dates win over week
/// labels when both are given.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub start_week: Option<String>,
    pub end_week: Option<String>,
}

pub struct View {
    pub entries: Vec<HistoryEntry>,
    pub weeks: Vec<WeeklyStats>,
    pub filter: Option<FilterInfo>,
    pub week_filter: Option<WeekFilterInfo>,
}

impl View {
    pub fn build(
        history: &[HistoryEntry],
        query: &FilterQuery,
        offset: &FixedOffset,
    ) -> Result<Self, ApiError> {
        let all_weeks = aggregate_weekly(history, offset);

        let range = DateRange::parse(query.start.as_deref(), query.end.as_deref())?;
        if !range.is_empty() {
            let weeks = filter_weeks(&all_weeks, &range);
            return Ok(Self {
                entries: filter_entries(history, &range, offset),
                filter: filter_info(&range, weeks.len()),
                week_filter: None,
                weeks,
            });
        }

        let labels = WeekRange::new(query.start_week.clone(), query.end_week.clone());
        if labels.resolve(&all_weeks).is_some() {
            let weeks = filter_weeks_by_label(&all_weeks, &labels);
            return Ok(Self {
                entries: filter_entries_by_label(history, &all_weeks, &labels, offset),
                week_filter: week_filter_info(&labels, weeks.len()),
                filter: None,
                weeks,
            });
        }

        Ok(Self {
            entries: history.to_vec(),
            weeks: all_weeks,
            filter: None,
            week_filter: None,
        })
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_some() || self.week_filter.is_some()
    }
}
