use outreach_types::HistoryEntry;
use outreach_types::api::{
    FilterInfo, GlobalStats, GlobalSummary, PerformanceLevel, SummarySource, Trend, TypeStats,
    WeekFilterInfo, WeeksAnalyzed,
};

use crate::global::total_replies;
use crate::reply_rate;

/// Everything the summary view is computed from.
pub struct SummaryInput<'a> {
    /// Type stats already ordered best rate first.
    pub type_stats: &'a [TypeStats],
    /// Weeks remaining after filtering.
    pub weeks: usize,
    /// Entries remaining after filtering.
    pub entries: &'a [HistoryEntry],
    pub global: Option<&'a GlobalStats>,
    pub filter: Option<&'a FilterInfo>,
    pub week_filter: Option<&'a WeekFilterInfo>,
}

impl SummaryInput<'_> {
    fn is_filtered(&self) -> bool {
        self.filter.is_some_and(|f| f.is_filtered) || self.week_filter.is_some_and(|f| f.is_filtered)
    }
}

pub fn trend(rate: f64) -> Trend {
    if rate >= 50.0 {
        Trend::Positive
    } else if rate >= 30.0 {
        Trend::Neutral
    } else {
        Trend::Negative
    }
}

pub fn performance_level(rate: f64) -> PerformanceLevel {
    match rate {
        r if r >= 70.0 => PerformanceLevel::Excellent,
        r if r >= 50.0 => PerformanceLevel::VeryGood,
        r if r >= 30.0 => PerformanceLevel::Good,
        r if r >= 15.0 => PerformanceLevel::Average,
        _ => PerformanceLevel::Weak,
    }
}

pub fn title(filter: Option<&FilterInfo>, week_filter: Option<&WeekFilterInfo>) -> String {
    if let Some(f) = filter.filter(|f| f.is_filtered) {
        if f.is_single_date {
            return format!("Summary for {}", f.start_date_formatted);
        }
        return format!(
            "Summary from {} to {}",
            f.start_date_formatted, f.end_date_formatted
        );
    }
    if let Some(w) = week_filter.filter(|w| w.is_filtered) {
        if w.is_single_week {
            return format!("Summary week {}", w.start_week_number);
        }
        return format!(
            "Summary weeks {} - {}",
            w.start_week_number, w.end_week_number
        );
    }
    "Global summary".to_string()
}

pub fn summarize(input: &SummaryInput<'_>) -> GlobalSummary {
    let fast_path = if input.is_filtered() { None } else { input.global };

    let (total_messages, total_replies, source) = match fast_path {
        Some(global) => (global.total_messages, total_replies(global), SummarySource::Global),
        None => {
            let replied = input.entries.iter().filter(|e| e.is_replied()).count() as u64;
            (input.entries.len() as u64, replied, SummarySource::Entries)
        }
    };
    let rate = reply_rate(total_replies, total_messages);

    let (best_method, best_method_rate) = input
        .type_stats
        .first()
        .map(|t| (t.kind.to_string(), t.reply_rate))
        .unwrap_or_else(|| ("N/A".to_string(), 0.0));
    let (worst_method, worst_method_rate) = input
        .type_stats
        .last()
        .map(|t| (t.kind.to_string(), t.reply_rate))
        .unwrap_or_else(|| ("N/A".to_string(), 0.0));

    GlobalSummary {
        title: title(input.filter, input.week_filter),
        total_messages,
        total_replies,
        reply_rate: rate,
        best_method,
        best_method_rate,
        worst_method,
        worst_method_rate,
        weeks_analyzed: match source {
            SummarySource::Global => WeeksAnalyzed::All,
            SummarySource::Entries => WeeksAnalyzed::Count(input.weeks),
        },
        trend: trend(rate),
        source,
    }
}
