use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::models::MessageType;

// -- Weekly --

/// Count/reply pair with its derived rate, used for per-type breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateStats {
    pub total: u64,
    pub replied: u64,
    pub reply_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    /// Display label, `DD/MM - DD/MM`.
    pub week: String,
    /// ISO-8601 week, `YYYY-Www`.
    pub iso_week: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total: u64,
    pub replied: u64,
    pub reply_rate: f64,
    pub by_type: BTreeMap<MessageType, RateStats>,
}

// -- Types --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub name: String,
    pub total: u64,
    pub replied: u64,
    pub reply_rate: f64,
    pub color: String,
}

// -- Global (pre-aggregated) --

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub sent: u64,
    pub replied: u64,
    /// Percentage rounded to one decimal.
    pub response_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_messages: u64,
    pub email: ChannelStats,
    pub linkedin_message: ChannelStats,
    pub linkedin_inmail: ChannelStats,
}

// -- Filters --

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterInfo {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_date_formatted: String,
    pub end_date_formatted: String,
    pub total_weeks: usize,
    pub is_filtered: bool,
    pub is_single_date: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekFilterInfo {
    pub start_week: String,
    pub end_week: String,
    pub start_week_number: String,
    pub end_week_number: String,
    pub total_weeks: usize,
    pub is_filtered: bool,
    pub is_single_week: bool,
}

// -- Summary --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Excellent,
    VeryGood,
    Good,
    Average,
    Weak,
}

/// Where summary totals came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// Pre-aggregated counts, no entry scan.
    Global,
    /// Computed from the (filtered) entry list.
    Entries,
}

/// Serialized as the string `"all"` or a week count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeeksAnalyzed {
    All,
    Count(usize),
}

impl Serialize for WeeksAnalyzed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Count(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    pub title: String,
    pub total_messages: u64,
    pub total_replies: u64,
    pub reply_rate: f64,
    pub best_method: String,
    pub best_method_rate: f64,
    pub worst_method: String,
    pub worst_method_rate: f64,
    pub weeks_analyzed: WeeksAnalyzed,
    pub trend: Trend,
    pub source: SummarySource,
}

// -- Comparison --

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub total_messages: u64,
    pub total_replies: u64,
    pub reply_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    NoData,
    Increase,
    Decrease,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evolution {
    pub direction: Direction,
    pub diff: f64,
    /// Relative change against the reference period, `None` when the
    /// reference value is zero.
    pub percent_change: Option<f64>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub message_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub period1: Option<PeriodBounds>,
    pub period2: Option<PeriodBounds>,
    pub stats1: PeriodStats,
    pub stats2: PeriodStats,
    pub messages: Evolution,
    pub replies: Evolution,
    pub reply_rate: Evolution,
    /// Both periods were given.
    pub has_data: bool,
}

// -- Pagination --

/// One slot of the pagination bar: a page number or a `"..."` gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Page(n) => serializer.serialize_u64(*n as u64),
            Self::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub window: Vec<PageItem>,
}

// -- Chart --

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub metric: String,
    pub label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub week: String,
    pub week_start: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartScales {
    pub max_reply_rate: f64,
    pub max_total: u64,
    pub max_replied: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceBar {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub name: String,
    pub total: u64,
    pub replied: u64,
    pub reply_rate: f64,
    /// Bar length relative to the best channel, 0..=100.
    pub width: f64,
    pub level: PerformanceLevel,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceOverview {
    pub total_messages: u64,
    pub total_replies: u64,
    pub average_rate: f64,
    pub max_rate: f64,
    pub bars: Vec<PerformanceBar>,
}

// -- Endpoint envelopes --

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: GlobalSummary,
    pub filter: Option<FilterInfo>,
    pub week_filter: Option<WeekFilterInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyResponse {
    pub weeks: Vec<WeeklyStats>,
    pub filter: Option<FilterInfo>,
    pub week_filter: Option<WeekFilterInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub series: Vec<ChartSeries>,
    pub scales: ChartScales,
    pub filter: Option<FilterInfo>,
    pub week_filter: Option<WeekFilterInfo>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
