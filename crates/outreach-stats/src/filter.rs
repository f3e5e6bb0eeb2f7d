use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use outreach_types::HistoryEntry;
use outreach_types::api::{FilterInfo, WeekFilterInfo, WeeklyStats};
use tracing::debug;

use crate::error::{Result, StatsError};

/// `DD/MM/YYYY`
pub fn format_day(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parse `YYYY-MM-DD`. Blank input means "no bound".
pub fn parse_day(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| StatsError::InvalidDate(s.to_string())),
    }
}

/// Midnight of `date` in `offset`, as a UTC instant. Saturates at the ends
/// of the representable range.
pub fn start_of_day(date: NaiveDate, offset: &FixedOffset) -> DateTime<Utc> {
    let shift = offset.local_minus_utc() as i64;
    date.and_time(NaiveTime::MIN)
        .checked_sub_signed(TimeDelta::seconds(shift))
        .map_or_else(|| saturate(shift > 0), |local| local.and_utc())
}

/// Last millisecond of `date` in `offset`.
pub fn end_of_day(date: NaiveDate, offset: &FixedOffset) -> DateTime<Utc> {
    date.checked_add_days(Days::new(1))
        .map(|next| start_of_day(next, offset))
        .and_then(|next| next.checked_sub_signed(TimeDelta::milliseconds(1)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn saturate(low: bool) -> DateTime<Utc> {
    if low {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    }
}

/// Dates whose day bounds exist under every offset (offsets stay under a day).
fn within_bounds(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(1))
        .and(date.checked_add_days(Days::new(2)))
        .map(|_| date)
        .ok_or(StatsError::OutOfRange)
}

/// Inclusive calendar-day range. Either bound may be missing; a lone bound
/// stands for both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        let start = start.map(within_bounds).transpose()?;
        let end = end.map(within_bounds).transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(StatsError::InvalidRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Self::new(parse_day(start)?, parse_day(end)?)
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Resolved `(first day, last day)`, `None` when unbounded.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (None, None) => None,
            (Some(s), None) => Some((s, s)),
            (None, Some(e)) => Some((e, e)),
            (Some(s), Some(e)) => Some((s, e)),
        }
    }

    /// Resolved bounds as instants: first day 00:00:00.000 through last day
    /// 23:59:59.999 in `offset`.
    pub fn instants(&self, offset: &FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.bounds()
            .map(|(s, e)| (start_of_day(s, offset), end_of_day(e, offset)))
    }

    pub fn contains(&self, ts: DateTime<Utc>, offset: &FixedOffset) -> bool {
        match self.instants(offset) {
            Some((from, to)) => ts >= from && ts <= to,
            None => true,
        }
    }
}

/// Weeks overlapping the range. An unbounded range keeps everything.
pub fn filter_weeks(weeks: &[WeeklyStats], range: &DateRange) -> Vec<WeeklyStats> {
    let Some((first, last)) = range.bounds() else {
        return weeks.to_vec();
    };
    weeks
        .iter()
        .filter(|w| w.week_start <= last && w.week_end >= first)
        .cloned()
        .collect()
}

/// Entries whose timestamp falls inside the range (inclusive).
pub fn filter_entries(
    entries: &[HistoryEntry],
    range: &DateRange,
    offset: &FixedOffset,
) -> Vec<HistoryEntry> {
    let Some((from, to)) = range.instants(offset) else {
        return entries.to_vec();
    };
    let kept: Vec<HistoryEntry> = entries
        .iter()
        .filter(|e| e.created_at >= from && e.created_at <= to)
        .cloned()
        .collect();
    debug!(kept = kept.len(), of = entries.len(), "filtered entries by date");
    kept
}

pub fn filter_info(range: &DateRange, total_weeks: usize) -> Option<FilterInfo> {
    let (start, end) = range.bounds()?;
    Some(FilterInfo {
        start_date: start,
        end_date: end,
        start_date_formatted: format_day(start),
        end_date_formatted: format_day(end),
        total_weeks,
        is_filtered: true,
        is_single_date: start == end,
    })
}

/// Range expressed with week labels (`DD/MM - DD/MM`) picked from the
/// aggregated weeks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekRange {
    pub start_week: Option<String>,
    pub end_week: Option<String>,
}

impl WeekRange {
    pub fn new(start_week: Option<String>, end_week: Option<String>) -> Self {
        let blank_to_none = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Self {
            start_week: blank_to_none(start_week),
            end_week: blank_to_none(end_week),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_week.is_none() && self.end_week.is_none()
    }

    fn labels(&self) -> Option<(&str, &str)> {
        let start = self.start_week.as_deref().or(self.end_week.as_deref())?;
        let end = self.end_week.as_deref().or(self.start_week.as_deref())?;
        Some((start, end))
    }

    /// First day of the start week through the last day of the end week.
    /// `None` when unbounded or when a label matches no known week.
    pub fn resolve(&self, weeks: &[WeeklyStats]) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = self.labels()?;
        let find = |label: &str| weeks.iter().find(|w| w.week == label);
        match (find(start), find(end)) {
            (Some(s), Some(e)) => Some((s.week_start, e.week_end)),
            _ => {
                debug!(start, end, "week label not found, leaving data unfiltered");
                None
            }
        }
    }
}

/// Weeks entirely inside the labelled span.
pub fn filter_weeks_by_label(weeks: &[WeeklyStats], range: &WeekRange) -> Vec<WeeklyStats> {
    let Some((first, last)) = range.resolve(weeks) else {
        return weeks.to_vec();
    };
    weeks
        .iter()
        .filter(|w| w.week_start >= first && w.week_end <= last)
        .cloned()
        .collect()
}

/// Entries inside the labelled span. The closing Sunday counts in full.
pub fn filter_entries_by_label(
    entries: &[HistoryEntry],
    weeks: &[WeeklyStats],
    range: &WeekRange,
    offset: &FixedOffset,
) -> Vec<HistoryEntry> {
    let Some((first, last)) = range.resolve(weeks) else {
        return entries.to_vec();
    };
    let (from, to) = (start_of_day(first, offset), end_of_day(last, offset));
    entries
        .iter()
        .filter(|e| e.created_at >= from && e.created_at <= to)
        .cloned()
        .collect()
}

pub fn week_filter_info(range: &WeekRange, total_weeks: usize) -> Option<WeekFilterInfo> {
    let (start, end) = range.labels()?;
    let start_number = start.split(" - ").next().unwrap_or(start).to_string();
    let end_number = end
        .split(" - ")
        .nth(1)
        .or_else(|| end.split(" - ").next())
        .unwrap_or(end)
        .to_string();

    Some(WeekFilterInfo {
        start_week: start.to_string(),
        end_week: end.to_string(),
        start_week_number: start_number,
        end_week_number: end_number,
        total_weeks,
        is_filtered: true,
        is_single_week: start == end,
    })
}
