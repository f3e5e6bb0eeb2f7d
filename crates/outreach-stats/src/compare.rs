use std::str::FromStr;

use chrono::{Datelike, Days, FixedOffset, Months, NaiveDate};
use outreach_types::HistoryEntry;
use outreach_types::api::{Comparison, Direction, Evolution, PeriodBounds, PeriodStats};

use crate::error::{Result, StatsError};
use crate::filter::{DateRange, filter_entries};
use crate::reply_rate;

pub fn period_stats(entries: &[HistoryEntry]) -> PeriodStats {
    let total = entries.len() as u64;
    let replied = entries.iter().filter(|e| e.is_replied()).count() as u64;
    PeriodStats {
        total_messages: total,
        total_replies: replied,
        reply_rate: reply_rate(replied, total),
    }
}

fn render(value: f64, is_percentage: bool) -> String {
    if is_percentage {
        format!("{:.1}%", value)
    } else {
        format!("{}", value.round() as i64)
    }
}

/// How `current` moved relative to `reference`.
pub fn evolution(reference: f64, current: f64, is_percentage: bool) -> Evolution {
    if reference == 0.0 && current == 0.0 {
        return Evolution {
            direction: Direction::NoData,
            diff: 0.0,
            percent_change: None,
            text: "No data".into(),
        };
    }
    if reference == 0.0 {
        return Evolution {
            direction: Direction::Increase,
            diff: current,
            percent_change: None,
            text: format!("+{}", render(current, is_percentage)),
        };
    }

    let diff = current - reference;
    let percent = diff / reference * 100.0;
    let (direction, text) = if diff > 0.0 {
        (
            Direction::Increase,
            format!("+{} (+{:.1}%)", render(diff, is_percentage), percent),
        )
    } else if diff < 0.0 {
        (
            Direction::Decrease,
            format!("{} ({:.1}%)", render(diff, is_percentage), percent),
        )
    } else {
        (Direction::Stable, "Stable".to_string())
    };

    Evolution {
        direction,
        diff,
        percent_change: Some(percent),
        text,
    }
}

/// Compare a reference period against a second one. A period left
/// unbounded contributes no entries.
pub fn compare(
    entries: &[HistoryEntry],
    reference: &DateRange,
    current: &DateRange,
    offset: &FixedOffset,
) -> Comparison {
    let select = |range: &DateRange| -> (Option<PeriodBounds>, PeriodStats) {
        let Some((start, end)) = range.bounds() else {
            return (None, PeriodStats::default());
        };
        let selected = filter_entries(entries, range, offset);
        let bounds = PeriodBounds {
            start,
            end,
            message_count: selected.len(),
        };
        (Some(bounds), period_stats(&selected))
    };

    let (period1, stats1) = select(reference);
    let (period2, stats2) = select(current);

    Comparison {
        has_data: period1.is_some() && period2.is_some(),
        period1,
        period2,
        messages: evolution(
            stats1.total_messages as f64,
            stats2.total_messages as f64,
            false,
        ),
        replies: evolution(stats1.total_replies as f64, stats2.total_replies as f64, false),
        reply_rate: evolution(stats1.reply_rate, stats2.reply_rate, true),
        stats1,
        stats2,
    }
}

/// Preset period pairs offered by the comparison view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickPeriod {
    /// Last week vs this week.
    LastWeek,
    /// Last month vs month to date.
    LastMonth,
    /// Three-to-six months ago vs the last three months.
    LastQuarter,
}

impl FromStr for QuickPeriod {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last_week" | "lastWeek" => Ok(Self::LastWeek),
            "last_month" | "lastMonth" => Ok(Self::LastMonth),
            "last_quarter" | "last3Months" => Ok(Self::LastQuarter),
            other => Err(StatsError::UnknownPeriod(other.to_string())),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.day0() as u64)
}

fn months_back(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_sub_months(Months::new(months))
        .ok_or(StatsError::OutOfRange)
}

fn days_back(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or(StatsError::OutOfRange)
}

impl QuickPeriod {
    /// `(reference, current)` ranges relative to `today`.
    pub fn resolve(self, today: NaiveDate) -> Result<(DateRange, DateRange)> {
        let month_start = first_of_month(today);
        let (p1, p2) = match self {
            Self::LastWeek => (
                (days_back(today, 14)?, days_back(today, 8)?),
                (days_back(today, 7)?, today),
            ),
            Self::LastMonth => (
                (months_back(month_start, 1)?, days_back(month_start, 1)?),
                (month_start, today),
            ),
            Self::LastQuarter => {
                let quarter_start = months_back(month_start, 3)?;
                (
                    (months_back(month_start, 6)?, days_back(quarter_start, 1)?),
                    (quarter_start, today),
                )
            }
        };
        Ok((
            DateRange::new(Some(p1.0), Some(p1.1))?,
            DateRange::new(Some(p2.0), Some(p2.1))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{day, sample};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn evolution_cases() {
        let none = evolution(0.0, 0.0, false);
        assert_eq!(none.direction, Direction::NoData);
        assert_eq!(none.text, "No data");

        let fresh = evolution(0.0, 12.0, false);
        assert_eq!(fresh.direction, Direction::Increase);
        assert_eq!(fresh.text, "+12");
        assert_eq!(fresh.percent_change, None);

        let up = evolution(10.0, 15.0, false);
        assert_eq!(up.text, "+5 (+50.0%)");

        let down = evolution(40.0, 30.0, true);
        assert_eq!(down.direction, Direction::Decrease);
        assert_eq!(down.text, "-10.0% (-25.0%)");

        // An empty current period reads as a full drop with its percentage,
        // not as the bare reference value.
        let gone = evolution(8.0, 0.0, false);
        assert_eq!(gone.direction, Direction::Decrease);
        assert_eq!(gone.text, "-8 (-100.0%)");

        let flat = evolution(5.0, 5.0, false);
        assert_eq!(flat.direction, Direction::Stable);
        assert_eq!(flat.text, "Stable");
    }

    #[test]
    fn compares_two_weeks() {
        let entries = sample();
        let p1 = DateRange::new(Some(day("2025-03-03")), Some(day("2025-03-09"))).unwrap();
        let p2 = DateRange::new(Some(day("2025-03-10")), Some(day("2025-03-16"))).unwrap();

        let cmp = compare(&entries, &p1, &p2, &utc());
        assert!(cmp.has_data);
        assert_eq!(cmp.stats1.total_messages, 4);
        assert_eq!(cmp.stats2.total_messages, 3);
        assert_eq!(cmp.messages.direction, Direction::Decrease);
        assert_eq!(cmp.replies.direction, Direction::Stable);
        assert_eq!(cmp.reply_rate.direction, Direction::Increase);
        assert_eq!(cmp.period1.unwrap().message_count, 4);
    }

    #[test]
    fn missing_period_has_no_data() {
        let p1 = DateRange::new(Some(day("2025-03-03")), None).unwrap();
        let cmp = compare(&sample(), &p1, &DateRange::unbounded(), &utc());
        assert!(!cmp.has_data);
        assert!(cmp.period2.is_none());
        assert_eq!(cmp.stats2, PeriodStats::default());
    }

    #[test]
    fn quick_periods() {
        let today = day("2025-05-20");

        let (p1, p2) = QuickPeriod::LastWeek.resolve(today).unwrap();
        assert_eq!(p1.bounds(), Some((day("2025-05-06"), day("2025-05-12"))));
        assert_eq!(p2.bounds(), Some((day("2025-05-13"), today)));

        let (p1, p2) = QuickPeriod::LastMonth.resolve(today).unwrap();
        assert_eq!(p1.bounds(), Some((day("2025-04-01"), day("2025-04-30"))));
        assert_eq!(p2.bounds(), Some((day("2025-05-01"), today)));

        let (p1, p2) = QuickPeriod::LastQuarter.resolve(today).unwrap();
        assert_eq!(p1.bounds(), Some((day("2024-11-01"), day("2025-01-31"))));
        assert_eq!(p2.bounds(), Some((day("2025-02-01"), today)));
    }

    #[test]
    fn quick_period_names() {
        assert_eq!("last_week".parse::<QuickPeriod>().unwrap(), QuickPeriod::LastWeek);
        assert_eq!("last3Months".parse::<QuickPeriod>().unwrap(), QuickPeriod::LastQuarter);
        assert!("yesterday".parse::<QuickPeriod>().is_err());
    }
}
