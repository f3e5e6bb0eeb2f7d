use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc};
use outreach_types::api::{RateStats, WeeklyStats};
use outreach_types::{HistoryEntry, MessageType};

use crate::reply_rate;

/// Monday of the calendar week `ts` falls in, as seen from `offset`.
pub fn week_start(ts: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    let local = ts.with_timezone(offset).date_naive();
    local - Days::new(local.weekday().num_days_from_monday() as u64)
}

/// Sunday closing the week that starts on `start`.
pub fn week_end(start: NaiveDate) -> NaiveDate {
    start + Days::new(6)
}

/// `DD/MM - DD/MM`
pub fn week_label(start: NaiveDate) -> String {
    format!(
        "{} - {}",
        start.format("%d/%m"),
        week_end(start).format("%d/%m")
    )
}

/// `YYYY-Www`, using the ISO week-numbering year.
pub fn iso_week_key(start: NaiveDate) -> String {
    let iso = start.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

#[derive(Default)]
struct WeekAccumulator {
    total: u64,
    replied: u64,
    by_type: BTreeMap<MessageType, (u64, u64)>,
}

impl WeekAccumulator {
    fn add(&mut self, entry: &HistoryEntry) {
        let replied = entry.is_replied() as u64;
        self.total += 1;
        self.replied += replied;

        let slot = self.by_type.entry(entry.kind.clone()).or_default();
        slot.0 += 1;
        slot.1 += replied;
    }

    fn into_stats(self, start: NaiveDate) -> WeeklyStats {
        let by_type = self
            .by_type
            .into_iter()
            .map(|(kind, (total, replied))| {
                let stats = RateStats {
                    total,
                    replied,
                    reply_rate: reply_rate(replied, total),
                };
                (kind, stats)
            })
            .collect();

        WeeklyStats {
            week: week_label(start),
            iso_week: iso_week_key(start),
            week_start: start,
            week_end: week_end(start),
            total: self.total,
            replied: self.replied,
            reply_rate: reply_rate(self.replied, self.total),
            by_type,
        }
    }
}

/// Group entries into Monday-based weeks with a per-type breakdown.
/// Most recent week first.
pub fn aggregate_weekly(entries: &[HistoryEntry], offset: &FixedOffset) -> Vec<WeeklyStats> {
    let mut weeks: HashMap<NaiveDate, WeekAccumulator> = HashMap::new();
    for entry in entries {
        weeks
            .entry(week_start(entry.created_at, offset))
            .or_default()
            .add(entry);
    }

    let mut stats: Vec<WeeklyStats> = weeks
        .into_iter()
        .map(|(start, acc)| acc.into_stats(start))
        .collect();
    stats.sort_by(|a, b| b.week_start.cmp(&a.week_start));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, day, entry, sample};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn sunday_belongs_to_previous_monday() {
        assert_eq!(week_start(at("2025-03-09T23:30:00Z"), &utc()), day("2025-03-03"));
        assert_eq!(week_start(at("2025-03-10T00:00:00Z"), &utc()), day("2025-03-10"));
        assert_eq!(week_start(at("2025-03-03T00:00:00Z"), &utc()), day("2025-03-03"));
    }

    #[test]
    fn offset_moves_late_sunday_into_next_week() {
        let paris = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(week_start(at("2025-03-09T23:30:00Z"), &paris), day("2025-03-10"));
    }

    #[test]
    fn labels_and_iso_keys() {
        assert_eq!(week_label(day("2025-03-03")), "03/03 - 09/03");
        assert_eq!(week_label(day("2024-12-30")), "30/12 - 05/01");
        assert_eq!(iso_week_key(day("2024-12-30")), "2025-W01");
        assert_eq!(iso_week_key(day("2025-03-03")), "2025-W10");
    }

    #[test]
    fn groups_by_week_most_recent_first() {
        let weeks = aggregate_weekly(&sample(), &utc());
        assert_eq!(weeks.len(), 2);

        let latest = &weeks[0];
        assert_eq!(latest.week_start, day("2025-03-10"));
        assert_eq!(latest.week_end, day("2025-03-16"));
        assert_eq!(latest.total, 3);
        assert_eq!(latest.replied, 2);

        let first = &weeks[1];
        assert_eq!(first.week, "03/03 - 09/03");
        assert_eq!(first.total, 4);
        assert_eq!(first.replied, 2);
        assert_eq!(first.reply_rate, 50.0);

        let email = &first.by_type[&MessageType::EmailSent];
        assert_eq!((email.total, email.replied, email.reply_rate), (2, 1, 50.0));
        let inmail = &first.by_type[&MessageType::LinkedinInmailSent];
        assert_eq!(inmail.reply_rate, 0.0);
    }

    #[test]
    fn per_type_totals_sum_to_week_total() {
        let mut entries = sample();
        entries.push(entry("8", "2025-03-11T08:00:00Z", "PHONE_CALL", Some(true)));

        for week in aggregate_weekly(&entries, &utc()) {
            let total: u64 = week.by_type.values().map(|t| t.total).sum();
            let replied: u64 = week.by_type.values().map(|t| t.replied).sum();
            assert_eq!(total, week.total);
            assert_eq!(replied, week.replied);
        }
    }

    #[test]
    fn empty_input_gives_no_weeks() {
        assert!(aggregate_weekly(&[], &utc()).is_empty());
    }
}
