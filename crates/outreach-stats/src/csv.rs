//! CSV exports of the weekly table and the chart data.
//!
//! Rates are written with one decimal, exactly as the table shows them.

use outreach_types::api::{TypeStats, WeeklyStats};

use crate::chart::Metric;

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_rows(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|f| escape(f))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn rate(value: f64) -> String {
    format!("{:.1}", value)
}

fn type_rate(week: &WeeklyStats, kind: &outreach_types::MessageType) -> String {
    week.by_type
        .get(kind)
        .map_or_else(|| "0".to_string(), |t| rate(t.reply_rate))
}

/// Weekly table with one rate column per channel type.
pub fn export_weekly(weeks: &[WeeklyStats], types: &[TypeStats]) -> String {
    let mut header = vec![
        "Week".to_string(),
        "Total Messages".to_string(),
        "Replies".to_string(),
        "Global Rate (%)".to_string(),
    ];
    header.extend(types.iter().map(|t| format!("{} - Rate (%)", t.kind)));

    let mut rows = vec![header];
    rows.extend(weeks.iter().map(|week| {
        let mut row = vec![
            week.week.clone(),
            week.total.to_string(),
            week.replied.to_string(),
            rate(week.reply_rate),
        ];
        row.extend(types.iter().map(|t| type_rate(week, &t.kind)));
        row
    }));
    write_rows(&rows)
}

/// Chart data, one column per selected metric.
pub fn export_chart(weeks: &[WeeklyStats], metrics: &[Metric]) -> String {
    let mut header = vec!["Week".to_string()];
    header.extend(metrics.iter().map(Metric::label));

    let mut rows = vec![header];
    rows.extend(weeks.iter().map(|week| {
        let mut row = vec![week.week.clone()];
        row.extend(metrics.iter().map(|metric| match metric {
            Metric::ReplyRate => rate(week.reply_rate),
            Metric::Total => week.total.to_string(),
            Metric::Replied => week.replied.to_string(),
            Metric::Type(kind) => type_rate(week, kind),
        }));
        row
    }));
    write_rows(&rows)
}

/// Read an export back into rows of fields. Understands quoted fields.
pub fn parse_rows(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => quoted = false,
            ('"', false) if field.is_empty() => quoted = true,
            (',', false) => row.push(std::mem::take(&mut field)),
            ('\n', false) => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            ('\r', false) => {}
            (c, _) => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::by_type::aggregate_by_type;
    use crate::fixtures::{entry, sample};
    use crate::weekly::aggregate_weekly;
    use chrono::FixedOffset;
    use outreach_types::MessageType;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn weekly_export_layout() {
        let entries = sample();
        let weeks = aggregate_weekly(&entries, &utc());
        let types = aggregate_by_type(&entries);

        let csv = export_weekly(&weeks, &types);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Week,Total Messages,Replies,Global Rate (%),EMAIL_SENT - Rate (%),LINKEDIN_MESSAGE_SENT - Rate (%),LINKEDIN_INMAIL_SENT - Rate (%)"
        );
        assert_eq!(lines[1], "10/03 - 16/03,3,2,66.7,100.0,50.0,0");
        assert_eq!(lines[2], "03/03 - 09/03,4,2,50.0,50.0,100.0,0.0");
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn weekly_export_round_trips_table_values() {
        let entries = sample();
        let weeks = aggregate_weekly(&entries, &utc());
        let types = aggregate_by_type(&entries);

        let rows = parse_rows(&export_weekly(&weeks, &types));
        assert_eq!(rows.len(), weeks.len() + 1);
        for (row, week) in rows[1..].iter().zip(&weeks) {
            assert_eq!(row[0], week.week);
            assert_eq!(row[1].parse::<u64>().unwrap(), week.total);
            assert_eq!(row[2].parse::<u64>().unwrap(), week.replied);
            assert_eq!(row[3], format!("{:.1}", week.reply_rate));
            for (cell, t) in row[4..].iter().zip(&types) {
                let shown = week
                    .by_type
                    .get(&t.kind)
                    .map_or("0".to_string(), |s| format!("{:.1}", s.reply_rate));
                assert_eq!(*cell, shown);
            }
        }
    }

    #[test]
    fn chart_export_selected_metrics() {
        let weeks = aggregate_weekly(&sample(), &utc());
        let metrics = [
            Metric::Total,
            Metric::ReplyRate,
            Metric::Type(MessageType::EmailSent),
        ];
        let csv = export_chart(&weeks, &metrics);
        let rows = parse_rows(&csv);
        assert_eq!(
            rows[0],
            ["Week", "Messages Sent", "Reply Rate (%)", "EMAIL_SENT - Rate (%)"]
        );
        assert_eq!(rows[2], ["03/03 - 09/03", "4", "50.0", "50.0"]);
    }

    #[test]
    fn awkward_type_names_are_quoted() {
        let entries = vec![entry("1", "2025-03-03T09:00:00Z", "CALL, \"cold\"", Some(true))];
        let weeks = aggregate_weekly(&entries, &utc());
        let types = aggregate_by_type(&entries);

        let csv = export_weekly(&weeks, &types);
        assert!(csv.contains("\"CALL, \"\"cold\"\" - Rate (%)\""));

        let rows = parse_rows(&csv);
        assert_eq!(rows[0][4], "CALL, \"cold\" - Rate (%)");
        assert_eq!(rows[1][4], "100.0");
    }

    #[test]
    fn empty_export_is_header_only() {
        let csv = export_weekly(&[], &[]);
        assert_eq!(csv, "Week,Total Messages,Replies,Global Rate (%)");
        assert_eq!(parse_rows(&csv).len(), 1);
    }
}
