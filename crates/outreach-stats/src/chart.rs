use std::str::FromStr;

use outreach_types::MessageType;
use outreach_types::api::{
    ChartPoint, ChartScales, ChartSeries, PerformanceBar, PerformanceOverview, TypeStats,
    WeeklyStats,
};

use crate::error::{Result, StatsError};
use crate::reply_rate;
use crate::summary::performance_level;

/// A line the weekly chart can draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    ReplyRate,
    Total,
    Replied,
    /// Reply rate of a single channel.
    Type(MessageType),
}

impl Metric {
    pub fn key(&self) -> &str {
        match self {
            Self::ReplyRate => "replyRate",
            Self::Total => "total",
            Self::Replied => "replied",
            Self::Type(kind) => kind.as_str(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::ReplyRate => "Reply Rate (%)".into(),
            Self::Total => "Messages Sent".into(),
            Self::Replied => "Replies Received".into(),
            Self::Type(kind) => format!("{} - Rate (%)", kind),
        }
    }

    pub fn value(&self, week: &WeeklyStats) -> f64 {
        match self {
            Self::ReplyRate => week.reply_rate,
            Self::Total => week.total as f64,
            Self::Replied => week.replied as f64,
            Self::Type(kind) => week.by_type.get(kind).map_or(0.0, |t| t.reply_rate),
        }
    }
}

impl FromStr for Metric {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(StatsError::InvalidMetric(s.to_string())),
            "replyRate" => Ok(Self::ReplyRate),
            "total" => Ok(Self::Total),
            "replied" => Ok(Self::Replied),
            tag => Ok(Self::Type(MessageType::from(tag))),
        }
    }
}

/// Comma-separated metric keys; defaults to the overall reply rate.
pub fn parse_metrics(raw: Option<&str>) -> Result<Vec<Metric>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(vec![Metric::ReplyRate]);
    };
    let mut metrics: Vec<Metric> = Vec::new();
    for part in raw.split(',') {
        let metric: Metric = part.parse()?;
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    Ok(metrics)
}

/// One series per metric, oldest week first.
pub fn weekly_series(weeks: &[WeeklyStats], metrics: &[Metric]) -> Vec<ChartSeries> {
    let mut ordered: Vec<&WeeklyStats> = weeks.iter().collect();
    ordered.sort_by_key(|w| w.week_start);

    metrics
        .iter()
        .map(|metric| ChartSeries {
            metric: metric.key().to_string(),
            label: metric.label(),
            points: ordered
                .iter()
                .map(|week| ChartPoint {
                    week: week.week.clone(),
                    week_start: week.week_start,
                    value: metric.value(week),
                })
                .collect(),
        })
        .collect()
}

pub fn scales(weeks: &[WeeklyStats]) -> ChartScales {
    ChartScales {
        max_reply_rate: weeks.iter().map(|w| w.reply_rate).fold(100.0, f64::max),
        max_total: weeks.iter().map(|w| w.total).max().unwrap_or(0).max(1),
        max_replied: weeks.iter().map(|w| w.replied).max().unwrap_or(0).max(1),
    }
}

/// Bar chart of channels, widths relative to the best reply rate.
pub fn performance(type_stats: &[TypeStats]) -> PerformanceOverview {
    let max_rate = type_stats.iter().map(|t| t.reply_rate).fold(1.0, f64::max);
    let total_messages: u64 = type_stats.iter().map(|t| t.total).sum();
    let total_replies: u64 = type_stats.iter().map(|t| t.replied).sum();

    PerformanceOverview {
        total_messages,
        total_replies,
        average_rate: reply_rate(total_replies, total_messages),
        max_rate,
        bars: type_stats
            .iter()
            .map(|t| PerformanceBar {
                kind: t.kind.clone(),
                name: t.name.clone(),
                total: t.total,
                replied: t.replied,
                reply_rate: t.reply_rate,
                width: t.reply_rate / max_rate * 100.0,
                level: performance_level(t.reply_rate),
                color: t.color.clone(),
            })
            .collect(),
    }
}
