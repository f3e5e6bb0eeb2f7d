use std::collections::HashMap;

use outreach_types::api::TypeStats;
use outreach_types::{HistoryEntry, MessageType};

use crate::reply_rate;

/// Colors handed out to channel types in first-seen order.
pub const PALETTE: [&str; 7] = [
    "#007bff", "#28a745", "#dc3545", "#ffc107", "#6f42c1", "#fd7e14", "#20c997",
];

/// Per-channel totals, best reply rate first.
pub fn aggregate_by_type(entries: &[HistoryEntry]) -> Vec<TypeStats> {
    let mut order: Vec<MessageType> = Vec::new();
    let mut counts: HashMap<MessageType, (u64, u64)> = HashMap::new();

    for entry in entries {
        let slot = counts.entry(entry.kind.clone()).or_insert_with(|| {
            order.push(entry.kind.clone());
            (0, 0)
        });
        slot.0 += 1;
        slot.1 += entry.is_replied() as u64;
    }

    let mut stats: Vec<TypeStats> = order
        .into_iter()
        .enumerate()
        .map(|(index, kind)| {
            let (total, replied) = counts.get(&kind).copied().unwrap_or_default();
            TypeStats {
                name: kind.display_name(),
                kind,
                total,
                replied,
                reply_rate: reply_rate(replied, total),
                color: PALETTE[index % PALETTE.len()].to_string(),
            }
        })
        .collect();

    sort_by_rate(&mut stats);
    stats
}

/// Descending reply rate; ties keep their relative order.
pub fn sort_by_rate(stats: &mut [TypeStats]) {
    stats.sort_by(|a, b| b.reply_rate.total_cmp(&a.reply_rate));
}
