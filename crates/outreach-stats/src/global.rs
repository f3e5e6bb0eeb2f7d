use outreach_types::api::{ChannelStats, GlobalStats, TypeStats};
use outreach_types::{HistoryEntry, MessageType};

use crate::by_type::{aggregate_by_type, sort_by_rate};
use crate::{reply_rate, round_one};

pub const EMAIL_COLOR: &str = "#3b82f6";
pub const LINKEDIN_MESSAGE_COLOR: &str = "#0ea5e9";
pub const LINKEDIN_INMAIL_COLOR: &str = "#06b6d4";

fn channel(sent: u64, replied: u64) -> ChannelStats {
    ChannelStats {
        sent,
        replied,
        response_rate: round_one(reply_rate(replied, sent)),
    }
}

/// Build the fast-path stats from the aggregate query.
///
/// `total` is the aggregate count reported by the API; `nodes` are the
/// `(type, replied)` pairs it returned. Tags outside the tracked three are
/// not counted per channel.
pub fn global_stats<I>(total: u64, nodes: I) -> GlobalStats
where
    I: IntoIterator<Item = (MessageType, bool)>,
{
    let mut counts = [(0u64, 0u64); 3];
    for (kind, replied) in nodes {
        let slot = match kind {
            MessageType::EmailSent => &mut counts[0],
            MessageType::LinkedinMessageSent => &mut counts[1],
            MessageType::LinkedinInmailSent => &mut counts[2],
            MessageType::Other(_) => continue,
        };
        slot.0 += 1;
        slot.1 += replied as u64;
    }

    GlobalStats {
        total_messages: total,
        email: channel(counts[0].0, counts[0].1),
        linkedin_message: channel(counts[1].0, counts[1].1),
        linkedin_inmail: channel(counts[2].0, counts[2].1),
    }
}

pub fn total_replies(global: &GlobalStats) -> u64 {
    global.email.replied + global.linkedin_message.replied + global.linkedin_inmail.replied
}

/// Type stats straight from the pre-aggregated counts, best rate first.
pub fn optimized_type_stats(global: &GlobalStats) -> Vec<TypeStats> {
    let rows = [
        (MessageType::EmailSent, &global.email, EMAIL_COLOR),
        (MessageType::LinkedinMessageSent, &global.linkedin_message, LINKEDIN_MESSAGE_COLOR),
        (MessageType::LinkedinInmailSent, &global.linkedin_inmail, LINKEDIN_INMAIL_COLOR),
    ];

    let mut stats: Vec<TypeStats> = rows
        .into_iter()
        .map(|(kind, channel, color)| TypeStats {
            name: kind.display_name(),
            kind,
            total: channel.sent,
            replied: channel.replied,
            reply_rate: channel.response_rate,
            color: color.to_string(),
        })
        .collect();
    sort_by_rate(&mut stats);
    stats
}

/// Fast path when nothing is filtered and the aggregate query answered;
/// otherwise derive from the (already filtered) entries.
pub fn select_type_stats(
    is_filtered: bool,
    global: Option<&GlobalStats>,
    entries: &[HistoryEntry],
) -> Vec<TypeStats> {
    match global {
        Some(global) if !is_filtered => optimized_type_stats(global),
        _ => aggregate_by_type(entries),
    }
}
