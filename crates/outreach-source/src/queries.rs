/// Full history of one owner, newest first.
pub const GET_HISTORY_ENTRIES: &str = r#"
query GetHistoryEntries($userId: uuid!) {
  historyentries(
    where: { userId: { _eq: $userId } }
    order_by: { createdAt: desc }
  ) {
    id
    createdAt
    type
    isRead
    triggerHasBeenRepliedTo
    userId
  }
}
"#;

/// Aggregate count plus the two columns needed for per-channel reply rates.
/// Much lighter than the full history query.
pub const GET_GLOBAL_STATS: &str = r#"
query GetGlobalStats($userId: uuid!, $types: [String!]!) {
  stats_aggregate: historyentries_aggregate(
    where: { userId: { _eq: $userId }, type: { _in: $types } }
  ) {
    aggregate {
      count
    }
    nodes {
      type
      triggerHasBeenRepliedTo
    }
  }
}
"#;

pub const GET_HISTORY_ENTRIES_OP: &str = "GetHistoryEntries";
pub const GET_GLOBAL_STATS_OP: &str = "GetGlobalStats";
