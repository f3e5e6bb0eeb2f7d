use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel tag attached to every history entry.
///
/// The three outreach channels the dashboard tracks get their own variant;
/// anything else the API returns is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    EmailSent,
    LinkedinMessageSent,
    LinkedinInmailSent,
    Other(String),
}

impl MessageType {
    /// The channels counted by the pre-aggregated global query.
    pub const TRACKED: [MessageType; 3] = [
        MessageType::EmailSent,
        MessageType::LinkedinMessageSent,
        MessageType::LinkedinInmailSent,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::EmailSent => "EMAIL_SENT",
            Self::LinkedinMessageSent => "LINKEDIN_MESSAGE_SENT",
            Self::LinkedinInmailSent => "LINKEDIN_INMAIL_SENT",
            Self::Other(tag) => tag,
        }
    }

    /// Human label used by summaries and charts.
    pub fn display_name(&self) -> String {
        match self {
            Self::EmailSent => "Email".into(),
            Self::LinkedinMessageSent => "LinkedIn message".into(),
            Self::LinkedinInmailSent => "LinkedIn InMail".into(),
            Self::Other(tag) => tag.clone(),
        }
    }

    pub fn is_tracked(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for MessageType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "EMAIL_SENT" => Self::EmailSent,
            "LINKEDIN_MESSAGE_SENT" => Self::LinkedinMessageSent,
            "LINKEDIN_INMAIL_SENT" => Self::LinkedinInmailSent,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for MessageType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<MessageType> for String {
    fn from(kind: MessageType) -> Self {
        match kind {
            MessageType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outreach event as returned by the data API.
/// Field names follow the API's camelCase columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub is_read: Option<bool>,
    #[serde(rename = "triggerHasBeenRepliedTo")]
    pub replied: Option<bool>,
    pub user_id: Uuid,
}

impl HistoryEntry {
    /// A missing reply flag counts as "not replied".
    pub fn is_replied(&self) -> bool {
        self.replied.unwrap_or(false)
    }
}
