//! Wire types for the GraphQL and sign-in endpoints. API quirks such as
//! nullable aggregates and query aliases stay in this crate.

use serde::{Deserialize, Serialize};

use outreach_types::{HistoryEntry, MessageType};

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(rename = "operationName")]
    pub operation_name: &'a str,
    pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

impl GraphQlError {
    /// Hasura answers an expired or forged JWT with HTTP 200 and this code.
    pub fn is_invalid_jwt(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.code.as_deref())
            == Some("invalid-jwt")
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorExtensions {
    pub code: Option<String>,
}

// -- GetHistoryEntries --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryVariables {
    pub user_id: uuid::Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HistoryData {
    pub historyentries: Vec<HistoryEntry>,
}

// -- GetGlobalStats --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatsVariables {
    pub user_id: uuid::Uuid,
    pub types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GlobalStatsData {
    pub stats_aggregate: AggregateRow,
}

#[derive(Debug, Deserialize)]
pub struct AggregateRow {
    pub aggregate: Option<AggregateCount>,
    #[serde(default)]
    pub nodes: Vec<CountNode>,
}

#[derive(Debug, Deserialize)]
pub struct AggregateCount {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct CountNode {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(rename = "triggerHasBeenRepliedTo")]
    pub replied: Option<bool>,
}

// -- Nhost sign-in --

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub session: Option<SignInSession>,
    pub error: Option<SignInError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInSession {
    pub access_token: String,
    /// Lifetime of the access token in seconds.
    pub access_token_expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SignInError {
    pub message: String,
}
