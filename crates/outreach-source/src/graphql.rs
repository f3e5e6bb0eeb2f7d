use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use outreach_types::MessageType;
use outreach_types::api::GlobalStats;

use crate::auth::{Authenticator, NhostCredentials};
use crate::error::{Result, SourceError};
use crate::models::{
    GlobalStatsData, GlobalStatsVariables, GraphQlError, GraphQlRequest, GraphQlResponse,
    HistoryData, HistoryVariables,
};
use crate::queries;
use crate::{History, HistorySource};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub graphql_url: String,
    pub user_id: Uuid,
    pub admin_secret: Option<String>,
    pub nhost: Option<NhostCredentials>,
    pub timeout: Duration,
}

impl SourceConfig {
    pub fn new(graphql_url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            graphql_url: graphql_url.into(),
            user_id,
            admin_secret: None,
            nhost: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Reads history from the Hasura-style GraphQL endpoint.
pub struct GraphqlSource {
    client: Client,
    config: SourceConfig,
    auth: Option<Authenticator>,
}

impl GraphqlSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        if config.graphql_url.is_empty() {
            return Err(SourceError::Config("GraphQL URL is empty".into()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Config(format!("cannot build HTTP client: {e}")))?;
        let auth = config
            .nhost
            .clone()
            .map(|creds| Authenticator::new(client.clone(), creds));
        Ok(Self { client, config, auth })
    }

    /// Replace the sign-in endpoint, for self-hosted auth.
    pub fn with_authenticator(mut self, auth: Authenticator) -> Self {
        self.auth = Some(auth);
        self
    }

    async fn query<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T>
    where
        V: Serialize + Send + Sync,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest {
            query,
            operation_name: operation,
            variables,
        };

        // One fresh sign-in per query when the token is refused.
        let mut retry = self.auth.as_ref();
        loop {
            let res = self.send(&body).await?;
            if res.status() == StatusCode::UNAUTHORIZED {
                if let Some(auth) = retry.take() {
                    warn!("{operation}: access token rejected, signing in again");
                    auth.forget().await;
                    continue;
                }
            }

            let status = res.status();
            if !status.is_success() {
                let body = res.text().await.unwrap_or_default();
                return Err(SourceError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let envelope: GraphQlResponse<T> = res
                .json()
                .await
                .map_err(|e| SourceError::Decode(format!("{operation}: {e}")))?;

            if !envelope.errors.is_empty() {
                if envelope.errors.iter().any(GraphQlError::is_invalid_jwt) {
                    if let Some(auth) = retry.take() {
                        warn!("{operation}: access token expired, signing in again");
                        auth.forget().await;
                        continue;
                    }
                }
                let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
                return Err(SourceError::GraphQl(messages.join("; ")));
            }
            return envelope
                .data
                .ok_or_else(|| SourceError::Decode(format!("{operation}: response has no data")));
        }
    }

    async fn send<V: Serialize>(&self, body: &GraphQlRequest<'_, V>) -> Result<reqwest::Response> {
        let mut req = self.client.post(&self.config.graphql_url).json(body);
        if let Some(secret) = &self.config.admin_secret {
            req = req.header("x-hasura-admin-secret", secret);
        }
        if let Some(auth) = &self.auth {
            req = req.bearer_auth(auth.token().await?);
        }
        Ok(req.send().await?)
    }
}

#[async_trait]
impl HistorySource for GraphqlSource {
    async fn fetch_history(&self) -> Result<History> {
        let data: HistoryData = self
            .query(
                queries::GET_HISTORY_ENTRIES_OP,
                queries::GET_HISTORY_ENTRIES,
                HistoryVariables {
                    user_id: self.config.user_id,
                },
            )
            .await?;

        info!("fetched {} history entries", data.historyentries.len());
        Ok(Arc::new(data.historyentries))
    }

    async fn fetch_global_stats(&self) -> Result<GlobalStats> {
        let data: GlobalStatsData = self
            .query(
                queries::GET_GLOBAL_STATS_OP,
                queries::GET_GLOBAL_STATS,
                GlobalStatsVariables {
                    user_id: self.config.user_id,
                    types: MessageType::TRACKED.iter().map(|t| t.as_str().to_string()).collect(),
                },
            )
            .await?;

        let row = data.stats_aggregate;
        let total = row.aggregate.map_or(row.nodes.len() as u64, |a| a.count);
        debug!("global stats: {total} tracked messages");

        Ok(outreach_stats::global::global_stats(
            total,
            row.nodes
                .into_iter()
                .map(|n| (n.kind, n.replied.unwrap_or(false))),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const OWNER: &str = "32ca93da-0cf6-4608-91e7-bc6a2dbedcd1";

    fn config(url: String) -> SourceConfig {
        SourceConfig {
            admin_secret: Some("s3cret".into()),
            ..SourceConfig::new(url, OWNER.parse().unwrap())
        }
    }

    #[tokio::test]
    async fn fetches_history_with_admin_secret() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/graphql")
            .match_header("x-hasura-admin-secret", "s3cret")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "GetHistoryEntries",
                "variables": { "userId": OWNER }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": { "historyentries": [
                        {
                            "id": "b",
                            "createdAt": "2025-03-11T10:00:00+00:00",
                            "type": "EMAIL_SENT",
                            "isRead": true,
                            "triggerHasBeenRepliedTo": true,
                            "userId": OWNER
                        },
                        {
                            "id": "a",
                            "createdAt": "2025-03-04T08:30:00+00:00",
                            "type": "CALL_LOGGED",
                            "isRead": null,
                            "triggerHasBeenRepliedTo": null,
                            "userId": OWNER
                        }
                    ]}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let source = GraphqlSource::new(config(format!("{}/v1/graphql", server.url()))).unwrap();
        let history = source.fetch_history().await.unwrap();

        mock.assert_async().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, MessageType::EmailSent);
        assert!(history[0].is_replied());
        assert_eq!(history[1].kind, MessageType::Other("CALL_LOGGED".into()));
        assert!(!history[1].is_replied());
    }

    #[tokio::test]
    async fn global_stats_from_aggregate_query() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/graphql")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "GetGlobalStats",
                "variables": {
                    "types": ["EMAIL_SENT", "LINKEDIN_MESSAGE_SENT", "LINKEDIN_INMAIL_SENT"]
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": { "stats_aggregate": {
                        "aggregate": { "count": 4 },
                        "nodes": [
                            { "type": "EMAIL_SENT", "triggerHasBeenRepliedTo": true },
                            { "type": "EMAIL_SENT", "triggerHasBeenRepliedTo": false },
                            { "type": "LINKEDIN_MESSAGE_SENT", "triggerHasBeenRepliedTo": null },
                            { "type": "LINKEDIN_INMAIL_SENT", "triggerHasBeenRepliedTo": true }
                        ]
                    }}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let source = GraphqlSource::new(config(format!("{}/v1/graphql", server.url()))).unwrap();
        let stats = source.fetch_global_stats().await.unwrap();

        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.email.sent, 2);
        assert_eq!(stats.email.replied, 1);
        assert_eq!(stats.email.response_rate, 50.0);
        assert_eq!(stats.linkedin_message.replied, 0);
        assert_eq!(stats.linkedin_inmail.response_rate, 100.0);
    }

    #[tokio::test]
    async fn graphql_errors_become_source_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":[{"message":"field 'historyentries' not found"},{"message":"second"}]}"#)
            .create_async()
            .await;

        let source = GraphqlSource::new(config(format!("{}/v1/graphql", server.url()))).unwrap();
        match source.fetch_history().await {
            Err(SourceError::GraphQl(msg)) => {
                assert_eq!(msg, "field 'historyentries' not found; second")
            }
            other => panic!("expected GraphQL error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_failure_keeps_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/graphql")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let source = GraphqlSource::new(config(format!("{}/v1/graphql", server.url()))).unwrap();
        match source.fetch_history().await {
            Err(SourceError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bearer_token_from_sign_in() {
        let mut server = mockito::Server::new_async().await;
        let _signin = server
            .mock("POST", "/signin")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"session":{"accessToken":"jwt-abc"}}"#)
            .create_async()
            .await;
        let graphql = server
            .mock("POST", "/v1/graphql")
            .match_header("authorization", "Bearer jwt-abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"historyentries":[]}}"#)
            .create_async()
            .await;

        let creds = NhostCredentials {
            subdomain: "x".into(),
            region: "y".into(),
            email: "owner@example.com".into(),
            password: "pw".into(),
        };
        let auth = Authenticator::with_url(Client::new(), creds, format!("{}/signin", server.url()));
        let source = GraphqlSource::new(SourceConfig::new(
            format!("{}/v1/graphql", server.url()),
            OWNER.parse().unwrap(),
        ))
        .unwrap()
        .with_authenticator(auth);

        let history = source.fetch_history().await.unwrap();
        assert!(history.is_empty());
        graphql.assert_async().await;
    }

    fn nhost_source(server: &mockito::ServerGuard) -> GraphqlSource {
        let creds = NhostCredentials {
            subdomain: "x".into(),
            region: "y".into(),
            email: "owner@example.com".into(),
            password: "pw".into(),
        };
        let auth = Authenticator::with_url(Client::new(), creds, format!("{}/signin", server.url()));
        GraphqlSource::new(SourceConfig::new(
            format!("{}/v1/graphql", server.url()),
            OWNER.parse().unwrap(),
        ))
        .unwrap()
        .with_authenticator(auth)
    }

    const EXPIRED_JWT: &str = r#"{"errors":[{"message":"Could not verify JWT: JWTExpired","extensions":{"path":"$","code":"invalid-jwt"}}]}"#;

    #[tokio::test]
    async fn expired_jwt_error_signs_in_again() {
        let mut server = mockito::Server::new_async().await;
        let sign_ins = Arc::new(AtomicUsize::new(0));
        let counter = sign_ins.clone();
        let signin = server
            .mock("POST", "/signin")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |_| {
                let token = match counter.fetch_add(1, Ordering::SeqCst) {
                    0 => "jwt-old",
                    _ => "jwt-new",
                };
                json!({ "session": { "accessToken": token } }).to_string().into()
            })
            .expect(2)
            .create_async()
            .await;
        let stale = server
            .mock("POST", "/v1/graphql")
            .match_header("authorization", "Bearer jwt-old")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EXPIRED_JWT)
            .expect(1)
            .create_async()
            .await;
        let fresh = server
            .mock("POST", "/v1/graphql")
            .match_header("authorization", "Bearer jwt-new")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"historyentries":[]}}"#)
            .expect(2)
            .create_async()
            .await;

        let source = nhost_source(&server);
        assert!(source.fetch_history().await.unwrap().is_empty());
        assert!(source.fetch_history().await.unwrap().is_empty());

        signin.assert_async().await;
        stale.assert_async().await;
        fresh.assert_async().await;
        assert_eq!(sign_ins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_jwt_is_retried_only_once() {
        let mut server = mockito::Server::new_async().await;
        let signin = server
            .mock("POST", "/signin")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"session":{"accessToken":"jwt"}}"#)
            .expect(2)
            .create_async()
            .await;
        let graphql = server
            .mock("POST", "/v1/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EXPIRED_JWT)
            .expect(2)
            .create_async()
            .await;

        let source = nhost_source(&server);
        match source.fetch_history().await {
            Err(SourceError::GraphQl(msg)) => assert_eq!(msg, "Could not verify JWT: JWTExpired"),
            other => panic!("expected GraphQL error, got {other:?}"),
        }
        signin.assert_async().await;
        graphql.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_jwt_without_sign_in_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let graphql = server
            .mock("POST", "/v1/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EXPIRED_JWT)
            .expect(1)
            .create_async()
            .await;

        let source = GraphqlSource::new(config(format!("{}/v1/graphql", server.url()))).unwrap();
        assert!(matches!(source.fetch_history().await, Err(SourceError::GraphQl(_))));
        graphql.assert_async().await;
    }

    #[test]
    fn empty_url_is_a_config_error() {
        let cfg = SourceConfig::new("", OWNER.parse().unwrap());
        assert!(matches!(GraphqlSource::new(cfg), Err(SourceError::Config(_))));
    }
}
