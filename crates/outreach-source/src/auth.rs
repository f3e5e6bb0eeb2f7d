use std::time::Duration;

use reqwest::Client;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Result, SourceError};
use crate::models::{SignInRequest, SignInResponse};

/// Sign in again this long before the access token expires.
const RENEW_MARGIN: Duration = Duration::from_secs(60);

/// Credentials for the hosted auth service in front of the data API.
#[derive(Debug, Clone)]
pub struct NhostCredentials {
    pub subdomain: String,
    pub region: String,
    pub email: String,
    pub password: String,
}

impl NhostCredentials {
    pub fn signin_url(&self) -> String {
        format!(
            "https://{}.auth.{}.nhost.run/v1/signin/email-password",
            self.subdomain, self.region
        )
    }
}

struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn usable_at(&self, now: Instant) -> bool {
        self.expires_at
            .is_none_or(|expires_at| now + RENEW_MARGIN < expires_at)
    }
}

/// Email/password sign-in. The access token is reused until it nears its
/// advertised expiry or the data API rejects it.
pub struct Authenticator {
    client: Client,
    signin_url: String,
    credentials: NhostCredentials,
    token: RwLock<Option<CachedToken>>,
}

impl Authenticator {
    pub fn new(client: Client, credentials: NhostCredentials) -> Self {
        let signin_url = credentials.signin_url();
        Self::with_url(client, credentials, signin_url)
    }

    /// Sign in against an explicit endpoint instead of the hosted one.
    pub fn with_url(client: Client, credentials: NhostCredentials, signin_url: String) -> Self {
        Self {
            client,
            signin_url,
            credentials,
            token: RwLock::new(None),
        }
    }

    /// Cached access token, signing in first when there is none or it is
    /// about to expire.
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.usable_at(Instant::now()) {
                return Ok(token.value.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another task may have signed in while we waited for the lock.
        if let Some(token) = slot.as_ref() {
            if token.usable_at(Instant::now()) {
                return Ok(token.value.clone());
            }
            debug!("access token about to expire, renewing");
        }
        let token = self.sign_in().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    pub async fn forget(&self) {
        self.token.write().await.take();
    }

    async fn sign_in(&self) -> Result<CachedToken> {
        debug!("signing in as {}", self.credentials.email);

        let res = self
            .client
            .post(&self.signin_url)
            .json(&SignInRequest {
                email: &self.credentials.email,
                password: &self.credentials.password,
            })
            .send()
            .await?;

        let status = res.status();
        let body: SignInResponse = res
            .json()
            .await
            .map_err(|e| SourceError::Auth(format!("unreadable sign-in response: {e}")))?;

        if let Some(err) = body.error {
            warn!("sign-in rejected: {}", err.message);
            return Err(SourceError::Auth(err.message));
        }
        match body.session {
            Some(session) if status.is_success() => Ok(CachedToken {
                expires_at: session
                    .access_token_expires_in
                    .map(|secs| Instant::now() + Duration::from_secs(secs)),
                value: session.access_token,
            }),
            _ => Err(SourceError::Auth(format!("sign-in returned {status} without a session"))),
        }
    }
}
