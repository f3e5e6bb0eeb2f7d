use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;
use uuid::Uuid;

use outreach_source::SourceConfig;
use outreach_source::auth::NhostCredentials;

const NHOST_VARS: [&str; 4] = [
    "OUTREACH_NHOST_SUBDOMAIN",
    "OUTREACH_NHOST_REGION",
    "OUTREACH_NHOST_EMAIL",
    "OUTREACH_NHOST_PASSWORD",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("Nhost sign-in needs all of {}; missing {}", NHOST_VARS.join(", "), .0.join(", "))]
    PartialNhost(Vec<&'static str>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub graphql_url: String,
    pub admin_secret: Option<String>,
    pub user_id: Uuid,
    pub nhost: Option<NhostCredentials>,
    pub cache_ttl: Duration,
    pub utc_offset: FixedOffset,
    pub static_dir: Option<PathBuf>,
    pub access_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let graphql_url = get("OUTREACH_GRAPHQL_URL");
        let user_id = get("OUTREACH_USER_ID");
        let missing: Vec<&'static str> = [
            ("OUTREACH_GRAPHQL_URL", graphql_url.is_none()),
            ("OUTREACH_USER_ID", user_id.is_none()),
        ]
        .into_iter()
        .filter_map(|(var, absent)| absent.then_some(var))
        .collect();
        let (Some(graphql_url), Some(user_id)) = (graphql_url, user_id) else {
            return Err(ConfigError::Missing(missing));
        };

        let user_id = user_id.trim().parse::<Uuid>().map_err(|_| ConfigError::Invalid {
            var: "OUTREACH_USER_ID",
            value: user_id.clone(),
        })?;

        let nhost_values = NHOST_VARS.map(|var| get(var));
        let nhost = match &nhost_values {
            [Some(subdomain), Some(region), Some(email), Some(password)] => Some(NhostCredentials {
                subdomain: subdomain.clone(),
                region: region.clone(),
                email: email.clone(),
                password: password.clone(),
            }),
            values if values.iter().all(Option::is_none) => None,
            values => {
                let absent = NHOST_VARS
                    .iter()
                    .zip(values)
                    .filter(|(_, v)| v.is_none())
                    .map(|(var, _)| *var)
                    .collect();
                return Err(ConfigError::PartialNhost(absent));
            }
        };

        Ok(Self {
            host: get("OUTREACH_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or("OUTREACH_PORT", get("OUTREACH_PORT"), 3000)?,
            graphql_url,
            admin_secret: get("OUTREACH_ADMIN_SECRET"),
            user_id,
            nhost,
            cache_ttl: Duration::from_secs(parse_or(
                "OUTREACH_CACHE_TTL_SECS",
                get("OUTREACH_CACHE_TTL_SECS"),
                300,
            )?),
            utc_offset: utc_offset(get("OUTREACH_UTC_OFFSET_MINUTES"))?,
            static_dir: get("OUTREACH_STATIC_DIR").map(PathBuf::from),
            access_token: get("OUTREACH_ACCESS_TOKEN"),
        })
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            admin_secret: self.admin_secret.clone(),
            nhost: self.nhost.clone(),
            ..SourceConfig::new(self.graphql_url.clone(), self.user_id)
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn utc_offset(raw: Option<String>) -> Result<FixedOffset, ConfigError> {
    const VAR: &str = "OUTREACH_UTC_OFFSET_MINUTES";
    let minutes: i32 = parse_or(VAR, raw.clone(), 0)?;
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ConfigError::Invalid {
            var: VAR,
            value: raw.unwrap_or_default(),
        })
}
