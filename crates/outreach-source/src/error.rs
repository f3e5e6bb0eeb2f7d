use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request to data API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("data API answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;
