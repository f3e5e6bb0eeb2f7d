use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use outreach_source::SourceError;
use outreach_stats::StatsError;
use outreach_types::api::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("could not load outreach data: {0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Stats(#[from] StatsError),

    #[error("missing or invalid access token")]
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Source(_) => StatusCode::BAD_GATEWAY,
            Self::Stats(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Source(e) => error!("data source failed: {e}"),
            Self::Stats(e) => warn!("rejected request: {e}"),
            Self::Unauthorized => {}
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
