use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::debug;

use outreach_stats::compare::{QuickPeriod, compare as compare_periods};
use outreach_stats::filter::DateRange;
use outreach_types::api::Comparison;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub p1_start: Option<String>,
    pub p1_end: Option<String>,
    pub p2_start: Option<String>,
    pub p2_end: Option<String>,
    /// Preset pair, overrides the explicit periods.
    pub quick: Option<String>,
}

impl CompareQuery {
    fn periods(&self, today: chrono::NaiveDate) -> Result<(DateRange, DateRange), ApiError> {
        if let Some(quick) = self.quick.as_deref().filter(|q| !q.is_empty()) {
            let period: QuickPeriod = quick.parse()?;
            return Ok(period.resolve(today)?);
        }
        Ok((
            DateRange::parse(self.p1_start.as_deref(), self.p1_end.as_deref())?,
            DateRange::parse(self.p2_start.as_deref(), self.p2_end.as_deref())?,
        ))
    }
}

pub async fn compare(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<Comparison>, ApiError> {
    let (reference, current) = query.periods(state.today())?;
    let history = state.source.fetch_history().await?;

    let comparison = compare_periods(&history, &reference, &current, &state.offset);
    debug!(
        has_data = comparison.has_data,
        before = comparison.stats1.total_messages,
        after = comparison.stats2.total_messages,
        "periods compared"
    );
    Ok(Json(comparison))
}
