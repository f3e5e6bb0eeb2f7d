use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

use outreach_stats::by_type::aggregate_by_type;
use outreach_stats::chart::parse_metrics;
use outreach_stats::csv::{export_chart, export_weekly};

use crate::error::ApiError;
use crate::stats::{ChartQuery, load_view};
use crate::state::AppState;
use crate::view::FilterQuery;

fn attachment(name: &str, body: String) -> impl IntoResponse + use<> {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        body,
    )
}

pub async fn weekly_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let view = load_view(&state, &query).await?;
    let types = aggregate_by_type(&view.entries);
    let name = format!("outreach-weekly-{}.csv", state.today());
    Ok(attachment(&name, export_weekly(&view.weeks, &types)))
}

pub async fn chart_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
    Query(chart): Query<ChartQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let metrics = parse_metrics(chart.metrics.as_deref())?;
    let view = load_view(&state, &query).await?;
    let name = format!("outreach-chart-{}.csv", state.today());
    Ok(attachment(&name, export_chart(&view.weeks, &metrics)))
}
