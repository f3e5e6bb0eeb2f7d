use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::{debug, warn};

use outreach_stats::chart::{parse_metrics, performance as performance_overview, scales, weekly_series};
use outreach_stats::global::select_type_stats;
use outreach_stats::paginate::{DEFAULT_PER_PAGE, paginate};
use outreach_stats::summary::{SummaryInput, summarize};
use outreach_types::HistoryEntry;
use outreach_types::api::{
    ChartResponse, GlobalStats, Page, PerformanceOverview, SummaryResponse, TypeStats,
    WeeklyResponse,
};

use crate::error::ApiError;
use crate::state::{AppState, AppStateInner};
use crate::view::{FilterQuery, View};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub metrics: Option<String>,
}

/// Pre-aggregated counts, or `None` when the view is filtered or the
/// aggregate query failed. Callers then derive everything from entries.
async fn fast_path(state: &AppStateInner, view: &View) -> Option<GlobalStats> {
    if view.is_filtered() {
        return None;
    }
    match state.source.fetch_global_stats().await {
        Ok(global) => Some(global),
        Err(e) => {
            warn!("global stats unavailable, falling back to entries: {e}");
            None
        }
    }
}

pub(crate) async fn load_view(state: &AppStateInner, query: &FilterQuery) -> Result<View, ApiError> {
    let history = state.source.fetch_history().await?;
    View::build(&history, query, &state.offset)
}

pub(crate) async fn type_stats(state: &AppStateInner, view: &View) -> Vec<TypeStats> {
    let global = fast_path(state, view).await;
    select_type_stats(view.is_filtered(), global.as_ref(), &view.entries)
}

pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let view = load_view(&state, &query).await?;
    let global = fast_path(&state, &view).await;
    let types = select_type_stats(view.is_filtered(), global.as_ref(), &view.entries);

    let summary = summarize(&SummaryInput {
        type_stats: &types,
        weeks: view.weeks.len(),
        entries: &view.entries,
        global: global.as_ref(),
        filter: view.filter.as_ref(),
        week_filter: view.week_filter.as_ref(),
    });
    debug!(source = ?summary.source, total = summary.total_messages, "summary computed");

    Ok(Json(SummaryResponse {
        summary,
        filter: view.filter,
        week_filter: view.week_filter,
    }))
}

pub async fn weekly(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<WeeklyResponse>, ApiError> {
    let view = load_view(&state, &query).await?;
    Ok(Json(WeeklyResponse {
        weeks: view.weeks,
        filter: view.filter,
        week_filter: view.week_filter,
    }))
}

pub async fn types(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<TypeStats>>, ApiError> {
    let view = load_view(&state, &query).await?;
    Ok(Json(type_stats(&state, &view).await))
}

pub async fn performance(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<PerformanceOverview>, ApiError> {
    let view = load_view(&state, &query).await?;
    let types = type_stats(&state, &view).await;
    Ok(Json(performance_overview(&types)))
}

pub async fn global(State(state): State<AppState>) -> Result<Json<GlobalStats>, ApiError> {
    Ok(Json(state.source.fetch_global_stats().await?))
}

pub async fn entries(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Page<HistoryEntry>>, ApiError> {
    let view = load_view(&state, &query).await?;
    Ok(Json(paginate(
        &view.entries,
        paging.page.unwrap_or(1),
        paging.per_page.unwrap_or(DEFAULT_PER_PAGE),
    )))
}

pub async fn chart(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
    Query(chart): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    let metrics = parse_metrics(chart.metrics.as_deref())?;
    let view = load_view(&state, &query).await?;
    Ok(Json(ChartResponse {
        series: weekly_series(&view.weeks, &metrics),
        scales: scales(&view.weeks),
        filter: view.filter,
        week_filter: view.week_filter,
    }))
}
