// HTTP request handlers
use crate::domain::window::{LookbackWindow, WindowError};
use crate::presentation::app_state::AppState;
use crate::presentation::views::{EnvironmentView, ErrorView, MotionView, SeriesView};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub minutes: Option<u32>,
}

/// A malformed query string is answered like any other bad window
type RangeParams = Result<Query<RangeQuery>, QueryRejection>;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Temperature, humidity and UV charts with advisories
pub async fn environment(
    query: RangeParams,
    State(state): State<Arc<AppState>>,
) -> Response {
    let window = match resolve_window(&state, query) {
        Ok(window) => window,
        Err(response) => return response,
    };

    let page = state.dashboard_service.environment(window).await;
    Json(EnvironmentView::from(page)).into_response()
}

/// Accelerometer and gyroscope magnitude charts
pub async fn motion(
    query: RangeParams,
    State(state): State<Arc<AppState>>,
) -> Response {
    let window = match resolve_window(&state, query) {
        Ok(window) => window,
        Err(response) => return response,
    };

    let page = state.dashboard_service.motion(window).await;
    Json(MotionView::from(page)).into_response()
}

/// One field of one measurement
pub async fn single_series(
    Path((measurement, field)): Path<(String, String)>,
    query: RangeParams,
    State(state): State<Arc<AppState>>,
) -> Response {
    let window = match resolve_window(&state, query) {
        Ok(window) => window,
        Err(response) => return response,
    };

    let (panel, errors) = state
        .dashboard_service
        .single_series(&measurement, &field, window)
        .await;

    Json(SeriesView {
        measurement,
        window_minutes: window.minutes(),
        series: panel.into(),
        errors,
    })
    .into_response()
}

fn resolve_window(state: &AppState, query: RangeParams) -> Result<LookbackWindow, Response> {
    let minutes = match query {
        Ok(Query(query)) => query.minutes,
        Err(rejection) => {
            tracing::debug!("Rejecting query string: {}", rejection.body_text());
            return Err(bad_request(rejection.body_text()));
        }
    };

    state
        .dashboard_service
        .window(minutes)
        .map_err(|e: WindowError| {
            tracing::debug!("Rejecting window {:?}: {}", minutes, e);
            bad_request(e.to_string())
        })
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorView { error })).into_response()
}
