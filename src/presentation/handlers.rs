// HTTP request handlers
use crate::application::controller::Trigger;
use crate::application::state_store::StatusSnapshot;
use crate::domain::site::TimeRange;
use crate::infrastructure::memory_view::{ElementState, ViewSnapshot};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Everything currently rendered: elements, busy marker, error banner, live charts
pub async fn view_snapshot(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    Json(state.view.snapshot())
}

/// A single named element
pub async fn view_element(
    Path(element): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ElementState>, StatusCode> {
    state
        .view
        .element(&element)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn refresh_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.controller.status())
}

/// Manual refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> StatusCode {
    enqueue(&state, Trigger::Manual)
}

pub async fn switch_site(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    if !state.controller.knows_site(&id) {
        return StatusCode::NOT_FOUND;
    }
    enqueue(&state, Trigger::SiteChanged(id))
}

pub async fn change_range(
    Path(token): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    match token.parse::<TimeRange>() {
        Ok(range) => enqueue(&state, Trigger::RangeChanged(range)),
        Err(e) => {
            tracing::debug!("Rejected range change: {}", e);
            StatusCode::BAD_REQUEST
        }
    }
}

fn enqueue(state: &AppState, trigger: Trigger) -> StatusCode {
    if state.triggers.send(trigger) {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
