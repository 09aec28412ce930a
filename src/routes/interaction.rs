//! Pointer interaction API Routes
//!
//! Hover, selection, drag/pan flags and stateless highlight lookups.

use crate::error::{validation_error, AppError};
use crate::highlight::{self, resolve, Focus, HighlightSet};
use crate::models::{DiagramUiState, HoverKind, LayerItemRef, ViewModel};
use crate::state::SharedState;
use crate::store::Transition;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize, Validate)]
pub struct HoverRequest {
    #[serde(rename = "type")]
    pub kind: HoverKind,
    #[validate(length(min = 1, message = "Id is required"))]
    pub id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HighlightRequest {
    pub kind: HoverKind,
    #[validate(length(min = 1, message = "Id is required"))]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct PanModeRequest {
    pub active: bool,
}

/// Diagram UI after an interaction, with whether anything changed
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub success: bool,
    pub changed: bool,
    pub ui: DiagramUiState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_item: Option<LayerItemRef>,
}

#[derive(Debug, Serialize)]
pub struct HighlightResponse {
    pub success: bool,
    #[serde(flatten)]
    pub highlight: HighlightSet,
}

// ==================== Handlers ====================

async fn run<F>(state: &SharedState, action: F) -> Json<InteractionResponse>
where
    F: FnOnce(&ViewModel) -> Transition<ViewModel>,
{
    let mut store = state.store.lock().await;
    let changed = store.dispatch(action);
    let vm = store.state();

    Json(InteractionResponse {
        success: true,
        changed,
        ui: vm.er_diagram.ui.clone(),
        selected_item: vm.ui.selected_item.clone(),
    })
}

pub async fn hover(
    State(state): State<SharedState>,
    Json(payload): Json<HoverRequest>,
) -> Result<Json<InteractionResponse>, AppError> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let focus = Focus {
        kind: payload.kind,
        id: payload.id,
    };
    Ok(run(&state, move |vm| highlight::hover(vm, focus)).await)
}

pub async fn clear_hover(State(state): State<SharedState>) -> Json<InteractionResponse> {
    run(&state, highlight::clear_hover).await
}

/// Select an item; a `null` body clears the selection
pub async fn select(
    State(state): State<SharedState>,
    Json(item): Json<Option<LayerItemRef>>,
) -> Json<InteractionResponse> {
    run(&state, move |vm| highlight::select_item(vm, item)).await
}

pub async fn start_drag(State(state): State<SharedState>) -> Json<InteractionResponse> {
    run(&state, highlight::start_entity_drag).await
}

pub async fn stop_drag(State(state): State<SharedState>) -> Json<InteractionResponse> {
    run(&state, highlight::stop_entity_drag).await
}

pub async fn set_pan_mode(
    State(state): State<SharedState>,
    Json(payload): Json<PanModeRequest>,
) -> Json<InteractionResponse> {
    run(&state, move |vm| highlight::set_pan_mode(vm, payload.active)).await
}

pub async fn toggle_lock(State(state): State<SharedState>) -> Json<InteractionResponse> {
    run(&state, highlight::toggle_lock).await
}

/// Resolve a highlight set without touching the stored UI state
pub async fn resolve_highlight(
    State(state): State<SharedState>,
    Json(payload): Json<HighlightRequest>,
) -> Result<Json<HighlightResponse>, AppError> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let vm = state.view_model().await;
    let focus = Focus {
        kind: payload.kind,
        id: payload.id,
    };
    let highlight = resolve(&vm.er_diagram.index, &vm.er_diagram.edges, &focus)?;

    Ok(Json(HighlightResponse {
        success: true,
        highlight,
    }))
}
