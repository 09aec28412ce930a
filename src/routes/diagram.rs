//! Diagram data API Routes
//!
//! Loading, reverse-engineering merges, export/import and renderer geometry.

use crate::actions::{self, NodePosition, NodeSize};
use crate::error::{validation_error, AppError};
use crate::models::{ConnectionInfo, HistoryEntry, SchemaSnapshot, SuccessResponse, ViewModel};
use crate::persistence::{import_view_model, to_export_json};
use crate::sample::sample_snapshot;
use crate::state::SharedState;
use crate::store::Transition;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use validator::{Validate, ValidationError};

// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReverseEngineerRequest {
    #[validate(custom(function = "validate_snapshot"))]
    pub snapshot: SchemaSnapshot,
    #[serde(default)]
    pub connection_info: Option<ConnectionInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseEngineerResponse {
    pub success: bool,
    pub message: String,
    pub view_model: Arc<ViewModel>,
    pub history_entry: Option<HistoryEntry>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePositionsRequest {
    #[validate(length(min = 1, message = "At least one position is required"))]
    pub positions: Vec<NodePosition>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSizesRequest {
    #[validate(length(min = 1, message = "At least one size is required"))]
    #[validate(nested)]
    pub sizes: Vec<NodeSize>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub changed: bool,
}

/// Every entity needs a name and entity ids must be unique
fn validate_snapshot(snapshot: &SchemaSnapshot) -> Result<(), ValidationError> {
    if snapshot.entities.iter().any(|e| e.name.trim().is_empty()) {
        return Err(ValidationError::new("empty_entity_name")
            .with_message("Entity names must not be empty".into()));
    }
    let mut ids = HashSet::new();
    if !snapshot.entities.iter().all(|e| ids.insert(e.id.as_str())) {
        return Err(ValidationError::new("duplicate_entity_id")
            .with_message("Entity ids must be unique within a snapshot".into()));
    }
    Ok(())
}

// ==================== Handlers ====================

/// Current view model
pub async fn init_view_model(State(state): State<SharedState>) -> Json<Arc<ViewModel>> {
    Json(state.view_model().await)
}

/// Merge a freshly introspected schema into the diagram
pub async fn reverse_engineer(
    State(state): State<SharedState>,
    Json(payload): Json<ReverseEngineerRequest>,
) -> Result<Json<ReverseEngineerResponse>, AppError> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    Ok(Json(
        merge(&state, &payload.snapshot, payload.connection_info).await,
    ))
}

/// Merge the built-in sample schema, for demos without a database
pub async fn load_sample(State(state): State<SharedState>) -> Json<ReverseEngineerResponse> {
    Json(merge(&state, &sample_snapshot(), None).await)
}

// The merge runs under the store lock, so `loading` never flips on the
// server side; it stays on the wire for clients that drive it themselves.
async fn merge(
    state: &SharedState,
    snapshot: &SchemaSnapshot,
    connection: Option<ConnectionInfo>,
) -> ReverseEngineerResponse {
    let mut store = state.store.lock().await;
    store.dispatch(|vm| actions::merge_snapshot(vm, &state.engine, snapshot, connection));

    let view_model = store.state();
    let history_entry = view_model.er_diagram.history.last().cloned();

    tracing::info!(
        "Reverse-engineered {} tables from {}",
        view_model.er_diagram.nodes.len(),
        snapshot.source.database
    );

    ReverseEngineerResponse {
        success: true,
        message: "Schema merged successfully".to_string(),
        view_model,
        history_entry,
    }
}

/// Download the view model without transient UI state
pub async fn export_view_model(State(state): State<SharedState>) -> Result<Response, AppError> {
    let vm = state.view_model().await;
    let body = to_export_json(&vm).map_err(|e| AppError::Internal(e.to_string()))?;
    let file_name = format!("relavue-er-{}.json", chrono::Utc::now().format("%Y-%m-%d"));

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Replace the view model with an exported document
pub async fn import(
    State(state): State<SharedState>,
    body: String,
) -> Result<Json<SuccessResponse<Arc<ViewModel>>>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("Request body is empty".to_string()));
    }
    let imported = import_view_model(&body)?;

    let mut store = state.store.lock().await;
    store.dispatch(move |_| Transition::Changed(imported));

    Ok(Json(SuccessResponse::with_data(
        "View model imported successfully",
        store.state(),
    )))
}

/// Apply node positions after a drag
pub async fn update_positions(
    State(state): State<SharedState>,
    Json(payload): Json<UpdatePositionsRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let changed = state
        .store
        .lock()
        .await
        .dispatch(|vm| actions::update_node_positions(vm, &payload.positions));

    Ok(Json(UpdateResponse { success: true, changed }))
}

/// Record node sizes measured by the renderer
pub async fn update_sizes(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateSizesRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let changed = state
        .store
        .lock()
        .await
        .dispatch(|vm| actions::update_node_sizes(vm, &payload.sizes));

    Ok(Json(UpdateResponse { success: true, changed }))
}
