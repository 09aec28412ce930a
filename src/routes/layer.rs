//! Layer ordering API Routes

use crate::actions::{self, z_index};
use crate::models::{LayerItemRef, LayerPosition, ViewModel};
use crate::state::SharedState;
use crate::store::Transition;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize)]
pub struct AddLayerItemRequest {
    pub item: LayerItemRef,
    pub position: LayerPosition,
}

#[derive(Debug, Deserialize)]
pub struct RemoveLayerItemRequest {
    pub item: LayerItemRef,
}

#[derive(Debug, Deserialize)]
pub struct MoveLayerItemRequest {
    pub item: LayerItemRef,
    pub position: LayerPosition,
    pub index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLayerRequest {
    pub position: LayerPosition,
    pub from_index: usize,
    pub to_index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayeredItem {
    #[serde(flatten)]
    pub item: LayerItemRef,
    pub position: LayerPosition,
    pub z_index: i64,
}

#[derive(Debug, Serialize)]
pub struct LayersResponse {
    pub success: bool,
    pub changed: bool,
    pub items: Vec<LayeredItem>,
}

// ==================== Handlers ====================

async fn run<F>(state: &SharedState, action: F) -> Json<LayersResponse>
where
    F: FnOnce(&ViewModel) -> Transition<ViewModel>,
{
    let mut store = state.store.lock().await;
    let changed = store.dispatch(action);
    let vm = store.state();
    Json(layers_response(&vm, changed))
}

fn layers_response(vm: &ViewModel, changed: bool) -> LayersResponse {
    let order = &vm.er_diagram.ui.layer_order;
    let items = [LayerPosition::Background, LayerPosition::Foreground]
        .into_iter()
        .flat_map(|position| {
            order.items(position).iter().map(move |item| LayeredItem {
                item: item.clone(),
                position,
                z_index: z_index(order, item),
            })
        })
        .collect();

    LayersResponse {
        success: true,
        changed,
        items,
    }
}

/// Layer order with computed stacking values
pub async fn list_layers(State(state): State<SharedState>) -> Json<LayersResponse> {
    let vm = state.view_model().await;
    Json(layers_response(&vm, false))
}

pub async fn add_item(
    State(state): State<SharedState>,
    Json(req): Json<AddLayerItemRequest>,
) -> Json<LayersResponse> {
    run(&state, move |vm| actions::add_layer_item(vm, req.item, req.position)).await
}

pub async fn remove_item(
    State(state): State<SharedState>,
    Json(req): Json<RemoveLayerItemRequest>,
) -> Json<LayersResponse> {
    run(&state, move |vm| actions::remove_layer_item(vm, &req.item)).await
}

pub async fn move_item(
    State(state): State<SharedState>,
    Json(req): Json<MoveLayerItemRequest>,
) -> Json<LayersResponse> {
    run(&state, move |vm| {
        actions::move_layer_item(vm, &req.item, req.position, req.index)
    })
    .await
}

pub async fn reorder_items(
    State(state): State<SharedState>,
    Json(req): Json<ReorderLayerRequest>,
) -> Json<LayersResponse> {
    run(&state, move |vm| {
        actions::reorder_layer_items(vm, req.position, req.from_index, req.to_index)
    })
    .await
}
