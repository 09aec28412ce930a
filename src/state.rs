//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::models::ViewModel;
use crate::reconcile::ReconciliationEngine;
use crate::store::Store;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared across all handlers
pub struct AppState {
    /// The one view model store; the lock serialises dispatches
    pub store: Mutex<Store<ViewModel>>,

    pub engine: ReconciliationEngine,
}

impl AppState {
    pub fn new(engine: ReconciliationEngine) -> Self {
        Self::with_view_model(engine, ViewModel::default())
    }

    pub fn with_view_model(engine: ReconciliationEngine, initial: ViewModel) -> Self {
        Self {
            store: Mutex::new(Store::new(initial)),
            engine,
        }
    }

    /// Snapshot of the current view model
    pub async fn view_model(&self) -> Arc<ViewModel> {
        self.store.lock().await.state()
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
