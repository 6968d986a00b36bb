// src/state.rs
use std::sync::Arc;

use crate::services::completion::CompletionClient;

pub type SharedState = Arc<AppState>;

/// Built once at startup and shared read-only by every request.
pub struct AppState {
    pub completion: Arc<dyn CompletionClient>,
}

impl AppState {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self { completion }
    }

    pub fn shared(completion: impl CompletionClient + 'static) -> SharedState {
        Arc::new(Self::new(Arc::new(completion)))
    }
}
