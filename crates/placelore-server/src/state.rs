use std::sync::Arc;

use crate::service::ContentService;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ContentService>,
}

impl AppState {
    pub fn new(service: ContentService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
