use remedy_core::Executor;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<Executor>,
}

impl AppState {
    pub fn new(executor: Executor) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }
}
