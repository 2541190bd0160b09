use ferrous_doh_application::use_cases::ResolveDohQueryUseCase;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub resolve: Arc<ResolveDohQueryUseCase>,
}

impl AppState {
    pub fn new(resolve: Arc<ResolveDohQueryUseCase>) -> Self {
        Self { resolve }
    }
}
