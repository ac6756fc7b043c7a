use crate::config::Settings;
use crate::service::GenerationService;

// app's shared state, built once at startup
pub struct AppState {
    pub settings: Settings,
    pub service: GenerationService,
}

impl AppState {
    pub fn new(settings: Settings, service: GenerationService) -> Self {
        Self { settings, service }
    }
}
