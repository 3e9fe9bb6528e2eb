//! Application state shared by every handler.

use mediashelf_core::Config;
use mediashelf_services::MediaRegistryService;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub media: Arc<MediaRegistryService>,
}

impl AppState {
    pub fn new(config: Config, media: MediaRegistryService) -> Arc<Self> {
        Arc::new(Self {
            config,
            media: Arc::new(media),
        })
    }
}
