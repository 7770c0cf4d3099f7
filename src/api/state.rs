use std::sync::Arc;

use crate::application::DocumentService;
use crate::infrastructure::Config;

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(documents: Arc<DocumentService>, config: Config) -> Self {
        Self {
            documents,
            config: Arc::new(config),
        }
    }
}
