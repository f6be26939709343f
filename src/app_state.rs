use std::{sync::Arc, time::Duration};

use crate::{
    config::AppConfig,
    llm::{LlmManager, TextCompleter},
    mindmap::MindmapGenerator,
    storage::UploadStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub generator: MindmapGenerator,
    pub uploads: UploadStore,
}

impl AppState {
    /// Resuelve el proveedor una sola vez y lo inyecta en el generador.
    pub fn from_config(config: AppConfig) -> Self {
        let completer = LlmManager::from_config(&config)
            .map(|manager| Arc::new(manager) as Arc<dyn TextCompleter>);

        Self {
            generator: MindmapGenerator::new(completer)
                .with_timeout(Duration::from_secs(config.llm_timeout_secs)),
            uploads: UploadStore::new(config.upload_dir.clone()),
            config,
        }
    }
}
