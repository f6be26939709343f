//! Abstracción sobre Rig para pedir el completado a DeepSeek u OpenAI.
//!
//! El resto de la aplicación sólo ve el trait [`TextCompleter`]: recibe un
//! prompt y devuelve el texto crudo del modelo.

use async_trait::async_trait;
use rig::completion::Prompt;
use tracing::info;

use crate::{
    config::{AppConfig, LlmProvider},
    error::CompletionError,
    prompt::SYSTEM_PROMPT,
};

pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u64 = 3000;

/// Capacidad externa de completado: `complete(prompt) -> texto crudo`.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Nombre para los logs, p. ej. "deepseek/deepseek-chat".
    fn describe(&self) -> String;
}

/// Proveedor remoto con su credencial. El caso sin credenciales no llega
/// aquí: se resuelve antes con el generador simulado.
#[derive(Clone)]
enum Backend {
    DeepSeek { api_key: String },
    OpenAI { api_key: String },
}

impl Backend {
    fn name(&self) -> &'static str {
        match self {
            Self::DeepSeek { .. } => "deepseek",
            Self::OpenAI { .. } => "openai",
        }
    }
}

/// Gestor de LLMs con el proveedor ya resuelto al arrancar.
#[derive(Clone)]
pub struct LlmManager {
    backend: Backend,
    pub chat_model: String,
}

impl std::fmt::Debug for LlmManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl LlmManager {
    /// Construye el manager a partir de la configuración. Devuelve `None`
    /// si no hay credenciales: entonces se usa el generador simulado.
    pub fn from_config(cfg: &AppConfig) -> Option<Self> {
        let backend = match &cfg.llm_provider {
            LlmProvider::DeepSeek { api_key } => Backend::DeepSeek { api_key: api_key.clone() },
            LlmProvider::OpenAI { api_key } => Backend::OpenAI { api_key: api_key.clone() },
            LlmProvider::Mock => return None,
        };
        Some(Self {
            backend,
            chat_model: cfg.llm_chat_model.clone(),
        })
    }

    async fn complete_with_deepseek(&self, api_key: &str, prompt: &str) -> Result<String, CompletionError> {
        use rig::providers::deepseek;
        // Trait para client.agent(...)
        use rig::client::CompletionClient as _;

        let client = deepseek::Client::new(api_key);
        let agent = client
            .agent(&self.chat_model)
            .preamble(SYSTEM_PROMPT)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| CompletionError::Provider(e.to_string()))
    }

    async fn complete_with_openai(&self, api_key: &str, prompt: &str) -> Result<String, CompletionError> {
        use rig::providers::openai;
        use rig::client::CompletionClient as _;

        let client = openai::Client::new(api_key);
        let agent = client
            .agent(&self.chat_model)
            .preamble(SYSTEM_PROMPT)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| CompletionError::Provider(e.to_string()))
    }
}

#[async_trait]
impl TextCompleter for LlmManager {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        info!("📤 Llamando a {} (modelo: {})...", self.backend.name(), self.chat_model);

        let raw = match &self.backend {
            Backend::DeepSeek { api_key } => self.complete_with_deepseek(api_key, prompt).await?,
            Backend::OpenAI { api_key } => self.complete_with_openai(api_key, prompt).await?,
        };

        Ok(raw.trim().to_string())
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.backend.name(), self.chat_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(provider: LlmProvider) -> AppConfig {
        AppConfig {
            server_addr: "127.0.0.1:0".into(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 1024,
            llm_chat_model: provider.default_model().to_string(),
            llm_provider: provider,
            llm_timeout_secs: 5,
        }
    }

    #[test]
    fn mock_provider_has_no_manager() {
        assert!(LlmManager::from_config(&config(LlmProvider::Mock)).is_none());
    }

    #[test]
    fn manager_uses_the_configured_model() {
        let cfg = config(LlmProvider::DeepSeek { api_key: "k".into() });
        let manager = LlmManager::from_config(&cfg).unwrap();
        assert_eq!(manager.describe(), "deepseek/deepseek-chat");
        assert_eq!(format!("{manager:?}"), "deepseek/deepseek-chat");
    }

    #[test]
    fn openai_key_selects_the_openai_backend() {
        let cfg = config(LlmProvider::OpenAI { api_key: "k".into() });
        let manager = LlmManager::from_config(&cfg).unwrap();
        assert_eq!(manager.describe(), "openai/gpt-3.5-turbo");
    }
}
