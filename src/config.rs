//! Carga y gestión de configuración de la aplicación (servidor + proveedor LLM).

use std::{env, path::PathBuf};
use anyhow::{anyhow, Result};

pub const DEEPSEEK_CHAT_MODEL: &str = "deepseek-chat";
pub const OPENAI_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Proveedor de completado seleccionado al arrancar.
///
/// Se decide una única vez según qué credencial esté presente: DeepSeek tiene
/// prioridad sobre OpenAI y, si no hay ninguna, se usa el generador simulado.
#[derive(Clone)]
pub enum LlmProvider {
    DeepSeek { api_key: String },
    OpenAI { api_key: String },
    Mock,
}

impl LlmProvider {
    /// Resuelve el proveedor a partir de las dos credenciales opcionales.
    /// Un valor vacío cuenta como ausente.
    pub fn resolve(deepseek_key: Option<String>, openai_key: Option<String>) -> Self {
        let present = |key: Option<String>| key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());

        if let Some(api_key) = present(deepseek_key) {
            Self::DeepSeek { api_key }
        } else if let Some(api_key) = present(openai_key) {
            Self::OpenAI { api_key }
        } else {
            Self::Mock
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DeepSeek { .. } => "deepseek",
            Self::OpenAI { .. } => "openai",
            Self::Mock => "mock",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::DeepSeek { .. } => DEEPSEEK_CHAT_MODEL,
            Self::OpenAI { .. } => OPENAI_CHAT_MODEL,
            Self::Mock => "",
        }
    }
}

// Nunca imprimimos las claves en los logs.
impl std::fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,

    pub llm_provider: LlmProvider,
    pub llm_chat_model: String,
    pub llm_timeout_secs: u64,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let upload_dir =
            PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(v) => v
                .parse::<usize>()
                .map_err(|_| anyhow!("MAX_UPLOAD_BYTES no es un número válido: {v}"))?,
            Err(_) => 50 * 1024 * 1024,
        };

        let llm_timeout_secs = parse_timeout_secs(env::var("LLM_TIMEOUT_SECS").ok())?;

        let llm_provider = LlmProvider::resolve(
            env::var("DEEPSEEK_API_KEY").ok(),
            env::var("OPENAI_API_KEY").ok(),
        );

        // Modelo de chat por defecto del proveedor si no se ha configurado otro
        let llm_chat_model = env::var("LLM_CHAT_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| llm_provider.default_model().to_string());

        Ok(Self {
            server_addr,
            upload_dir,
            max_upload_bytes,
            llm_provider,
            llm_chat_model,
            llm_timeout_secs,
        })
    }
}

/// Segundos de espera al proveedor (120 por defecto). Cero no es válido.
fn parse_timeout_secs(raw: Option<String>) -> Result<u64> {
    let Some(v) = raw else {
        return Ok(120);
    };
    let secs = v
        .trim()
        .parse::<u64>()
        .map_err(|_| anyhow!("LLM_TIMEOUT_SECS no es un número válido: {v}"))?;
    if secs == 0 {
        return Err(anyhow!("LLM_TIMEOUT_SECS debe ser mayor que 0"));
    }
    Ok(secs)
}
