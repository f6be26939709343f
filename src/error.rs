//! Tipos de error de la aplicación.
//!
//! Sólo los errores de validación de la entrada (formato no soportado, texto
//! vacío) llegan al cliente como 4xx. Los fallos del proveedor LLM se quedan
//! dentro del generador y se convierten en un árbol de sustitución.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores del flujo de subida que sí se devuelven al cliente.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("不支持的文件类型: {0}")]
    UnsupportedFormat(String),

    #[error("文件内容为空或无法提取文本")]
    EmptyContent,

    #[error("文本文件不是有效的 UTF-8 编码: {0}")]
    InvalidEncoding(String),

    #[error("缺少上传字段 'file'")]
    MissingFile,

    #[error("无效的 multipart 请求: {0}")]
    Multipart(String),

    #[error("文本提取失败: {0}")]
    Extraction(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedFormat(_)
            | Self::EmptyContent
            | Self::InvalidEncoding(_)
            | Self::MissingFile
            | Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::Extraction(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = if status.is_server_error() {
            format!("处理文件时出错: {self}")
        } else {
            self.to_string()
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Fallos de la llamada de completado. Nunca salen del generador.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Error del proveedor LLM: {0}")]
    Provider(String),

    #[error("La llamada al LLM superó {0} segundos")]
    Timeout(u64),
}
