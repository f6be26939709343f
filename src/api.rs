use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{info, warn};

use crate::{
    app_state::AppState,
    error::UploadError,
    extract,
    models::{FileKind, UploadArtifact, UploadResponse},
    storage,
};

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    let uploads = ServeDir::new(app_state.uploads.root());
    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .route("/", get(root_handler))
        .route("/api/upload", post(upload_handler))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

// --- Handlers ---

#[axum::debug_handler]
async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "文档思维导图生成器API" }))
}

/// Sube un documento y genera su mapa mental.
///
/// Sólo los errores de entrada (tipo no soportado, texto vacío) son 400; el
/// resto de fallos internos son 500. Los fallos del LLM no llegan aquí.
#[axum::debug_handler]
async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let (filename, bytes) = read_file_field(&mut multipart).await?;

    let extension = storage::extension_of(&filename);
    let kind = FileKind::from_extension(&extension)
        .ok_or_else(|| UploadError::UnsupportedFormat(filename.clone()))?;

    let (file_id, stored_path) = state.uploads.save(&bytes, &extension).await?;

    let text = tokio::task::spawn_blocking(move || extract::extract_text(&bytes, kind))
        .await
        .map_err(|e| UploadError::Extraction(e.to_string()))??;

    if text.trim().is_empty() {
        warn!("Fichero sin texto útil: {} ({})", filename, stored_path.display());
        return Err(UploadError::EmptyContent);
    }

    info!("🤖 Generando mapa mental ({} caracteres de texto)...", text.chars().count());
    let mindmap = state.generator.generate(&text).await;

    let artifact = UploadArtifact {
        file_id,
        original_filename: filename,
        stored_path,
        extension,
        kind,
        extracted_text: text,
    };
    info!(
        "📄 '{}' ({:?}) guardado en {}",
        artifact.original_filename,
        artifact.kind,
        artifact.stored_path.display()
    );
    Ok(Json(UploadResponse::assemble(artifact, mindmap)))
}

// --- Utilidades ---

/// Lee el campo multipart `file`: nombre original y contenido.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, axum::body::Bytes), UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?;
        return Ok((filename, bytes));
    }
    Err(UploadError::MissingFile)
}
