// Módulos de la aplicación
mod api;
mod app_state;
mod config;
mod error;
mod extract;
mod llm;
mod mindmap;
mod models;
mod normalize;
mod prompt;
mod schema;
mod storage;
mod text;

use crate::app_state::AppState;
use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Cargar configuración (el proveedor LLM se decide aquí, una sola vez)
    let cfg = config::AppConfig::from_env().context("Error al cargar la configuración")?;

    // 3. Crear estado compartido y directorio de subidas
    let app_state = AppState::from_config(cfg);
    if app_state.generator.is_mock() {
        info!("⚠️  No hay API Key configurada: se usarán datos simulados");
    } else {
        info!(
            "✅ Proveedor LLM: {:?} (modelo: {})",
            app_state.config.llm_provider, app_state.config.llm_chat_model
        );
    }
    app_state
        .uploads
        .ensure_dir()
        .await
        .with_context(|| format!("No se pudo crear {}", app_state.uploads.root().display()))?;

    // 4. Configurar el router de la API
    let server_addr = app_state.config.server_addr.clone();
    let app = api::create_router(app_state).layer(TraceLayer::new_for_http());

    // 5. Iniciar el servidor
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {server_addr}"))?;
    info!("🚀 Servidor escuchando en http://{}", server_addr);

    // Apagado ordenado con Ctrl+C.
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
