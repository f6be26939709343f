//! Persistencia de los ficheros subidos en el directorio de uploads.
//!
//! Cada fichero se guarda como `<uuid><extensión original>`, así que las
//! subidas concurrentes nunca colisionan. No hay política de borrado.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Crea el directorio si no existe.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Guarda el contenido con un nombre nuevo y devuelve `(file_id, ruta)`.
    pub async fn save(&self, bytes: &[u8], extension: &str) -> std::io::Result<(Uuid, PathBuf)> {
        let file_id = Uuid::new_v4();
        let path = self.root.join(format!("{file_id}{extension}"));
        fs::write(&path, bytes).await?;
        debug!("Fichero guardado en {} ({} bytes)", path.display(), bytes.len());
        Ok((file_id, path))
    }
}

/// Extensión de un nombre de fichero, con el punto, tal como venía
/// (`"Informe.PDF"` → `".PDF"`). Cadena vacía si no tiene.
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
