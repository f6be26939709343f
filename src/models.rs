//! Modelos de dominio (mapa mental bilingüe, ficheros subidos y respuesta de la API).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::text::preview;

/// Nodo del mapa mental. Es recursivo: las hojas tienen `children` vacío.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindmapNode {
    pub name: String,
    /// Fragmentos copiados literalmente del documento, usados para resaltar.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub children: Vec<MindmapNode>,
}

impl MindmapNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<MindmapNode>) -> Self {
        Self {
            name: name.into(),
            keywords: Vec::new(),
            children,
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }
}

/// Mapa mental completo: siempre con las dos versiones, china e inglesa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindmapTree {
    pub chinese: MindmapNode,
    pub english: MindmapNode,
}

/// Idioma de cada una de las dos ramas del árbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Chinese,
    English,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Chinese, Language::English];

    /// Clave JSON de la rama.
    pub fn key(self) -> &'static str {
        match self {
            Self::Chinese => "chinese",
            Self::English => "english",
        }
    }

    /// Título de los árboles de sustitución.
    pub fn analysis_result(self) -> &'static str {
        match self {
            Self::Chinese => "文档分析结果",
            Self::English => "Document Analysis Result",
        }
    }

    /// Localiza un texto fijo: devuelve la variante del idioma.
    pub fn pick(self, chinese: &'static str, english: &'static str) -> &'static str {
        match self {
            Self::Chinese => chinese,
            Self::English => english,
        }
    }
}

impl MindmapTree {
    pub fn from_fn(mut build: impl FnMut(Language) -> MindmapNode) -> Self {
        Self {
            chinese: build(Language::Chinese),
            english: build(Language::English),
        }
    }

    /// Árbol "resultado del análisis" con los hijos de diagnóstico dados.
    pub fn placeholder(mut diagnostics: impl FnMut(Language) -> Vec<String>) -> Self {
        Self::from_fn(|lang| {
            MindmapNode::with_children(
                lang.analysis_result(),
                diagnostics(lang).into_iter().map(MindmapNode::leaf).collect(),
            )
        })
    }
}

/// Formatos de documento admitidos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    Txt,
}

impl FileKind {
    /// Determina el tipo a partir de la extensión (sin distinguir mayúsculas).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

/// Fichero subido y persistido en disco. No se modifica ni se borra.
#[derive(Debug, Clone)]
pub struct UploadArtifact {
    pub file_id: Uuid,
    pub original_filename: String,
    pub stored_path: PathBuf,
    /// Extensión original, con el punto (p. ej. ".PDF").
    pub extension: String,
    pub kind: FileKind,
    pub extracted_text: String,
}

impl UploadArtifact {
    pub fn file_url(&self) -> String {
        format!("/uploads/{}{}", self.file_id, self.extension)
    }

    pub fn file_type(&self) -> String {
        self.extension.to_lowercase()
    }
}

/// Cuerpo de la respuesta de `POST /api/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub file_id: String,
    pub file_url: String,
    pub file_type: String,
    pub full_text: String,
    pub text_preview: String,
    pub mindmap: MindmapTree,
}

pub const PREVIEW_CHARS: usize = 500;

impl UploadResponse {
    pub fn assemble(artifact: UploadArtifact, mindmap: MindmapTree) -> Self {
        let text_preview = preview(&artifact.extracted_text, PREVIEW_CHARS);
        Self {
            success: true,
            file_id: artifact.file_id.to_string(),
            file_url: artifact.file_url(),
            file_type: artifact.file_type(),
            filename: artifact.original_filename,
            full_text: artifact.extracted_text,
            text_preview,
            mindmap,
        }
    }
}
