//! Generación del mapa mental: prompt → completado → normalización →
//! validación. Siempre devuelve un árbol válido.

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info};

use crate::{
    error::CompletionError,
    llm::TextCompleter,
    models::{Language, MindmapNode, MindmapTree},
    normalize::{self, RecoveryStage},
    prompt::{self, PROMPT_CHAR_BUDGET},
    schema,
    text::truncate_chars,
};

/// Caracteres del documento usados por el generador simulado.
const MOCK_SAMPLE_CHARS: usize = 500;
/// Palabras por cada tramo de keywords del generador simulado.
const MOCK_SLICE_WORDS: usize = 3;
/// Líneas del documento usadas cuando falla el proveedor.
const OUTLINE_LINES: usize = 10;
/// Límite por defecto de la llamada al proveedor.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct MindmapGenerator {
    completer: Option<Arc<dyn TextCompleter>>,
    timeout: Duration,
}

impl MindmapGenerator {
    /// `None` activa el generador simulado, sin red.
    pub fn new(completer: Option<Arc<dyn TextCompleter>>) -> Self {
        Self {
            completer,
            timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    /// Tiempo máximo de espera al proveedor; pasado ese plazo se usa el
    /// esquema por líneas del documento.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_mock(&self) -> bool {
        self.completer.is_none()
    }

    pub async fn generate(&self, text: &str) -> MindmapTree {
        let Some(completer) = &self.completer else {
            info!("⚠️  Sin API Key configurada: se usa el mapa mental simulado");
            return schema::validate(&tree_value(&mock_tree(text)));
        };

        let prompt = prompt::build_prompt(text, PROMPT_CHAR_BUDGET);
        let call = tokio::time::timeout(self.timeout, completer.complete(&prompt));
        let completed = call
            .await
            .unwrap_or_else(|_| Err(CompletionError::Timeout(self.timeout.as_secs())));

        let raw = match completed {
            Ok(raw) => raw,
            Err(e) => {
                error!("❌ Error llamando a {}: {e}", completer.describe());
                return schema::validate(&tree_value(&text_outline_tree(text)));
            }
        };

        info!("📥 Respuesta de {} ({} caracteres)", completer.describe(), raw.chars().count());
        debug!("Respuesta cruda (primeros 1000): {}", truncate_chars(&raw, 1000));

        let normalized = normalize::normalize(&raw);
        match normalized.stage {
            RecoveryStage::Strict => info!("✅ JSON parseado correctamente"),
            RecoveryStage::SingleQuoteRepair => info!("✅ JSON parseado tras reparar comillas"),
            RecoveryStage::Fallback => info!("Se devuelve la estructura por defecto"),
        }

        schema::validate(&normalized.value)
    }
}

fn tree_value(tree: &MindmapTree) -> serde_json::Value {
    serde_json::to_value(tree).unwrap_or(serde_json::Value::Null)
}

/// Mapa mental determinista: tres capítulos con dos puntos cada uno; las
/// keywords son tramos consecutivos de palabras de los primeros 500
/// caracteres del documento.
pub fn mock_tree(text: &str) -> MindmapTree {
    let sample = truncate_chars(text, MOCK_SAMPLE_CHARS);
    let words: Vec<&str> = sample.split_whitespace().collect();

    // El tramo `index` son las palabras [3·index, 3·index + 3). Si el texto no
    // llega a cubrirlo entero (y alguna más), se usa la keyword fija.
    let slice = |index: usize, fallback: &str| -> Vec<String> {
        let start = index * MOCK_SLICE_WORDS;
        let end = start + MOCK_SLICE_WORDS;
        if words.len() > end {
            words[start..end].iter().map(|w| w.to_string()).collect()
        } else {
            vec![fallback.to_string()]
        }
    };

    // La raíz usa las tres primeras palabras, aunque sean menos.
    let root_keywords: Vec<String> = words
        .iter()
        .take(MOCK_SLICE_WORDS)
        .map(|w| w.to_string())
        .collect();

    MindmapTree::from_fn(|lang| {
        let chapters = mock_outline(lang)
            .iter()
            .enumerate()
            .map(|(c, (chapter, chapter_kw, points))| {
                let base = 1 + c * 3;
                let children = points
                    .iter()
                    .enumerate()
                    .map(|(p, (point, point_kw))| {
                        MindmapNode::leaf(*point).with_keywords(slice(base + 1 + p, *point_kw))
                    })
                    .collect();
                MindmapNode::with_children(*chapter, children)
                    .with_keywords(slice(base, *chapter_kw))
            })
            .collect();

        MindmapNode::with_children(lang.analysis_result(), chapters)
            .with_keywords(root_keywords.clone())
    })
}

type MockChapter = (&'static str, &'static str, [(&'static str, &'static str); 2]);

fn mock_outline(lang: Language) -> [MockChapter; 3] {
    match lang {
        Language::Chinese => [
            ("第一章：概述", "概述", [("背景介绍", "背景"), ("目标设定", "目标")]),
            ("第二章：主要内容", "内容", [("核心概念", "概念"), ("实施方法", "方法")]),
            ("第三章：总结", "总结", [("关键要点", "要点"), ("未来展望", "展望")]),
        ],
        Language::English => [
            ("Chapter 1: Overview", "overview", [("Background", "background"), ("Objectives", "objectives")]),
            ("Chapter 2: Main Content", "content", [("Core Concepts", "concepts"), ("Implementation Methods", "methods")]),
            ("Chapter 3: Summary", "summary", [("Key Points", "points"), ("Future Outlook", "outlook")]),
        ],
    }
}

/// Árbol usado cuando falla el proveedor: las primeras líneas no vacías del
/// documento como hojas.
pub fn text_outline_tree(text: &str) -> MindmapTree {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(OUTLINE_LINES)
        .collect();

    MindmapTree::from_fn(|lang| {
        MindmapNode::with_children(
            lang.pick("文档内容", "Document Content"),
            lines.iter().map(|line| MindmapNode::leaf(*line)).collect(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Completado falso que devuelve una respuesta fija y guarda el prompt.
    struct StubCompleter {
        reply: Result<String, u64>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubCompleter {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn timing_out() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(30),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextCompleter for StubCompleter {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(CompletionError::Timeout)
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn mock_tree_slices_words_across_chapters() {
        let tree = mock_tree(&words(40));
        for root in [&tree.chinese, &tree.english] {
            assert_eq!(root.keywords, vec!["w0", "w1", "w2"]);
            assert_eq!(root.children.len(), 3);
            assert_eq!(root.children[0].keywords, vec!["w3", "w4", "w5"]);
            assert_eq!(root.children[0].children[0].keywords, vec!["w6", "w7", "w8"]);
            assert_eq!(root.children[2].children[1].keywords, vec!["w27", "w28", "w29"]);
        }
        assert_eq!(tree.chinese.children[1].name, "第二章：主要内容");
        assert_eq!(tree.english.children[1].name, "Chapter 2: Main Content");
    }

    #[test]
    fn mock_tree_uses_fixed_keywords_for_short_text() {
        let tree = mock_tree("solo dos");
        assert_eq!(tree.chinese.keywords, vec!["solo", "dos"]);
        assert_eq!(tree.chinese.children[0].keywords, vec!["概述"]);
        assert_eq!(tree.english.children[2].children[1].keywords, vec!["outlook"]);

        // Exactamente seis palabras no bastan para el tramo [3, 6).
        let tree = mock_tree(&words(6));
        assert_eq!(tree.english.children[0].keywords, vec!["overview"]);
        let tree = mock_tree(&words(7));
        assert_eq!(tree.english.children[0].keywords, vec!["w3", "w4", "w5"]);
    }

    #[test]
    fn mock_tree_only_looks_at_the_first_500_chars() {
        let text = format!("{} {}", "x".repeat(500), words(40));
        let tree = mock_tree(&text);
        assert_eq!(tree.chinese.keywords, vec!["x".repeat(500)]);
        assert_eq!(tree.chinese.children[0].keywords, vec!["概述"]);
    }

    #[test]
    fn text_outline_takes_first_ten_non_empty_lines() {
        let text = (0..15).map(|i| format!("  línea {i}  \n\n")).collect::<String>();
        let tree = text_outline_tree(&text);
        assert_eq!(tree.chinese.name, "文档内容");
        assert_eq!(tree.english.name, "Document Content");
        assert_eq!(tree.english.children.len(), 10);
        assert_eq!(tree.english.children[0].name, "línea 0");
    }

    #[test]
    fn generator_without_provider_is_offline_and_deterministic() {
        let generator = MindmapGenerator::new(None);
        assert!(generator.is_mock());
        let a = tokio_test::block_on(generator.generate("uno dos tres cuatro"));
        let b = tokio_test::block_on(generator.generate("uno dos tres cuatro"));
        assert_eq!(a, b);
        assert_eq!(a.english.name, "Document Analysis Result");
    }

    #[tokio::test]
    async fn generator_parses_fenced_response() {
        let stub = StubCompleter::replying(
            "```json\n{\"chinese\":{\"name\":\"A\"},\"english\":{\"name\":\"B\"}}\n```",
        );
        let generator = MindmapGenerator::new(Some(stub.clone()));

        let tree = generator.generate("documento de prueba").await;
        assert_eq!(tree.chinese, MindmapNode::leaf("A"));
        assert_eq!(tree.english, MindmapNode::leaf("B"));

        let prompts = stub.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("documento de prueba"));
    }

    #[tokio::test]
    async fn generator_duplicates_legacy_shape() {
        let stub = StubCompleter::replying("{\"name\":\"Root\",\"children\":[]}");
        let tree = MindmapGenerator::new(Some(stub)).generate("texto").await;
        assert_eq!(tree.chinese, MindmapNode::leaf("Root"));
        assert_eq!(tree.english, MindmapNode::leaf("Root"));
    }

    #[tokio::test]
    async fn generator_falls_back_on_unparseable_response() {
        let stub = StubCompleter::replying("not json at all");
        let tree = MindmapGenerator::new(Some(stub)).generate("texto").await;
        assert_eq!(tree, normalize::parse_failure_tree());
    }

    #[tokio::test]
    async fn provider_failure_becomes_a_text_outline() {
        let generator = MindmapGenerator::new(Some(StubCompleter::timing_out()));
        let tree = generator.generate("Título\n\nIntroducción\n").await;
        assert_eq!(tree.chinese.name, "文档内容");
        assert_eq!(
            tree.chinese.children,
            vec![MindmapNode::leaf("Título"), MindmapNode::leaf("Introducción")]
        );
    }

    #[tokio::test]
    async fn provider_failure_on_blank_lines_still_yields_both_languages() {
        let generator = MindmapGenerator::new(Some(StubCompleter::timing_out()));
        let tree = generator.generate("   ").await;
        assert_eq!(tree.english.name, "Document Content");
        assert!(tree.english.children.is_empty());
    }

    /// Proveedor que tarda diez minutos en contestar.
    struct SlowCompleter;

    #[async_trait]
    impl TextCompleter for SlowCompleter {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok("{\"chinese\":{\"name\":\"tarde\"},\"english\":{\"name\":\"late\"}}".to_string())
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_is_cut_off_by_the_timeout() {
        let generator = MindmapGenerator::new(Some(Arc::new(SlowCompleter)))
            .with_timeout(Duration::from_secs(5));
        let started = tokio::time::Instant::now();

        let tree = generator.generate("Título\nCuerpo").await;

        assert_eq!(tree, text_outline_tree("Título\nCuerpo"));
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn provider_within_the_timeout_is_used() {
        let generator = MindmapGenerator::new(Some(Arc::new(SlowCompleter)))
            .with_timeout(Duration::from_secs(601));
        let tree = generator.generate("Título").await;
        assert_eq!(tree.english, MindmapNode::leaf("late"));
    }
}
