//! Normalización de la respuesta en texto libre del LLM.
//!
//! El texto pasa por etapas cada vez más permisivas hasta obtener un valor
//! JSON:
//!
//! 1. quitar vallas de markdown (```json ... ``` o ``` ... ```),
//! 2. aislar el tramo entre la primera `{` y la última `}`,
//! 3. decodificación estricta,
//! 4. reparación: comillas simples → dobles y un único reintento,
//! 5. árbol de sustitución "JSON解析失败".
//!
//! El valor resultante pasa siempre después por [`crate::schema::validate`].

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    models::{Language, MindmapTree},
    text::truncate_chars,
};

/// Etapa que produjo el valor final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    Strict,
    SingleQuoteRepair,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: Value,
    pub stage: RecoveryStage,
}

/// Estados de la máquina de decodificación.
enum Step {
    Decode(String),
    Repair(String),
    Done(Normalized),
}

/// Convierte la salida cruda del modelo en un valor JSON. Nunca falla: si
/// ninguna etapa decodifica, devuelve el árbol de sustitución serializado.
pub fn normalize(raw: &str) -> Normalized {
    let candidate = extract_candidate(raw);
    let mut step = Step::Decode(candidate.to_string());

    loop {
        step = match step {
            Step::Decode(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => Step::Done(Normalized {
                    value,
                    stage: RecoveryStage::Strict,
                }),
                Err(e) => {
                    warn!("❌ No se pudo parsear el JSON del LLM: {e}");
                    debug!("Contenido intentado: {}", truncate_chars(&text, 200));
                    Step::Repair(text)
                }
            },
            Step::Repair(text) => {
                let repaired = text.replace('\'', "\"");
                match serde_json::from_str::<Value>(&repaired) {
                    Ok(value) => Step::Done(Normalized {
                        value,
                        stage: RecoveryStage::SingleQuoteRepair,
                    }),
                    Err(e) => {
                        warn!("❌ Tampoco tras reparar las comillas ({e}); se usa la estructura por defecto");
                        Step::Done(Normalized {
                            value: parse_failure_value(),
                            stage: RecoveryStage::Fallback,
                        })
                    }
                }
            }
            Step::Done(result) => return result,
        };
    }
}

/// Etapas 1 y 2: vallas de markdown y tramo de llaves.
pub fn extract_candidate(raw: &str) -> &str {
    brace_span(strip_fences(raw.trim()))
}

/// Interior del primer bloque ```json; si no hay, del primer bloque ```
/// cualquiera. Sin vallas, el texto tal cual. Una valla sin cerrar se toma
/// hasta el final del texto.
pub fn strip_fences(text: &str) -> &str {
    const JSON_FENCE: &str = "```json";
    const FENCE: &str = "```";

    let opener = if let Some(pos) = text.find(JSON_FENCE) {
        pos + JSON_FENCE.len()
    } else if let Some(pos) = text.find(FENCE) {
        pos + FENCE.len()
    } else {
        return text;
    };

    let rest = &text[opener..];
    let inner = match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    };
    inner.trim()
}

/// Tramo voraz desde la primera `{` hasta la última `}`, ambas incluidas.
///
/// No tiene en cuenta el anidamiento: llaves desparejadas dentro de cadenas
/// pueden dar un tramo incorrecto, y entonces actúan las etapas siguientes.
pub fn brace_span(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn parse_failure_value() -> Value {
    let tree = parse_failure_tree();
    serde_json::to_value(&tree).unwrap_or(Value::Null)
}

/// Árbol devuelto cuando ninguna etapa consigue decodificar la respuesta.
pub fn parse_failure_tree() -> MindmapTree {
    MindmapTree::placeholder(|lang: Language| {
        vec![lang
            .pick(
                "JSON解析失败，请检查AI返回格式",
                "JSON parsing failed, please check AI response format",
            )
            .to_string()]
    })
}
