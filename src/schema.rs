//! Validación y coerción del valor JSON al contrato `MindmapTree`.
//!
//! Las reglas se aplican en orden sobre una clasificación explícita de la
//! forma del valor ([`Shape`]), de modo que cada caso se puede probar sin
//! tocar la red:
//!
//! | forma          | resultado                                               |
//! |----------------|---------------------------------------------------------|
//! | `NotAMapping`  | árbol por defecto "数据格式错误"                        |
//! | `LegacySingle` | el mismo nodo duplicado en `chinese` y `english`        |
//! | `WrongKeys`    | árbol de diagnóstico con las claves, en orden recibido  |
//! | `Bilingual`    | cada idioma por separado: nodo válido o sustituto       |

use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{Language, MindmapNode, MindmapTree};

/// Forma de nivel superior del valor recibido.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    NotAMapping,
    LegacySingle(&'a Value),
    WrongKeys(Vec<String>),
    Bilingual(&'a Map<String, Value>),
}

pub fn classify(value: &Value) -> Shape<'_> {
    let Some(map) = value.as_object() else {
        return Shape::NotAMapping;
    };

    let has_language = Language::ALL.iter().any(|lang| map.contains_key(lang.key()));
    if has_language {
        Shape::Bilingual(map)
    } else if map.contains_key("name") && map.contains_key("children") {
        Shape::LegacySingle(value)
    } else {
        Shape::WrongKeys(map.keys().cloned().collect())
    }
}

/// Aplica las reglas y devuelve siempre un árbol válido con los dos idiomas.
pub fn validate(value: &Value) -> MindmapTree {
    match classify(value) {
        Shape::NotAMapping => {
            warn!("⚠️  El mapa mental no es un objeto JSON: {}", kind_of(value));
            invalid_format_tree()
        }
        Shape::LegacySingle(single) => {
            warn!("⚠️  Formato antiguo (name + children); se duplica en ambos idiomas");
            MindmapTree::from_fn(|lang| coerce_language_node(Some(single), lang))
        }
        Shape::WrongKeys(keys) => {
            warn!("⚠️  Formato incompleto; claves disponibles: {keys:?}");
            wrong_keys_tree(&keys)
        }
        Shape::Bilingual(map) => {
            MindmapTree::from_fn(|lang| coerce_language_node(map.get(lang.key()), lang))
        }
    }
}

/// Nodo raíz de un idioma, o el sustituto de ese idioma si no es utilizable.
fn coerce_language_node(value: Option<&Value>, lang: Language) -> MindmapNode {
    match value.and_then(coerce_node) {
        Some(node) => node,
        None => {
            warn!("⚠️  Datos de '{}' con formato incorrecto: {:?}", lang.key(), value);
            MindmapNode::with_children(
                lang.analysis_result(),
                vec![MindmapNode::leaf(lang.pick("数据格式错误", "Data format error"))],
            )
        }
    }
}

/// Convierte un objeto en nodo. Exige un `name` escalar y no vacío; los hijos
/// sin nombre se descartan y los hijos que son cadenas se convierten en hojas.
pub fn coerce_node(value: &Value) -> Option<MindmapNode> {
    let map = value.as_object()?;
    let name = scalar_text(map.get("name")?)?;
    if name.trim().is_empty() {
        return None;
    }

    let keywords = match map.get("keywords") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    };

    let children = match map.get("children") {
        Some(Value::Array(items)) => items.iter().filter_map(coerce_child).collect(),
        _ => Vec::new(),
    };

    Some(MindmapNode {
        name,
        keywords,
        children,
    })
}

fn coerce_child(value: &Value) -> Option<MindmapNode> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(MindmapNode::leaf(s.clone())),
        _ => coerce_node(value),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_format_tree() -> MindmapTree {
    MindmapTree::placeholder(|lang| {
        vec![lang
            .pick(
                "数据格式错误，请检查AI返回结果",
                "Data format error, please check AI response",
            )
            .to_string()]
    })
}

fn wrong_keys_tree(keys: &[String]) -> MindmapTree {
    let listed = keys.join(", ");
    MindmapTree::placeholder(|lang| match lang {
        Language::Chinese => vec!["数据格式不完整".to_string(), format!("可用字段: {listed}")],
        Language::English => vec![
            "Incomplete data format".to_string(),
            format!("Available fields: {listed}"),
        ],
    })
}
