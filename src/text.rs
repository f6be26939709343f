//! Recortes de texto por caracteres (no bytes), compartidos por el prompt,
//! la vista previa de la respuesta y los logs.

/// Prefijo de `text` con como mucho `limit` caracteres (no bytes).
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Primeros `limit` caracteres, con "..." si se ha recortado.
pub fn preview(text: &str, limit: usize) -> String {
    let head = truncate_chars(text, limit);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_chars("hola", 10), "hola");
        assert_eq!(truncate_chars("hola", 2), "ho");
        assert_eq!(truncate_chars("", 2), "");
    }

    #[test]
    fn truncate_never_splits_a_character() {
        assert_eq!(truncate_chars("思维导图", 2), "思维");
        assert_eq!(truncate_chars("思维导图", 0), "");
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let text = "思".repeat(600);
        let p = preview(&text, 500);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 503);

        assert_eq!(preview("corto", 500), "corto");
        let exact = "a".repeat(500);
        assert_eq!(preview(&exact, 500), exact);
    }
}
