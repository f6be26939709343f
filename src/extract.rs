//! Extracción de texto de los documentos subidos (PDF, DOCX y TXT).

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::{error::UploadError, models::FileKind};

/// Extrae el texto según el tipo de fichero.
///
/// Es trabajo de CPU síncrono: desde el servidor se llama dentro de
/// `spawn_blocking`.
pub fn extract_text(bytes: &[u8], kind: FileKind) -> Result<String, UploadError> {
    match kind {
        FileKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| UploadError::Extraction(format!("PDF: {e}"))),
        FileKind::Docx => extract_docx(bytes),
        FileKind::Txt => String::from_utf8(bytes.to_vec())
            .map_err(|e| UploadError::InvalidEncoding(e.to_string())),
    }
}

/// Un DOCX es un ZIP; el cuerpo está en `word/document.xml`. Cada párrafo
/// (`w:p`) termina en salto de línea y el texto vive en los `w:t`.
fn extract_docx(bytes: &[u8]) -> Result<String, UploadError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| UploadError::Extraction(format!("DOCX no es un ZIP válido: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| UploadError::Extraction(format!("DOCX sin word/document.xml: {e}")))?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| UploadError::Extraction(format!("XML de DOCX inválido: {e}")))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(UploadError::Extraction(format!(
                    "XML de DOCX inválido en la posición {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(text)
}
