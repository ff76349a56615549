//! Text extraction from uploaded legal documents.
//!
//! Supports PDF (via lopdf), DOCX (a zip archive of WordprocessingML, read
//! with zip + quick-xml), and plain text. Extraction failures carry a
//! client-facing taxonomy: unsupported types and undecodable bytes are the
//! caller's problem, everything downstream of a successful extraction is
//! not.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("File name has no extension")]
    MissingExtension,
    #[error("Failed to extract {format} text: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },
}

impl ExtractError {
    fn decode(format: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            format,
            message: err.to_string(),
        }
    }
}

/// Result of a successful extraction; also the upload endpoint's response
/// data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub text: String,
    pub file_name: String,
    pub file_type: String,
    pub char_count: usize,
    pub word_count: usize,
}

/// Extract plain text from raw file bytes, dispatching on the extension.
pub fn process(bytes: &[u8], file_name: &str) -> Result<ExtractedDocument, ExtractError> {
    let extension = file_name
        .rsplit('.')
        .next()
        .filter(|ext| !ext.eq_ignore_ascii_case(file_name))
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or(ExtractError::MissingExtension)?;

    info!("Extracting text from {} ({} bytes)", file_name, bytes.len());

    let raw = match extension.as_str() {
        "pdf" => extract_pdf(bytes)?,
        "docx" | "doc" => extract_docx(bytes)?,
        "txt" => extract_txt(bytes),
        other => return Err(ExtractError::UnsupportedType(other.to_string())),
    };

    let text = clean_text(&raw);
    let char_count = text.chars().count();
    let word_count = text.split_whitespace().count();

    debug!(
        "Extracted {} chars / {} words from {}",
        char_count, word_count, file_name
    );

    Ok(ExtractedDocument {
        text,
        file_name: file_name.to_string(),
        file_type: extension,
        char_count,
        word_count,
    })
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::decode("PDF", e))?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut text = String::new();

    for page in page_numbers {
        let page_text = doc
            .extract_text(&[page])
            .map_err(|e| ExtractError::decode("PDF", e))?;
        if !page_text.trim().is_empty() {
            text.push_str(page_text.trim_end());
            text.push_str("\n\n");
        }
    }

    Ok(text)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| ExtractError::decode("DOCX", e))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::decode("DOCX", e))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::decode("DOCX", e))?;

    parse_docx_xml(&xml)
}

/// Pull the `<w:t>` text runs out of WordprocessingML, breaking paragraphs
/// at `</w:p>`.
fn parse_docx_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                let run = e.unescape().map_err(|e| ExtractError::decode("DOCX", e))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractError::decode("DOCX", e)),
        }
    }

    Ok(text)
}

fn extract_txt(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // Not UTF-8: decode as Latin-1, which maps every byte to a char.
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Trim line edges and collapse runs of blank lines to a single paragraph
/// break.
pub fn clean_text(text: &str) -> String {
    let mut cleaned: Vec<&str> = Vec::new();
    let mut prev_empty = false;

    for line in text.lines().map(str::trim) {
        if !line.is_empty() {
            cleaned.push(line);
            prev_empty = false;
        } else if !prev_empty {
            cleaned.push("");
            prev_empty = true;
        }
    }

    cleaned.join("\n").trim().to_string()
}
