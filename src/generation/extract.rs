// src/generation/extract.rs

use std::path::Path;

use regex::Regex;

use crate::error::AppError;

/// Fragments shorter than this are discarded by the sentence splitter.
const MIN_SENTENCE_CHARS: usize = 20;

/// Decodes an uploaded document into plain text, dispatching on the file
/// extension. Unsupported extensions fail before any parsing is attempted.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        // Invalid byte sequences are replaced, never fatal.
        "txt" | "md" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "pdf" => extract_pdf(bytes),
        "docx" => extract_docx(bytes),
        _ => Err(AppError::BadRequest(
            "Unsupported file type; upload .txt, .md, .pdf or .docx".to_string(),
        )),
    }
}

/// Page-by-page PDF extraction. A page that fails to extract contributes an
/// empty string instead of aborting the whole document.
fn extract_pdf(bytes: &[u8]) -> Result<String, AppError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| {
        tracing::warn!("Failed to load PDF: {}", e);
        AppError::BadRequest("Could not parse this document format".to_string())
    })?;

    let mut pages = Vec::new();
    for (page_no, _) in doc.get_pages() {
        match doc.extract_text(&[page_no]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                tracing::warn!("PDF text extraction failed on page {}: {}", page_no, e);
                pages.push(String::new());
            }
        }
    }

    Ok(pages.join("\n"))
}

/// Joins the text of every paragraph in a Word document.
fn extract_docx(bytes: &[u8]) -> Result<String, AppError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| {
        tracing::warn!("Failed to read docx: {:?}", e);
        AppError::BadRequest("Could not parse this document format".to_string())
    })?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            let mut text = String::new();
            for pc in &paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = pc {
                    for rc in &run.children {
                        if let docx_rs::RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            if !text.trim().is_empty() {
                paragraphs.push(text);
            }
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Splits plain text into candidate sentences: terminator followed by
/// whitespace, trimmed, short fragments dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let boundary = Regex::new(r"[.!?]\s+").unwrap();

    boundary
        .split(text)
        .map(|frag| frag.trim().trim_end_matches(['.', '!', '?']).trim().to_string())
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_decodes_with_replacement() {
        let bytes = b"Rust compiles to native code. \xFF\xFE It also has a borrow checker.";
        let text = extract_text("notes.txt", bytes).unwrap();
        assert!(text.contains("Rust compiles to native code"));
        assert!(text.contains("borrow checker"));
        // The invalid bytes were replaced, not dropped as an error.
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn markdown_is_treated_as_plain_text() {
        let text = extract_text("readme.md", b"# Title\n\nSome body text here.").unwrap();
        assert!(text.contains("Some body text here."));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_parsing() {
        let err = extract_text("slides.pptx", b"anything").unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.contains("Unsupported file type")),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn missing_extension_is_rejected() {
        assert!(extract_text("README", b"text").is_err());
    }

    #[test]
    fn corrupt_pdf_reports_parse_failure() {
        let err = extract_text("broken.pdf", b"not a pdf at all").unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.contains("Could not parse")),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn sentences_split_on_terminator_plus_whitespace() {
        let text = "The borrow checker enforces aliasing rules. Short. \
                    Lifetimes describe how long references remain valid! \
                    Is the trait system based on type classes? Yes";
        let sentences = split_sentences(text);
        assert_eq!(
            sentences,
            vec![
                "The borrow checker enforces aliasing rules",
                "Lifetimes describe how long references remain valid",
                "Is the trait system based on type classes",
            ]
        );
    }

    #[test]
    fn fragments_under_twenty_chars_are_discarded() {
        let sentences = split_sentences("Tiny. Also tiny here. This one is comfortably long enough.");
        assert_eq!(
            sentences,
            vec!["This one is comfortably long enough"]
        );
    }

    #[test]
    fn no_survivors_yields_empty_list() {
        assert!(split_sentences("a. b. c.").is_empty());
        assert!(split_sentences("").is_empty());
    }
}
