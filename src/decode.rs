//! PDF byte-stream text extraction.
//!
//! Decoding happens before any chunking, embedding, or store call, so a failure here is
//! guaranteed to leave the collection untouched.

use lopdf::Document;
use thiserror::Error;

/// Errors raised while turning an uploaded byte stream into text.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte stream was not a parseable PDF.
    #[error("failed to parse PDF document: {0}")]
    Malformed(String),
    /// The document is encrypted and cannot be read.
    #[error("PDF document is encrypted")]
    Encrypted,
    /// The document parsed, but no readable text remained after trimming.
    #[error("PDF document contains no extractable text")]
    EmptyDocument,
}

/// Extract the full text of a PDF supplied as raw bytes.
///
/// Pages are decoded in document order and joined with newlines; pages without readable
/// text are skipped. Returns [`DecodeError::EmptyDocument`] when the whole document is
/// blank after trimming whitespace.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, DecodeError> {
    let document =
        Document::load_mem(bytes).map_err(|error| DecodeError::Malformed(error.to_string()))?;

    if document.is_encrypted() {
        return Err(DecodeError::Encrypted);
    }

    let mut pages = Vec::new();
    for (page_number, _object_id) in document.get_pages() {
        let text = document
            .extract_text(&[page_number])
            .map_err(|error| DecodeError::Malformed(error.to_string()))?;
        if !text.trim().is_empty() {
            pages.push(text);
        }
    }

    let full_text = pages.join("\n");
    if full_text.trim().is_empty() {
        return Err(DecodeError::EmptyDocument);
    }

    Ok(full_text)
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, extract_pdf_text};

    #[test]
    fn garbage_bytes_are_rejected_as_malformed() {
        let error = extract_pdf_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(error, DecodeError::Malformed(_)));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(extract_pdf_text(&[]).is_err());
    }
}
