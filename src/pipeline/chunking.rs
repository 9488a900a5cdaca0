//! Character-offset sliding-window chunker.
//!
//! Chunk boundaries are purely positional: successive windows of `chunk_size` characters
//! starting every `chunk_size - overlap` characters, with no sentence or paragraph
//! awareness. That is a deliberate simplicity/latency tradeoff and the contract callers
//! rely on, not a gap; a boundary-aware splitter would be a separate strategy, never a
//! silent replacement for this one.

use super::types::ChunkingError;

/// Split text into overlapping fixed-size character windows.
///
/// - Windows start at offsets `0, stride, 2 * stride, ...` where `stride` is
///   `chunk_size - overlap`; the final chunk may be shorter than `chunk_size`.
/// - Empty input yields zero chunks.
/// - When `overlap >= chunk_size` the stride would be zero; the function produces exactly
///   one chunk instead of looping.
///
/// Offsets are measured in characters, so multi-byte input never splits inside a code point.
pub(crate) fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let stride = chunk_size.saturating_sub(overlap);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if stride == 0 {
            // overlap >= chunk_size: a zero stride would revisit the same offset forever
            break;
        }
        start += stride;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunks = chunk_text("", 1000, 200).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_input_yields_single_chunk() {
        let chunks = chunk_text("Hello world", 1000, 200).unwrap();
        assert_eq!(chunks, vec!["Hello world"]);
    }

    #[test]
    fn windows_have_exact_size_except_last() {
        let text = "a".repeat(2500);
        let chunks = chunk_text(&text, 1000, 200).unwrap();

        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.chars().count(), 1000);
        }
        assert!(chunks.last().unwrap().chars().count() <= 1000);
    }

    #[test]
    fn overlap_reconstruction_matches_original() {
        let text: String = ('a'..='z').cycle().take(3200).collect();
        let chunk_size = 1000;
        let overlap = 200;
        let chunks = chunk_text(&text, chunk_size, overlap).unwrap();

        // Dropping each chunk's leading overlap and concatenating restores the input.
        let mut rebuilt = String::new();
        for (index, chunk) in chunks.iter().enumerate() {
            if index == 0 {
                rebuilt.push_str(chunk);
            } else {
                rebuilt.extend(chunk.chars().skip(overlap));
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn window_starts_follow_stride() {
        let text: String = ('0'..='9').cycle().take(50).collect();
        let chunks = chunk_text(&text, 20, 5).unwrap();

        let expected: Vec<String> = vec![
            text.chars().take(20).collect(),
            text.chars().skip(15).take(20).collect(),
            text.chars().skip(30).take(20).collect(),
            text.chars().skip(45).collect(),
        ];
        assert_eq!(chunks, expected);
    }

    #[test]
    fn overlap_equal_to_chunk_size_terminates_with_one_chunk() {
        let text = "x".repeat(5000);
        let chunks = chunk_text(&text, 1000, 1000).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chars().count(), 1000);
    }

    #[test]
    fn overlap_greater_than_chunk_size_terminates_with_one_chunk() {
        let chunks = chunk_text("abcdef", 2, 10).unwrap();
        assert_eq!(chunks, vec!["ab"]);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let error = chunk_text("hello", 0, 0).unwrap_err();
        assert!(matches!(error, ChunkingError::InvalidChunkSize));
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "héllo wörld 🚀".repeat(40);
        let chunks = chunk_text(&text, 16, 4).unwrap();
        let rebuilt: String = chunks
            .iter()
            .enumerate()
            .flat_map(|(index, chunk)| chunk.chars().skip(if index == 0 { 0 } else { 4 }))
            .collect();
        assert_eq!(rebuilt, text);
    }
}
