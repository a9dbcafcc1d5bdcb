//! Fixed-length document splitting.

/// Split `text` into consecutive pieces of at most `max_chunk_size` characters.
///
/// Lengths are counted in Unicode scalar values, so a chunk never ends in the
/// middle of a code point. The pieces are non-overlapping, in document order,
/// and concatenate back to `text` exactly. There is no semantic awareness:
/// sentences and words may be cut.
///
/// The empty string yields no chunks. A `max_chunk_size` of zero is treated
/// as one.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::split_into_chunks;
///
/// let chunks = split_into_chunks("天地玄黄宇宙洪荒", 3);
/// assert_eq!(chunks, vec!["天地玄", "黄宇宙", "洪荒"]);
/// assert_eq!(chunks.concat(), "天地玄黄宇宙洪荒");
///
/// assert_eq!(split_into_chunks("short", 100), vec!["short"]);
/// assert!(split_into_chunks("", 10).is_empty());
/// ```
pub fn split_into_chunks(text: &str, max_chunk_size: usize) -> Vec<&str> {
    let size = max_chunk_size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / size + 1);
    let mut start = 0;

    for (count, (offset, _)) in text.char_indices().enumerate() {
        if count > 0 && count % size == 0 {
            chunks.push(&text[start..offset]);
            start = offset;
        }
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_cover_text_exactly() {
        let text = "The quick brown fox jumps over the lazy dog. 敏捷的棕色狐狸跳过了懒狗。";
        let total = text.chars().count();
        for n in 1..=total + 2 {
            let chunks = split_into_chunks(text, n);
            assert_eq!(chunks.concat(), text, "coverage failed for n={n}");
            assert_eq!(chunks.len(), total.div_ceil(n), "count failed for n={n}");
            assert!(chunks.iter().all(|c| c.chars().count() <= n));
        }
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_empty_chunk() {
        assert_eq!(split_into_chunks("abcdef", 3), vec!["abc", "def"]);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        assert_eq!(split_into_chunks("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_multibyte_boundaries() {
        assert_eq!(split_into_chunks("🐉龙a", 1), vec!["🐉", "龙", "a"]);
    }
}
