//! Fixed-width text splitting with overlap.
//!
//! Windows are measured in characters, stepping forward by
//! `chunk_size - overlap` each time; the final partial window is kept
//! as-is. Operating on `char` boundaries means a window can never split
//! a UTF-8 code point.

/// Split `text` into overlapping fixed-size windows.
///
/// Consecutive chunks share exactly `overlap` characters, except that the
/// last chunk may be shorter than a full window. A text no longer than one
/// window yields a single chunk.
pub fn split_fixed(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    if total == 0 || chunk_size == 0 {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(total);
        chunks.push(chars[start..end].iter().collect());
        if end == total {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Distinct repeating characters so overlap can be checked by content.
    fn sample_text(len: usize) -> String {
        (0..len)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn splits_long_text_into_expected_windows() {
        // window=800, overlap=100, len=1700 -> offsets 0, 700, 1400
        let text = sample_text(1700);
        let chunks = split_fixed(&text, 800, 100);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 800);
        assert_eq!(chunks[1].chars().count(), 800);
        assert_eq!(chunks[2].chars().count(), 300);
    }

    #[test]
    fn chunk_count_matches_ceil_formula() {
        let size = 800;
        let overlap = 100;
        for len in [801, 1500, 1700, 2101, 5000] {
            let text = sample_text(len);
            let chunks = split_fixed(&text, size, overlap);
            let expected = (len - overlap).div_ceil(size - overlap);
            assert_eq!(chunks.len(), expected, "len={}", len);
        }
    }

    #[test]
    fn adjacent_chunks_share_exact_overlap() {
        let text = sample_text(1700);
        let chunks = split_fixed(&text, 800, 100);

        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(700).collect();
            let head: String = pair[1].chars().take(100).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let text = sample_text(300);
        let chunks = split_fixed(&text, 800, 100);
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn exact_window_yields_single_chunk() {
        let text = sample_text(800);
        assert_eq!(split_fixed(&text, 800, 100).len(), 1);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(split_fixed("", 800, 100).is_empty());
    }

    #[test]
    fn multibyte_text_never_panics() {
        let text = "日本語のテキスト。".repeat(40);
        let chunks = split_fixed(&text, 50, 10);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }
}
