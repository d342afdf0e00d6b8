//! Cleanup of raw model output
//!
//! The model is asked to finish every answer with [`END_MARKER`]. Anything
//! from the marker on is dropped, then the text is cut back to its last
//! complete sentence so a reply clipped by the token limit does not end
//! mid-word. Text without any sentence terminator is kept whole.

#[cfg(test)]
mod proptests;

/// Sentinel the model emits at the true end of its answer
pub const END_MARKER: &str = "<END>";

/// Latin, Arabic and full-width sentence terminators
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '؟', '؛', '…', '！', '？'];

/// Strip the end marker, then trim to the last complete sentence.
///
/// Idempotent: running it on its own output changes nothing.
pub fn postprocess(raw: &str) -> String {
    trim_to_last_sentence(strip_end_marker(raw)).to_string()
}

/// Keep only the text before the first end marker, trimmed.
/// Text without a marker is returned unchanged.
pub fn strip_end_marker(text: &str) -> &str {
    text.split_once(END_MARKER)
        .map_or(text, |(before, _)| before.trim())
}

/// Cut after the last sentence terminator and trim.
/// Without any terminator the whole text is returned trimmed.
pub fn trim_to_last_sentence(text: &str) -> &str {
    let end = text
        .char_indices()
        .rev()
        .find(|(_, c)| SENTENCE_TERMINATORS.contains(c))
        .map(|(idx, c)| idx + c.len_utf8());

    match end.and_then(|end| text.get(..end)) {
        Some(sentence) => sentence.trim(),
        None => text.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_and_tail_removed() {
        assert_eq!(postprocess("hello world.<END> extra"), "hello world.");
    }

    #[test]
    fn test_only_first_marker_counts() {
        assert_eq!(postprocess("one. <END> two. <END> three."), "one.");
    }

    #[test]
    fn test_no_terminator_falls_back_to_whole_text() {
        assert_eq!(postprocess("no punctuation here"), "no punctuation here");
        assert_eq!(postprocess("  padded  \n"), "padded");
    }

    #[test]
    fn test_trailing_fragment_dropped() {
        assert_eq!(
            postprocess("First sentence. Second one is cut off mid"),
            "First sentence."
        );
    }

    #[test]
    fn test_arabic_terminators() {
        assert_eq!(
            postprocess("هلا والله! شلونك اليوم؟ والله زين بس الجو"),
            "هلا والله! شلونك اليوم؟"
        );
        assert_eq!(postprocess("تمام؛ بعدين نكمل"), "تمام؛");
        assert_eq!(postprocess("يعني…"), "يعني…");
    }

    #[test]
    fn test_marker_before_any_terminator() {
        // Marker wins first, then nothing is left to trim back to
        assert_eq!(postprocess("partial answer <END> Later."), "partial answer");
    }

    #[test]
    fn test_marker_only() {
        assert_eq!(postprocess("<END>"), "");
        assert_eq!(postprocess(""), "");
    }

    #[test]
    fn test_strip_end_marker_passthrough() {
        assert_eq!(strip_end_marker("  untouched  "), "  untouched  ");
    }

    #[test]
    fn test_processed_text_is_stable() {
        for raw in [
            "hello world.<END> extra",
            "مرحبا! كيف الحال",
            "no punctuation here",
            "wait... what",
        ] {
            let once = postprocess(raw);
            assert_eq!(postprocess(&once), once);
        }
    }
}
