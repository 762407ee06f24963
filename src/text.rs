//! Review text cleaning and truncation.
//!
//! Reviews arrive as free text mixing English, Romanized Sinhala and Sinhala
//! script, often with URLs and emoji. [`clean`] normalizes a review down to
//! the characters the classifier was trained on; [`truncate_chars`] enforces
//! the model's input limit.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of characters fed to the classifier.
///
/// Text beyond this limit is never seen by the model, and keywords appearing
/// only past the limit are not detected by the refiner.
pub const MAX_CLASSIFY_CHARS: usize = 512;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").unwrap());

// Keeps word characters, whitespace and the Sinhala block (U+0D80..U+0DFF).
static NON_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\x{0D80}-\x{0DFF}]").unwrap());

/// Normalize a raw review for classification.
///
/// Lowercases, strips URLs, removes everything that is not a word character,
/// whitespace or Sinhala script, and collapses whitespace runs. Running it on
/// already-cleaned text is a no-op.
///
/// # Examples
///
/// ```
/// use singlish_sentiment::text::clean;
///
/// let cleaned = clean("Delivery eka NIYAMAI!! http://t.co/x 👍");
/// assert_eq!(cleaned, "delivery eka niyamai");
/// assert_eq!(clean(&cleaned), cleaned);
/// ```
pub fn clean(text: &str) -> String {
    let lowered = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lowered, "");
    let stripped = NON_TEXT_RE.replace_all(&no_urls, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate `text` to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_symbols() {
        assert_eq!(clean("GOOD product!!! 100%"), "good product 100");
    }

    #[test]
    fn strips_urls() {
        assert_eq!(
            clean("check https://example.com/review?id=1 niyamai"),
            "check niyamai"
        );
    }

    #[test]
    fn keeps_sinhala_script() {
        assert_eq!(clean("හොඳයි super!"), "හොඳයි super");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean("  too \t many\n\nspaces  "), "too many spaces");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let raw = "Mehema app ekak!! https://t.co/abc ගොඩක් හොඳයි :)";
        let once = clean(raw);
        assert_eq!(clean(&once), once);
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let s = "හොඳයි"; // 5 chars, 15 bytes
        assert_eq!(truncate_chars(s, 3), "හොඳ");
        assert_eq!(truncate_chars(s, 10), s);
    }

    #[test]
    fn truncate_exact_length_is_noop() {
        assert_eq!(truncate_chars("abcd", 4), "abcd");
    }
}
