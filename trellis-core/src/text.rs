//! Text utilities.

/// Truncate a string to `limit` characters without splitting words.
///
/// Returns the input unchanged when it already fits. Otherwise whole leading
/// words are kept while they (plus the `...` suffix) fit within `limit`, and
/// `...` is appended.
///
/// ```
/// use trellis_core::truncate_words;
///
/// assert_eq!(truncate_words("this is a test sentence", 12), "this is a...");
/// assert_eq!(truncate_words("this is a test sentence", 50), "this is a test sentence");
/// ```
pub fn truncate_words(text: &str, limit: usize) -> String {
    const ELLIPSIS_LEN: usize = 3;

    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut kept = String::new();
    let mut kept_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        let separator = usize::from(!kept.is_empty());

        if kept_chars + separator + word_chars + ELLIPSIS_LEN > limit {
            break;
        }

        if separator == 1 {
            kept.push(' ');
        }
        kept.push_str(word);
        kept_chars += separator + word_chars;
    }

    kept.push_str("...");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncates_without_abbreviating_words() {
        let results = [
            truncate_words("this is a test sentence", 12),
            truncate_words("this is a test sentence", 17),
            truncate_words("this is a test sentence", 50),
        ];

        assert_eq!(
            results,
            [
                "this is a...".to_string(),
                "this is a test...".to_string(),
                "this is a test sentence".to_string(),
            ]
        );
    }

    #[test]
    fn test_short_input_is_unchanged() {
        assert_eq!(truncate_words("hello", 5), "hello");
        assert_eq!(truncate_words("", 10), "");
    }

    #[test]
    fn test_limit_too_small_for_any_word() {
        // No word fits, only the ellipsis remains.
        assert_eq!(truncate_words("borderline case", 3), "...");
    }

    proptest! {
        #[test]
        fn prop_output_never_exceeds_limit_when_truncated(
            text in "[a-z ]{0,64}",
            limit in 3usize..32,
        ) {
            let out = truncate_words(&text, limit);
            if out != text {
                prop_assert!(out.chars().count() <= limit);
                prop_assert!(out.ends_with("..."));
            }
        }

        #[test]
        fn prop_kept_prefix_is_whole_words(
            text in "[a-z]{1,8}( [a-z]{1,8}){0,8}",
            limit in 3usize..32,
        ) {
            let out = truncate_words(&text, limit);
            if let Some(kept) = out.strip_suffix("...") {
                let words: Vec<&str> = text.split_whitespace().collect();
                let kept_words: Vec<&str> = kept.split_whitespace().collect();
                prop_assert_eq!(&words[..kept_words.len()], &kept_words[..]);
            }
        }
    }
}
