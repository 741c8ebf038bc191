use std::collections::HashSet;

/// Marker prepended to captions when special tokens are enabled
pub const SOS_TOKEN: &str = "<sos>";
/// Marker appended to captions when special tokens are enabled
pub const EOS_TOKEN: &str = "<eos>";

/// Characters removed by punctuation stripping
pub const PUNCTUATION: [char; 7] = [',', '.', '!', '?', ';', ':', '"'];

const SPECIAL_MARKERS: [&str; 4] = ["<sos>", "<SOS>", "<eos>", "<EOS>"];

/// Flags controlling [`normalize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    /// Keep the original casing instead of lower-casing everything
    pub keep_case: bool,
    /// Replace punctuation characters with whitespace
    pub strip_punctuation: bool,
    /// Drop the start/end markers
    pub strip_special_tokens: bool,
}

/// Normalize a sentence
///
/// Steps, in order:
/// 1. Lower-case the whole sentence unless `keep_case` is set
/// 2. Drop `<sos>`/`<eos>` markers (either case) if requested
/// 3. Replace punctuation with whitespace if requested
/// 4. Collapse whitespace runs into single spaces and trim
pub fn normalize(sentence: &str, options: NormalizeOptions) -> String {
    let folded = if options.keep_case {
        sentence.to_string()
    } else {
        sentence.to_lowercase()
    };

    let without_specials = if options.strip_special_tokens {
        folded
            .split_whitespace()
            .filter(|word| !SPECIAL_MARKERS.contains(word))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        folded
    };

    let without_punctuation: String = if options.strip_punctuation {
        without_specials
            .chars()
            .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
            .collect()
    } else {
        without_specials
    };

    collapse_whitespace(&without_punctuation)
}

/// Split a normalized sentence into words
///
/// With `unique` set, repeated words are dropped keeping the first occurrence.
pub fn tokenize_words(sentence: &str, unique: bool, options: NormalizeOptions) -> Vec<String> {
    let normalized = normalize(sentence, options);
    let words = normalized.split_whitespace().map(str::to_string);

    if unique {
        let mut seen = HashSet::new();
        words.filter(|w| seen.insert(w.clone())).collect()
    } else {
        words.collect()
    }
}

/// Split a normalized sentence into single-character tokens
///
/// With `with_special_tokens` set the sequence is bracketed by [`SOS_TOKEN`]
/// and [`EOS_TOKEN`], each kept as one multi-character token.
pub fn tokenize_chars(
    sentence: &str,
    options: NormalizeOptions,
    with_special_tokens: bool,
) -> Vec<String> {
    let normalized = normalize(sentence, options);
    let mut tokens = Vec::with_capacity(normalized.len() + 2);

    if with_special_tokens {
        tokens.push(SOS_TOKEN.to_string());
    }
    tokens.extend(normalized.chars().map(String::from));
    if with_special_tokens {
        tokens.push(EOS_TOKEN.to_string());
    }

    tokens
}

/// Turn a raw annotation caption into the caption text stored in records
pub fn prepare_caption(raw: &str, use_special_tokens: bool) -> String {
    let collapsed = collapse_whitespace(raw);
    if use_special_tokens {
        collapse_whitespace(&format!("{} {} {}", SOS_TOKEN, collapsed, EOS_TOKEN))
    } else {
        collapsed
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(
        keep_case: bool,
        strip_punctuation: bool,
        strip_special_tokens: bool,
    ) -> NormalizeOptions {
        NormalizeOptions {
            keep_case,
            strip_punctuation,
            strip_special_tokens,
        }
    }

    #[test]
    fn test_lowercases_unless_keep_case() {
        assert_eq!(normalize("A Dog Barks", opts(false, false, false)), "a dog barks");
        assert_eq!(normalize("A Dog Barks", opts(true, false, false)), "A Dog Barks");
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(
            normalize("Birds sing, loudly; \"then\" stop!", opts(false, true, false)),
            "birds sing loudly then stop"
        );
        assert_eq!(normalize("a,b", opts(false, true, false)), "a b");
    }

    #[test]
    fn test_keeps_punctuation_when_disabled() {
        assert_eq!(normalize("Rain falls.", opts(false, false, false)), "rain falls.");
    }

    #[test]
    fn test_strips_special_tokens_in_both_cases() {
        assert_eq!(normalize("<SOS> a dog <EOS>", opts(true, false, true)), "a dog");
        assert_eq!(normalize("<sos> a dog <eos>", opts(true, false, true)), "a dog");
        assert_eq!(normalize("<SOS> A dog <EOS>", opts(false, false, true)), "a dog");
    }

    #[test]
    fn test_keeps_special_tokens_through_punctuation_stripping() {
        assert_eq!(
            normalize("<sos> a dog, barking. <eos>", opts(false, true, false)),
            "<sos> a dog barking <eos>"
        );
    }

    #[test]
    fn test_empty_caption_with_markers() {
        assert_eq!(normalize("<sos> <eos>", opts(false, true, true)), "");
    }

    #[test]
    fn test_is_pure() {
        let o = opts(false, true, true);
        let sentence = "<sos> The  Wind, howls. <eos>";
        assert_eq!(normalize(sentence, o), normalize(sentence, o));
    }

    #[test]
    fn test_tokenize_words() {
        let words = tokenize_words("A dog, a cat.", false, opts(false, true, true));
        assert_eq!(words, vec!["a", "dog", "a", "cat"]);
    }

    #[test]
    fn test_tokenize_words_unique_keeps_first_occurrence() {
        let words = tokenize_words("b a b c a", true, opts(false, true, true));
        assert_eq!(words, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_tokenize_chars_with_special_tokens() {
        let chars = tokenize_chars("<sos> Ab <eos>", opts(false, true, true), true);
        assert_eq!(chars, vec!["<sos>", "a", "b", "<eos>"]);
    }

    #[test]
    fn test_tokenize_chars_keeps_spaces() {
        let chars = tokenize_chars("a b", opts(false, true, true), false);
        assert_eq!(chars, vec!["a", " ", "b"]);
    }

    #[test]
    fn test_prepare_caption() {
        assert_eq!(prepare_caption("  A  dog barks. ", false), "A dog barks.");
        assert_eq!(prepare_caption("A dog", true), "<sos> A dog <eos>");
        assert_eq!(prepare_caption("", true), "<sos> <eos>");
    }
}
