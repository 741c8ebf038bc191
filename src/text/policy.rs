use crate::config::AnnotationSettings;

use super::normalize::{NormalizeOptions, prepare_caption, tokenize_chars, tokenize_words};

/// Word and character tokenization rules derived from the annotation settings
///
/// Vocabulary construction, materialization and verification all go through
/// the same policy so the three stages cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionPolicy {
    pub words: NormalizeOptions,
    pub chars: NormalizeOptions,
    pub unique_words: bool,
    pub special_tokens: bool,
}

impl CaptionPolicy {
    pub fn from_settings(settings: &AnnotationSettings) -> Self {
        Self {
            words: NormalizeOptions {
                keep_case: settings.keep_case,
                strip_punctuation: settings.remove_punctuation_words,
                strip_special_tokens: !settings.use_special_tokens,
            },
            chars: NormalizeOptions {
                keep_case: settings.keep_case,
                strip_punctuation: settings.remove_punctuation_chars,
                strip_special_tokens: true,
            },
            unique_words: settings.use_unique_words_per_caption,
            special_tokens: settings.use_special_tokens,
        }
    }

    /// Caption text as stored in a record
    pub fn caption_text(&self, raw: &str) -> String {
        prepare_caption(raw, self.special_tokens)
    }

    /// Word tokens of a stored caption
    pub fn words(&self, caption: &str) -> Vec<String> {
        tokenize_words(caption, self.unique_words, self.words)
    }

    /// Character tokens of a stored caption, markers included when enabled
    pub fn chars(&self, caption: &str) -> Vec<String> {
        tokenize_chars(caption, self.chars, self.special_tokens)
    }

    /// Character tokens without the start/end markers
    pub fn plain_chars(&self, caption: &str) -> Vec<String> {
        tokenize_chars(caption, self.chars, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_tokens_kept_as_words() {
        let policy = CaptionPolicy::from_settings(&AnnotationSettings::default());
        let caption = policy.caption_text("A dog barks.");
        assert_eq!(caption, "<sos> A dog barks. <eos>");
        assert_eq!(policy.words(&caption), vec!["<sos>", "a", "dog", "barks", "<eos>"]);
    }

    #[test]
    fn test_special_tokens_bracket_chars_regardless_of_case() {
        for keep_case in [false, true] {
            let settings = AnnotationSettings {
                keep_case,
                remove_punctuation_chars: false,
                ..Default::default()
            };
            let policy = CaptionPolicy::from_settings(&settings);
            let chars = policy.chars(&policy.caption_text("a"));
            assert_eq!(chars.first().map(String::as_str), Some("<sos>"));
            assert_eq!(chars.last().map(String::as_str), Some("<eos>"));
            assert_eq!(chars.len(), 3);
        }
    }

    #[test]
    fn test_without_special_tokens() {
        let settings = AnnotationSettings {
            use_special_tokens: false,
            ..Default::default()
        };
        let policy = CaptionPolicy::from_settings(&settings);
        let caption = policy.caption_text("Rain.");
        assert_eq!(caption, "Rain.");
        assert_eq!(policy.words(&caption), vec!["rain"]);
        assert_eq!(policy.chars(&caption), vec!["r", "a", "i", "n"]);
    }
}
