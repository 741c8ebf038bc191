use std::path::Path;

use tracing::info;

use crate::config::{AnnotationSettings, CounterSettings};
use crate::error::Result;
use crate::io::write_vocabularies;
use crate::models::Vocabularies;
use crate::text::{CaptionPolicy, EOS_TOKEN, SOS_TOKEN};

/// Count word and character vocabularies over raw captions
///
/// Captions are scanned in the order given. Token indices follow first
/// encounter, never alphabetical or frequency order:
/// 1. Words of every caption under the word policy
/// 2. Characters of every caption, markers stripped, under the character policy
/// 3. With special tokens on, `<sos>` and `<eos>` once per caption, appended
///    after all plain characters
pub fn count_vocabularies(captions: &[String], policy: &CaptionPolicy) -> Vocabularies {
    let mut vocabularies = Vocabularies::new();

    let stored: Vec<String> = captions.iter().map(|c| policy.caption_text(c)).collect();

    for caption in &stored {
        for word in policy.words(caption) {
            vocabularies.words.observe(&word);
        }
    }

    for caption in &stored {
        for c in policy.plain_chars(caption) {
            vocabularies.characters.observe(&c);
        }
    }

    if policy.special_tokens {
        let count = stored.len() as u64;
        vocabularies.characters.observe_n(SOS_TOKEN, count);
        vocabularies.characters.observe_n(EOS_TOKEN, count);
    }

    vocabularies
}

/// Build both vocabularies from the development captions and persist them
///
/// The four artifacts (word list, word frequencies, character list,
/// character frequencies) are written to `dir` before returning.
pub fn build_vocabularies(
    captions: &[String],
    settings: &AnnotationSettings,
    files: &CounterSettings,
    dir: &Path,
) -> Result<Vocabularies> {
    let policy = CaptionPolicy::from_settings(settings);
    let vocabularies = count_vocabularies(captions, &policy);

    info!(
        "Vocabularies from {} captions: {} words, {} characters",
        captions.len(),
        vocabularies.words.len(),
        vocabularies.characters.len()
    );

    write_vocabularies(dir, files, &vocabularies)?;
    Ok(vocabularies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_vocabularies;

    fn plain_settings() -> AnnotationSettings {
        AnnotationSettings {
            use_special_tokens: false,
            ..Default::default()
        }
    }

    fn captions(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_encounter_ordering() {
        let policy = CaptionPolicy::from_settings(&plain_settings());
        let vocabularies = count_vocabularies(&captions(&["a b", "b a"]), &policy);

        assert_eq!(vocabularies.words.tokens(), ["a", "b"]);
        assert_eq!(vocabularies.words.frequencies(), [2, 2]);
        assert_eq!(vocabularies.characters.tokens(), ["a", " ", "b"]);
        assert_eq!(vocabularies.characters.frequencies(), [2, 2, 2]);
    }

    #[test]
    fn test_deterministic() {
        let input = captions(&["A dog barks.", "Rain, rain; rain!", "The dog sleeps"]);
        let settings = AnnotationSettings::default();
        let files = CounterSettings::default();
        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();

        let first = build_vocabularies(&input, &settings, &files, first_dir.path()).unwrap();
        let second = build_vocabularies(&input, &settings, &files, second_dir.path()).unwrap();
        assert_eq!(first, second);

        for name in [
            &files.words_list_file_name,
            &files.words_counter_file_name,
            &files.characters_list_file_name,
            &files.characters_frequencies_file_name,
        ] {
            let a = std::fs::read(first_dir.path().join(name)).unwrap();
            let b = std::fs::read(second_dir.path().join(name)).unwrap();
            assert!(!a.is_empty());
            assert_eq!(a, b, "{} differs between runs", name);
        }
    }

    #[test]
    fn test_special_tokens() {
        let policy = CaptionPolicy::from_settings(&AnnotationSettings::default());
        let vocabularies = count_vocabularies(&captions(&["Ab", "b"]), &policy);

        assert_eq!(vocabularies.words.tokens(), ["<sos>", "ab", "<eos>", "b"]);
        assert_eq!(vocabularies.words.frequency("<sos>"), Some(2));
        assert_eq!(vocabularies.characters.tokens(), ["a", "b", "<sos>", "<eos>"]);
        assert_eq!(vocabularies.characters.frequencies(), [1, 2, 2, 2]);
    }

    #[test]
    fn test_punctuation_policies_are_independent() {
        let settings = AnnotationSettings {
            use_special_tokens: false,
            remove_punctuation_words: true,
            remove_punctuation_chars: false,
            ..Default::default()
        };
        let policy = CaptionPolicy::from_settings(&settings);
        let vocabularies = count_vocabularies(&captions(&["a, b."]), &policy);

        assert_eq!(vocabularies.words.tokens(), ["a", "b"]);
        assert_eq!(vocabularies.characters.tokens(), ["a", ",", " ", "b", "."]);
    }

    #[test]
    fn test_empty_captions() {
        let policy = CaptionPolicy::from_settings(&AnnotationSettings::default());
        let vocabularies = count_vocabularies(&[], &policy);
        assert!(vocabularies.words.is_empty());
        assert!(vocabularies.characters.is_empty());
    }

    #[test]
    fn test_build_persists_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let files = CounterSettings::default();
        let built = build_vocabularies(
            &captions(&["A dog barks.", "A cat"]),
            &AnnotationSettings::default(),
            &files,
            dir.path(),
        )
        .unwrap();

        let loaded = load_vocabularies(dir.path(), &files).unwrap();
        assert_eq!(loaded, built);
    }
}
