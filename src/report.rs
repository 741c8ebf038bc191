use std::io::Write;
use std::path::Path;

use crate::error::{DatasetError, Result};
use crate::io::list_files_with_extension;
use crate::models::{RECORD_EXTENSION, Vocabularies, Vocabulary};

/// Summary of a dataset's vocabularies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyReport {
    pub word_count: usize,
    pub character_count: usize,
    /// Total word occurrences across all captions
    pub word_occurrences: u64,
    /// Most frequent words, ties broken by vocabulary index
    pub most_frequent: Vec<(String, u64)>,
}

pub fn vocabulary_report(vocabularies: &Vocabularies, top: usize) -> VocabularyReport {
    let words = &vocabularies.words;
    let mut ranked: Vec<(usize, u64)> = words.frequencies().iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    VocabularyReport {
        word_count: words.len(),
        character_count: vocabularies.characters.len(),
        word_occurrences: words.frequencies().iter().sum(),
        most_frequent: ranked
            .into_iter()
            .take(top)
            .map(|(i, freq)| (words.tokens()[i].clone(), freq))
            .collect(),
    }
}

/// Tokens occurring exactly `frequency` times, sorted
pub fn words_with_frequency(vocabulary: &Vocabulary, frequency: u64) -> Vec<String> {
    let mut words: Vec<String> = vocabulary
        .tokens()
        .iter()
        .zip(vocabulary.frequencies())
        .filter(|(_, f)| **f == frequency)
        .map(|(w, _)| w.clone())
        .collect();
    words.sort();
    words
}

/// Write one word per line
pub fn write_word_list(path: &Path, words: &[String]) -> Result<()> {
    let mut file =
        std::fs::File::create(path).map_err(|e| DatasetError::io("creating", path, e))?;
    write!(file, "{}", words.join("\n")).map_err(|e| DatasetError::io("writing", path, e))
}

/// Number of audio files and record files of one split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitFileCounts {
    pub audio_files: usize,
    pub record_files: usize,
}

pub fn count_split_files(audio_dir: &Path, data_dir: &Path) -> Result<SplitFileCounts> {
    let audio_files = std::fs::read_dir(audio_dir)
        .map_err(|e| DatasetError::io("listing", audio_dir, e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .count();
    let record_files = list_files_with_extension(data_dir, RECORD_EXTENSION)?.len();

    Ok(SplitFileCounts {
        audio_files,
        record_files,
    })
}
