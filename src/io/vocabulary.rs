use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::CounterSettings;
use crate::error::{DatasetError, Result, VocabularyKind};
use crate::models::{Vocabularies, Vocabulary};

/// Persist the four vocabulary artifacts under `dir`
pub fn write_vocabularies(
    dir: &Path,
    files: &CounterSettings,
    vocabularies: &Vocabularies,
) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| DatasetError::io("creating", dir, e))?;

    write_json(
        &dir.join(&files.words_list_file_name),
        vocabularies.words.tokens(),
    )?;
    write_json(
        &dir.join(&files.words_counter_file_name),
        vocabularies.words.frequencies(),
    )?;
    write_json(
        &dir.join(&files.characters_list_file_name),
        vocabularies.characters.tokens(),
    )?;
    write_json(
        &dir.join(&files.characters_frequencies_file_name),
        vocabularies.characters.frequencies(),
    )?;
    Ok(())
}

/// Load the vocabularies written by [`write_vocabularies`]
pub fn load_vocabularies(dir: &Path, files: &CounterSettings) -> Result<Vocabularies> {
    let words = Vocabulary::from_parts(
        VocabularyKind::Words,
        read_json(&dir.join(&files.words_list_file_name))?,
        read_json(&dir.join(&files.words_counter_file_name))?,
    )?;
    let characters = Vocabulary::from_parts(
        VocabularyKind::Characters,
        read_json(&dir.join(&files.characters_list_file_name))?,
        read_json(&dir.join(&files.characters_frequencies_file_name))?,
    )?;
    Ok(Vocabularies { words, characters })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| DatasetError::io("creating", path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| DatasetError::json("writing", path, e))?;
    writer
        .flush()
        .map_err(|e| DatasetError::io("writing", path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).map_err(|e| DatasetError::io("reading", path, e))?;
    serde_json::from_str(&content).map_err(|e| DatasetError::json("parsing", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabularies_reload_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let files = CounterSettings::default();
        let mut vocabularies = Vocabularies::new();
        for word in ["<sos>", "a", "dog", "a", "<eos>"] {
            vocabularies.words.observe(word);
        }
        for c in ["a", " ", "d", "o", "g"] {
            vocabularies.characters.observe(c);
        }
        vocabularies.characters.observe_n("<sos>", 1);

        write_vocabularies(dir.path(), &files, &vocabularies).unwrap();
        for name in [
            &files.words_list_file_name,
            &files.words_counter_file_name,
            &files.characters_list_file_name,
            &files.characters_frequencies_file_name,
        ] {
            assert!(dir.path().join(name).exists());
        }

        let loaded = load_vocabularies(dir.path(), &files).unwrap();
        assert_eq!(loaded, vocabularies);
        assert_eq!(loaded.words.get_index("dog"), Some(2));
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_vocabularies(dir.path(), &CounterSettings::default());
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
