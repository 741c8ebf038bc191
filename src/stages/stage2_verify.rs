use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{DatasetError, Result};
use crate::io::{AudioLoader, RecordIndex, index_records, read_record};
use crate::models::{AnnotationEntry, RecordNaming, SampleRecord, Vocabularies};
use crate::pool;
use crate::text::CaptionPolicy;

/// Result of verifying one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyResult {
    /// Number of annotation entries checked
    pub entries: usize,
    /// Number of record files checked
    pub records_checked: usize,
}

struct VerifyContext<'a> {
    audio_dir: &'a Path,
    index: RecordIndex,
    vocabularies: &'a Vocabularies,
    policy: CaptionPolicy,
    settings: &'a Settings,
    loader: &'a dyn AudioLoader,
}

/// Check that every record of a split is faithful to its source
///
/// For every entry:
/// 1. The source audio must still exist
/// 2. At least one record must carry the clip's stem
/// 3. Each record's audio must equal the re-decoded source, sample by sample
/// 4. Each record's caption must equal the source caption re-prepared
/// 5. Word and character indices must decode to the tokenization of the
///    stored caption
///
/// Nothing is written. The first mismatch aborts the run.
pub fn verify_split(
    entries: &[AnnotationEntry],
    data_dir: &Path,
    audio_dir: &Path,
    vocabularies: &Vocabularies,
    settings: &Settings,
    loader: &dyn AudioLoader,
    workers: usize,
) -> Result<VerifyResult> {
    let naming = RecordNaming::new(&settings.output_files.file_name_template)?;
    let context = VerifyContext {
        audio_dir,
        index: index_records(data_dir, &naming)?,
        vocabularies,
        policy: CaptionPolicy::from_settings(&settings.annotations),
        settings,
        loader,
    };

    info!(
        "Verifying {} entries in {:?} against {:?}",
        entries.len(),
        data_dir,
        audio_dir
    );

    let checked = AtomicUsize::new(0);
    pool::run(
        |entry| {
            let count = verify_entry(entry, &context)?;
            checked.fetch_add(count, Ordering::Relaxed);
            Ok(())
        },
        entries,
        workers,
    )?;

    let result = VerifyResult {
        entries: entries.len(),
        records_checked: checked.into_inner(),
    };
    info!("Verified {} records", result.records_checked);
    Ok(result)
}

fn verify_entry(entry: &AnnotationEntry, context: &VerifyContext<'_>) -> Result<usize> {
    let audio_path = context.audio_dir.join(&entry.audio_file_name);
    if !audio_path.is_file() {
        return Err(DatasetError::AudioMissing { path: audio_path });
    }

    let records = context
        .index
        .get(&entry.clip_stem())
        .filter(|records| !records.is_empty())
        .ok_or_else(|| DatasetError::NoDataForAudio {
            file_name: entry.audio_file_name.clone(),
        })?;

    let audio = context.loader.load(
        &audio_path,
        context.settings.audio.sr,
        context.settings.audio.to_mono,
    )?;

    for (path, _) in records {
        let record: SampleRecord = read_record(path)?;
        verify_record(&record, path, entry, &audio, context.vocabularies, &context.policy)?;
    }

    debug!("{}: {} records verified", entry.audio_file_name, records.len());
    Ok(records.len())
}

/// Compare one record against its source entry and decoded audio
pub fn verify_record(
    record: &SampleRecord,
    record_path: &Path,
    entry: &AnnotationEntry,
    source_audio: &[f32],
    vocabularies: &Vocabularies,
    policy: &CaptionPolicy,
) -> Result<()> {
    verify_audio(record, record_path, source_audio)?;
    verify_caption(record, record_path, entry, policy)?;

    // The stored caption matches the source, so it is the reference from here on
    let expected_words = policy.words(&record.caption);
    let decoded_words = vocabularies.words.decode(&record.words_indices);
    if decoded_words.as_deref() != Some(as_strs(&expected_words).as_slice()) {
        return Err(DatasetError::WordIndexMismatch {
            record: record_path.to_path_buf(),
            expected: expected_words.join(" "),
            found: describe_decoded(decoded_words, " "),
        });
    }

    let expected_chars = policy.chars(&record.caption);
    let decoded_chars = vocabularies.characters.decode(&record.chars_indices);
    if decoded_chars.as_deref() != Some(as_strs(&expected_chars).as_slice()) {
        return Err(DatasetError::CharIndexMismatch {
            record: record_path.to_path_buf(),
            expected: expected_chars.concat(),
            found: describe_decoded(decoded_chars, ""),
        });
    }

    Ok(())
}

fn verify_audio(record: &SampleRecord, record_path: &Path, source_audio: &[f32]) -> Result<()> {
    if record.audio_data.len() != source_audio.len() {
        return Err(DatasetError::AudioCorrupted {
            record: record_path.to_path_buf(),
            reason: format!(
                "{} samples stored, source has {}",
                record.audio_data.len(),
                source_audio.len()
            ),
        });
    }

    let mismatch = record
        .audio_data
        .iter()
        .zip(source_audio)
        .position(|(stored, source)| stored.to_bits() != source.to_bits());
    if let Some(i) = mismatch {
        return Err(DatasetError::AudioCorrupted {
            record: record_path.to_path_buf(),
            reason: format!(
                "sample {} is {} but source has {}",
                i, record.audio_data[i], source_audio[i]
            ),
        });
    }

    Ok(())
}

fn verify_caption(
    record: &SampleRecord,
    record_path: &Path,
    entry: &AnnotationEntry,
    policy: &CaptionPolicy,
) -> Result<()> {
    let expected = match entry.caption(record.caption_index) {
        Some(raw) => policy.caption_text(raw),
        None => {
            return Err(DatasetError::CaptionMismatch {
                record: record_path.to_path_buf(),
                expected: format!("one of {} captions", entry.captions.len()),
                found: format!("caption index {}", record.caption_index),
            });
        }
    };

    if record.caption != expected {
        return Err(DatasetError::CaptionMismatch {
            record: record_path.to_path_buf(),
            expected,
            found: record.caption.clone(),
        });
    }
    Ok(())
}

fn as_strs(tokens: &[String]) -> Vec<&str> {
    tokens.iter().map(String::as_str).collect()
}

fn describe_decoded(decoded: Option<Vec<&str>>, separator: &str) -> String {
    decoded
        .map(|tokens| tokens.join(separator))
        .unwrap_or_else(|| "<index out of range>".to_string())
}
