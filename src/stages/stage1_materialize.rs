use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{DatasetError, Result};
use crate::io::{AudioLoader, write_record};
use crate::models::{AnnotationEntry, RecordNaming, SampleRecord, Vocabularies};
use crate::pool;
use crate::text::CaptionPolicy;

/// Result of materializing one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeResult {
    /// Number of annotation entries processed
    pub entries: usize,
    /// Number of record files written
    pub records_written: usize,
}

/// Shared read-only state handed to every materialization task
struct SplitContext<'a> {
    output_dir: &'a Path,
    audio_dir: &'a Path,
    vocabularies: &'a Vocabularies,
    policy: CaptionPolicy,
    naming: RecordNaming,
    settings: &'a Settings,
    loader: &'a dyn AudioLoader,
}

/// Materialize one split: one record file per (clip, caption)
///
/// Runs one task per annotation entry so each clip is decoded once. Every
/// word and character must already be in the vocabularies; an unknown token
/// aborts the run. Re-running with the same inputs rewrites identical files.
pub fn materialize_split(
    entries: &[AnnotationEntry],
    output_dir: &Path,
    audio_dir: &Path,
    vocabularies: &Vocabularies,
    settings: &Settings,
    loader: &dyn AudioLoader,
    workers: usize,
) -> Result<MaterializeResult> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| DatasetError::io("creating", output_dir, e))?;

    let context = SplitContext {
        output_dir,
        audio_dir,
        vocabularies,
        policy: CaptionPolicy::from_settings(&settings.annotations),
        naming: RecordNaming::new(&settings.output_files.file_name_template)?,
        settings,
        loader,
    };

    info!(
        "Materializing {} entries from {:?} into {:?}",
        entries.len(),
        audio_dir,
        output_dir
    );

    let written = AtomicUsize::new(0);
    pool::run(
        |entry| {
            let count = materialize_entry(entry, &context)?;
            written.fetch_add(count, Ordering::Relaxed);
            Ok(())
        },
        entries,
        workers,
    )?;

    let result = MaterializeResult {
        entries: entries.len(),
        records_written: written.into_inner(),
    };
    info!("Wrote {} records", result.records_written);
    Ok(result)
}

fn materialize_entry(entry: &AnnotationEntry, context: &SplitContext<'_>) -> Result<usize> {
    let audio_path = context.audio_dir.join(&entry.audio_file_name);
    if !audio_path.is_file() {
        return Err(DatasetError::AudioMissing { path: audio_path });
    }

    let audio = context.loader.load(
        &audio_path,
        context.settings.audio.sr,
        context.settings.audio.to_mono,
    )?;

    for (caption_index, raw_caption) in entry.captions.iter().enumerate() {
        let path = context
            .output_dir
            .join(context.naming.file_name(&entry.audio_file_name, caption_index));
        let record = build_record(
            entry,
            caption_index,
            raw_caption,
            &audio,
            context.vocabularies,
            &context.policy,
            &path,
        )?;
        write_record(&path, &record)?;
    }

    debug!(
        "{}: {} records, {} samples",
        entry.audio_file_name,
        entry.captions.len(),
        audio.len()
    );
    Ok(entry.captions.len())
}

/// Assemble the record of one caption
///
/// `record_path` is where the record will be written; unknown tokens are
/// reported against it.
pub fn build_record(
    entry: &AnnotationEntry,
    caption_index: usize,
    raw_caption: &str,
    audio: &[f32],
    vocabularies: &Vocabularies,
    policy: &CaptionPolicy,
    record_path: &Path,
) -> Result<SampleRecord> {
    let caption = policy.caption_text(raw_caption);
    let words_indices = vocabularies
        .words
        .encode(&policy.words(&caption), record_path)?;
    let chars_indices = vocabularies
        .characters
        .encode(&policy.chars(&caption), record_path)?;

    Ok(SampleRecord {
        file_name: entry.audio_file_name.clone(),
        audio_data: audio.to_vec(),
        caption,
        caption_index,
        words_indices,
        chars_indices,
    })
}
