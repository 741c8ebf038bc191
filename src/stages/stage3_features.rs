use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{FeatureSettings, Settings};
use crate::error::{DatasetError, Result};
use crate::features::FeatureExtractor;
use crate::io::{list_files_with_extension, read_record, write_record};
use crate::models::{FeatureRecord, SampleRecord};
use crate::pool;

/// Result of the feature stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureResult {
    /// Records rewritten into the development feature dir
    pub development_records: usize,
    /// Records rewritten into the evaluation feature dir
    pub evaluation_records: usize,
}

/// One record to rewrite and the directory it goes to
#[derive(Debug, Clone)]
struct FeatureJob {
    source: PathBuf,
    output_dir: PathBuf,
}

/// Run a feature extractor over every materialized record
///
/// Records are read from both split dirs and written under the same file
/// name to the matching feature output dir. Source records are untouched.
pub fn extract_features(
    settings: &Settings,
    feature_settings: &FeatureSettings,
    extractor: &dyn FeatureExtractor,
    workers: usize,
) -> Result<FeatureResult> {
    let output_root = settings
        .directories
        .root_dir
        .join(&feature_settings.output.dir_output);
    let splits = [
        (
            settings.data_dir_development(),
            output_root.join(&feature_settings.output.dir_development),
        ),
        (
            settings.data_dir_evaluation(),
            output_root.join(&feature_settings.output.dir_evaluation),
        ),
    ];

    let mut jobs = Vec::new();
    let mut counts = [0usize; 2];
    for (count, (data_dir, output_dir)) in counts.iter_mut().zip(splits.iter()) {
        std::fs::create_dir_all(output_dir)
            .map_err(|e| DatasetError::io("creating", output_dir, e))?;
        let files = list_files_with_extension(data_dir, &feature_settings.data_files_suffix)?;
        *count = files.len();
        jobs.extend(files.into_iter().map(|source| FeatureJob {
            source,
            output_dir: output_dir.clone(),
        }));
    }

    info!(
        "Extracting {} features for {} records",
        extractor.name(),
        jobs.len()
    );

    pool::run(
        |job| extract_record(job, extractor, feature_settings),
        &jobs,
        workers,
    )?;

    Ok(FeatureResult {
        development_records: counts[0],
        evaluation_records: counts[1],
    })
}

fn extract_record(
    job: &FeatureJob,
    extractor: &dyn FeatureExtractor,
    feature_settings: &FeatureSettings,
) -> Result<()> {
    let record: SampleRecord = read_record(&job.source)?;
    let features = extractor.extract(&record.audio_data, &feature_settings.process)?;
    let output = FeatureRecord::from_sample(record, features, feature_settings.keep_raw_audio_data);

    let file_name = job
        .source
        .file_name()
        .ok_or_else(|| DatasetError::InvalidRecordName {
            name: job.source.display().to_string(),
        })?;
    let path = job.output_dir.join(file_name);
    write_record(&path, &output)?;

    debug!("{:?}: {} frames", path, output.features.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::LogFrameEnergy;

    fn sample(caption_index: usize) -> SampleRecord {
        SampleRecord {
            file_name: "rain.wav".to_string(),
            audio_data: vec![0.1, -0.4, 0.2, 0.3, -0.1, 0.0],
            caption: "<sos> rain <eos>".to_string(),
            caption_index,
            words_indices: vec![0, 1, 2],
            chars_indices: vec![5, 0, 1, 2, 3, 6],
        }
    }

    #[test]
    fn test_extract_features_routes_splits() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.directories.root_dir = dir.path().to_path_buf();

        let dev = settings.data_dir_development();
        let eva = settings.data_dir_evaluation();
        std::fs::create_dir_all(&dev).unwrap();
        std::fs::create_dir_all(&eva).unwrap();
        write_record(&dev.join("clotho_file_rain.wav_0.bin"), &sample(0)).unwrap();
        write_record(&dev.join("clotho_file_rain.wav_1.bin"), &sample(1)).unwrap();
        write_record(&eva.join("clotho_file_rain.wav_0.bin"), &sample(0)).unwrap();

        let feature_settings = FeatureSettings {
            keep_raw_audio_data: true,
            process: serde_json::json!({"frame_length": 4, "hop_size": 2}),
            ..Default::default()
        };

        let result = extract_features(&settings, &feature_settings, &LogFrameEnergy, 2).unwrap();
        assert_eq!(result.development_records, 2);
        assert_eq!(result.evaluation_records, 1);

        let out: FeatureRecord = read_record(
            &dir.path()
                .join("data_splits_features/development/clotho_file_rain.wav_1.bin"),
        )
        .unwrap();
        assert_eq!(out.caption_index, 1);
        assert_eq!(out.features.len(), 2);
        assert_eq!(out.audio_data, Some(sample(1).audio_data));
        assert_eq!(out.chars_indices, sample(1).chars_indices);

        assert!(dir
            .path()
            .join("data_splits_features/evaluation/clotho_file_rain.wav_0.bin")
            .exists());
    }
}
