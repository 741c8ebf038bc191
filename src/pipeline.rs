use tracing::info;

use crate::config::{FeatureSettings, Settings};
use crate::error::Result;
use crate::features::extractor_by_name;
use crate::io::{AudioLoader, load_vocabularies, read_annotations};
use crate::models::{AnnotationEntry, collect_captions};
use crate::stages::{
    FeatureResult, MaterializeResult, VerifyResult, build_vocabularies, extract_features,
    materialize_split, verify_split,
};

/// Outcome of [`create_dataset`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub word_vocabulary_size: usize,
    pub character_vocabulary_size: usize,
    pub development: MaterializeResult,
    pub evaluation: MaterializeResult,
}

/// Outcome of [`validate_dataset`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    pub development: VerifyResult,
    pub evaluation: VerifyResult,
}

/// Read the development and evaluation annotation tables
pub fn read_annotation_splits(
    settings: &Settings,
) -> Result<(Vec<AnnotationEntry>, Vec<AnnotationEntry>)> {
    let dir = settings.annotations_dir();
    let development = read_annotations(
        &dir.join(&settings.annotations.development_file),
        &settings.annotations,
    )?;
    let evaluation = read_annotations(
        &dir.join(&settings.annotations.evaluation_file),
        &settings.annotations,
    )?;
    info!(
        "Annotations: {} development, {} evaluation entries",
        development.len(),
        evaluation.len()
    );
    Ok((development, evaluation))
}

/// Build the vocabularies and materialize both splits
///
/// Vocabularies come from the development captions only and are persisted
/// before any worker starts. The evaluation split reuses them unchanged, so
/// an evaluation word never seen in development aborts the run.
pub fn create_dataset(
    settings: &Settings,
    loader: &dyn AudioLoader,
    workers: usize,
) -> Result<DatasetSummary> {
    let (development, evaluation) = read_annotation_splits(settings)?;

    let vocabularies = build_vocabularies(
        &collect_captions(&development),
        &settings.annotations,
        &settings.counters,
        &settings.directories.root_dir,
    )?;

    info!("Creating development split");
    let development_result = materialize_split(
        &development,
        &settings.data_dir_development(),
        &settings.audio_dir_development(),
        &vocabularies,
        settings,
        loader,
        workers,
    )?;

    info!("Creating evaluation split");
    let evaluation_result = materialize_split(
        &evaluation,
        &settings.data_dir_evaluation(),
        &settings.audio_dir_evaluation(),
        &vocabularies,
        settings,
        loader,
        workers,
    )?;

    Ok(DatasetSummary {
        word_vocabulary_size: vocabularies.words.len(),
        character_vocabulary_size: vocabularies.characters.len(),
        development: development_result,
        evaluation: evaluation_result,
    })
}

/// Verify both materialized splits against the annotations and audio
pub fn validate_dataset(
    settings: &Settings,
    loader: &dyn AudioLoader,
    workers: usize,
) -> Result<ValidationSummary> {
    let (development, evaluation) = read_annotation_splits(settings)?;
    let vocabularies = load_vocabularies(&settings.directories.root_dir, &settings.counters)?;

    info!("Validating development split");
    let development_result = verify_split(
        &development,
        &settings.data_dir_development(),
        &settings.audio_dir_development(),
        &vocabularies,
        settings,
        loader,
        workers,
    )?;

    info!("Validating evaluation split");
    let evaluation_result = verify_split(
        &evaluation,
        &settings.data_dir_evaluation(),
        &settings.audio_dir_evaluation(),
        &vocabularies,
        settings,
        loader,
        workers,
    )?;

    Ok(ValidationSummary {
        development: development_result,
        evaluation: evaluation_result,
    })
}

/// Run the configured feature extractor over both materialized splits
pub fn extract_dataset_features(
    settings: &Settings,
    feature_settings: &FeatureSettings,
    workers: usize,
) -> Result<FeatureResult> {
    let extractor = extractor_by_name(&feature_settings.extractor)?;
    extract_features(settings, feature_settings, extractor.as_ref(), workers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatasetError;
    use crate::io::WavLoader;
    use crate::io::audio::tests::write_wav;

    fn write_csv(path: &std::path::Path, rows: &[(&str, &str, &str)]) {
        let mut content = String::from("file_name,caption_1,caption_2\n");
        for (file, c1, c2) in rows {
            content.push_str(&format!("{},{},{}\n", file, c1, c2));
        }
        std::fs::write(path, content).unwrap();
    }

    fn setup(evaluation_caption: &str) -> (tempfile::TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.directories.root_dir = dir.path().to_path_buf();
        settings.annotations.nb_captions = 2;
        settings.audio.sr = 8_000;

        std::fs::create_dir_all(settings.annotations_dir()).unwrap();
        std::fs::create_dir_all(settings.audio_dir_development()).unwrap();
        std::fs::create_dir_all(settings.audio_dir_evaluation()).unwrap();

        write_csv(
            &settings
                .annotations_dir()
                .join(&settings.annotations.development_file),
            &[
                ("rain.wav", "Rain falls.", "Heavy rain falls"),
                ("dog.wav", "A dog barks", "The dog barks loudly!"),
            ],
        );
        write_csv(
            &settings
                .annotations_dir()
                .join(&settings.annotations.evaluation_file),
            &[("storm.wav", evaluation_caption, "Rain falls")],
        );

        let development = settings.audio_dir_development();
        write_wav(&development.join("rain.wav"), &[100, -200, 300, -400], 1, 8_000);
        write_wav(&development.join("dog.wav"), &[5, 6, 7, 8, 9, 10], 1, 8_000);
        let evaluation = settings.audio_dir_evaluation();
        write_wav(&evaluation.join("storm.wav"), &[-1, 1, -1, 1], 1, 8_000);

        (dir, settings)
    }

    #[test]
    fn test_create_then_validate() {
        let (_dir, settings) = setup("Heavy rain");
        let summary = create_dataset(&settings, &WavLoader, 1).unwrap();
        assert_eq!(summary.development.records_written, 4);
        assert_eq!(summary.evaluation.records_written, 2);
        assert!(summary.word_vocabulary_size > 0);

        let validation = validate_dataset(&settings, &WavLoader, 2).unwrap();
        assert_eq!(validation.development.records_checked, 4);
        assert_eq!(validation.evaluation.records_checked, 2);
    }

    #[test]
    fn test_evaluation_word_outside_development_vocabulary() {
        let (_dir, settings) = setup("Thunder rolls");
        let err = create_dataset(&settings, &WavLoader, 1).unwrap_err();
        let expected = settings
            .data_dir_evaluation()
            .join("clotho_file_storm.wav_0.bin");
        assert!(matches!(
            err,
            DatasetError::OutOfVocabularyToken { ref record, ref token, .. }
                if token == "thunder" && *record == expected
        ));
    }

    #[test]
    fn test_extract_dataset_features() {
        let (_dir, settings) = setup("Heavy rain");
        create_dataset(&settings, &WavLoader, 1).unwrap();

        let mut feature_settings = FeatureSettings::default();
        feature_settings.process =
            serde_json::json!({"sr": 8000, "nb_fft": 4, "hop_size": 2, "nb_mels": 2});
        let result = extract_dataset_features(&settings, &feature_settings, 2).unwrap();
        assert_eq!(result.development_records, 4);
        assert_eq!(result.evaluation_records, 2);

        let path = settings
            .directories
            .root_dir
            .join(&feature_settings.output.dir_output)
            .join(&feature_settings.output.dir_development)
            .join("clotho_file_rain.wav_0.bin");
        let record: crate::models::FeatureRecord = crate::io::read_record(&path).unwrap();
        assert!(!record.features.is_empty());
        assert!(record.features.iter().all(|frame| frame.len() == 2));

        feature_settings.extractor = "log_frame_energy".to_string();
        feature_settings.process = serde_json::json!({"frame_length": 2, "hop_size": 1});
        assert!(extract_dataset_features(&settings, &feature_settings, 1).is_ok());

        feature_settings.extractor = "mfcc".to_string();
        assert!(matches!(
            extract_dataset_features(&settings, &feature_settings, 1),
            Err(DatasetError::UnknownExtractor { .. })
        ));
    }
}
