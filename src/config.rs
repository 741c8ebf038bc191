use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DatasetError, Result};

pub const AUDIO_FILE_NAME_PLACEHOLDER: &str = "{audio_file_name}";
pub const CAPTION_INDEX_PLACEHOLDER: &str = "{caption_index}";

/// Dataset creation settings, usually read from a JSON file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub workflow: WorkflowSettings,
    pub directories: DirectorySettings,
    pub annotations: AnnotationSettings,
    pub audio: AudioSettings,
    pub output_files: OutputSettings,
    pub counters: CounterSettings,
    /// Worker processes for materialization and verification (<= 1 runs inline)
    pub nb_workers: usize,
}

/// Which pipeline stages to run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    pub create_dataset: bool,
    pub validate_dataset: bool,
    pub extract_features: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            create_dataset: true,
            validate_dataset: true,
            extract_features: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    pub root_dir: PathBuf,
    pub annotations_dir: PathBuf,
    pub downloaded_audio_dir: PathBuf,
    pub downloaded_audio_development: PathBuf,
    pub downloaded_audio_evaluation: PathBuf,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("data"),
            annotations_dir: PathBuf::from("clotho_csv_files"),
            downloaded_audio_dir: PathBuf::from("clotho_audio_files"),
            downloaded_audio_development: PathBuf::from("development"),
            downloaded_audio_evaluation: PathBuf::from("evaluation"),
        }
    }
}

/// Annotation table layout and caption normalization policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnotationSettings {
    pub development_file: String,
    pub evaluation_file: String,
    pub audio_file_column: String,
    /// Caption column template, `{}` is replaced by the 1-based caption number
    pub captions_fields_prefix: String,
    pub nb_captions: usize,
    pub use_special_tokens: bool,
    pub use_unique_words_per_caption: bool,
    pub keep_case: bool,
    pub remove_punctuation_words: bool,
    pub remove_punctuation_chars: bool,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            development_file: "clotho_captions_development.csv".to_string(),
            evaluation_file: "clotho_captions_evaluation.csv".to_string(),
            audio_file_column: "file_name".to_string(),
            captions_fields_prefix: "caption_{}".to_string(),
            nb_captions: 5,
            use_special_tokens: true,
            use_unique_words_per_caption: false,
            keep_case: false,
            remove_punctuation_words: true,
            remove_punctuation_chars: true,
        }
    }
}

impl AnnotationSettings {
    /// Column names of the caption fields, in caption order
    pub fn caption_fields(&self) -> Vec<String> {
        (1..=self.nb_captions)
            .map(|i| self.captions_fields_prefix.replacen("{}", &i.to_string(), 1))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Target sample rate in Hz
    pub sr: u32,
    pub to_mono: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sr: 44_100,
            to_mono: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir_output: PathBuf,
    pub dir_data_development: String,
    pub dir_data_evaluation: String,
    /// Record file name template without the extension
    pub file_name_template: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir_output: PathBuf::from("data_splits"),
            dir_data_development: "development".to_string(),
            dir_data_evaluation: "evaluation".to_string(),
            file_name_template: "clotho_file_{audio_file_name}_{caption_index}".to_string(),
        }
    }
}

/// File names of the persisted vocabulary artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CounterSettings {
    pub words_list_file_name: String,
    pub words_counter_file_name: String,
    pub characters_list_file_name: String,
    pub characters_frequencies_file_name: String,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            words_list_file_name: "words_list.json".to_string(),
            words_counter_file_name: "words_frequencies.json".to_string(),
            characters_list_file_name: "characters_list.json".to_string(),
            characters_frequencies_file_name: "characters_frequencies.json".to_string(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DatasetError::io("reading settings", path, e))?;
        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| DatasetError::json("parsing settings", path, e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.annotations.nb_captions == 0 {
            return Err(DatasetError::invalid_settings(
                "annotations.nb_captions must be at least 1",
            ));
        }
        if !self.annotations.captions_fields_prefix.contains("{}") {
            return Err(DatasetError::invalid_settings(
                "annotations.captions_fields_prefix must contain `{}`",
            ));
        }
        crate::models::RecordNaming::new(&self.output_files.file_name_template)?;
        Ok(())
    }

    pub fn annotations_dir(&self) -> PathBuf {
        self.directories
            .root_dir
            .join(&self.directories.annotations_dir)
    }

    pub fn audio_dir_development(&self) -> PathBuf {
        self.directories
            .root_dir
            .join(&self.directories.downloaded_audio_dir)
            .join(&self.directories.downloaded_audio_development)
    }

    pub fn audio_dir_evaluation(&self) -> PathBuf {
        self.directories
            .root_dir
            .join(&self.directories.downloaded_audio_dir)
            .join(&self.directories.downloaded_audio_evaluation)
    }

    pub fn data_dir_development(&self) -> PathBuf {
        self.directories
            .root_dir
            .join(&self.output_files.dir_output)
            .join(&self.output_files.dir_data_development)
    }

    pub fn data_dir_evaluation(&self) -> PathBuf {
        self.directories
            .root_dir
            .join(&self.output_files.dir_output)
            .join(&self.output_files.dir_data_evaluation)
    }
}

/// Feature extraction settings, read from their own JSON file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Registered name of the extractor to run
    pub extractor: String,
    pub keep_raw_audio_data: bool,
    /// Extractor-specific parameters
    pub process: serde_json::Value,
    pub output: FeatureOutputSettings,
    /// Only records with this extension are processed
    pub data_files_suffix: String,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            extractor: "log_mel_bands".to_string(),
            keep_raw_audio_data: false,
            process: serde_json::json!({}),
            output: FeatureOutputSettings::default(),
            data_files_suffix: "bin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeatureOutputSettings {
    pub dir_output: PathBuf,
    pub dir_development: String,
    pub dir_evaluation: String,
}

impl Default for FeatureOutputSettings {
    fn default() -> Self {
        Self {
            dir_output: PathBuf::from("data_splits_features"),
            dir_development: "development".to_string(),
            dir_evaluation: "evaluation".to_string(),
        }
    }
}

impl FeatureSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DatasetError::io("reading feature settings", path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| DatasetError::json("parsing feature settings", path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.annotations.nb_captions, 5);
        assert!(settings.annotations.use_special_tokens);
        assert_eq!(settings.audio.sr, 44_100);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_caption_fields() {
        let settings = AnnotationSettings {
            nb_captions: 3,
            ..Default::default()
        };
        assert_eq!(
            settings.caption_fields(),
            vec!["caption_1", "caption_2", "caption_3"]
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "annotations": {"nb_captions": 2, "keep_case": true},
            "audio": {"sr": 16000}
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.annotations.nb_captions, 2);
        assert!(settings.annotations.keep_case);
        assert!(settings.annotations.remove_punctuation_words);
        assert_eq!(settings.audio.sr, 16_000);
        assert!(settings.audio.to_mono);
    }

    #[test]
    fn test_validate_rejects_zero_captions() {
        let mut settings = Settings::default();
        settings.annotations.nb_captions = 0;
        assert!(matches!(
            settings.validate(),
            Err(DatasetError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_template() {
        let mut settings = Settings::default();
        settings.output_files.file_name_template = "record_{caption_index}".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_split_dirs() {
        let settings = Settings::default();
        assert_eq!(
            settings.data_dir_development(),
            PathBuf::from("data/data_splits/development")
        );
        assert_eq!(
            settings.audio_dir_evaluation(),
            PathBuf::from("data/clotho_audio_files/evaluation")
        );
    }
}
