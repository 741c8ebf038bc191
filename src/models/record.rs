use serde::{Deserialize, Serialize};

use crate::config::{AUDIO_FILE_NAME_PLACEHOLDER, CAPTION_INDEX_PLACEHOLDER};
use crate::error::{DatasetError, Result};

use super::annotation::file_stem;

/// Extension of every record file
pub const RECORD_EXTENSION: &str = "bin";

/// One materialized (clip, caption) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Source audio file name
    pub file_name: String,
    /// Decoded audio samples
    pub audio_data: Vec<f32>,
    /// Stored caption text, markers included when enabled
    pub caption: String,
    /// 0-based position of the caption among the clip's captions
    pub caption_index: usize,
    /// Word vocabulary indices
    pub words_indices: Vec<usize>,
    /// Character vocabulary indices
    pub chars_indices: Vec<usize>,
}

/// A record rewritten by the feature stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub file_name: String,
    /// Raw audio, only when the feature settings keep it
    pub audio_data: Option<Vec<f32>>,
    /// Feature frames, one inner vector per frame
    pub features: Vec<Vec<f32>>,
    pub caption: String,
    pub caption_index: usize,
    pub words_indices: Vec<usize>,
    pub chars_indices: Vec<usize>,
}

impl FeatureRecord {
    pub fn from_sample(
        record: SampleRecord,
        features: Vec<Vec<f32>>,
        keep_raw_audio: bool,
    ) -> Self {
        Self {
            file_name: record.file_name,
            audio_data: keep_raw_audio.then_some(record.audio_data),
            features,
            caption: record.caption,
            caption_index: record.caption_index,
            words_indices: record.words_indices,
            chars_indices: record.chars_indices,
        }
    }
}

/// Parsed record file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordName {
    pub audio_file_name: String,
    pub caption_index: usize,
}

impl RecordName {
    /// Audio file name without its extension
    pub fn clip_stem(&self) -> String {
        file_stem(&self.audio_file_name)
    }
}

/// Renders and parses record file names from a template such as
/// `clotho_file_{audio_file_name}_{caption_index}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNaming {
    prefix: String,
    separator: String,
    suffix: String,
}

impl RecordNaming {
    pub fn new(template: &str) -> Result<Self> {
        let audio_pos = template.find(AUDIO_FILE_NAME_PLACEHOLDER).ok_or_else(|| {
            DatasetError::invalid_settings(format!(
                "record template {:?} lacks {}",
                template, AUDIO_FILE_NAME_PLACEHOLDER
            ))
        })?;
        let index_pos = template.find(CAPTION_INDEX_PLACEHOLDER).ok_or_else(|| {
            DatasetError::invalid_settings(format!(
                "record template {:?} lacks {}",
                template, CAPTION_INDEX_PLACEHOLDER
            ))
        })?;

        let audio_end = audio_pos + AUDIO_FILE_NAME_PLACEHOLDER.len();
        if index_pos < audio_end {
            return Err(DatasetError::invalid_settings(format!(
                "record template {:?} must place {} after {}",
                template, CAPTION_INDEX_PLACEHOLDER, AUDIO_FILE_NAME_PLACEHOLDER
            )));
        }

        let separator = &template[audio_end..index_pos];
        if separator.is_empty() || separator.chars().any(|c| c.is_ascii_digit()) {
            return Err(DatasetError::invalid_settings(format!(
                "record template {:?} needs a non-numeric separator between placeholders",
                template
            )));
        }

        Ok(Self {
            prefix: template[..audio_pos].to_string(),
            separator: separator.to_string(),
            suffix: template[index_pos + CAPTION_INDEX_PLACEHOLDER.len()..].to_string(),
        })
    }

    /// File name of the record for one caption of one clip
    pub fn file_name(&self, audio_file_name: &str, caption_index: usize) -> String {
        format!(
            "{}{}{}{}{}.{}",
            self.prefix,
            audio_file_name,
            self.separator,
            caption_index,
            self.suffix,
            RECORD_EXTENSION
        )
    }

    /// Recover `(audio file name, caption index)` from a record file name
    pub fn parse(&self, file_name: &str) -> Result<RecordName> {
        let invalid = || DatasetError::InvalidRecordName {
            name: file_name.to_string(),
        };

        let body = file_name
            .strip_suffix(RECORD_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .and_then(|s| s.strip_suffix(self.suffix.as_str()))
            .and_then(|s| s.strip_prefix(self.prefix.as_str()))
            .ok_or_else(invalid)?;

        let (audio_file_name, index) = body
            .rsplit_once(self.separator.as_str())
            .ok_or_else(invalid)?;
        if audio_file_name.is_empty()
            || index.is_empty()
            || !index.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let caption_index = index.parse().map_err(|_| invalid())?;

        Ok(RecordName {
            audio_file_name: audio_file_name.to_string(),
            caption_index,
        })
    }
}
