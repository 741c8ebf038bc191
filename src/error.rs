use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Which of the two vocabularies a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyKind {
    Words,
    Characters,
}

impl fmt::Display for VocabularyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabularyKind::Words => write!(f, "words"),
            VocabularyKind::Characters => write!(f, "characters"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("audio file {path:?} does not exist")]
    AudioMissing { path: PathBuf },

    #[error("record {record:?} has wrong audio data: {reason}")]
    AudioCorrupted { record: PathBuf, reason: String },

    #[error("record {record:?} has wrong caption: expected {expected:?}, found {found:?}")]
    CaptionMismatch {
        record: PathBuf,
        expected: String,
        found: String,
    },

    #[error("record {record:?} has wrong word indices: expected {expected:?}, decoded {found:?}")]
    WordIndexMismatch {
        record: PathBuf,
        expected: String,
        found: String,
    },

    #[error(
        "record {record:?} has wrong character indices: expected {expected:?}, decoded {found:?}"
    )]
    CharIndexMismatch {
        record: PathBuf,
        expected: String,
        found: String,
    },

    #[error("record {record:?}: token {token:?} is not in the {kind} vocabulary")]
    OutOfVocabularyToken {
        record: PathBuf,
        token: String,
        kind: VocabularyKind,
    },

    #[error("audio file {file_name:?} has no associated data records")]
    NoDataForAudio { file_name: String },

    #[error("I/O error while {context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error while {context} {path:?}: {source}")]
    Json {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("WAV error in {path:?}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("failed to encode record {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: bincode::error::EncodeError,
    },

    #[error("failed to decode record {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::error::DecodeError,
    },

    #[error("row {row} of {path:?} has no column {column:?}")]
    MissingColumn {
        path: PathBuf,
        row: usize,
        column: String,
    },

    #[error("file name {name:?} does not match the record naming template")]
    InvalidRecordName { name: String },

    #[error("invalid settings: {message}")]
    InvalidSettings { message: String },

    #[error("invalid vocabulary: {message}")]
    InvalidVocabulary { message: String },

    #[error("unknown feature extractor {name:?}")]
    UnknownExtractor { name: String },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl DatasetError {
    pub(crate) fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(context: &'static str, path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_vocabulary(message: impl Into<String>) -> Self {
        Self::InvalidVocabulary {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;
