pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod pool;
pub mod report;
pub mod stages;
pub mod text;

pub use config::{FeatureSettings, Settings};
pub use error::{DatasetError, Result, VocabularyKind};
pub use features::{FeatureExtractor, LogFrameEnergy, LogMelBands, extractor_by_name};
pub use io::{AudioLoader, WavLoader, load_vocabularies, read_annotations};
pub use models::{
    AnnotationEntry, FeatureRecord, RecordName, RecordNaming, SampleRecord, Vocabularies,
    Vocabulary,
};
pub use pipeline::{
    DatasetSummary, ValidationSummary, create_dataset, extract_dataset_features, validate_dataset,
};
pub use report::{count_split_files, vocabulary_report, words_with_frequency, write_word_list};
pub use text::CaptionPolicy;
