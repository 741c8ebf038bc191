pub mod log_energy;
pub mod log_mel;

pub use log_energy::*;
pub use log_mel::*;

use crate::error::{DatasetError, Result};

/// Feature frames of one clip, one inner vector per frame
pub type FeatureFrames = Vec<Vec<f32>>;

/// A pluggable acoustic feature function
///
/// `params` is the free-form `process` object of the feature settings; each
/// extractor reads the keys it understands.
pub trait FeatureExtractor: Send + Sync {
    /// Name the extractor is registered under
    fn name(&self) -> &'static str;

    fn extract(&self, samples: &[f32], params: &serde_json::Value) -> Result<FeatureFrames>;
}

/// Look up a built-in extractor by its registered name
pub fn extractor_by_name(name: &str) -> Result<Box<dyn FeatureExtractor>> {
    match name {
        LogMelBands::NAME => Ok(Box::new(LogMelBands)),
        LogFrameEnergy::NAME => Ok(Box::new(LogFrameEnergy)),
        _ => Err(DatasetError::UnknownExtractor {
            name: name.to_string(),
        }),
    }
}
