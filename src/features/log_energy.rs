use serde::Deserialize;

use super::{FeatureExtractor, FeatureFrames};
use crate::error::{DatasetError, Result};

/// Log mean energy per frame of the peak-normalized signal
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFrameEnergy;

impl LogFrameEnergy {
    pub const NAME: &'static str = "log_frame_energy";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct LogFrameEnergyParams {
    frame_length: usize,
    hop_size: usize,
}

impl Default for LogFrameEnergyParams {
    fn default() -> Self {
        Self {
            frame_length: 1024,
            hop_size: 512,
        }
    }
}

impl FeatureExtractor for LogFrameEnergy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extract(&self, samples: &[f32], params: &serde_json::Value) -> Result<FeatureFrames> {
        let params: LogFrameEnergyParams = if params.is_null() {
            LogFrameEnergyParams::default()
        } else {
            serde_json::from_value(params.clone()).map_err(|e| {
                DatasetError::invalid_settings(format!("{} parameters: {}", Self::NAME, e))
            })?
        };
        if params.frame_length == 0 || params.hop_size == 0 {
            return Err(DatasetError::invalid_settings(format!(
                "{} needs non-zero frame_length and hop_size",
                Self::NAME
            )));
        }

        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let gain = if peak > 0.0 { 1.0 / peak } else { 1.0 };

        // A signal shorter than one frame still yields one (partial) frame
        let frames = 1 + samples.len().saturating_sub(params.frame_length) / params.hop_size;

        Ok((0..frames)
            .map(|i| {
                let start = i * params.hop_size;
                let end = (start + params.frame_length).min(samples.len());
                let energy = samples[start..end]
                    .iter()
                    .map(|s| (s * gain).powi(2))
                    .sum::<f32>()
                    / params.frame_length as f32;
                vec![(energy + f32::EPSILON).ln()]
            })
            .collect())
    }
}
