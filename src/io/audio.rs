use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::{DatasetError, Result};

/// Decodes an audio file into samples
///
/// Implementations must be deterministic: the same file and parameters
/// always produce the same samples, otherwise verification fails.
pub trait AudioLoader: Send + Sync {
    fn load(&self, path: &Path, sample_rate: u32, mono: bool) -> Result<Vec<f32>>;
}

/// WAV decoder
///
/// Integer PCM is scaled to [-1, 1). Multi-channel audio is averaged when
/// `mono` is requested, otherwise samples stay interleaved. A differing file
/// rate is converted with linear interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavLoader;

impl AudioLoader for WavLoader {
    fn load(&self, path: &Path, sample_rate: u32, mono: bool) -> Result<Vec<f32>> {
        let wav_err = |source| DatasetError::Wav {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = WavReader::open(path).map_err(wav_err)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(wav_err)?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(wav_err)?
            }
        };

        let mut channels = usize::from(spec.channels.max(1));
        let samples = if mono && channels > 1 {
            let mixed = downmix(&samples, channels);
            channels = 1;
            mixed
        } else {
            samples
        };

        if spec.sample_rate == sample_rate {
            Ok(samples)
        } else {
            Ok(resample_linear(&samples, channels, spec.sample_rate, sample_rate))
        }
    }
}

/// Average interleaved channels into one
fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

fn resample_linear(samples: &[f32], channels: usize, from_rate: u32, to_rate: u32) -> Vec<f32> {
    let frames = samples.len() / channels;
    if frames == 0 || from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }

    let out_frames = (frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let step = from_rate as f64 / to_rate as f64;
    let mut out = Vec::with_capacity(out_frames * channels);

    for i in 0..out_frames {
        let position = i as f64 * step;
        let left = (position.floor() as usize).min(frames - 1);
        let right = (left + 1).min(frames - 1);
        let frac = (position - left as f64) as f32;

        for ch in 0..channels {
            let a = samples[left * channels + ch];
            let b = samples[right * channels + ch];
            out.push(a + (b - a) * frac);
        }
    }

    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Write a 16-bit PCM WAV fixture
    pub(crate) fn write_wav(path: &Path, samples: &[i16], channels: u16, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_int_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_wav(&path, &[0, 16384, -16384, 32767], 1, 16_000);

        let samples = WavLoader.load(&path, 16_000, true).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 0.5);
        assert_eq!(samples[2], -0.5);
    }

    #[test]
    fn test_downmix_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, &[16384, 0, -16384, -16384], 2, 16_000);

        let mono = WavLoader.load(&path, 16_000, true).unwrap();
        assert_eq!(mono, vec![0.25, -0.5]);

        let stereo = WavLoader.load(&path, 16_000, false).unwrap();
        assert_eq!(stereo.len(), 4);
    }

    #[test]
    fn test_resample_halves_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_wav(&path, &[0; 100], 1, 16_000);

        let samples = WavLoader.load(&path, 8_000, true).unwrap();
        assert_eq!(samples.len(), 50);
    }

    #[test]
    fn test_load_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_wav(&path, &[1, 200, -3000, 12000, 5], 1, 22_050);

        let a = WavLoader.load(&path, 16_000, true).unwrap();
        let b = WavLoader.load(&path, 16_000, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_file() {
        let result = WavLoader.load(Path::new("/nonexistent/a.wav"), 16_000, true);
        assert!(matches!(result, Err(DatasetError::Wav { .. })));
    }
}
