use std::f64::consts::PI;

use serde::Deserialize;

use super::{FeatureExtractor, FeatureFrames};
use crate::error::{DatasetError, Result};

/// Log mel-band energies of the peak-normalized signal
///
/// Frames are Hann-windowed and, with `center` set, the signal is zero-padded
/// by half a window on both sides so frame `t` is centered on sample
/// `t * hop_size`. Each frame yields `nb_mels` values `ln(band + eps)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMelBands;

impl LogMelBands {
    pub const NAME: &'static str = "log_mel_bands";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct LogMelParams {
    sr: u32,
    nb_fft: usize,
    hop_size: usize,
    nb_mels: usize,
    f_min: f64,
    /// Upper band edge, Nyquist when absent
    f_max: Option<f64>,
    /// HTK mel formula instead of the Slaney one
    htk: bool,
    /// Exponent applied to the magnitude spectrum
    power: f64,
    /// Scale each filter to unit area (Slaney normalization)
    norm: bool,
    center: bool,
}

impl Default for LogMelParams {
    fn default() -> Self {
        Self {
            sr: 44_100,
            nb_fft: 1024,
            hop_size: 512,
            nb_mels: 64,
            f_min: 0.0,
            f_max: None,
            htk: false,
            power: 1.0,
            norm: true,
            center: true,
        }
    }
}

impl LogMelParams {
    fn parse(params: &serde_json::Value) -> Result<Self> {
        let parsed: Self = if params.is_null() {
            Self::default()
        } else {
            serde_json::from_value(params.clone()).map_err(|e| {
                DatasetError::invalid_settings(format!("{} parameters: {}", LogMelBands::NAME, e))
            })?
        };

        let f_max = parsed.f_max.unwrap_or(f64::from(parsed.sr) / 2.0);
        if parsed.sr == 0 || parsed.nb_fft == 0 || parsed.hop_size == 0 || parsed.nb_mels == 0 {
            return Err(DatasetError::invalid_settings(format!(
                "{} needs non-zero sr, nb_fft, hop_size and nb_mels",
                LogMelBands::NAME
            )));
        }
        if parsed.f_min < 0.0 || f_max <= parsed.f_min {
            return Err(DatasetError::invalid_settings(format!(
                "{} needs 0 <= f_min < f_max, got {} and {}",
                LogMelBands::NAME,
                parsed.f_min,
                f_max
            )));
        }
        Ok(parsed)
    }

    fn f_max(&self) -> f64 {
        self.f_max.unwrap_or(f64::from(self.sr) / 2.0)
    }
}

impl FeatureExtractor for LogMelBands {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extract(&self, samples: &[f32], params: &serde_json::Value) -> Result<FeatureFrames> {
        let params = LogMelParams::parse(params)?;
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let gain = if peak > 0.0 { 1.0 / f64::from(peak) } else { 1.0 };

        let pad = if params.center { params.nb_fft / 2 } else { 0 };
        let mut signal = vec![0.0f64; pad];
        signal.extend(samples.iter().map(|&s| f64::from(s) * gain));
        signal.resize(signal.len() + pad, 0.0);

        if signal.len() < params.nb_fft {
            return Ok(Vec::new());
        }
        let frames = 1 + (signal.len() - params.nb_fft) / params.hop_size;

        let window = hann_window(params.nb_fft);
        let dft = DftTable::new(params.nb_fft);
        let filters = mel_filterbank(&params);

        let mut output: FeatureFrames = Vec::with_capacity(frames);
        let mut frame = vec![0.0f64; params.nb_fft];
        for t in 0..frames {
            let start = t * params.hop_size;
            for (i, value) in frame.iter_mut().enumerate() {
                *value = signal[start + i] * window[i];
            }
            let spectrum: Vec<f64> = dft
                .magnitudes(&frame)
                .into_iter()
                .map(|m| m.powf(params.power))
                .collect();

            output.push(
                filters
                    .iter()
                    .map(|filter| {
                        let energy: f64 =
                            filter.iter().zip(&spectrum).map(|(w, s)| w * s).sum();
                        (energy + f64::EPSILON).ln() as f32
                    })
                    .collect(),
            );
        }

        Ok(output)
    }
}

/// Periodic Hann window
fn hann_window(length: usize) -> Vec<f64> {
    (0..length)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / length as f64).cos())
        .collect()
}

/// Precomputed twiddles for the one-sided DFT of a real frame
struct DftTable {
    cos: Vec<f64>,
    sin: Vec<f64>,
    length: usize,
}

impl DftTable {
    fn new(length: usize) -> Self {
        let (cos, sin) = (0..length)
            .map(|n| {
                let angle = 2.0 * PI * n as f64 / length as f64;
                (angle.cos(), angle.sin())
            })
            .unzip();
        Self { cos, sin, length }
    }

    /// Magnitudes of bins `0..=length / 2`
    fn magnitudes(&self, frame: &[f64]) -> Vec<f64> {
        (0..=self.length / 2)
            .map(|k| {
                let (mut re, mut im) = (0.0, 0.0);
                for (n, &x) in frame.iter().enumerate() {
                    let phase = (k * n) % self.length;
                    re += x * self.cos[phase];
                    im -= x * self.sin[phase];
                }
                (re * re + im * im).sqrt()
            })
            .collect()
    }
}

fn hz_to_mel(hz: f64, htk: bool) -> f64 {
    if htk {
        return 2595.0 * (1.0 + hz / 700.0).log10();
    }
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let log_step = 6.4f64.ln() / 27.0;
    if hz >= min_log_hz {
        min_log_mel + (hz / min_log_hz).ln() / log_step
    } else {
        hz / f_sp
    }
}

fn mel_to_hz(mel: f64, htk: bool) -> f64 {
    if htk {
        return 700.0 * (10f64.powf(mel / 2595.0) - 1.0);
    }
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let log_step = 6.4f64.ln() / 27.0;
    if mel >= min_log_mel {
        min_log_hz * (log_step * (mel - min_log_mel)).exp()
    } else {
        mel * f_sp
    }
}

/// Band edges: `nb_mels + 2` frequencies evenly spaced on the mel scale
fn mel_frequencies(params: &LogMelParams) -> Vec<f64> {
    let low = hz_to_mel(params.f_min, params.htk);
    let high = hz_to_mel(params.f_max(), params.htk);
    let points = params.nb_mels + 2;
    (0..points)
        .map(|i| mel_to_hz(low + (high - low) * i as f64 / (points - 1) as f64, params.htk))
        .collect()
}

/// Triangular filters over the one-sided spectrum, one row per band
fn mel_filterbank(params: &LogMelParams) -> Vec<Vec<f64>> {
    let bins = params.nb_fft / 2 + 1;
    let bin_hz: Vec<f64> = (0..bins)
        .map(|k| k as f64 * f64::from(params.sr) / params.nb_fft as f64)
        .collect();
    let edges = mel_frequencies(params);

    (0..params.nb_mels)
        .map(|m| {
            let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
            let scale = if params.norm { 2.0 / (right - left) } else { 1.0 };
            bin_hz
                .iter()
                .map(|&f| {
                    let rising = (f - left) / (center - left);
                    let falling = (right - f) / (right - center);
                    rising.min(falling).max(0.0) * scale
                })
                .collect()
        })
        .collect()
}
