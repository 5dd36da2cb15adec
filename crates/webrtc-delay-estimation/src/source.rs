//! Decoded audio inputs.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use derive_more::Debug;

/// Scale from the `[-1, 1]` float range to the 16-bit range the estimator's
/// excitation thresholds are tuned for.
const FLOAT_TO_S16: f32 = 32768.0;

/// Errors raised while reading audio.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read WAV data: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported sample format: {bits_per_sample} bit {sample_format:?}")]
    UnsupportedFormat {
        sample_format: hound::SampleFormat,
        bits_per_sample: u16,
    },
    #[error("invalid stream format: {sample_rate} Hz, {num_channels} channel(s)")]
    InvalidFormat {
        sample_rate: usize,
        num_channels: usize,
    },
}

/// A source of interleaved audio samples in the 16-bit nominal range.
pub trait AudioSource {
    /// Sample rate in Hz.
    fn sample_rate(&self) -> usize;

    fn num_channels(&self) -> usize;

    /// Total number of samples, counting every channel.
    fn num_samples(&self) -> usize;

    /// Reads up to `out.len()` samples and returns how many were read.
    fn read_samples(&mut self, out: &mut [f32]) -> Result<usize, SourceError>;
}

/// A WAV file read with `hound`.
#[derive(Debug)]
pub struct WavSource {
    spec: hound::WavSpec,
    #[debug(skip)]
    reader: hound::WavReader<BufReader<File>>,
}

impl WavSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let supported = match spec.sample_format {
            hound::SampleFormat::Float => spec.bits_per_sample == 32,
            hound::SampleFormat::Int => (1..=32).contains(&spec.bits_per_sample),
        };
        if !supported {
            return Err(SourceError::UnsupportedFormat {
                sample_format: spec.sample_format,
                bits_per_sample: spec.bits_per_sample,
            });
        }
        Ok(Self { spec, reader })
    }
}

impl AudioSource for WavSource {
    fn sample_rate(&self) -> usize {
        self.spec.sample_rate as usize
    }

    fn num_channels(&self) -> usize {
        self.spec.channels as usize
    }

    fn num_samples(&self) -> usize {
        self.reader.len() as usize
    }

    fn read_samples(&mut self, out: &mut [f32]) -> Result<usize, SourceError> {
        let mut read = 0;
        match self.spec.sample_format {
            hound::SampleFormat::Float => {
                for (o, sample) in out.iter_mut().zip(self.reader.samples::<f32>()) {
                    *o = sample? * FLOAT_TO_S16;
                    read += 1;
                }
            }
            hound::SampleFormat::Int => {
                let full_scale = (1u64 << (self.spec.bits_per_sample - 1)) as f32;
                let scale = FLOAT_TO_S16 / full_scale;
                for (o, sample) in out.iter_mut().zip(self.reader.samples::<i32>()) {
                    *o = sample? as f32 * scale;
                    read += 1;
                }
            }
        }
        Ok(read)
    }
}
