//! Input stream description and estimation settings.

use derive_more::Debug;

use crate::error::Error;
use crate::source::{AudioSource, SourceError};

/// A decoded audio stream: its format and every sample it holds.
///
/// Multi-channel samples are interleaved frame by frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStreamInfo {
    sample_rate: usize,
    num_channels: usize,
    #[debug(skip)]
    samples: Vec<f32>,
}

impl AudioStreamInfo {
    /// Creates a stream description.
    ///
    /// # Panics
    ///
    /// Panics if `sample_rate` or `num_channels` is zero.
    pub fn new(sample_rate: usize, num_channels: usize, samples: Vec<f32>) -> Self {
        assert!(sample_rate > 0, "sample_rate must be > 0");
        assert!(num_channels > 0, "num_channels must be > 0");
        Self {
            sample_rate,
            num_channels,
            samples,
        }
    }

    /// Reads every remaining sample of `source`.
    pub fn from_source(source: &mut impl AudioSource) -> Result<Self, SourceError> {
        let (sample_rate, num_channels) = (source.sample_rate(), source.num_channels());
        if sample_rate == 0 || num_channels == 0 {
            return Err(SourceError::InvalidFormat {
                sample_rate,
                num_channels,
            });
        }
        let mut samples = vec![0.0f32; source.num_samples()];
        let read = source.read_samples(&mut samples)?;
        samples.truncate(read);
        Ok(Self::new(sample_rate, num_channels, samples))
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// All samples, interleaved when there is more than one channel.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of complete frames, i.e. samples per channel.
    #[inline]
    pub fn samples_per_channel(&self) -> usize {
        self.samples.len() / self.num_channels
    }
}

/// Tuning of the delay estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimationSettings {
    /// Factor by which the engine reduces the sample rate before correlating.
    /// One of 2, 4 or 8; other values fall back to 4.
    pub down_sampling_factor: usize,
    /// Number of matched filters. Each one covers roughly 24 blocks of delay.
    pub num_filters: usize,
}

impl Default for EstimationSettings {
    fn default() -> Self {
        Self {
            down_sampling_factor: 8,
            num_filters: 10,
        }
    }
}

/// Checks that the two streams share sample rate and channel count.
pub fn validate_compatibility(
    render: &AudioStreamInfo,
    capture: &AudioStreamInfo,
) -> Result<(), Error> {
    if render.sample_rate != capture.sample_rate || render.num_channels != capture.num_channels {
        return Err(Error::IncompatibleInputs {
            render_sample_rate: render.sample_rate,
            render_channels: render.num_channels,
            capture_sample_rate: capture.sample_rate,
            capture_channels: capture.num_channels,
        });
    }
    Ok(())
}
