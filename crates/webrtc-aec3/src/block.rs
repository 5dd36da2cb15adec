//! Multi-band, multi-channel audio block.
//!
//! Ported from `modules/audio_processing/aec3/block.h`.

use derive_more::Debug;

use crate::common::BLOCK_SIZE;

/// Contains one or more channels of 4 ms of audio data.
///
/// The audio is split into one or more frequency bands, each with a sampling
/// rate of 16 kHz. Each band/channel combination holds [`BLOCK_SIZE`]
/// samples, laid out as `[band][channel][sample]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    num_bands: usize,
    num_channels: usize,
    #[debug(skip)]
    data: Vec<f32>,
}

impl Block {
    /// Creates a zeroed block.
    pub fn new(num_bands: usize, num_channels: usize) -> Self {
        assert!(num_bands > 0, "num_bands must be > 0");
        assert!(num_channels > 0, "num_channels must be > 0");
        Self {
            num_bands,
            num_channels,
            data: vec![0.0; num_bands * num_channels * BLOCK_SIZE],
        }
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Returns the `BLOCK_SIZE` samples of the given band and channel.
    pub fn view(&self, band: usize, channel: usize) -> &[f32] {
        let start = self.index(band, channel);
        &self.data[start..start + BLOCK_SIZE]
    }

    /// Returns the `BLOCK_SIZE` samples of the given band and channel for
    /// writing.
    pub fn view_mut(&mut self, band: usize, channel: usize) -> &mut [f32] {
        let start = self.index(band, channel);
        &mut self.data[start..start + BLOCK_SIZE]
    }

    /// Sets every sample in every band and channel to zero.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    fn index(&self, band: usize, channel: usize) -> usize {
        debug_assert!(band < self.num_bands);
        debug_assert!(channel < self.num_channels);
        (band * self.num_channels + channel) * BLOCK_SIZE
    }
}
