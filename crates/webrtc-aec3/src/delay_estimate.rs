//! Delay estimate data structure.
//!
//! Ported from `modules/audio_processing/aec3/delay_estimate.h`.

/// Confidence tier of a delay estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayEstimateQuality {
    /// Reported before the lag histogram has converged.
    Coarse,
    /// Reported once a lag has dominated the histogram.
    Refined,
}

/// A delay estimate in samples together with its quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayEstimate {
    pub quality: DelayEstimateQuality,
    pub delay: usize,
}

impl DelayEstimate {
    pub fn new(quality: DelayEstimateQuality, delay: usize) -> Self {
        Self { quality, delay }
    }
}
