//! The delay estimation engine consumed by the driver.

use webrtc_aec3::{
    Block, DelayEstimate, DelayEstimatorConfig, EchoPathDelayEstimator, RenderDelayBuffer,
};

use crate::stream::EstimationSettings;

/// A stateful estimator fed one render/capture block pair at a time.
///
/// For every block the driver calls [`insert`](Self::insert),
/// [`prepare_capture_processing`](Self::prepare_capture_processing) and
/// [`estimate_delay`](Self::estimate_delay), in that order. [`reset`](Self::reset)
/// is called once, right after the first insert.
pub trait DelayEstimationEngine {
    /// Buffers a render frame.
    fn insert(&mut self, render: &Block);

    /// Realigns the render buffer so the next capture frame pairs with the
    /// most recent render frame.
    fn reset(&mut self);

    /// Advances the render buffer by one block ahead of a capture frame.
    fn prepare_capture_processing(&mut self);

    /// Correlates `capture` against the buffered render history.
    fn estimate_delay(&mut self, capture: &Block) -> Option<DelayEstimate>;
}

/// The AEC3 render delay buffer and echo path delay estimator.
#[derive(Debug)]
pub struct Aec3DelayEngine {
    render_delay_buffer: RenderDelayBuffer,
    estimator: EchoPathDelayEstimator,
}

impl Aec3DelayEngine {
    pub fn new(
        settings: EstimationSettings,
        sample_rate: usize,
        num_render_channels: usize,
        num_capture_channels: usize,
    ) -> Self {
        let mut config = DelayEstimatorConfig::default();
        config.delay.down_sampling_factor = settings.down_sampling_factor;
        config.delay.num_filters = settings.num_filters;
        if !config.validate() {
            tracing::warn!(?settings, "estimation settings adjusted to supported values");
        }

        Self {
            render_delay_buffer: RenderDelayBuffer::new(&config, sample_rate, num_render_channels),
            estimator: EchoPathDelayEstimator::new(&config, num_capture_channels),
        }
    }
}

impl DelayEstimationEngine for Aec3DelayEngine {
    fn insert(&mut self, render: &Block) {
        let event = self.render_delay_buffer.insert(render);
        tracing::trace!(?event, "render block inserted");
    }

    fn reset(&mut self) {
        self.render_delay_buffer.reset();
    }

    fn prepare_capture_processing(&mut self) {
        let event = self.render_delay_buffer.prepare_capture_processing();
        tracing::trace!(?event, "capture processing prepared");
    }

    fn estimate_delay(&mut self, capture: &Block) -> Option<DelayEstimate> {
        self.estimator.estimate_delay(
            self.render_delay_buffer.get_downsampled_render_buffer(),
            capture,
        )
    }
}
