//! Echo path delay estimator.
//!
//! Estimates the delay of the echo path using matched filtering and lag
//! aggregation.
//!
//! Ported from `modules/audio_processing/aec3/echo_path_delay_estimator.h/cc`.

use derive_more::Debug;

use crate::alignment_mixer::AlignmentMixer;
use crate::block::Block;
use crate::common::{
    BLOCK_SIZE, MATCHED_FILTER_ALIGNMENT_SHIFT_SIZE_SUB_BLOCKS,
    MATCHED_FILTER_WINDOW_SIZE_SUB_BLOCKS, NUM_BLOCKS_PER_SECOND, sub_block_size,
};
use crate::config::DelayEstimatorConfig;
use crate::decimator::Decimator;
use crate::delay_estimate::DelayEstimate;
use crate::downsampled_render_buffer::DownsampledRenderBuffer;
use crate::matched_filter::MatchedFilter;
use crate::matched_filter_lag_aggregator::MatchedFilterLagAggregator;

/// Estimates the delay of the echo path.
#[derive(Debug)]
pub struct EchoPathDelayEstimator {
    down_sampling_factor: usize,
    sub_block_size: usize,
    #[debug(skip)]
    capture_mixer: AlignmentMixer,
    #[debug(skip)]
    capture_decimator: Decimator,
    matched_filter: MatchedFilter,
    matched_filter_lag_aggregator: MatchedFilterLagAggregator,
    old_aggregated_lag: Option<DelayEstimate>,
    consistent_estimate_counter: usize,
}

impl EchoPathDelayEstimator {
    pub fn new(config: &DelayEstimatorConfig, num_capture_channels: usize) -> Self {
        let down_sampling_factor = config.delay.down_sampling_factor;
        let sub_block_size = sub_block_size(down_sampling_factor);

        let excitation_limit = if down_sampling_factor == 8 {
            config.render_levels.poor_excitation_render_limit_ds8
        } else {
            config.render_levels.poor_excitation_render_limit
        };

        let matched_filter = MatchedFilter::new(
            sub_block_size,
            MATCHED_FILTER_WINDOW_SIZE_SUB_BLOCKS,
            config.delay.num_filters,
            MATCHED_FILTER_ALIGNMENT_SHIFT_SIZE_SUB_BLOCKS,
            excitation_limit,
            config.delay.delay_estimate_smoothing,
            config.delay.delay_estimate_smoothing_delay_found,
            config.delay.delay_candidate_detection_threshold,
        );
        let matched_filter_lag_aggregator =
            MatchedFilterLagAggregator::new(matched_filter.get_max_filter_lag(), &config.delay);

        Self {
            down_sampling_factor,
            sub_block_size,
            capture_mixer: AlignmentMixer::new(
                num_capture_channels,
                &config.delay.capture_alignment_mixing,
            ),
            capture_decimator: Decimator::new(down_sampling_factor),
            matched_filter,
            matched_filter_lag_aggregator,
            old_aggregated_lag: None,
            consistent_estimate_counter: 0,
        }
    }

    /// Resets the estimation. If `reset_delay_confidence` is true, the reset
    /// behavior is as if the call is restarted.
    pub fn reset(&mut self, reset_delay_confidence: bool) {
        self.reset_internal(true, reset_delay_confidence);
    }

    /// Produces a delay estimate, in full-rate samples, if one is available.
    pub fn estimate_delay(
        &mut self,
        render_buffer: &DownsampledRenderBuffer,
        capture: &Block,
    ) -> Option<DelayEstimate> {
        let mut downmixed_capture = [0.0f32; BLOCK_SIZE];
        self.capture_mixer
            .produce_output(capture, &mut downmixed_capture);

        let mut downsampled_capture_data = [0.0f32; BLOCK_SIZE];
        let downsampled_capture = &mut downsampled_capture_data[..self.sub_block_size];
        self.capture_decimator
            .decimate(&downmixed_capture, downsampled_capture);

        self.matched_filter.update(
            render_buffer,
            downsampled_capture,
            self.matched_filter_lag_aggregator.reliable_delay_found(),
        );

        let mut aggregated_lag = self
            .matched_filter_lag_aggregator
            .aggregate(self.matched_filter.get_best_lag_estimate());

        // Compensate the aggregated lag for the down sampling factor.
        if let Some(lag) = &mut aggregated_lag {
            lag.delay *= self.down_sampling_factor;
        }

        match (&self.old_aggregated_lag, &aggregated_lag) {
            (Some(old), Some(new)) if old.delay == new.delay => {
                self.consistent_estimate_counter += 1;
            }
            _ => self.consistent_estimate_counter = 0,
        }
        self.old_aggregated_lag = aggregated_lag;

        // After half a second of agreement, restart the matched filters so
        // they can follow a change in the echo path.
        if self.consistent_estimate_counter > NUM_BLOCKS_PER_SECOND / 2 {
            tracing::trace!(
                delay = aggregated_lag.map(|lag| lag.delay),
                "delay estimate stable, resetting matched filter"
            );
            self.reset_internal(false, false);
        }

        aggregated_lag
    }

    fn reset_internal(&mut self, reset_lag_aggregator: bool, reset_delay_confidence: bool) {
        if reset_lag_aggregator {
            self.matched_filter_lag_aggregator
                .reset(reset_delay_confidence);
        }
        self.matched_filter.reset();
        self.old_aggregated_lag = None;
        self.consistent_estimate_counter = 0;
    }
}
