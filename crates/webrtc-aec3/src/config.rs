//! Delay estimator configuration.
//!
//! The subset of `EchoCanceller3Config` (`api/audio/echo_canceller3_config.h`)
//! read by the render delay buffer and the echo path delay estimator.

/// Configuration for the delay-estimation path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DelayEstimatorConfig {
    pub buffering: Buffering,
    pub delay: Delay,
    pub render_levels: RenderLevels,
}

impl DelayEstimatorConfig {
    /// Validates and clamps config parameters to supported ranges.
    /// Returns `true` if no changes were needed.
    pub fn validate(&mut self) -> bool {
        let mut ok = true;

        if !matches!(self.delay.down_sampling_factor, 2 | 4 | 8) {
            tracing::warn!(
                down_sampling_factor = self.delay.down_sampling_factor,
                "unsupported down-sampling factor, using 4"
            );
            self.delay.down_sampling_factor = 4;
            ok = false;
        }

        ok &= limit_usize(&mut self.delay.num_filters, 1, 5000);
        ok &= limit_usize(&mut self.delay.delay_headroom_samples, 0, 5000);
        ok &= limit_f32(&mut self.delay.delay_estimate_smoothing, 0.0, 1.0);
        ok &= limit_f32(&mut self.delay.delay_estimate_smoothing_delay_found, 0.0, 1.0);
        ok &= limit_f32(&mut self.delay.delay_candidate_detection_threshold, 0.0, 1.0);
        ok &= limit_usize(&mut self.delay.delay_selection_thresholds.initial, 1, 250);
        ok &= limit_usize(&mut self.delay.delay_selection_thresholds.converged, 1, 250);

        if self.delay.delay_selection_thresholds.initial
            > self.delay.delay_selection_thresholds.converged
        {
            self.delay.delay_selection_thresholds.initial =
                self.delay.delay_selection_thresholds.converged;
            ok = false;
        }

        ok &= limit_usize(
            &mut self.buffering.excess_render_detection_interval_blocks,
            1,
            250,
        );
        ok &= limit_usize(&mut self.buffering.max_allowed_excess_render_blocks, 0, 250);
        ok &= limit_f32(
            &mut self.render_levels.poor_excitation_render_limit,
            0.0,
            32768.0,
        );
        ok &= limit_f32(
            &mut self.render_levels.poor_excitation_render_limit_ds8,
            0.0,
            32768.0,
        );

        ok
    }
}

fn limit_usize(value: &mut usize, min: usize, max: usize) -> bool {
    let clamped = (*value).clamp(min, max);
    if clamped != *value {
        tracing::warn!(value = *value, clamped, "delay estimator config value out of range");
        *value = clamped;
        return false;
    }
    true
}

fn limit_f32(value: &mut f32, min: f32, max: f32) -> bool {
    let clamped = value.clamp(min, max);
    if clamped != *value || value.is_nan() {
        tracing::warn!(value = *value, clamped, "delay estimator config value out of range");
        *value = if value.is_nan() { min } else { clamped };
        return false;
    }
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffering {
    pub excess_render_detection_interval_blocks: usize,
    pub max_allowed_excess_render_blocks: usize,
}

impl Default for Buffering {
    fn default() -> Self {
        Self {
            excess_render_detection_interval_blocks: 250,
            max_allowed_excess_render_blocks: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelaySelectionThresholds {
    pub initial: usize,
    pub converged: usize,
}

/// How multi-channel audio is reduced to mono before alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentMixing {
    /// Average all channels; otherwise channel 0 is used.
    pub downmix: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delay {
    pub down_sampling_factor: usize,
    pub num_filters: usize,
    /// Samples subtracted from the detected lag. AEC3 uses 32 to place its
    /// adaptive filter ahead of the echo; a pure delay measurement uses 0.
    pub delay_headroom_samples: usize,
    pub delay_estimate_smoothing: f32,
    pub delay_estimate_smoothing_delay_found: f32,
    pub delay_candidate_detection_threshold: f32,
    pub delay_selection_thresholds: DelaySelectionThresholds,
    pub render_alignment_mixing: AlignmentMixing,
    pub capture_alignment_mixing: AlignmentMixing,
}

impl Default for Delay {
    fn default() -> Self {
        Self {
            down_sampling_factor: 4,
            num_filters: 5,
            delay_headroom_samples: 0,
            delay_estimate_smoothing: 0.7,
            delay_estimate_smoothing_delay_found: 0.7,
            delay_candidate_detection_threshold: 0.2,
            delay_selection_thresholds: DelaySelectionThresholds {
                initial: 5,
                converged: 20,
            },
            render_alignment_mixing: AlignmentMixing { downmix: true },
            capture_alignment_mixing: AlignmentMixing { downmix: true },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderLevels {
    pub poor_excitation_render_limit: f32,
    pub poor_excitation_render_limit_ds8: f32,
}

impl Default for RenderLevels {
    fn default() -> Self {
        Self {
            poor_excitation_render_limit: 150.0,
            poor_excitation_render_limit_ds8: 20.0,
        }
    }
}
