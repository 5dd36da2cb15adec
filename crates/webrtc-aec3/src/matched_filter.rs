//! Matched filter for delay estimation via cross-correlation.
//!
//! Produces recursively updated cross-correlation estimates for several signal
//! shifts where the intra-shift spacing is uniform. The filters are adapted
//! with NLMS (Normalized Least Mean Squares).
//!
//! Ported from `modules/audio_processing/aec3/matched_filter.h/cc` (scalar
//! path, without pre-echo detection).

use derive_more::Debug;

use crate::common::BLOCK_SIZE;
use crate::downsampled_render_buffer::DownsampledRenderBuffer;

/// Capture samples at or beyond this magnitude are treated as saturated and
/// do not adapt the filters.
const SATURATION_LIMIT: f32 = 32000.0;

/// Result of one NLMS pass over a capture sub-block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct CoreOutput {
    pub error_sum: f32,
    pub filters_updated: bool,
}

/// Adapts filter `h` towards mapping the circular render history `x` onto the
/// capture sub-block `y`.
///
/// For capture sample `i`, tap `k` reads `x[x_start_index - i + k]` (modulo
/// the history length), so a peak at tap `k` means the capture lags the
/// render by `k` samples.
pub(crate) fn matched_filter_core(
    mut x_start_index: usize,
    x2_sum_threshold: f32,
    smoothing: f32,
    x: &[f32],
    y: &[f32],
    h: &mut [f32],
) -> CoreOutput {
    let x_size = x.len();
    let mut output = CoreOutput::default();

    for &y_i in y {
        // Apply the matched filter as filter * x, and compute x * x.
        let mut x2_sum = 0.0f32;
        let mut s = 0.0f32;
        let mut x_index = x_start_index;
        for &h_k in h.iter() {
            let x_k = x[x_index];
            x2_sum += x_k * x_k;
            s += h_k * x_k;
            x_index = if x_index < x_size - 1 { x_index + 1 } else { 0 };
        }

        let e = y_i - s;
        let saturation = y_i.abs() >= SATURATION_LIMIT;
        output.error_sum += e * e;

        // filter = filter + smoothing * (y - filter * x) * x / (x * x)
        if x2_sum > x2_sum_threshold && !saturation {
            debug_assert!(x2_sum > 0.0);
            let alpha = smoothing * e / x2_sum;
            let mut x_index = x_start_index;
            for h_k in h.iter_mut() {
                *h_k += alpha * x[x_index];
                x_index = if x_index < x_size - 1 { x_index + 1 } else { 0 };
            }
            output.filters_updated = true;
        }

        x_start_index = if x_start_index > 0 {
            x_start_index - 1
        } else {
            x_size - 1
        };
    }

    output
}

/// Returns the index of the element with the largest squared value. Ties
/// resolve to the lowest index.
pub(crate) fn max_square_peak_index(h: &[f32]) -> usize {
    let mut peak_index = 0;
    let mut peak = f32::NEG_INFINITY;
    for (k, &v) in h.iter().enumerate() {
        let v2 = v * v;
        if v2 > peak {
            peak = v2;
            peak_index = k;
        }
    }
    peak_index
}

/// Bank of matched filters covering consecutive, overlapping lag windows.
#[derive(Debug)]
pub(crate) struct MatchedFilter {
    sub_block_size: usize,
    filter_intra_lag_shift: usize,
    #[debug(skip)]
    filters: Vec<Vec<f32>>,
    reported_lag_estimate: Option<usize>,
    excitation_limit: f32,
    smoothing_fast: f32,
    smoothing_slow: f32,
    matching_filter_threshold: f32,
}

impl MatchedFilter {
    #[allow(
        clippy::too_many_arguments,
        reason = "matches C++ constructor signature"
    )]
    pub(crate) fn new(
        sub_block_size: usize,
        window_size_sub_blocks: usize,
        num_matched_filters: usize,
        alignment_shift_sub_blocks: usize,
        excitation_limit: f32,
        smoothing_fast: f32,
        smoothing_slow: f32,
        matching_filter_threshold: f32,
    ) -> Self {
        debug_assert!(window_size_sub_blocks > 0);
        debug_assert!(num_matched_filters > 0);
        debug_assert!(BLOCK_SIZE % sub_block_size == 0);
        debug_assert!(sub_block_size % 4 == 0);

        let filter_size = window_size_sub_blocks * sub_block_size;
        Self {
            sub_block_size,
            filter_intra_lag_shift: alignment_shift_sub_blocks * sub_block_size,
            filters: vec![vec![0.0f32; filter_size]; num_matched_filters],
            reported_lag_estimate: None,
            excitation_limit,
            smoothing_fast,
            smoothing_slow,
            matching_filter_threshold,
        }
    }

    /// Zeroes all filters and forgets the current lag estimate.
    pub(crate) fn reset(&mut self) {
        for f in &mut self.filters {
            f.fill(0.0);
        }
        self.reported_lag_estimate = None;
    }

    /// Updates the correlation with the values in the capture buffer.
    pub(crate) fn update(
        &mut self,
        render_buffer: &DownsampledRenderBuffer,
        capture: &[f32],
        use_slow_smoothing: bool,
    ) {
        debug_assert_eq!(self.sub_block_size, capture.len());

        let smoothing = if use_slow_smoothing {
            self.smoothing_slow
        } else {
            self.smoothing_fast
        };
        let filter_size = self.filters[0].len();
        let x2_sum_threshold = filter_size as f32 * self.excitation_limit * self.excitation_limit;

        // Anchor for the matched filter error: the capture energy.
        let error_sum_anchor: f32 = capture.iter().map(|&y| y * y).sum();

        let mut winner_error_sum = error_sum_anchor;
        let mut winner_lag = None;
        let mut alignment_shift = 0usize;
        let x = &render_buffer.buffer;

        for filter in &mut self.filters {
            let x_start_index =
                (render_buffer.read + alignment_shift + self.sub_block_size - 1) % x.len();
            let CoreOutput {
                error_sum,
                filters_updated,
            } = matched_filter_core(x_start_index, x2_sum_threshold, smoothing, x, capture, filter);

            // Estimate the lag as the peak of the matched filter.
            let lag_estimate = max_square_peak_index(filter);
            let reliable = lag_estimate > 2
                && lag_estimate < filter_size - 10
                && error_sum < self.matching_filter_threshold * error_sum_anchor;

            let lag = lag_estimate + alignment_shift;
            if filters_updated && reliable && error_sum < winner_error_sum {
                winner_error_sum = error_sum;
                winner_lag = Some(lag);
            }
            alignment_shift += self.filter_intra_lag_shift;
        }

        // Without a winner the previous estimate stands until reset.
        if winner_lag.is_some() {
            self.reported_lag_estimate = winner_lag;
        }
    }

    /// Returns the lag of the most recent winning filter.
    pub(crate) fn get_best_lag_estimate(&self) -> Option<usize> {
        self.reported_lag_estimate
    }

    /// Returns the largest lag, in downsampled samples, the bank can detect.
    pub(crate) fn get_max_filter_lag(&self) -> usize {
        self.filters.len() * self.filter_intra_lag_shift + self.filters[0].len()
    }
}
