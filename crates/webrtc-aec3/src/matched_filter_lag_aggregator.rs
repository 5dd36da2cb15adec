//! Aggregates lag estimates from the matched filter into a single reliable
//! combined lag estimate.
//!
//! Ported from `modules/audio_processing/aec3/matched_filter_lag_aggregator.h/cc`
//! (highest-peak aggregation only).

use derive_more::Debug;

use crate::config::{Delay, DelaySelectionThresholds};
use crate::delay_estimate::{DelayEstimate, DelayEstimateQuality};

/// Number of past lag estimates kept in the histogram.
const HISTOGRAM_DATA_SIZE: usize = 250;

/// Histogram over the most recent lag estimates.
#[derive(Debug)]
struct HighestPeakAggregator {
    #[debug(skip)]
    histogram: Vec<i32>,
    #[debug(skip)]
    histogram_data: [usize; HISTOGRAM_DATA_SIZE],
    histogram_data_index: usize,
    candidate: usize,
}

impl HighestPeakAggregator {
    fn new(max_filter_lag: usize) -> Self {
        Self {
            histogram: vec![0; max_filter_lag + 1],
            histogram_data: [0; HISTOGRAM_DATA_SIZE],
            histogram_data_index: 0,
            candidate: 0,
        }
    }

    fn reset(&mut self) {
        self.histogram.fill(0);
        self.histogram_data.fill(0);
        self.histogram_data_index = 0;
    }

    fn aggregate(&mut self, lag: usize) {
        debug_assert!(lag < self.histogram.len());
        let lag = lag.min(self.histogram.len() - 1);

        // The slot being overwritten may hold the initial zero, which drives
        // the count for lag 0 negative until the window has filled.
        let oldest = self.histogram_data[self.histogram_data_index];
        self.histogram[oldest] -= 1;
        self.histogram_data[self.histogram_data_index] = lag;
        self.histogram[lag] += 1;
        self.histogram_data_index = (self.histogram_data_index + 1) % HISTOGRAM_DATA_SIZE;

        // First index with the maximum count.
        let mut best = 0;
        for (i, &count) in self.histogram.iter().enumerate() {
            if count > self.histogram[best] {
                best = i;
            }
        }
        self.candidate = best;
    }

    fn candidate(&self) -> usize {
        self.candidate
    }

    fn candidate_count(&self) -> i32 {
        self.histogram[self.candidate]
    }
}

/// Aggregates lag estimates produced by the matched filter into a single
/// reliable combined lag estimate.
#[derive(Debug)]
pub(crate) struct MatchedFilterLagAggregator {
    significant_candidate_found: bool,
    thresholds: DelaySelectionThresholds,
    headroom: usize,
    highest_peak_aggregator: HighestPeakAggregator,
}

impl MatchedFilterLagAggregator {
    pub(crate) fn new(max_filter_lag: usize, delay_config: &Delay) -> Self {
        debug_assert!(
            delay_config.delay_selection_thresholds.initial
                <= delay_config.delay_selection_thresholds.converged
        );
        Self {
            significant_candidate_found: false,
            thresholds: delay_config.delay_selection_thresholds,
            headroom: delay_config.delay_headroom_samples / delay_config.down_sampling_factor,
            highest_peak_aggregator: HighestPeakAggregator::new(max_filter_lag),
        }
    }

    /// Clears the histogram. A hard reset also forgets that a reliable delay
    /// was ever found.
    pub(crate) fn reset(&mut self, hard_reset: bool) {
        self.highest_peak_aggregator.reset();
        if hard_reset {
            self.significant_candidate_found = false;
        }
    }

    /// Adds a lag estimate (in downsampled samples) and returns the
    /// aggregated lag if a candidate is strong enough.
    pub(crate) fn aggregate(&mut self, lag_estimate: Option<usize>) -> Option<DelayEstimate> {
        let lag = lag_estimate?;
        self.highest_peak_aggregator
            .aggregate(lag.saturating_sub(self.headroom));
        let count = self.highest_peak_aggregator.candidate_count();

        let converged = count > self.thresholds.converged as i32;
        self.significant_candidate_found |= converged;

        if converged || (count > self.thresholds.initial as i32 && !self.significant_candidate_found)
        {
            let quality = if self.significant_candidate_found {
                DelayEstimateQuality::Refined
            } else {
                DelayEstimateQuality::Coarse
            };
            return Some(DelayEstimate::new(
                quality,
                self.highest_peak_aggregator.candidate(),
            ));
        }
        None
    }

    /// Returns whether a reliable delay estimate has been found.
    pub(crate) fn reliable_delay_found(&self) -> bool {
        self.significant_candidate_found
    }
}
