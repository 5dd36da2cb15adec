//! AEC3 constants and buffer sizing used by the delay-estimation path.
//!
//! Ported from `modules/audio_processing/aec3/aec3_common.h/cc`.

/// Number of blocks in one second of 16 kHz audio.
pub const NUM_BLOCKS_PER_SECOND: usize = 250;

/// Number of samples per band and channel in a block (4 ms at 16 kHz).
pub const BLOCK_SIZE: usize = 64;

pub(crate) const MATCHED_FILTER_WINDOW_SIZE_SUB_BLOCKS: usize = 32;
pub(crate) const MATCHED_FILTER_ALIGNMENT_SHIFT_SIZE_SUB_BLOCKS: usize =
    MATCHED_FILTER_WINDOW_SIZE_SUB_BLOCKS * 3 / 4;

/// Returns the number of 16 kHz bands for the given sample rate.
///
/// Rates below 16 kHz still occupy a single band.
pub const fn num_bands_for_rate(sample_rate_hz: usize) -> usize {
    let bands = sample_rate_hz / 16000;
    if bands == 0 { 1 } else { bands }
}

/// Returns the number of downsampled samples produced per block.
pub(crate) const fn sub_block_size(down_sampling_factor: usize) -> usize {
    if down_sampling_factor > 0 {
        BLOCK_SIZE / down_sampling_factor
    } else {
        BLOCK_SIZE
    }
}

/// Returns the required downsampled buffer size for matched filtering.
pub(crate) const fn get_down_sampled_buffer_size(
    down_sampling_factor: usize,
    num_matched_filters: usize,
) -> usize {
    sub_block_size(down_sampling_factor)
        * (MATCHED_FILTER_ALIGNMENT_SHIFT_SIZE_SUB_BLOCKS * num_matched_filters
            + MATCHED_FILTER_WINDOW_SIZE_SUB_BLOCKS
            + 1)
}
