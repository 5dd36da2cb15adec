//! WebRTC Echo Canceller 3 (AEC3) delay estimation, ported to Rust.
//!
//! This crate carries the part of AEC3 that aligns the render (far-end) and
//! capture (near-end) signals: the render delay buffer with its low-rate
//! history, the decimators, the bank of matched filters and the lag
//! aggregator. It is ported from the C++ source at
//! `modules/audio_processing/aec3/`, without the echo removal stages.
//!
//! The two entry points are [`RenderDelayBuffer`], which receives render
//! blocks, and [`EchoPathDelayEstimator`], which correlates each capture
//! block against the buffered render history.

pub(crate) mod alignment_mixer;
pub(crate) mod block;
pub(crate) mod cascaded_biquad_filter;
pub(crate) mod common;
pub mod config;
pub(crate) mod decimator;
pub(crate) mod delay_estimate;
pub(crate) mod downsampled_render_buffer;
pub(crate) mod echo_path_delay_estimator;
pub(crate) mod matched_filter;
pub(crate) mod matched_filter_lag_aggregator;
pub(crate) mod render_delay_buffer;

// Public re-exports.
pub use block::Block;
pub use common::{BLOCK_SIZE, NUM_BLOCKS_PER_SECOND, num_bands_for_rate};
pub use config::DelayEstimatorConfig;
pub use delay_estimate::{DelayEstimate, DelayEstimateQuality};
pub use downsampled_render_buffer::DownsampledRenderBuffer;
pub use echo_path_delay_estimator::EchoPathDelayEstimator;
pub use render_delay_buffer::{BufferingEvent, RenderDelayBuffer};
