//! Render delay buffer. Buffers incoming render blocks at a low rate so that
//! capture blocks can be correlated against the render history.
//!
//! Only the downsampled path used for delay estimation is kept; the
//! full-band block, spectrum and FFT histories of AEC3 are not.
//!
//! Ported from `modules/audio_processing/aec3/render_delay_buffer.h/cc`.

use derive_more::Debug;

use crate::alignment_mixer::AlignmentMixer;
use crate::block::Block;
use crate::common::{BLOCK_SIZE, get_down_sampled_buffer_size, num_bands_for_rate, sub_block_size};
use crate::config::{Buffering, DelayEstimatorConfig};
use crate::decimator::Decimator;
use crate::downsampled_render_buffer::DownsampledRenderBuffer;

/// Events that can occur during buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferingEvent {
    None,
    RenderUnderrun,
    RenderOverrun,
}

/// Buffers downsampled render data for the echo path delay estimator.
#[derive(Debug)]
pub struct RenderDelayBuffer {
    buffering: Buffering,
    num_bands: usize,
    num_channels: usize,
    sub_block_size: usize,
    low_rate: DownsampledRenderBuffer,
    #[debug(skip)]
    render_mixer: AlignmentMixer,
    #[debug(skip)]
    render_decimator: Decimator,
    #[debug(skip)]
    render_ds: Vec<f32>,
    min_latency_blocks: usize,
    excess_render_detection_counter: usize,
}

impl RenderDelayBuffer {
    /// Creates a buffer for render audio at `sample_rate_hz` with
    /// `num_render_channels` channels.
    pub fn new(
        config: &DelayEstimatorConfig,
        sample_rate_hz: usize,
        num_render_channels: usize,
    ) -> Self {
        let down_sampling_factor = config.delay.down_sampling_factor;
        let sub_block_size = sub_block_size(down_sampling_factor);
        let low_rate = DownsampledRenderBuffer::new(get_down_sampled_buffer_size(
            down_sampling_factor,
            config.delay.num_filters,
        ));

        let mut rdb = Self {
            buffering: config.buffering.clone(),
            num_bands: num_bands_for_rate(sample_rate_hz),
            num_channels: num_render_channels,
            sub_block_size,
            low_rate,
            render_mixer: AlignmentMixer::new(
                num_render_channels,
                &config.delay.render_alignment_mixing,
            ),
            render_decimator: Decimator::new(down_sampling_factor),
            render_ds: vec![0.0f32; sub_block_size],
            min_latency_blocks: 0,
            excess_render_detection_counter: 0,
        };
        rdb.reset();
        rdb
    }

    /// Resets the buffer alignment so that the next capture block is paired
    /// with the most recently inserted render block.
    pub fn reset(&mut self) {
        self.min_latency_blocks = 0;
        self.excess_render_detection_counter = 0;

        // Initialize the read index to one sub-block before the write index.
        self.low_rate.read = self
            .low_rate
            .offset_index(self.low_rate.write, self.sub_block_size as isize);
    }

    /// Inserts a render block into the buffer.
    pub fn insert(&mut self, block: &Block) -> BufferingEvent {
        debug_assert_eq!(block.num_bands(), self.num_bands);
        debug_assert_eq!(block.num_channels(), self.num_channels);

        self.low_rate
            .update_write_index(-(self.sub_block_size as isize));

        // Allow overrun and do a reset when more render data than capture
        // data has been received.
        let event = if self.render_overrun() {
            BufferingEvent::RenderOverrun
        } else {
            BufferingEvent::None
        };

        let mut downmixed_render = [0.0f32; BLOCK_SIZE];
        self.render_mixer
            .produce_output(block, &mut downmixed_render);
        self.render_decimator
            .decimate(&downmixed_render, &mut self.render_ds);
        self.low_rate.write_sub_block(&self.render_ds);

        if event != BufferingEvent::None {
            self.reset();
        }
        event
    }

    /// Prepares the render buffer for processing another capture block.
    pub fn prepare_capture_processing(&mut self) -> BufferingEvent {
        if self.detect_excess_render_blocks() {
            self.reset();
            BufferingEvent::RenderOverrun
        } else if self.render_underrun() {
            // No new render data: keep pointing at the same sub-block.
            BufferingEvent::RenderUnderrun
        } else {
            self.low_rate
                .update_read_index(-(self.sub_block_size as isize));
            BufferingEvent::None
        }
    }

    /// Returns the downsampled render history used by the delay estimator.
    pub fn get_downsampled_render_buffer(&self) -> &DownsampledRenderBuffer {
        &self.low_rate
    }

    fn detect_excess_render_blocks(&mut self) -> bool {
        let latency_blocks = self.buffer_latency();
        self.min_latency_blocks = self.min_latency_blocks.min(latency_blocks);

        self.excess_render_detection_counter += 1;
        if self.excess_render_detection_counter < self.buffering.excess_render_detection_interval_blocks
        {
            return false;
        }

        let excess_render_detected =
            self.min_latency_blocks > self.buffering.max_allowed_excess_render_blocks;
        self.min_latency_blocks = latency_blocks;
        self.excess_render_detection_counter = 0;
        excess_render_detected
    }

    /// Number of whole sub-blocks between the read and write positions.
    fn buffer_latency(&self) -> usize {
        let lr = &self.low_rate;
        let size = lr.buffer.len();
        (size + lr.read - lr.write) % size / self.sub_block_size
    }

    fn render_overrun(&self) -> bool {
        self.low_rate.read == self.low_rate.write
    }

    fn render_underrun(&self) -> bool {
        self.low_rate.read == self.low_rate.write
    }
}
