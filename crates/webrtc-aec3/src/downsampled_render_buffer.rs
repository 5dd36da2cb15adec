//! Circular buffer holding downsampled render data for delay estimation.
//!
//! Ported from `modules/audio_processing/aec3/downsampled_render_buffer.h/cc`.

use derive_more::Debug;

/// Circular buffer of downsampled render samples.
///
/// Samples are written newest-first: advancing the write index moves it
/// *backwards*, so reading forward from `read` walks back in time.
#[derive(Debug)]
pub struct DownsampledRenderBuffer {
    #[debug(skip)]
    pub(crate) buffer: Vec<f32>,
    pub(crate) write: usize,
    pub(crate) read: usize,
}

impl DownsampledRenderBuffer {
    pub(crate) fn new(size: usize) -> Self {
        assert!(size > 0, "downsampled render buffer must not be empty");
        Self {
            buffer: vec![0.0f32; size],
            write: 0,
            read: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Samples in storage order, starting at index 0.
    pub fn samples(&self) -> &[f32] {
        &self.buffer
    }

    pub(crate) fn offset_index(&self, index: usize, offset: isize) -> usize {
        let size = self.buffer.len() as isize;
        (index as isize + offset).rem_euclid(size) as usize
    }

    pub(crate) fn update_write_index(&mut self, offset: isize) {
        self.write = self.offset_index(self.write, offset);
    }

    pub(crate) fn update_read_index(&mut self, offset: isize) {
        self.read = self.offset_index(self.read, offset);
    }

    /// Stores a sub-block, reversing it so the newest sample sits at the
    /// write index.
    pub(crate) fn write_sub_block(&mut self, sub_block: &[f32]) {
        let size = self.buffer.len();
        for (i, &v) in sub_block.iter().rev().enumerate() {
            self.buffer[(self.write + i) % size] = v;
        }
    }
}
