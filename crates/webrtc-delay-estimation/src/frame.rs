//! Block segmentation of the two input streams and their reshaping into the
//! engine's frame layout.

use webrtc_aec3::{BLOCK_SIZE, Block, num_bands_for_rate};

use crate::stream::AudioStreamInfo;

/// Number of whole blocks shared by both streams. A trailing partial block is
/// dropped.
pub(crate) fn num_blocks(render: &AudioStreamInfo, capture: &AudioStreamInfo) -> usize {
    let num_samples = render
        .samples_per_channel()
        .min(capture.samples_per_channel());
    num_samples / BLOCK_SIZE
}

/// Reusable render and capture frames, refilled for every block.
///
/// Render frames carry `max(1, sample_rate / 16000)` bands; only band 0 is
/// populated. Capture frames carry a single band.
#[derive(Debug)]
pub(crate) struct FrameAdapter {
    num_channels: usize,
    render: Block,
    capture: Block,
}

impl FrameAdapter {
    pub(crate) fn new(sample_rate: usize, num_channels: usize) -> Self {
        Self {
            num_channels,
            render: Block::new(num_bands_for_rate(sample_rate), num_channels),
            capture: Block::new(1, num_channels),
        }
    }

    /// Copies block `index` of both streams into the frames.
    pub(crate) fn fill(
        &mut self,
        index: usize,
        render: &AudioStreamInfo,
        capture: &AudioStreamInfo,
    ) -> (&Block, &Block) {
        copy_block(index, self.num_channels, render.samples(), &mut self.render);
        copy_block(index, self.num_channels, capture.samples(), &mut self.capture);
        (&self.render, &self.capture)
    }
}

/// Copies `[index * BLOCK_SIZE, (index + 1) * BLOCK_SIZE)` of every channel of
/// the interleaved `samples` into band 0 of `frame`.
fn copy_block(index: usize, num_channels: usize, samples: &[f32], frame: &mut Block) {
    let frames = &samples[index * BLOCK_SIZE * num_channels..(index + 1) * BLOCK_SIZE * num_channels];
    if num_channels == 1 {
        frame.view_mut(0, 0).copy_from_slice(frames);
        return;
    }
    for ch in 0..num_channels {
        let out = frame.view_mut(0, ch);
        for (o, f) in out.iter_mut().zip(frames.chunks_exact(num_channels)) {
            *o = f[ch];
        }
    }
}
