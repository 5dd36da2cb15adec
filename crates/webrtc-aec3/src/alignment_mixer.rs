//! Multi-channel to mono alignment mixer for delay estimation.
//!
//! Ported from `modules/audio_processing/aec3/alignment_mixer.h/cc`, keeping
//! the downmix and fixed-channel variants.

use crate::block::Block;
use crate::common::BLOCK_SIZE;
use crate::config::AlignmentMixing;

/// Mixes band 0 of a multi-channel block down to mono.
#[derive(Debug)]
pub(crate) struct AlignmentMixer {
    num_channels: usize,
    one_by_num_channels: f32,
    downmix: bool,
}

impl AlignmentMixer {
    pub(crate) fn new(num_channels: usize, config: &AlignmentMixing) -> Self {
        debug_assert!(num_channels > 0);
        Self {
            num_channels,
            one_by_num_channels: 1.0 / num_channels as f32,
            downmix: config.downmix && num_channels > 1,
        }
    }

    pub(crate) fn produce_output(&self, x: &Block, y: &mut [f32; BLOCK_SIZE]) {
        debug_assert_eq!(x.num_channels(), self.num_channels);

        y.copy_from_slice(x.view(0, 0));
        if !self.downmix {
            return;
        }

        for ch in 1..self.num_channels {
            for (out, &inp) in y.iter_mut().zip(x.view(0, ch)) {
                *out += inp;
            }
        }
        for v in y.iter_mut() {
            *v *= self.one_by_num_channels;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_block(left: f32, right: f32) -> Block {
        let mut block = Block::new(1, 2);
        block.view_mut(0, 0).fill(left);
        block.view_mut(0, 1).fill(right);
        block
    }

    #[test]
    fn downmix_averages_channels() {
        let mixer = AlignmentMixer::new(2, &AlignmentMixing { downmix: true });
        let mut y = [0.0f32; BLOCK_SIZE];
        mixer.produce_output(&stereo_block(2.0, 4.0), &mut y);
        assert!(y.iter().all(|&v| v == 3.0));
    }

    #[test]
    fn fixed_selection_uses_first_channel() {
        let mixer = AlignmentMixer::new(2, &AlignmentMixing { downmix: false });
        let mut y = [0.0f32; BLOCK_SIZE];
        mixer.produce_output(&stereo_block(2.0, 4.0), &mut y);
        assert!(y.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn mono_is_copied_unchanged() {
        let mixer = AlignmentMixer::new(1, &AlignmentMixing { downmix: true });
        let mut block = Block::new(1, 1);
        for (i, v) in block.view_mut(0, 0).iter_mut().enumerate() {
            *v = i as f32;
        }
        let mut y = [0.0f32; BLOCK_SIZE];
        mixer.produce_output(&block, &mut y);
        assert_eq!(&y[..], block.view(0, 0));
    }
}
