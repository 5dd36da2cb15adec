//! Signal decimator with anti-aliasing and noise reduction filtering.
//!
//! Ported from `modules/audio_processing/aec3/decimator.h/cc`.

use crate::cascaded_biquad_filter::{BiQuadCoefficients, CascadedBiQuadFilter};
use crate::common::BLOCK_SIZE;

// signal.butter(2, 3400/8000.0, 'lowpass', output='sos'), repeated 3 times.
const LOW_PASS_FILTER_DS2: [BiQuadCoefficients; 3] = [BiQuadCoefficients {
    b: [0.227_117_96, 0.454_235_93, 0.227_117_96],
    a: [-0.276_664_62, 0.185_136_45],
}; 3];

// signal.ellip(6, 1, 40, 1800/8000, 'lowpass', output='sos')
const LOW_PASS_FILTER_DS4: [BiQuadCoefficients; 3] = [
    BiQuadCoefficients {
        b: [0.018_091_987_7, 0.003_209_613_63, 0.018_091_987_7],
        a: [-1.518_319_5, 0.633_165_865],
    },
    BiQuadCoefficients {
        b: [1.0, -1.245_504_59, 1.0],
        a: [-1.497_842_54, 0.853_586_692],
    },
    BiQuadCoefficients {
        b: [1.0, -1.422_168_1, 1.0],
        a: [-1.497_912_82, 0.969_572_384],
    },
];

// signal.cheby1(1, 6, [1000/8000, 2000/8000], 'bandpass', output='sos'),
// repeated 5 times.
const BAND_PASS_FILTER_DS8: [BiQuadCoefficients; 5] = [BiQuadCoefficients {
    b: [0.103_304_783, 0.0, -0.103_304_783],
    a: [-1.520_363, 0.793_390_435],
}; 5];

// signal.butter(2, 1000/8000.0, 'highpass', output='sos')
const HIGH_PASS_FILTER: [BiQuadCoefficients; 1] = [BiQuadCoefficients {
    b: [0.757_076_375, -1.514_152_75, 0.757_076_375],
    a: [-1.454_243_59, 0.574_061_915],
}];

/// Downsamples a 64-sample block by a factor of 2, 4 or 8.
#[derive(Debug)]
pub(crate) struct Decimator {
    down_sampling_factor: usize,
    anti_aliasing_filter: CascadedBiQuadFilter,
    noise_reduction_filter: CascadedBiQuadFilter,
}

impl Decimator {
    pub(crate) fn new(down_sampling_factor: usize) -> Self {
        debug_assert!(matches!(down_sampling_factor, 2 | 4 | 8));
        let (anti_aliasing, noise_reduction): (&[BiQuadCoefficients], &[BiQuadCoefficients]) =
            match down_sampling_factor {
                // The band-pass already removes the low frequencies.
                8 => (&BAND_PASS_FILTER_DS8, &[]),
                4 => (&LOW_PASS_FILTER_DS4, &HIGH_PASS_FILTER),
                _ => (&LOW_PASS_FILTER_DS2, &HIGH_PASS_FILTER),
            };
        Self {
            down_sampling_factor,
            anti_aliasing_filter: CascadedBiQuadFilter::new(anti_aliasing),
            noise_reduction_filter: CascadedBiQuadFilter::new(noise_reduction),
        }
    }

    /// Decimates `BLOCK_SIZE` input samples into
    /// `BLOCK_SIZE / down_sampling_factor` output samples.
    pub(crate) fn decimate(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(BLOCK_SIZE, input.len());
        debug_assert_eq!(BLOCK_SIZE / self.down_sampling_factor, output.len());

        let mut x = [0.0f32; BLOCK_SIZE];
        self.anti_aliasing_filter.process(input, &mut x);
        self.noise_reduction_filter.process_in_place(&mut x);

        for (out, &v) in output
            .iter_mut()
            .zip(x.iter().step_by(self.down_sampling_factor))
        {
            *out = v;
        }
    }
}
