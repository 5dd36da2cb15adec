//! Synthetic signals with a known delay, for validating the estimator.

use derive_more::Debug;
use rand::Rng;

/// Peak amplitude of [`randomize_samples`] output.
pub const RANDOM_AMPLITUDE: f32 = 32767.0;

/// Fills `samples` with independent values drawn uniformly from
/// `[-32767, 32767]`.
pub fn randomize_samples(samples: &mut [f32], rng: &mut impl Rng) {
    for sample in samples {
        *sample = rng.random_range(-RANDOM_AMPLITUDE..=RANDOM_AMPLITUDE);
    }
}

/// Delays a signal by a fixed number of samples.
///
/// The first `delay` output samples are zero; state carries over between
/// calls, so a signal may be fed in pieces of any size.
#[derive(Debug)]
pub struct DelayBuffer {
    #[debug(skip)]
    buffer: Vec<f32>,
    next_insert_index: usize,
}

impl DelayBuffer {
    pub fn new(delay: usize) -> Self {
        Self {
            buffer: vec![0.0; delay],
            next_insert_index: 0,
        }
    }

    /// Writes `x` delayed by the buffer's delay into `x_delayed`.
    ///
    /// # Panics
    ///
    /// Panics if the two slices differ in length.
    pub fn delay(&mut self, x: &[f32], x_delayed: &mut [f32]) {
        assert_eq!(
            x.len(),
            x_delayed.len(),
            "the original and the delayed buffer must have the same size"
        );

        if self.buffer.is_empty() {
            x_delayed.copy_from_slice(x);
            return;
        }

        for (&x_i, out) in x.iter().zip(x_delayed.iter_mut()) {
            *out = std::mem::replace(&mut self.buffer[self.next_insert_index], x_i);
            self.next_insert_index = (self.next_insert_index + 1) % self.buffer.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use derive_more::Debug;
    use proptest::collection::vec as pvec;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use test_strategy::proptest;

    #[test]
    fn zero_delay_is_passthrough() {
        let mut buffer = DelayBuffer::new(0);
        let x = [1.0, -2.0, 3.0];
        let mut y = [0.0; 3];
        buffer.delay(&x, &mut y);
        assert_eq!(y, x);
    }

    #[test]
    fn delay_spans_calls() {
        let mut buffer = DelayBuffer::new(3);
        let mut y = [0.0; 2];
        buffer.delay(&[1.0, 2.0], &mut y);
        assert_eq!(y, [0.0, 0.0]);
        buffer.delay(&[3.0, 4.0], &mut y);
        assert_eq!(y, [0.0, 1.0]);
        buffer.delay(&[5.0, 6.0], &mut y);
        assert_eq!(y, [2.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "same size")]
    fn mismatched_lengths_panic() {
        let mut buffer = DelayBuffer::new(4);
        buffer.delay(&[0.0; 3], &mut [0.0; 2]);
    }

    #[test]
    fn random_samples_stay_in_range_and_vary() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut samples = [0.0f32; 4096];
        randomize_samples(&mut samples, &mut rng);
        assert!(samples.iter().all(|v| v.abs() <= RANDOM_AMPLITUDE));
        assert!(samples.iter().any(|&v| v > 16000.0));
        assert!(samples.iter().any(|&v| v < -16000.0));
    }

    #[proptest]
    fn output_is_input_shifted_by_delay(
        #[strategy(0..300usize)] delay: usize,
        #[strategy(pvec(-1000.0f32..1000.0, 0..600))] signal: Vec<f32>,
        #[strategy(1..100usize)] chunk: usize,
    ) {
        let mut buffer = DelayBuffer::new(delay);
        let mut out = vec![0.0f32; signal.len()];
        for (x, y) in signal.chunks(chunk).zip(out.chunks_mut(chunk)) {
            buffer.delay(x, y);
        }

        for (n, &y) in out.iter().enumerate() {
            let expected = if n >= delay { signal[n - delay] } else { 0.0 };
            prop_assert_eq!(y, expected);
        }
    }
}
