//! Cascaded biquad (IIR) filter, direct form 1.
//!
//! Ported from `modules/audio_processing/utility/cascaded_biquad_filter.h/cc`.

/// Coefficients for a single second-order section. `a` omits the leading 1.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BiQuadCoefficients {
    pub b: [f32; 3],
    pub a: [f32; 2],
}

#[derive(Debug, Clone)]
struct BiQuad {
    coefficients: BiQuadCoefficients,
    x: [f32; 2],
    y: [f32; 2],
}

impl BiQuad {
    fn new(coefficients: BiQuadCoefficients) -> Self {
        Self {
            coefficients,
            x: [0.0; 2],
            y: [0.0; 2],
        }
    }

    /// Filters `samples` in place.
    fn apply(&mut self, samples: &mut [f32]) {
        let BiQuadCoefficients { b, a } = self.coefficients;
        let [mut x0, mut x1] = self.x;
        let [mut y0, mut y1] = self.y;
        for v in samples.iter_mut() {
            let input = *v;
            let output = b[0] * input + b[1] * x0 + b[2] * x1 - a[0] * y0 - a[1] * y1;
            x1 = x0;
            x0 = input;
            y1 = y0;
            y0 = output;
            *v = output;
        }
        self.x = [x0, x1];
        self.y = [y0, y1];
    }
}

/// Applies second-order sections in series. An empty cascade passes the
/// signal through unchanged.
#[derive(Debug, Clone)]
pub(crate) struct CascadedBiQuadFilter {
    biquads: Vec<BiQuad>,
}

impl CascadedBiQuadFilter {
    pub(crate) fn new(coefficients: &[BiQuadCoefficients]) -> Self {
        Self {
            biquads: coefficients.iter().copied().map(BiQuad::new).collect(),
        }
    }

    /// Filters `x` into `y`.
    pub(crate) fn process(&mut self, x: &[f32], y: &mut [f32]) {
        debug_assert_eq!(x.len(), y.len());
        y.copy_from_slice(x);
        self.process_in_place(y);
    }

    pub(crate) fn process_in_place(&mut self, y: &mut [f32]) {
        for biquad in &mut self.biquads {
            biquad.apply(y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Pure delay: y[n] = x[n - 2].
    const DELAY_TWO: BiQuadCoefficients = BiQuadCoefficients {
        b: [0.0, 0.0, 1.0],
        a: [0.0, 0.0],
    };

    #[test]
    fn empty_cascade_is_pass_through() {
        let mut filter = CascadedBiQuadFilter::new(&[]);
        let x = [1.0f32, -2.0, 3.0];
        let mut y = [0.0f32; 3];
        filter.process(&x, &mut y);
        assert_eq!(x, y);
    }

    #[test]
    fn state_carries_across_calls() {
        let mut filter = CascadedBiQuadFilter::new(&[DELAY_TWO]);
        let mut first = [1.0f32, 2.0, 3.0];
        filter.process_in_place(&mut first);
        assert_eq!(first, [0.0, 0.0, 1.0]);

        let mut second = [4.0f32, 5.0, 6.0];
        filter.process_in_place(&mut second);
        assert_eq!(second, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn sections_run_in_series() {
        let mut filter = CascadedBiQuadFilter::new(&[DELAY_TWO, DELAY_TWO]);
        let x = [1.0f32, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mut y = [0.0f32; 6];
        filter.process(&x, &mut y);
        assert_eq!(y, [0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn recursive_part_uses_previous_outputs() {
        // y[n] = x[n] + 0.5 * y[n - 1]
        let mut filter = CascadedBiQuadFilter::new(&[BiQuadCoefficients {
            b: [1.0, 0.0, 0.0],
            a: [-0.5, 0.0],
        }]);
        let mut y = [1.0f32, 0.0, 0.0, 0.0];
        filter.process_in_place(&mut y);
        assert_eq!(y, [1.0, 0.5, 0.25, 0.125]);
    }
}
