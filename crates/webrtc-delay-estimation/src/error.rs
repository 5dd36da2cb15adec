//! Errors returned by the delay estimation driver.

/// Errors returned by [`estimate_delay`](crate::estimate_delay) and its
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The two streams differ in sample rate or channel count.
    #[error(
        "the inputs are not compatible: render is {render_channels}ch {render_sample_rate} Hz, \
         capture is {capture_channels}ch {capture_sample_rate} Hz"
    )]
    IncompatibleInputs {
        render_sample_rate: usize,
        render_channels: usize,
        capture_sample_rate: usize,
        capture_channels: usize,
    },
    /// Every block was processed without the engine producing an estimate.
    #[error("the delay estimator was not able to come up with a viable delay estimate")]
    NoEstimateAvailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incompatible_inputs_message_names_both_streams() {
        let err = Error::IncompatibleInputs {
            render_sample_rate: 48000,
            render_channels: 1,
            capture_sample_rate: 16000,
            capture_channels: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("1ch 48000 Hz"), "{msg}");
        assert!(msg.contains("2ch 16000 Hz"), "{msg}");
    }
}
