//! The streaming estimation loop.

use webrtc_aec3::DelayEstimate;

use crate::engine::{Aec3DelayEngine, DelayEstimationEngine};
use crate::error::Error;
use crate::frame::{FrameAdapter, num_blocks};
use crate::stream::{AudioStreamInfo, EstimationSettings, validate_compatibility};

/// Outcome of a successful estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayReport {
    /// The last estimate the engine produced.
    pub estimate: DelayEstimate,
    /// Number of blocks fed to the engine.
    pub num_blocks: usize,
    /// Number of blocks for which the engine produced an estimate.
    pub num_estimates: usize,
}

/// Estimates how many samples `capture` lags behind `render`.
pub fn estimate_delay(
    render: &AudioStreamInfo,
    capture: &AudioStreamInfo,
    settings: EstimationSettings,
) -> Result<usize, Error> {
    estimate_delay_report(render, capture, settings).map(|report| report.estimate.delay)
}

/// Like [`estimate_delay`], also reporting the estimate's quality and how
/// many blocks produced one.
pub fn estimate_delay_report(
    render: &AudioStreamInfo,
    capture: &AudioStreamInfo,
    settings: EstimationSettings,
) -> Result<DelayReport, Error> {
    tracing::debug!(?settings, "estimating delay");
    estimate_delay_with(render, capture, || {
        Aec3DelayEngine::new(
            settings,
            render.sample_rate(),
            render.num_channels(),
            capture.num_channels(),
        )
    })
}

/// Runs the estimation loop with an engine built by `make_engine`.
///
/// `make_engine` is only called once the streams are known to be compatible.
/// Every block replaces the current result with the engine's estimate, if it
/// produced one, so the last estimate wins regardless of its quality.
pub fn estimate_delay_with<E, F>(
    render: &AudioStreamInfo,
    capture: &AudioStreamInfo,
    make_engine: F,
) -> Result<DelayReport, Error>
where
    E: DelayEstimationEngine,
    F: FnOnce() -> E,
{
    validate_compatibility(render, capture)?;

    let num_blocks = num_blocks(render, capture);
    tracing::debug!(
        num_blocks,
        sample_rate = render.sample_rate(),
        num_channels = render.num_channels(),
        "processing blocks"
    );

    let mut frames = FrameAdapter::new(render.sample_rate(), render.num_channels());
    let mut engine = make_engine();

    let mut latest: Option<DelayEstimate> = None;
    let mut num_estimates = 0;
    for i in 0..num_blocks {
        let (render_frame, capture_frame) = frames.fill(i, render, capture);

        engine.insert(render_frame);
        if i == 0 {
            engine.reset();
        }
        engine.prepare_capture_processing();

        if let Some(estimate) = engine.estimate_delay(capture_frame) {
            if latest != Some(estimate) {
                tracing::trace!(
                    block = i,
                    delay = estimate.delay,
                    quality = ?estimate.quality,
                    "new estimate"
                );
            }
            latest = Some(estimate);
            num_estimates += 1;
        }
    }

    let estimate = latest.ok_or(Error::NoEstimateAvailable)?;
    tracing::debug!(
        delay = estimate.delay,
        quality = ?estimate.quality,
        num_estimates,
        "delay estimated"
    );
    Ok(DelayReport {
        estimate,
        num_blocks,
        num_estimates,
    })
}

/// Converts a delay in samples to whole milliseconds.
pub fn delay_to_ms(delay: usize, sample_rate: usize) -> usize {
    delay * 1000 / sample_rate
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::synthetic::randomize_samples;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use webrtc_aec3::{BLOCK_SIZE, Block, DelayEstimateQuality};

    /// What a [`ScriptedEngine`] received.
    #[derive(Debug, Default)]
    struct Log {
        calls: Vec<&'static str>,
        inserted: Vec<f32>,
    }

    /// Records the calls it receives and answers estimates from a script,
    /// one entry per block.
    struct ScriptedEngine<'a> {
        log: &'a mut Log,
        estimates: Vec<Option<DelayEstimate>>,
        block: usize,
    }

    impl<'a> ScriptedEngine<'a> {
        fn new(log: &'a mut Log, estimates: Vec<Option<DelayEstimate>>) -> Self {
            Self {
                log,
                estimates,
                block: 0,
            }
        }
    }

    impl DelayEstimationEngine for ScriptedEngine<'_> {
        fn insert(&mut self, render: &Block) {
            self.log.calls.push("insert");
            self.log.inserted.extend_from_slice(render.view(0, 0));
        }

        fn reset(&mut self) {
            self.log.calls.push("reset");
        }

        fn prepare_capture_processing(&mut self) {
            self.log.calls.push("prepare");
        }

        fn estimate_delay(&mut self, _capture: &Block) -> Option<DelayEstimate> {
            self.log.calls.push("estimate");
            let estimate = self.estimates.get(self.block).copied().flatten();
            self.block += 1;
            estimate
        }
    }

    fn mono(samples: Vec<f32>) -> AudioStreamInfo {
        AudioStreamInfo::new(16000, 1, samples)
    }

    fn random_signal(len: usize, seed: u64) -> Vec<f32> {
        let mut samples = vec![0.0f32; len];
        randomize_samples(&mut samples, &mut StdRng::seed_from_u64(seed));
        samples
    }

    /// Capture is `delay` zeros followed by the whole render signal.
    fn delayed_copy(render: &[f32], delay: usize) -> Vec<f32> {
        let mut capture = vec![0.0f32; delay];
        capture.extend_from_slice(render);
        capture
    }

    #[test]
    fn reset_happens_once_after_first_insert() {
        let stream = mono(vec![0.0; 3 * BLOCK_SIZE]);
        let mut log = Log::default();
        let result = estimate_delay_with(&stream, &stream, || ScriptedEngine::new(&mut log, vec![]));

        assert_eq!(result, Err(Error::NoEstimateAvailable));
        assert_eq!(
            log.calls,
            [
                "insert", "reset", "prepare", "estimate", "insert", "prepare", "estimate",
                "insert", "prepare", "estimate",
            ]
        );
    }

    #[test]
    fn latest_estimate_wins() {
        let stream = mono(vec![0.0; 6 * BLOCK_SIZE]);
        let script = vec![
            Some(DelayEstimate::new(DelayEstimateQuality::Refined, 100)),
            None,
            Some(DelayEstimate::new(DelayEstimateQuality::Coarse, 200)),
            Some(DelayEstimate::new(DelayEstimateQuality::Refined, 300)),
            Some(DelayEstimate::new(DelayEstimateQuality::Coarse, 400)),
            None,
        ];

        let mut log = Log::default();
        let report =
            estimate_delay_with(&stream, &stream, || ScriptedEngine::new(&mut log, script))
                .unwrap();

        assert_eq!(
            report.estimate,
            DelayEstimate::new(DelayEstimateQuality::Coarse, 400)
        );
        assert_eq!(report.num_blocks, 6);
        assert_eq!(report.num_estimates, 4);
    }

    #[test]
    fn incompatible_inputs_never_build_the_engine() {
        let render = AudioStreamInfo::new(48000, 1, vec![0.0; 10 * BLOCK_SIZE]);
        for capture in [
            AudioStreamInfo::new(16000, 1, vec![0.0; 10 * BLOCK_SIZE]),
            AudioStreamInfo::new(48000, 2, vec![0.0; 20 * BLOCK_SIZE]),
        ] {
            let mut log = Log::default();
            let built = Cell::new(false);
            let result = estimate_delay_with(&render, &capture, || {
                built.set(true);
                ScriptedEngine::new(&mut log, vec![])
            });
            assert!(matches!(result, Err(Error::IncompatibleInputs { .. })));
            assert!(!built.get());
            assert!(log.calls.is_empty());
        }
    }

    #[test]
    fn trailing_partial_block_is_dropped() {
        let render = mono((0..5 * BLOCK_SIZE + 40).map(|i| i as f32).collect());
        let capture = mono(vec![0.0; 4 * BLOCK_SIZE + 63]);

        let mut log = Log::default();
        let script = vec![Some(DelayEstimate::new(DelayEstimateQuality::Coarse, 7)); 10];
        let report =
            estimate_delay_with(&render, &capture, || ScriptedEngine::new(&mut log, script))
                .unwrap();

        assert_eq!(report.num_blocks, 4);
        assert_eq!(report.num_estimates, 4);
        assert_eq!(log.calls.iter().filter(|&&c| c == "insert").count(), 4);
        let expected: Vec<f32> = (0..4 * BLOCK_SIZE).map(|i| i as f32).collect();
        assert_eq!(log.inserted, expected);
    }

    #[test]
    fn silence_has_no_estimate() {
        let stream = AudioStreamInfo::new(48000, 1, vec![0.0; 15000]);
        assert_eq!(
            estimate_delay(&stream, &stream, EstimationSettings::default()),
            Err(Error::NoEstimateAvailable)
        );
    }

    #[test]
    fn empty_input_has_no_estimate() {
        let stream = mono(Vec::new());
        let mut log = Log::default();
        let result = estimate_delay_with(&stream, &stream, || ScriptedEngine::new(&mut log, vec![]));
        assert_eq!(result, Err(Error::NoEstimateAvailable));
        assert!(log.calls.is_empty());
    }

    #[test]
    fn delayed_copy_at_48_khz() {
        let render = random_signal(15000, 0x5eed);
        let capture = delayed_copy(&render, 150);
        let render = AudioStreamInfo::new(48000, 1, render);
        let capture = AudioStreamInfo::new(48000, 1, capture);

        let delay = estimate_delay(&render, &capture, EstimationSettings::default()).unwrap();
        assert!((17..=19).contains(&(delay / 8)), "delay={delay}");
    }

    #[test]
    fn injected_delays_are_recovered() {
        let render = random_signal(15000, 42);
        for down_sampling_factor in [2usize, 4, 8] {
            let settings = EstimationSettings {
                down_sampling_factor,
                num_filters: 10,
            };
            for delay in [30usize, 64, 150, 200, 800, 4000] {
                let capture = delayed_copy(&render, delay);
                let result = estimate_delay(
                    &AudioStreamInfo::new(48000, 1, render.clone()),
                    &AudioStreamInfo::new(48000, 1, capture),
                    settings,
                );
                let estimate = result.unwrap_or_else(|e| {
                    panic!("factor={down_sampling_factor}, delay={delay}: {e}")
                });

                // Off by at most one sample in the downsampled domain.
                let delay_ds = delay / down_sampling_factor;
                let estimate_ds = estimate / down_sampling_factor;
                assert!(
                    estimate_ds + 1 >= delay_ds && estimate_ds <= delay_ds + 1,
                    "factor={down_sampling_factor}, delay={delay}, estimate={estimate}"
                );
            }
        }
    }

    #[test]
    fn stereo_streams_are_estimated() {
        let left = random_signal(15000, 9);
        let right = random_signal(15000, 10);
        let interleave = |l: &[f32], r: &[f32]| -> Vec<f32> {
            l.iter().zip(r).flat_map(|(&a, &b)| [a, b]).collect()
        };
        let render = interleave(&left, &right);
        let capture = interleave(&delayed_copy(&left, 200), &delayed_copy(&right, 200));

        let delay = estimate_delay(
            &AudioStreamInfo::new(16000, 2, render),
            &AudioStreamInfo::new(16000, 2, capture),
            EstimationSettings::default(),
        )
        .unwrap();
        assert!((24..=26).contains(&(delay / 8)), "delay={delay}");
    }

    #[test]
    fn delay_in_milliseconds() {
        assert_eq!(delay_to_ms(150, 48000), 3);
        assert_eq!(delay_to_ms(4000, 16000), 250);
        assert_eq!(delay_to_ms(0, 8000), 0);
    }
}
