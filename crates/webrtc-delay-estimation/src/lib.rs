//! Delay estimation between a render (loudspeaker) and a capture (microphone)
//! audio stream.
//!
//! The driver slices both streams into 64-sample blocks, feeds them to a
//! [`DelayEstimationEngine`] one block at a time and reports the last delay
//! the engine produced. The default engine, [`Aec3DelayEngine`], is the
//! delay estimator of WebRTC's Echo Canceller 3.
//!
//! ```no_run
//! use webrtc_delay_estimation::{AudioStreamInfo, EstimationSettings, WavSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let render = AudioStreamInfo::from_source(&mut WavSource::open("render.wav")?)?;
//! let capture = AudioStreamInfo::from_source(&mut WavSource::open("capture.wav")?)?;
//! let delay = webrtc_delay_estimation::estimate_delay(
//!     &render,
//!     &capture,
//!     EstimationSettings::default(),
//! )?;
//! println!("{delay} samples");
//! # Ok(())
//! # }
//! ```

pub mod engine;
mod error;
mod estimator;
mod frame;
pub mod source;
mod stream;
pub mod synthetic;

pub use engine::{Aec3DelayEngine, DelayEstimationEngine};
pub use error::Error;
pub use estimator::{
    DelayReport, delay_to_ms, estimate_delay, estimate_delay_report, estimate_delay_with,
};
pub use source::{AudioSource, SourceError, WavSource};
pub use stream::{AudioStreamInfo, EstimationSettings, validate_compatibility};

pub use webrtc_aec3::{BLOCK_SIZE, DelayEstimate, DelayEstimateQuality};
