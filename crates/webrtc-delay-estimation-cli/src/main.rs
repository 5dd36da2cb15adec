//! Estimates the delay between a render and a capture WAV file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use webrtc_delay_estimation::{
    AudioSource, AudioStreamInfo, Error, EstimationSettings, WavSource, delay_to_ms,
    estimate_delay_report,
};

/// Exit code for a missing file or a failed estimate.
const EXIT_FAILURE: u8 = 1;
/// Exit code for a render/capture pair with different formats.
const EXIT_INCOMPATIBLE: u8 = 5;

#[derive(Debug, Parser)]
#[command(name = "webrtc-delay-estimation")]
#[command(about = "Delay estimation algorithm extracted from the WebRTC library.")]
struct Cli {
    /// Makes this program talk more.
    #[arg(short, long)]
    verbose: bool,

    /// Number of filters to use when recognizing delay.
    #[arg(short = 'f', long = "filter", default_value_t = 10)]
    num_filters: usize,

    /// Down-sampling factor to use when recognizing delay.
    #[arg(short = 'd', long = "downsampling-factor", default_value_t = 8)]
    down_sampling_factor: usize,

    /// Path to the "rendered" WAV file.
    render: PathBuf,

    /// Path to the "captured" WAV file.
    capture: PathBuf,
}

impl Cli {
    fn settings(&self) -> EstimationSettings {
        EstimationSettings {
            down_sampling_factor: self.down_sampling_factor,
            num_filters: self.num_filters,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(Error::IncompatibleInputs { .. }) => EXIT_INCOMPATIBLE,
        _ => EXIT_FAILURE,
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut render = open(&cli.render)?;
    let mut capture = open(&cli.capture)?;

    if cli.verbose {
        print_source_info("Render", &render);
        print_source_info("Capture", &capture);
    }

    let render = AudioStreamInfo::from_source(&mut render)
        .with_context(|| format!("reading {}", cli.render.display()))?;
    let capture = AudioStreamInfo::from_source(&mut capture)
        .with_context(|| format!("reading {}", cli.capture.display()))?;

    let settings = cli.settings();
    if cli.verbose {
        println!("Using the following settings:");
        println!("  - Down sampling factor: {}", settings.down_sampling_factor);
        println!("  - Delay filters: {}", settings.num_filters);
    }

    let report = estimate_delay_report(&render, &capture, settings).map_err(|err| {
        let context = match err {
            Error::IncompatibleInputs { .. } => {
                "Render and capture files are incompatible. Cannot proceed."
            }
            Error::NoEstimateAvailable => "Unable to get estimated delay value",
        };
        anyhow::Error::new(err).context(context)
    })?;

    let delay = report.estimate.delay;
    if cli.verbose {
        println!(
            "Estimated delay: {delay} sample(s) (around {}ms).",
            delay_to_ms(delay, render.sample_rate())
        );
        println!(
            "  quality: {:?}, {} of {} blocks produced an estimate",
            report.estimate.quality, report.num_estimates, report.num_blocks
        );
    } else {
        println!("{delay}");
    }
    Ok(())
}

fn open(path: &Path) -> Result<WavSource> {
    if !path.exists() {
        bail!("{}: No such file or directory", path.display());
    }
    WavSource::open(path).with_context(|| format!("opening {}", path.display()))
}

fn print_source_info(label: &str, source: &WavSource) {
    println!("{label} file information:");
    println!("  sample rate: {}", source.sample_rate());
    println!("  number of channels: {}", source.num_channels());
    println!("  number of samples: {}", source.num_samples());
}
