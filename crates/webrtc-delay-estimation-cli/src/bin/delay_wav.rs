//! Writes a copy of a WAV file that starts after a given delay.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;

#[derive(Debug, Parser)]
#[command(name = "delay-wav")]
#[command(about = "Create delayed WAV files.")]
struct Args {
    /// Name of the input file.
    input: PathBuf,

    /// Delay in milliseconds.
    delay: u64,

    /// Name of the output file.
    #[arg(default_value = "delay.wav")]
    output: PathBuf,

    /// Prepend random samples instead of silence.
    #[arg(long)]
    random: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = args.random.then(rand::rng);
    let delay_frames = delay_wav(&args.input, args.delay, &args.output, rng.as_mut())?;
    println!("Delaying samples: {delay_frames}");
    Ok(())
}

/// Copies `input` to `output`, preceded by `delay_ms` worth of frames that are
/// silent, or random when `rng` is given. Returns the number of delay frames.
fn delay_wav<R: Rng>(
    input: &Path,
    delay_ms: u64,
    output: &Path,
    mut rng: Option<&mut R>,
) -> Result<u64> {
    let mut reader =
        hound::WavReader::open(input).with_context(|| format!("opening {}", input.display()))?;
    let spec = reader.spec();
    let mut writer = hound::WavWriter::create(output, spec)
        .with_context(|| format!("creating {}", output.display()))?;

    let delay_frames = delay_ms * u64::from(spec.sample_rate) / 1000;
    let delay_samples = delay_frames * u64::from(spec.channels);

    match spec.sample_format {
        hound::SampleFormat::Int => {
            let full_scale = 1i64 << (spec.bits_per_sample - 1);
            for _ in 0..delay_samples {
                let sample = match rng.as_deref_mut() {
                    Some(rng) => rng.random_range(-full_scale..full_scale) as i32,
                    None => 0,
                };
                writer.write_sample(sample)?;
            }
            for sample in reader.samples::<i32>() {
                writer.write_sample(sample?)?;
            }
        }
        hound::SampleFormat::Float => {
            for _ in 0..delay_samples {
                let sample = match rng.as_deref_mut() {
                    Some(rng) => rng.random_range(-1.0f32..1.0),
                    None => 0.0,
                };
                writer.write_sample(sample)?;
            }
            for sample in reader.samples::<f32>() {
                writer.write_sample(sample?)?;
            }
        }
    }

    writer.finalize()?;
    Ok(delay_frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn write_input(path: &Path, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn read_output(path: &Path) -> (hound::WavSpec, Vec<i16>) {
        let mut reader = hound::WavReader::open(path).unwrap();
        let spec = reader.spec();
        let samples = reader.samples::<i16>().map(Result::unwrap).collect();
        (spec, samples)
    }

    #[test]
    fn silence_is_prepended() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        write_input(&input, 1, &[1, 2, 3]);

        let frames = delay_wav::<StdRng>(&input, 1, &output, None).unwrap();
        assert_eq!(frames, 8);

        let (spec, samples) = read_output(&output);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(samples.len(), 11);
        assert!(samples[..8].iter().all(|&s| s == 0));
        assert_eq!(&samples[8..], &[1, 2, 3]);
    }

    #[test]
    fn delay_counts_frames_not_samples() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        write_input(&input, 2, &[5, -5]);

        let frames = delay_wav::<StdRng>(&input, 2, &output, None).unwrap();
        assert_eq!(frames, 16);

        let (spec, samples) = read_output(&output);
        assert_eq!(spec.channels, 2);
        assert_eq!(samples.len(), 34);
        assert_eq!(&samples[32..], &[5, -5]);
    }

    #[test]
    fn random_prefix_is_not_silent() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        write_input(&input, 1, &[7]);

        let mut rng = StdRng::seed_from_u64(11);
        delay_wav(&input, 10, &output, Some(&mut rng)).unwrap();

        let (_, samples) = read_output(&output);
        assert_eq!(samples.len(), 81);
        assert!(samples[..80].iter().any(|&s| s != 0));
        assert_eq!(samples[80], 7);
    }
}
