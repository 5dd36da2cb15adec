//! Writes a mono 16-bit WAV file of uniform noise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use rand::Rng;

const AMPLITUDE: f32 = 32767.0;

#[derive(Debug, Parser)]
#[command(name = "random-wav")]
#[command(about = "Create a WAV file with random content in it.")]
struct Args {
    /// Name of the output file.
    output: PathBuf,

    /// Length of the file in seconds.
    length: f64,

    /// Sample rate of the output file in Hz.
    #[arg(long, default_value_t = 16000)]
    sample_rate: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    write_random_wav(&args.output, args.length, args.sample_rate, &mut rand::rng())?;
    Ok(())
}

/// Writes `length` seconds of noise to `path` and returns the number of
/// samples written.
fn write_random_wav(
    path: &Path,
    length: f64,
    sample_rate: u32,
    rng: &mut impl Rng,
) -> Result<usize> {
    ensure!(length >= 0.0, "length must not be negative, got {length}");
    let num_samples = (length * f64::from(sample_rate)) as usize;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;
    for _ in 0..num_samples {
        writer.write_sample(rng.random_range(-AMPLITUDE..=AMPLITUDE) as i16)?;
    }
    writer.finalize()?;
    Ok(num_samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn writes_requested_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        let mut rng = StdRng::seed_from_u64(3);

        let written = write_random_wav(&path, 0.5, 8000, &mut rng).unwrap();
        assert_eq!(written, 4000);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples.len(), 4000);
        assert!(samples.iter().any(|&s| s != 0));
    }

    #[test]
    fn negative_length_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(write_random_wav(&dir.path().join("x.wav"), -1.0, 8000, &mut rng).is_err());
    }
}
