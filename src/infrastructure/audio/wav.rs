//! WAV container reading and writing
//!
//! Captures are finalized through `write_mono_wav`; playback streams
//! samples through `WavChunkSource` in fixed-size chunks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use hound::{SampleFormat, WavIntoSamples, WavReader, WavSpec, WavWriter};

use crate::application::ports::AudioError;
use crate::domain::clip::{AudioClip, ClipFormat};

/// Read a container header and return a clip reference with its
/// format and duration.
pub fn probe_clip(path: &Path) -> Result<AudioClip, AudioError> {
    let reader = WavReader::open(path).map_err(|e| AudioError::FileFormat(e.to_string()))?;
    let spec = reader.spec();
    let frames = reader.duration();
    let duration = Duration::from_secs_f64(frames as f64 / spec.sample_rate as f64);

    Ok(AudioClip::new(
        path,
        ClipFormat {
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            sample_rate: spec.sample_rate,
        },
        duration,
    ))
}

/// Serialize accumulated capture samples into a WAV file.
/// An empty sample buffer still produces a validly-headed,
/// zero-duration container.
pub fn write_mono_wav(path: &Path, samples: &[i16], format: ClipFormat) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| AudioError::Write(e.to_string()))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| AudioError::Write(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| AudioError::Write(e.to_string()))
}

enum Samples {
    Int16(WavIntoSamples<BufReader<File>, i16>),
    Float32(WavIntoSamples<BufReader<File>, f32>),
}

/// Sequential chunk reader over a WAV file, yielding interleaved i16
/// samples. 16-bit integer and 32-bit float containers are accepted;
/// anything else is a format error at open.
pub struct WavChunkSource {
    spec: WavSpec,
    samples: Samples,
}

impl WavChunkSource {
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let reader = WavReader::open(path).map_err(|e| AudioError::FileFormat(e.to_string()))?;
        let spec = reader.spec();

        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => Samples::Int16(reader.into_samples()),
            (SampleFormat::Float, 32) => Samples::Float32(reader.into_samples()),
            (format, bits) => {
                return Err(AudioError::FileFormat(format!(
                    "Unsupported sample format: {:?} {} bit",
                    format, bits
                )))
            }
        };

        Ok(Self { spec, samples })
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Read up to `frames` frames. An empty result means the input is
    /// exhausted.
    pub fn next_chunk(&mut self, frames: usize) -> Result<Vec<i16>, AudioError> {
        let wanted = frames * self.spec.channels as usize;
        match &mut self.samples {
            Samples::Int16(iter) => iter
                .by_ref()
                .take(wanted)
                .map(|s| s.map_err(|e| AudioError::Stream(e.to_string())))
                .collect(),
            Samples::Float32(iter) => iter
                .by_ref()
                .take(wanted)
                .map(|s| {
                    s.map(|v| (v * 32767.0) as i16)
                        .map_err(|e| AudioError::Stream(e.to_string()))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clip::CAPTURE_FORMAT;

    #[test]
    fn two_second_buffer_round_trips_within_tolerance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_seconds.wav");

        let samples = vec![0i16; CAPTURE_FORMAT.sample_rate as usize * 2];
        write_mono_wav(&path, &samples, CAPTURE_FORMAT).unwrap();

        let clip = probe_clip(&path).unwrap();
        let drift = (clip.duration().as_secs_f64() - 2.0).abs();
        assert!(drift <= 0.05, "duration drifted by {}s", drift);
        assert_eq!(clip.format(), CAPTURE_FORMAT);
    }

    #[test]
    fn empty_capture_still_writes_a_valid_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");

        write_mono_wav(&path, &[], CAPTURE_FORMAT).unwrap();

        let clip = probe_clip(&path).unwrap();
        assert_eq!(clip.duration(), Duration::ZERO);
        assert_eq!(clip.format(), CAPTURE_FORMAT);
    }

    #[test]
    fn probe_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"not a riff header").unwrap();

        assert!(matches!(
            probe_clip(&path),
            Err(AudioError::FileFormat(_))
        ));
    }

    #[test]
    fn chunk_source_reads_in_fixed_chunks_until_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunked.wav");

        let samples: Vec<i16> = (0..2500).map(|i| i as i16).collect();
        write_mono_wav(&path, &samples, CAPTURE_FORMAT).unwrap();

        let mut source = WavChunkSource::open(&path).unwrap();
        let first = source.next_chunk(1024).unwrap();
        assert_eq!(first.len(), 1024);
        assert_eq!(first[0], 0);

        let second = source.next_chunk(1024).unwrap();
        assert_eq!(second.len(), 1024);
        assert_eq!(second[0], 1024);

        let tail = source.next_chunk(1024).unwrap();
        assert_eq!(tail.len(), 2500 - 2048);

        assert!(source.next_chunk(1024).unwrap().is_empty());
    }

    #[test]
    fn chunk_source_rejects_unsupported_widths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.wav");

        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0i32).unwrap();
        writer.finalize().unwrap();

        assert!(matches!(
            WavChunkSource::open(&path),
            Err(AudioError::FileFormat(_))
        ));
    }
}
