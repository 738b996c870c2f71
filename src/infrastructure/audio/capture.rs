//! Capture worker using cpal
//!
//! Each start spawns a dedicated thread that opens an input stream,
//! accumulates mono i16 samples until the stop flag flips, releases
//! the device, and only then finalizes the buffer into a WAV file.
//! A stream error emits a Failed event and writes no file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use log::debug;
use rubato::{FftFixedIn, Resampler};

use crate::application::ports::{
    AudioError, CaptureEngine, CaptureHandle, EventSender, WorkerEvent,
};
use crate::domain::clip::{AudioClip, CAPTURE_FORMAT};
use crate::domain::device::DeviceRef;

use super::directory::resolve_input_device;
use super::wav::write_mono_wav;

/// How often the worker loop checks the stop flag
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Capture engine spawning one worker thread per start
pub struct CpalCaptureEngine;

impl CpalCaptureEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpalCaptureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureEngine for CpalCaptureEngine {
    fn start(
        &self,
        destination: &Path,
        device: Option<&DeviceRef>,
        events: EventSender,
    ) -> CaptureHandle {
        let stop_requested = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop_requested);
        let destination = destination.to_path_buf();
        let device_name = device.map(|d| d.name().to_string());

        let thread = thread::spawn(move || {
            run_capture(destination, device_name, worker_stop, events);
        });

        CaptureHandle::new(stop_requested, thread)
    }
}

fn run_capture(
    destination: PathBuf,
    device_name: Option<String>,
    stop_requested: Arc<AtomicBool>,
    events: EventSender,
) {
    // The input stream is fully released inside capture_samples before
    // the finalize step below touches the filesystem.
    let (samples, device_rate) = match capture_samples(device_name, &stop_requested) {
        Ok(captured) => captured,
        Err(e) => {
            let _ = events.send(WorkerEvent::CaptureFailed(e));
            return;
        }
    };

    let samples = if device_rate == CAPTURE_FORMAT.sample_rate || samples.is_empty() {
        samples
    } else {
        match resample(&samples, device_rate, CAPTURE_FORMAT.sample_rate) {
            Ok(resampled) => resampled,
            Err(e) => {
                let _ = events.send(WorkerEvent::CaptureFailed(e));
                return;
            }
        }
    };

    if let Err(e) = write_mono_wav(&destination, &samples, CAPTURE_FORMAT) {
        let _ = events.send(WorkerEvent::CaptureFailed(e));
        return;
    }

    let duration =
        Duration::from_secs_f64(samples.len() as f64 / CAPTURE_FORMAT.sample_rate as f64);
    debug!(
        "capture finalized: {} ({:.2}s)",
        destination.display(),
        duration.as_secs_f64()
    );
    let clip = AudioClip::new(destination, CAPTURE_FORMAT, duration);
    let _ = events.send(WorkerEvent::CaptureFinished(clip));
}

/// Open the input stream and accumulate samples until the stop flag
/// flips or the stream errors. Returns the buffer and the rate it was
/// captured at; the device is released before returning.
fn capture_samples(
    device_name: Option<String>,
    stop_requested: &AtomicBool,
) -> Result<(Vec<i16>, u32), AudioError> {
    let device = resolve_input_device(device_name.as_deref())?;
    let (config, sample_format) = pick_input_config(&device, CAPTURE_FORMAT.sample_rate)?;
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;

    let buffer = Arc::new(StdMutex::new(Vec::<i16>::new()));
    let capturing = Arc::new(AtomicBool::new(true));
    let stream_error = Arc::new(StdMutex::new(None::<String>));

    let make_error_callback = |slot: Arc<StdMutex<Option<String>>>| {
        move |err: cpal::StreamError| {
            let mut slot = slot.lock().unwrap();
            slot.get_or_insert_with(|| err.to_string());
        }
    };

    let stream = match sample_format {
        SampleFormat::I16 => {
            let buffer = Arc::clone(&buffer);
            let capturing = Arc::clone(&capturing);
            device
                .build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if capturing.load(Ordering::SeqCst) {
                            let mono = downmix_to_mono(data, channels);
                            if let Ok(mut buffer) = buffer.lock() {
                                buffer.extend_from_slice(&mono);
                            }
                        }
                    },
                    make_error_callback(Arc::clone(&stream_error)),
                    None,
                )
                .map_err(|e| AudioError::DeviceOpen(e.to_string()))?
        }

        SampleFormat::F32 => {
            let buffer = Arc::clone(&buffer);
            let capturing = Arc::clone(&capturing);
            device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if capturing.load(Ordering::SeqCst) {
                            let as_i16: Vec<i16> =
                                data.iter().map(|&s| (s * 32767.0) as i16).collect();
                            let mono = downmix_to_mono(&as_i16, channels);
                            if let Ok(mut buffer) = buffer.lock() {
                                buffer.extend_from_slice(&mono);
                            }
                        }
                    },
                    make_error_callback(Arc::clone(&stream_error)),
                    None,
                )
                .map_err(|e| AudioError::DeviceOpen(e.to_string()))?
        }

        other => {
            return Err(AudioError::DeviceOpen(format!(
                "Unsupported device sample format: {:?}",
                other
            )))
        }
    };

    stream
        .play()
        .map_err(|e| AudioError::DeviceOpen(e.to_string()))?;
    debug!("capture started at {} Hz, {} ch", sample_rate, channels);

    // Cooperative cancellation: the flag is checked at the top of each
    // iteration, as is the stream's error slot.
    loop {
        if stop_requested.load(Ordering::SeqCst) {
            break;
        }
        if stream_error.lock().unwrap().is_some() {
            break;
        }
        thread::sleep(STOP_POLL_INTERVAL);
    }

    capturing.store(false, Ordering::SeqCst);
    drop(stream);

    let error = stream_error.lock().unwrap().take();
    if let Some(message) = error {
        return Err(AudioError::Stream(message));
    }

    let samples = {
        let mut buffer = buffer.lock().unwrap();
        std::mem::take(&mut *buffer)
    };
    Ok((samples, sample_rate))
}

/// Pick an input configuration, preferring mono and the target sample
/// rate; falls back to the device's minimum rate (resampled later).
fn pick_input_config(
    device: &cpal::Device,
    target_rate: u32,
) -> Result<(StreamConfig, SampleFormat), AudioError> {
    let supported_configs = device
        .supported_input_configs()
        .map_err(|e| AudioError::DeviceOpen(format!("Failed to get configs: {}", e)))?;

    let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

    for config in supported_configs {
        if config.sample_format() != SampleFormat::I16
            && config.sample_format() != SampleFormat::F32
        {
            continue;
        }

        let includes_target =
            config.min_sample_rate().0 <= target_rate && config.max_sample_rate().0 >= target_rate;

        let is_better = match &best_config {
            None => true,
            Some(current) => {
                let fewer_channels = config.channels() < current.channels();
                let better_rate = includes_target && current.min_sample_rate().0 > target_rate;
                fewer_channels || better_rate
            }
        };
        if is_better {
            best_config = Some(config);
        }
    }

    let config_range =
        best_config.ok_or_else(|| AudioError::DeviceOpen("No suitable config found".into()))?;

    let sample_rate = if config_range.min_sample_rate().0 <= target_rate
        && config_range.max_sample_rate().0 >= target_rate
    {
        SampleRate(target_rate)
    } else {
        config_range.min_sample_rate()
    };

    let sample_format = config_range.sample_format();
    let config = StreamConfig {
        channels: config_range.channels(),
        sample_rate,
        buffer_size: cpal::BufferSize::Default,
    };

    Ok((config, sample_format))
}

/// Mix interleaved multi-channel samples down to mono
fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels == 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Resample mono audio between rates with rubato
fn resample(samples: &[i16], source_rate: u32, target_rate: u32) -> Result<Vec<i16>, AudioError> {
    if source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        1024, // Chunk size
        2,    // Sub-chunks
        1,    // Mono
    )
    .map_err(|e| AudioError::Stream(format!("Resampler init failed: {}", e)))?;

    let mut output = Vec::with_capacity(output_len);
    let mut input_pos = 0;

    while input_pos < samples_f32.len() {
        let frames_needed = resampler.input_frames_next();
        let end_pos = (input_pos + frames_needed).min(samples_f32.len());
        let chunk: Vec<Vec<f32>> = vec![samples_f32[input_pos..end_pos].to_vec()];

        // Pad the tail chunk up to the resampler's frame requirement
        let chunk = if chunk[0].len() < frames_needed {
            let mut padded = chunk[0].clone();
            padded.resize(frames_needed, 0.0);
            vec![padded]
        } else {
            chunk
        };

        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| AudioError::Stream(format!("Resampling failed: {}", e)))?;

        output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
        input_pos = end_pos;
    }

    output.truncate(output_len);

    Ok(output)
}
