//! Playback worker using rodio
//!
//! Each start spawns a dedicated thread that reads the clip in
//! fixed-size chunks and feeds them to a rodio sink on the selected
//! output device. Pause parks the thread on the control's condition
//! variable; stop is cooperative and checked every iteration. The
//! terminal event is sent only after the output stream is dropped, so
//! the device is provably free once the event is observed or the
//! handle joined.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::debug;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

use crate::application::ports::{
    AudioError, EventSender, PlaybackControl, PlaybackEngine, PlaybackHandle, WorkerEvent,
};
use crate::domain::clip::AudioClip;
use crate::domain::device::DeviceRef;

use super::directory::resolve_output_device;
use super::wav::WavChunkSource;

/// Frames streamed per loop iteration
const FRAMES_PER_CHUNK: usize = 1024;

enum Terminal {
    Completed,
    Stopped,
}

/// Playback engine spawning one worker thread per start
pub struct RodioPlaybackEngine {
    frames_per_chunk: usize,
}

impl RodioPlaybackEngine {
    pub fn new() -> Self {
        Self {
            frames_per_chunk: FRAMES_PER_CHUNK,
        }
    }
}

impl Default for RodioPlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine for RodioPlaybackEngine {
    fn start(
        &self,
        clip: &AudioClip,
        device: Option<&DeviceRef>,
        events: EventSender,
    ) -> PlaybackHandle {
        let control = Arc::new(PlaybackControl::new());
        let worker_control = Arc::clone(&control);
        let path = clip.path().to_path_buf();
        let device_name = device.map(|d| d.name().to_string());
        let frames_per_chunk = self.frames_per_chunk;

        let thread = thread::spawn(move || {
            let outcome = stream_clip(&path, device_name, frames_per_chunk, &worker_control);
            // The stream and sink are dropped by now; the receiver may
            // rely on the device being free.
            let event = match outcome {
                Ok(Terminal::Completed) => WorkerEvent::PlaybackFinished,
                Ok(Terminal::Stopped) => WorkerEvent::PlaybackStopped,
                Err(e) => WorkerEvent::PlaybackFailed(e),
            };
            let _ = events.send(event);
        });

        PlaybackHandle::new(control, thread)
    }
}

/// The worker loop. Returns once the clip is exhausted, a stop is
/// observed, or an I/O error occurs; all owned audio resources are
/// released before returning.
fn stream_clip(
    path: &Path,
    device_name: Option<String>,
    frames_per_chunk: usize,
    control: &PlaybackControl,
) -> Result<Terminal, AudioError> {
    let mut source = WavChunkSource::open(path)?;
    let spec = source.spec();

    let device = resolve_output_device(device_name.as_deref())?;
    let (_stream, stream_handle) =
        OutputStream::try_from_device(&device).map_err(|e| AudioError::DeviceOpen(e.to_string()))?;
    let sink = Sink::try_new(&stream_handle).map_err(|e| AudioError::DeviceOpen(e.to_string()))?;

    let chunk_duration =
        Duration::from_secs_f64(frames_per_chunk as f64 / spec.sample_rate as f64);
    debug!(
        "playback started: {} ({} Hz, {} ch)",
        path.display(),
        spec.sample_rate,
        spec.channels
    );

    loop {
        // Parked here while paused; the read cursor cannot advance.
        if !control.block_while_paused() {
            sink.stop();
            return Ok(Terminal::Stopped);
        }

        let chunk = source.next_chunk(frames_per_chunk)?;
        if chunk.is_empty() {
            sink.sleep_until_end();
            return Ok(Terminal::Completed);
        }
        sink.append(SamplesBuffer::new(spec.channels, spec.sample_rate, chunk));

        // Keep at most one chunk queued behind the one playing; the
        // coarse wait keeps stop latency within a fraction of a chunk.
        while sink.len() > 1 && !control.is_stopped() && !control.is_paused() {
            thread::sleep(chunk_duration / 4);
        }
    }
}
