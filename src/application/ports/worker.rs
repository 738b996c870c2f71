//! Worker boundary: background capture and playback tasks
//!
//! Engines spawn worker threads and hand back handles. All terminal
//! outcomes travel over the event channel, and a worker sends its
//! terminal event only after its device resources are released, so
//! joining the handle after the event (or stop-then-wait) guarantees
//! the device is free for the next start.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::clip::AudioClip;
use crate::domain::device::DeviceRef;

/// Worker-level audio errors
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    #[error("No audio device available")]
    NoDevice,

    #[error("Failed to open audio device: {0}")]
    DeviceOpen(String),

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Unreadable audio file: {0}")]
    FileFormat(String),

    #[error("Failed to write recording: {0}")]
    Write(String),
}

/// Terminal notifications from workers, delivered asynchronously and
/// applied to session state only on the front-end task.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Playback reached the end of the clip
    PlaybackFinished,
    /// Playback was cancelled by request
    PlaybackStopped,
    /// Playback failed at open or mid-stream
    PlaybackFailed(AudioError),
    /// Capture stopped and the buffer was finalized to a file
    CaptureFinished(AudioClip),
    /// Capture failed; no file was written
    CaptureFailed(AudioError),
}

/// Sender half of the worker event channel
pub type EventSender = mpsc::UnboundedSender<WorkerEvent>;

#[derive(Debug, Default)]
struct ControlFlags {
    paused: bool,
    stopped: bool,
}

/// Pause/stop control shared between a playback handle and its worker.
/// Pausing blocks the worker on a condition variable; the worker's read
/// cursor cannot advance and no CPU is burned while paused.
#[derive(Debug, Default)]
pub struct PlaybackControl {
    flags: Mutex<ControlFlags>,
    cond: Condvar,
}

impl PlaybackControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.flags.lock().unwrap().paused = true;
    }

    pub fn resume(&self) {
        self.flags.lock().unwrap().paused = false;
        self.cond.notify_all();
    }

    /// Request cooperative cancellation; wakes a paused worker so it
    /// can observe the stop.
    pub fn request_stop(&self) {
        self.flags.lock().unwrap().stopped = true;
        self.cond.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.flags.lock().unwrap().paused
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.lock().unwrap().stopped
    }

    /// Block while paused. Returns false once stop has been requested,
    /// whether or not a pause was in effect.
    pub fn block_while_paused(&self) -> bool {
        let mut flags = self.flags.lock().unwrap();
        while flags.paused && !flags.stopped {
            flags = self.cond.wait(flags).unwrap();
        }
        !flags.stopped
    }
}

/// Handle to an in-flight playback worker. Dropping the handle stops
/// the worker and waits for device release.
#[derive(Debug)]
pub struct PlaybackHandle {
    control: Arc<PlaybackControl>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    pub fn new(control: Arc<PlaybackControl>, thread: JoinHandle<()>) -> Self {
        Self {
            control,
            thread: Some(thread),
        }
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    /// Request cancellation without waiting for release
    pub fn stop(&self) {
        self.control.request_stop();
    }

    /// Block the caller until the worker thread has exited and the
    /// output device is released. Bounded by roughly one chunk of
    /// audio once a stop has been requested.
    pub fn wait(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// Cancellation: request stop, then wait for release
    pub fn stop_and_wait(&mut self) {
        self.stop();
        self.wait();
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.stop_and_wait();
    }
}

/// Handle to an in-flight capture worker. One capture per handle;
/// a new recording requires a fresh start call on the engine.
#[derive(Debug)]
pub struct CaptureHandle {
    stop_requested: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    pub fn new(stop_requested: Arc<AtomicBool>, thread: JoinHandle<()>) -> Self {
        Self {
            stop_requested,
            thread: Some(thread),
        }
    }

    /// Flip the stop flag checked at the top of each capture loop
    /// iteration. Finalization happens on the worker thread.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Block the caller until the worker thread has exited, the input
    /// device is released, and the terminal event has been sent.
    pub fn wait(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    pub fn stop_and_wait(&mut self) {
        self.request_stop();
        self.wait();
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.stop_and_wait();
    }
}

/// Port for starting playback workers
pub trait PlaybackEngine: Send + Sync {
    /// Spawn a worker streaming `clip` to `device` (or the default
    /// output). Open failures and all terminal outcomes arrive as
    /// events on `events`.
    fn start(
        &self,
        clip: &AudioClip,
        device: Option<&DeviceRef>,
        events: EventSender,
    ) -> PlaybackHandle;
}

/// Port for starting capture workers
pub trait CaptureEngine: Send + Sync {
    /// Spawn a worker recording from `device` (or the default input)
    /// into `destination`. The finalized clip arrives as a
    /// `CaptureFinished` event after `request_stop`.
    fn start(
        &self,
        destination: &Path,
        device: Option<&DeviceRef>,
        events: EventSender,
    ) -> CaptureHandle;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn pause_freezes_the_worker_loop() {
        let control = Arc::new(PlaybackControl::new());
        let iterations = Arc::new(AtomicU64::new(0));

        let worker_control = Arc::clone(&control);
        let worker_iterations = Arc::clone(&iterations);
        let worker = thread::spawn(move || {
            while worker_control.block_while_paused() {
                worker_iterations.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(1));
            }
        });

        // Let it advance, then pause and verify the counter freezes.
        thread::sleep(Duration::from_millis(20));
        control.pause();
        thread::sleep(Duration::from_millis(20));
        let frozen = iterations.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(iterations.load(Ordering::SeqCst), frozen);

        control.resume();
        thread::sleep(Duration::from_millis(20));
        assert!(iterations.load(Ordering::SeqCst) > frozen);

        control.request_stop();
        worker.join().unwrap();
    }

    #[test]
    fn stop_wakes_a_paused_worker() {
        let control = Arc::new(PlaybackControl::new());
        control.pause();

        let worker_control = Arc::clone(&control);
        let worker = thread::spawn(move || worker_control.block_while_paused());

        thread::sleep(Duration::from_millis(10));
        control.request_stop();

        // A stop observed during a pause reports cancellation.
        assert!(!worker.join().unwrap());
    }

    #[test]
    fn block_while_paused_passes_through_when_running() {
        let control = PlaybackControl::new();
        assert!(control.block_while_paused());

        control.request_stop();
        assert!(!control.block_while_paused());
    }

    #[test]
    fn playback_handle_wait_joins_thread() {
        let control = Arc::new(PlaybackControl::new());
        let worker_control = Arc::clone(&control);
        let thread = thread::spawn(move || {
            while !worker_control.is_stopped() {
                thread::sleep(Duration::from_millis(1));
            }
        });

        let mut handle = PlaybackHandle::new(control, thread);
        handle.stop_and_wait();
        // A second wait is a no-op.
        handle.wait();
    }

    #[test]
    fn capture_handle_stop_flag_reaches_worker() {
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            while !worker_stop.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
        });

        let mut handle = CaptureHandle::new(stop, thread);
        handle.request_stop();
        handle.wait();
    }
}
