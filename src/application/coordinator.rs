//! Session coordinator
//!
//! The single owner of session state. Starts and stops at most one
//! background worker at a time, enforces mutual exclusion between
//! capture and playback, and applies worker events to the session —
//! always on the front-end task, never from a worker thread.

use std::path::PathBuf;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::domain::clip::AudioClip;
use crate::domain::device::DeviceRef;
use crate::domain::session::{RecordMode, Session, SessionPhase};

use super::ports::{
    CaptureEngine, CaptureHandle, EventSender, PlaybackEngine, PlaybackHandle, WorkerEvent,
};
use super::storage::ClipStore;

/// The worker currently holding the audio subsystem.
/// Capture and playback are mutually exclusive by construction.
enum ActiveWorker {
    Playback(PlaybackHandle),
    Capture(CaptureHandle),
}

/// User-facing outcomes of coordinator operations and worker events
#[derive(Debug)]
pub enum SessionNotice {
    NoClip,
    AlreadyPlaying,
    NotPlaying,
    PlaybackStarted(String),
    PlaybackResumed,
    PlaybackPaused,
    PlaybackRewound,
    PlaybackFinished,
    PlaybackStopped,
    RecordingStarted(RecordMode),
    RecordingFinished { clip: AudioClip, remembered: bool },
    ClipLoaded(AudioClip),
    ClipDeleted(PathBuf),
    ClipKept(PathBuf),
    NothingToClear,
    WorkerFailed(String),
    Warning(String),
}

/// Read-only session snapshot for status rendering
#[derive(Debug)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub clip: Option<AudioClip>,
    pub remembered: bool,
    pub input_device: Option<DeviceRef>,
    pub output_device: Option<DeviceRef>,
}

/// Coordinator over a playback engine and a capture engine.
///
/// All operations are synchronous: stop-then-wait sequences block the
/// caller for at most roughly one audio chunk, which the front end
/// accepts as teardown time.
pub struct Coordinator<P, C>
where
    P: PlaybackEngine,
    C: CaptureEngine,
{
    playback: P,
    capture: C,
    store: ClipStore,
    session: Session,
    active: Option<ActiveWorker>,
    events_tx: EventSender,
    events_rx: mpsc::UnboundedReceiver<WorkerEvent>,
}

impl<P, C> Coordinator<P, C>
where
    P: PlaybackEngine,
    C: CaptureEngine,
{
    pub fn new(playback: P, capture: C, store: ClipStore) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            playback,
            capture,
            store,
            session: Session::new(),
            active: None,
            events_tx,
            events_rx,
        }
    }

    /// Current session snapshot
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.session.phase(),
            clip: self.session.current_clip().cloned(),
            remembered: self.session.is_remembered(),
            input_device: self.session.input_device().cloned(),
            output_device: self.session.output_device().cloned(),
        }
    }

    pub fn current_clip(&self) -> Option<&AudioClip> {
        self.session.current_clip()
    }

    pub fn select_input_device(&mut self, device: Option<DeviceRef>) {
        self.session.select_input_device(device);
    }

    pub fn select_output_device(&mut self, device: Option<DeviceRef>) {
        self.session.select_output_device(device);
    }

    /// Wait for the next worker event and apply it to the session.
    /// Pends until a worker reports; intended for the front end's
    /// select loop.
    pub async fn next_event(&mut self) -> SessionNotice {
        loop {
            // The coordinator holds a sender, so the channel never closes.
            let Some(event) = self.events_rx.recv().await else {
                continue;
            };
            if let Some(notice) = self.apply_event(event) {
                return notice;
            }
        }
    }

    /// Start or resume playback of the current clip. An active
    /// recording is finalized first; capture and playback never
    /// overlap.
    pub fn play(&mut self) -> Vec<SessionNotice> {
        let mut notices = Vec::new();

        match self.session.phase() {
            SessionPhase::PlayingClip => {
                notices.push(SessionNotice::AlreadyPlaying);
                return notices;
            }
            SessionPhase::PlaybackPaused => {
                if let Some(ActiveWorker::Playback(handle)) = &self.active {
                    handle.resume();
                }
                if self.session.resume_playback().is_ok() {
                    notices.push(SessionNotice::PlaybackResumed);
                }
                return notices;
            }
            SessionPhase::Recording(_) => {
                notices.extend(self.cancel_active_worker());
            }
            SessionPhase::Idle => {}
        }

        let Some(clip) = self.session.current_clip().cloned() else {
            notices.push(SessionNotice::NoClip);
            return notices;
        };

        debug!("starting playback of {}", clip.path().display());
        let handle = self.playback.start(
            &clip,
            self.session.output_device(),
            self.events_tx.clone(),
        );
        // Cannot fail: the session is idle after the cancellation above.
        let _ = self.session.begin_playback();
        self.active = Some(ActiveWorker::Playback(handle));
        notices.push(SessionNotice::PlaybackStarted(clip.display_name()));
        notices
    }

    /// Pause an active playback
    pub fn pause(&mut self) -> Vec<SessionNotice> {
        if self.session.pause_playback().is_err() {
            return vec![SessionNotice::NotPlaying];
        }
        if let Some(ActiveWorker::Playback(handle)) = &self.active {
            handle.pause();
        }
        vec![SessionNotice::PlaybackPaused]
    }

    /// Discard the playback worker; the next play restarts from the
    /// beginning of the clip.
    pub fn rewind(&mut self) -> Vec<SessionNotice> {
        match self.session.phase() {
            SessionPhase::PlayingClip | SessionPhase::PlaybackPaused => {
                let mut notices = self.cancel_active_worker();
                notices.push(SessionNotice::PlaybackRewound);
                notices
            }
            _ => vec![SessionNotice::NotPlaying],
        }
    }

    /// Start a recording, or stop the one in flight.
    ///
    /// While recording, a second invocation (either mode) stops the
    /// capture and finalizes the current clip. While playing, the
    /// playback worker is forcibly stopped and released before the
    /// input stream opens.
    pub fn record(&mut self, mode: RecordMode) -> Vec<SessionNotice> {
        let mut notices = Vec::new();

        match self.session.phase() {
            SessionPhase::Recording(_) => {
                return self.cancel_active_worker();
            }
            SessionPhase::PlayingClip | SessionPhase::PlaybackPaused => {
                notices.extend(self.cancel_active_worker());
            }
            SessionPhase::Idle => {}
        }

        let destination = match mode {
            RecordMode::Transient => self.store.temp_clip_path(),
            RecordMode::Remembered => match self.store.next_saved_path() {
                Ok(path) => path,
                Err(e) => {
                    notices.push(SessionNotice::Warning(format!(
                        "Cannot prepare the saved-clips directory: {}",
                        e
                    )));
                    return notices;
                }
            },
        };

        debug!("starting {:?} capture into {}", mode, destination.display());
        let handle = self.capture.start(
            &destination,
            self.session.input_device(),
            self.events_tx.clone(),
        );
        let _ = self.session.begin_recording(mode);
        self.active = Some(ActiveWorker::Capture(handle));
        notices.push(SessionNotice::RecordingStarted(mode));
        notices
    }

    /// Cancel any active worker and delete the backing file unless the
    /// clip is remembered. Resets the session to idle.
    pub fn clear(&mut self) -> Vec<SessionNotice> {
        let mut notices = self.cancel_active_worker();

        let remembered = self.session.is_remembered();
        match self.session.take_clip() {
            Some(clip) => {
                let path = clip.path().to_path_buf();
                if remembered {
                    notices.push(SessionNotice::ClipKept(path));
                } else {
                    match std::fs::remove_file(&path) {
                        Ok(()) => notices.push(SessionNotice::ClipDeleted(path)),
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                            notices.push(SessionNotice::ClipDeleted(path));
                        }
                        Err(e) => notices.push(SessionNotice::Warning(format!(
                            "Failed to delete {}: {}",
                            path.display(),
                            e
                        ))),
                    }
                }
            }
            None => {
                if notices.is_empty() {
                    notices.push(SessionNotice::NothingToClear);
                }
            }
        }
        notices
    }

    /// Make an imported clip current. Any active worker is released
    /// first; the previous clip's file stays on disk.
    pub fn adopt_clip(&mut self, clip: AudioClip) -> Vec<SessionNotice> {
        let mut notices = self.cancel_active_worker();
        // Idle after cancellation, so this cannot fail.
        let _ = self.session.adopt_clip(clip.clone());
        notices.push(SessionNotice::ClipLoaded(clip));
        notices
    }

    /// Stop any active worker without touching the current clip.
    /// Used before exporting the clip's file.
    pub fn stop_workers(&mut self) -> Vec<SessionNotice> {
        self.cancel_active_worker()
    }

    /// Remove the exported clip from the session and delete its
    /// working copy; the export destination is now the only copy.
    pub fn complete_export(&mut self) -> Vec<SessionNotice> {
        match self.session.take_clip() {
            Some(clip) => {
                let path = clip.path().to_path_buf();
                if let Err(e) = std::fs::remove_file(&path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        return vec![SessionNotice::Warning(format!(
                            "Failed to remove {}: {}",
                            path.display(),
                            e
                        ))];
                    }
                }
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Release any active worker before process exit
    pub fn shutdown(&mut self) {
        let _ = self.cancel_active_worker();
    }

    /// Stop the active worker, wait for device release, and apply its
    /// terminal event. The stop-wait-apply sequence is what allows the
    /// next start to open the device immediately.
    fn cancel_active_worker(&mut self) -> Vec<SessionNotice> {
        let Some(worker) = self.active.take() else {
            return Vec::new();
        };

        match worker {
            ActiveWorker::Playback(mut handle) => {
                handle.stop_and_wait();
            }
            ActiveWorker::Capture(mut handle) => {
                handle.stop_and_wait();
            }
        }

        // The worker sends its terminal event before exiting, so after
        // the join it is already in the channel.
        let mut notices = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(notice) = self.apply_terminal(event) {
                notices.push(notice);
            }
        }
        notices
    }

    /// Apply an event that arrived asynchronously (worker still
    /// registered as active). Returns None for stale events left over
    /// from an already-released worker.
    fn apply_event(&mut self, event: WorkerEvent) -> Option<SessionNotice> {
        let matches_active = matches!(
            (&event, &self.active),
            (
                WorkerEvent::PlaybackFinished
                    | WorkerEvent::PlaybackStopped
                    | WorkerEvent::PlaybackFailed(_),
                Some(ActiveWorker::Playback(_)),
            ) | (
                WorkerEvent::CaptureFinished(_) | WorkerEvent::CaptureFailed(_),
                Some(ActiveWorker::Capture(_)),
            )
        );
        if !matches_active {
            debug!("ignoring stale worker event: {:?}", event);
            return None;
        }

        // The worker has reached its terminal state; join the thread
        // so its device handles are provably released.
        match self.active.take() {
            Some(ActiveWorker::Playback(mut handle)) => handle.wait(),
            Some(ActiveWorker::Capture(mut handle)) => handle.wait(),
            None => {}
        }
        self.apply_terminal(event)
    }

    /// Translate a terminal worker event into a session transition
    fn apply_terminal(&mut self, event: WorkerEvent) -> Option<SessionNotice> {
        match event {
            WorkerEvent::PlaybackFinished => {
                self.session.finish_playback().ok()?;
                Some(SessionNotice::PlaybackFinished)
            }
            WorkerEvent::PlaybackStopped => {
                self.session.finish_playback().ok()?;
                Some(SessionNotice::PlaybackStopped)
            }
            WorkerEvent::PlaybackFailed(e) => {
                warn!("playback worker failed: {}", e);
                let _ = self.session.finish_playback();
                Some(SessionNotice::WorkerFailed(e.to_string()))
            }
            WorkerEvent::CaptureFinished(clip) => {
                if self.session.finish_recording(clip.clone()).is_err() {
                    return None;
                }
                Some(SessionNotice::RecordingFinished {
                    clip,
                    remembered: self.session.is_remembered(),
                })
            }
            WorkerEvent::CaptureFailed(e) => {
                warn!("capture worker failed: {}", e);
                let _ = self.session.abort_recording();
                Some(SessionNotice::WorkerFailed(e.to_string()))
            }
        }
    }
}
