//! Session state machine

use std::fmt;
use thiserror::Error;

use super::clip::AudioClip;
use super::device::DeviceRef;

/// Recording mode: transient clips are deleted on clear,
/// remembered clips survive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordMode {
    Transient,
    Remembered,
}

/// Session phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    PlayingClip,
    PlaybackPaused,
    Recording(RecordMode),
}

impl SessionPhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PlayingClip => "playing",
            Self::PlaybackPaused => "paused",
            Self::Recording(_) => "recording",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid phase transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_phase} state")]
pub struct InvalidStateTransition {
    pub current_phase: SessionPhase,
    pub action: &'static str,
}

/// Session entity: the single owner of the current clip, the remembered
/// flag, and the selected devices. Mutated only through validated
/// transitions, and only from the front-end task.
///
/// Phase machine:
///   IDLE -> PLAYING             (begin_playback)
///   PLAYING -> PAUSED           (pause_playback)
///   PAUSED -> PLAYING           (resume_playback)
///   PLAYING | PAUSED -> IDLE    (finish_playback)
///   IDLE -> RECORDING(mode)     (begin_recording)
///   RECORDING -> IDLE           (finish_recording | abort_recording)
#[derive(Debug, Default)]
pub struct Session {
    phase: SessionPhase,
    current_clip: Option<AudioClip>,
    remembered: bool,
    input_device: Option<DeviceRef>,
    output_device: Option<DeviceRef>,
}

impl Session {
    /// Create a new session in idle state with no clip
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_clip(&self) -> Option<&AudioClip> {
        self.current_clip.as_ref()
    }

    /// Whether the current clip must survive a clear
    pub fn is_remembered(&self) -> bool {
        self.remembered
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SessionPhase::Idle
    }

    pub fn input_device(&self) -> Option<&DeviceRef> {
        self.input_device.as_ref()
    }

    pub fn output_device(&self) -> Option<&DeviceRef> {
        self.output_device.as_ref()
    }

    /// Select an input device for subsequent recordings
    pub fn select_input_device(&mut self, device: Option<DeviceRef>) {
        self.input_device = device;
    }

    /// Select an output device for subsequent playback
    pub fn select_output_device(&mut self, device: Option<DeviceRef>) {
        self.output_device = device;
    }

    /// Transition from IDLE or PAUSED to PLAYING
    pub fn begin_playback(&mut self) -> Result<(), InvalidStateTransition> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::PlaybackPaused => {
                self.phase = SessionPhase::PlayingClip;
                Ok(())
            }
            _ => Err(InvalidStateTransition {
                current_phase: self.phase,
                action: "start playback",
            }),
        }
    }

    /// Transition from PLAYING to PAUSED
    pub fn pause_playback(&mut self) -> Result<(), InvalidStateTransition> {
        if self.phase != SessionPhase::PlayingClip {
            return Err(InvalidStateTransition {
                current_phase: self.phase,
                action: "pause playback",
            });
        }
        self.phase = SessionPhase::PlaybackPaused;
        Ok(())
    }

    /// Transition from PAUSED back to PLAYING
    pub fn resume_playback(&mut self) -> Result<(), InvalidStateTransition> {
        if self.phase != SessionPhase::PlaybackPaused {
            return Err(InvalidStateTransition {
                current_phase: self.phase,
                action: "resume playback",
            });
        }
        self.phase = SessionPhase::PlayingClip;
        Ok(())
    }

    /// Transition from any playback phase to IDLE (completion, stop,
    /// rewind, or failure). The current clip is unchanged.
    pub fn finish_playback(&mut self) -> Result<(), InvalidStateTransition> {
        match self.phase {
            SessionPhase::PlayingClip | SessionPhase::PlaybackPaused => {
                self.phase = SessionPhase::Idle;
                Ok(())
            }
            _ => Err(InvalidStateTransition {
                current_phase: self.phase,
                action: "finish playback",
            }),
        }
    }

    /// Transition from IDLE to RECORDING(mode)
    pub fn begin_recording(&mut self, mode: RecordMode) -> Result<(), InvalidStateTransition> {
        if self.phase != SessionPhase::Idle {
            return Err(InvalidStateTransition {
                current_phase: self.phase,
                action: "start recording",
            });
        }
        self.phase = SessionPhase::Recording(mode);
        Ok(())
    }

    /// Transition from RECORDING to IDLE, adopting the finalized clip.
    /// The remembered flag is set from the recording mode.
    pub fn finish_recording(&mut self, clip: AudioClip) -> Result<(), InvalidStateTransition> {
        let SessionPhase::Recording(mode) = self.phase else {
            return Err(InvalidStateTransition {
                current_phase: self.phase,
                action: "finish recording",
            });
        };
        self.current_clip = Some(clip);
        self.remembered = mode == RecordMode::Remembered;
        self.phase = SessionPhase::Idle;
        Ok(())
    }

    /// Transition from RECORDING to IDLE without a clip (worker failure).
    /// The prior clip, if any, remains current.
    pub fn abort_recording(&mut self) -> Result<(), InvalidStateTransition> {
        let SessionPhase::Recording(_) = self.phase else {
            return Err(InvalidStateTransition {
                current_phase: self.phase,
                action: "abort recording",
            });
        };
        self.phase = SessionPhase::Idle;
        Ok(())
    }

    /// Replace the current clip while idle (import). The previous clip
    /// reference is returned so the caller can dispose of its file.
    pub fn adopt_clip(&mut self, clip: AudioClip) -> Result<Option<AudioClip>, InvalidStateTransition> {
        if self.phase != SessionPhase::Idle {
            return Err(InvalidStateTransition {
                current_phase: self.phase,
                action: "replace the clip",
            });
        }
        self.remembered = false;
        Ok(self.current_clip.replace(clip))
    }

    /// Take the current clip out of the session (clear, export).
    /// Resets the remembered flag.
    pub fn take_clip(&mut self) -> Option<AudioClip> {
        self.remembered = false;
        self.current_clip.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clip::CAPTURE_FORMAT;
    use std::time::Duration;

    fn clip(path: &str) -> AudioClip {
        AudioClip::new(path, CAPTURE_FORMAT, Duration::from_secs(1))
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = Session::new();
        assert!(session.is_idle());
        assert!(session.current_clip().is_none());
        assert!(!session.is_remembered());
    }

    #[test]
    fn playback_from_idle() {
        let mut session = Session::new();
        assert!(session.begin_playback().is_ok());
        assert_eq!(session.phase(), SessionPhase::PlayingClip);
    }

    #[test]
    fn playback_while_recording_fails() {
        let mut session = Session::new();
        session.begin_recording(RecordMode::Transient).unwrap();

        let err = session.begin_playback().unwrap_err();
        assert_eq!(
            err.current_phase,
            SessionPhase::Recording(RecordMode::Transient)
        );
        assert_eq!(err.action, "start playback");
    }

    #[test]
    fn pause_resume_cycle() {
        let mut session = Session::new();
        session.begin_playback().unwrap();

        session.pause_playback().unwrap();
        assert_eq!(session.phase(), SessionPhase::PlaybackPaused);

        session.resume_playback().unwrap();
        assert_eq!(session.phase(), SessionPhase::PlayingClip);
    }

    #[test]
    fn pause_from_idle_fails() {
        let mut session = Session::new();
        assert!(session.pause_playback().is_err());
    }

    #[test]
    fn resume_restarts_from_paused_only() {
        let mut session = Session::new();
        assert!(session.resume_playback().is_err());

        session.begin_playback().unwrap();
        assert!(session.resume_playback().is_err());
    }

    #[test]
    fn finish_playback_from_either_playback_phase() {
        let mut session = Session::new();
        session.begin_playback().unwrap();
        session.finish_playback().unwrap();
        assert!(session.is_idle());

        session.begin_playback().unwrap();
        session.pause_playback().unwrap();
        session.finish_playback().unwrap();
        assert!(session.is_idle());
    }

    #[test]
    fn finish_playback_from_idle_fails() {
        let mut session = Session::new();
        assert!(session.finish_playback().is_err());
    }

    #[test]
    fn recording_transient_then_finish() {
        let mut session = Session::new();
        session.begin_recording(RecordMode::Transient).unwrap();
        assert_eq!(
            session.phase(),
            SessionPhase::Recording(RecordMode::Transient)
        );

        session.finish_recording(clip("/tmp/a.wav")).unwrap();
        assert!(session.is_idle());
        assert!(!session.is_remembered());
        assert_eq!(session.current_clip().unwrap().display_name(), "a.wav");
    }

    #[test]
    fn recording_remembered_sets_flag() {
        let mut session = Session::new();
        session.begin_recording(RecordMode::Remembered).unwrap();
        session.finish_recording(clip("/tmp/b.wav")).unwrap();
        assert!(session.is_remembered());
    }

    #[test]
    fn new_transient_recording_clears_remembered_flag() {
        let mut session = Session::new();
        session.begin_recording(RecordMode::Remembered).unwrap();
        session.finish_recording(clip("/tmp/b.wav")).unwrap();

        session.begin_recording(RecordMode::Transient).unwrap();
        session.finish_recording(clip("/tmp/c.wav")).unwrap();
        assert!(!session.is_remembered());
    }

    #[test]
    fn recording_while_playing_fails() {
        let mut session = Session::new();
        session.begin_playback().unwrap();
        assert!(session.begin_recording(RecordMode::Transient).is_err());
    }

    #[test]
    fn abort_recording_keeps_prior_clip() {
        let mut session = Session::new();
        session.adopt_clip(clip("/tmp/prior.wav")).unwrap();

        session.begin_recording(RecordMode::Transient).unwrap();
        session.abort_recording().unwrap();

        assert!(session.is_idle());
        assert_eq!(session.current_clip().unwrap().display_name(), "prior.wav");
    }

    #[test]
    fn adopt_clip_only_while_idle() {
        let mut session = Session::new();
        session.begin_playback().unwrap();
        assert!(session.adopt_clip(clip("/tmp/x.wav")).is_err());
    }

    #[test]
    fn adopt_clip_returns_previous() {
        let mut session = Session::new();
        assert!(session.adopt_clip(clip("/tmp/first.wav")).unwrap().is_none());

        let prev = session.adopt_clip(clip("/tmp/second.wav")).unwrap();
        assert_eq!(prev.unwrap().display_name(), "first.wav");
    }

    #[test]
    fn take_clip_resets_remembered() {
        let mut session = Session::new();
        session.begin_recording(RecordMode::Remembered).unwrap();
        session.finish_recording(clip("/tmp/kept.wav")).unwrap();
        assert!(session.is_remembered());

        let taken = session.take_clip();
        assert_eq!(taken.unwrap().display_name(), "kept.wav");
        assert!(!session.is_remembered());
        assert!(session.current_clip().is_none());
    }

    #[test]
    fn device_selection_persists_across_transitions() {
        let mut session = Session::new();
        session.select_input_device(Some(DeviceRef::new("Mic", 1, 0)));
        session.select_output_device(Some(DeviceRef::new("Speakers", 0, 2)));

        session.begin_playback().unwrap();
        session.finish_playback().unwrap();

        assert_eq!(session.input_device().unwrap().name(), "Mic");
        assert_eq!(session.output_device().unwrap().name(), "Speakers");
    }

    #[test]
    fn phase_display() {
        assert_eq!(SessionPhase::Idle.to_string(), "idle");
        assert_eq!(SessionPhase::PlayingClip.to_string(), "playing");
        assert_eq!(SessionPhase::PlaybackPaused.to_string(), "paused");
        assert_eq!(
            SessionPhase::Recording(RecordMode::Transient).to_string(),
            "recording"
        );
    }

    #[test]
    fn transition_error_display() {
        let err = InvalidStateTransition {
            current_phase: SessionPhase::PlayingClip,
            action: "start recording",
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("playing"));
    }
}
