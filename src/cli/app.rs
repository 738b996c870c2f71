//! Application runners: interactive session, device listing, one-shot
//! compare

use std::path::Path;
use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::compare::MatchVerdict;
use crate::application::coordinator::{Coordinator, SessionNotice};
use crate::application::ports::DeviceDirectory;
use crate::application::{export_clip, import_clip, ClipStore, PhraseComparator};
use crate::domain::language::LanguageTag;
use crate::domain::session::RecordMode;
use crate::infrastructure::{
    CpalCaptureEngine, CpalDeviceDirectory, FfmpegTranscoder, GoogleSpeechTranscriber,
    RodioPlaybackEngine,
};

use super::commands::SessionCommand;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Options shared by the session and the one-shot runners
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub language: LanguageTag,
    pub api_key: Option<String>,
}

enum Flow {
    Continue,
    Quit,
}

/// Clip storage rooted in the platform directories: transient
/// captures in the temp dir, remembered clips under the data dir.
fn default_clip_store() -> ClipStore {
    let saved_dir = dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("voicematch")
        .join("clips");
    ClipStore::new(std::env::temp_dir(), saved_dir)
}

fn missing_api_key_message() -> &'static str {
    "Missing API key. Set GOOGLE_SPEECH_API_KEY or pass --api-key"
}

/// List devices once and exit
pub async fn run_devices() -> ExitCode {
    let presenter = Presenter::new();
    let directory = CpalDeviceDirectory::new();

    print_device_listing(
        &presenter,
        &directory,
        directory.default_input().as_ref().map(|d| d.name().to_string()),
        directory.default_output().as_ref().map(|d| d.name().to_string()),
    );
    ExitCode::from(EXIT_SUCCESS)
}

fn print_device_listing(
    presenter: &Presenter,
    directory: &CpalDeviceDirectory,
    selected_input: Option<String>,
    selected_output: Option<String>,
) {
    presenter.output("Input devices:");
    match directory.input_devices() {
        Ok(devices) if devices.is_empty() => presenter.output("  (none found)"),
        Ok(devices) => {
            for (i, device) in devices.iter().enumerate() {
                let selected = selected_input.as_deref() == Some(device.name());
                presenter.device_entry(i + 1, device.name(), selected);
            }
        }
        Err(e) => presenter.warn(&e.to_string()),
    }

    presenter.output("Output devices:");
    match directory.output_devices() {
        Ok(devices) if devices.is_empty() => presenter.output("  (none found)"),
        Ok(devices) => {
            for (i, device) in devices.iter().enumerate() {
                let selected = selected_output.as_deref() == Some(device.name());
                presenter.device_entry(i + 1, device.name(), selected);
            }
        }
        Err(e) => presenter.warn(&e.to_string()),
    }
}

/// Compare two files once and exit
pub async fn run_compare(clip_a: &Path, clip_b: &Path, options: SessionOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let Some(api_key) = options.api_key else {
        presenter.error(missing_api_key_message());
        return ExitCode::from(EXIT_USAGE_ERROR);
    };

    let comparator = PhraseComparator::new(GoogleSpeechTranscriber::new(api_key));

    presenter.start_spinner("Transcribing...");
    match comparator.compare(clip_a, clip_b, &options.language).await {
        Ok(outcome) => {
            presenter.stop_spinner();
            match outcome.verdict {
                MatchVerdict::Match => presenter.success("The phrases match!"),
                MatchVerdict::NoMatch => presenter.info("The phrases do not match."),
            }
            presenter.output(&format!("  A: {}", outcome.transcript_a));
            presenter.output(&format!("  B: {}", outcome.transcript_b));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.stop_spinner();
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the interactive session: one command per line, worker
/// notifications rendered as they arrive on the same task.
pub async fn run_session(options: SessionOptions) -> ExitCode {
    let mut presenter = Presenter::new();
    let directory = CpalDeviceDirectory::new();
    let store = default_clip_store();
    let codec = FfmpegTranscoder::new();

    let mut coordinator = Coordinator::new(
        RodioPlaybackEngine::new(),
        CpalCaptureEngine::new(),
        store.clone(),
    );
    coordinator.select_input_device(directory.default_input());
    coordinator.select_output_device(directory.default_output());

    presenter.info("VoiceMatch session. Type 'help' for commands, 'quit' to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        presenter.prompt();
        tokio::select! {
            maybe_line = lines.next_line() => {
                match maybe_line {
                    Ok(Some(line)) => {
                        let flow = handle_line(
                            &line,
                            &mut presenter,
                            &mut coordinator,
                            &directory,
                            &codec,
                            &store,
                            &options,
                        )
                        .await;
                        if matches!(flow, Flow::Quit) {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        presenter.error(&format!("Input error: {}", e));
                        break;
                    }
                }
            }
            notice = coordinator.next_event() => {
                presenter.output("");
                render_notice(&presenter, &notice);
            }
            _ = tokio::signal::ctrl_c() => {
                presenter.output("");
                presenter.info("Interrupted");
                break;
            }
        }
    }

    coordinator.shutdown();
    ExitCode::from(EXIT_SUCCESS)
}

async fn handle_line(
    line: &str,
    presenter: &mut Presenter,
    coordinator: &mut Coordinator<RodioPlaybackEngine, CpalCaptureEngine>,
    directory: &CpalDeviceDirectory,
    codec: &FfmpegTranscoder,
    store: &ClipStore,
    options: &SessionOptions,
) -> Flow {
    if line.trim().is_empty() {
        return Flow::Continue;
    }

    let command = match line.parse::<SessionCommand>() {
        Ok(command) => command,
        Err(e) => {
            presenter.warn(&e.to_string());
            return Flow::Continue;
        }
    };

    match command {
        SessionCommand::Play => render_notices(presenter, coordinator.play()),
        SessionCommand::Pause => render_notices(presenter, coordinator.pause()),
        SessionCommand::Rewind => render_notices(presenter, coordinator.rewind()),
        SessionCommand::Record => {
            render_notices(presenter, coordinator.record(RecordMode::Transient))
        }
        SessionCommand::Remember => {
            render_notices(presenter, coordinator.record(RecordMode::Remembered))
        }
        SessionCommand::Clear => render_notices(presenter, coordinator.clear()),
        SessionCommand::Status => print_status(presenter, coordinator),
        SessionCommand::Devices => {
            let status = coordinator.status();
            print_device_listing(
                presenter,
                directory,
                status.input_device.map(|d| d.name().to_string()),
                status.output_device.map(|d| d.name().to_string()),
            );
        }
        SessionCommand::SelectInput(index) => {
            match directory.input_devices() {
                Ok(devices) => match devices.into_iter().nth(index - 1) {
                    Some(device) => {
                        presenter.success(&format!("Input device: {}", device.name()));
                        coordinator.select_input_device(Some(device));
                    }
                    None => presenter.warn(&format!("No input device number {}", index)),
                },
                Err(e) => presenter.error(&e.to_string()),
            }
        }
        SessionCommand::SelectOutput(index) => {
            match directory.output_devices() {
                Ok(devices) => match devices.into_iter().nth(index - 1) {
                    Some(device) => {
                        presenter.success(&format!("Output device: {}", device.name()));
                        coordinator.select_output_device(Some(device));
                    }
                    None => presenter.warn(&format!("No output device number {}", index)),
                },
                Err(e) => presenter.error(&e.to_string()),
            }
        }
        SessionCommand::Import(path) => {
            match import_clip(codec, &path, store).await {
                Ok(clip) => render_notices(presenter, coordinator.adopt_clip(clip)),
                Err(e) => presenter.error(&e.to_string()),
            }
        }
        SessionCommand::Export(path) => {
            let Some(clip) = coordinator.current_clip().cloned() else {
                presenter.warn("No clip to export");
                return Flow::Continue;
            };
            render_notices(presenter, coordinator.stop_workers());
            match export_clip(codec, &clip, &path).await {
                Ok(()) => {
                    render_notices(presenter, coordinator.complete_export());
                    presenter.success(&format!("Exported to {}", path.display()));
                }
                Err(e) => presenter.error(&e.to_string()),
            }
        }
        SessionCommand::Compare(path) => {
            compare_current(presenter, coordinator, &path, options).await;
        }
        SessionCommand::Help => print_help(presenter),
        SessionCommand::Quit => return Flow::Quit,
    }

    Flow::Continue
}

/// Compare the current clip with a stored file
async fn compare_current(
    presenter: &mut Presenter,
    coordinator: &mut Coordinator<RodioPlaybackEngine, CpalCaptureEngine>,
    other: &Path,
    options: &SessionOptions,
) {
    let Some(clip) = coordinator.current_clip().cloned() else {
        presenter.warn("The player is empty. Record or import a clip to compare.");
        return;
    };

    let Some(api_key) = options.api_key.clone() else {
        presenter.error(missing_api_key_message());
        return;
    };

    render_notices(presenter, coordinator.stop_workers());

    let comparator = PhraseComparator::new(GoogleSpeechTranscriber::new(api_key));
    presenter.start_spinner("Transcribing...");
    match comparator.compare(clip.path(), other, &options.language).await {
        Ok(outcome) => {
            presenter.stop_spinner();
            match outcome.verdict {
                MatchVerdict::Match => presenter.success("The phrases match!"),
                MatchVerdict::NoMatch => presenter.info("The phrases do not match."),
            }
            presenter.output(&format!("  current: {}", outcome.transcript_a));
            presenter.output(&format!("  {}: {}", other.display(), outcome.transcript_b));
        }
        Err(e) => {
            presenter.stop_spinner();
            presenter.error(&e.to_string());
        }
    }
}

fn print_status(
    presenter: &Presenter,
    coordinator: &Coordinator<RodioPlaybackEngine, CpalCaptureEngine>,
) {
    let status = coordinator.status();
    presenter.output(&format!("State: {}", status.phase));
    presenter.output(&presenter.clip_line(status.clip.as_ref(), status.remembered));
    presenter.output(&format!(
        "Input: {}",
        status
            .input_device
            .map(|d| d.name().to_string())
            .unwrap_or_else(|| "(default)".to_string())
    ));
    presenter.output(&format!(
        "Output: {}",
        status
            .output_device
            .map(|d| d.name().to_string())
            .unwrap_or_else(|| "(default)".to_string())
    ));
}

fn print_help(presenter: &Presenter) {
    presenter.output("Commands:");
    presenter.output("  play            Play the current clip (resumes if paused)");
    presenter.output("  pause           Pause playback");
    presenter.output("  rewind          Back to the beginning; next play restarts");
    presenter.output("  record          Start/stop a recording (deleted on clear)");
    presenter.output("  remember        Start/stop a recording kept across clear");
    presenter.output("  clear           Drop the current clip (file kept if remembered)");
    presenter.output("  compare <path>  Compare the current clip with a file");
    presenter.output("  import <path>   Load a .wav or .mp3 file as the current clip");
    presenter.output("  export <path>   Save the current clip (.wav copy, .mp3 re-encode)");
    presenter.output("  devices         List audio devices");
    presenter.output("  input <n>       Select input device by number");
    presenter.output("  output <n>      Select output device by number");
    presenter.output("  status          Show session state");
    presenter.output("  quit            Leave the session");
}

fn render_notices(presenter: &Presenter, notices: Vec<SessionNotice>) {
    for notice in notices {
        render_notice(presenter, &notice);
    }
}

fn render_notice(presenter: &Presenter, notice: &SessionNotice) {
    match notice {
        SessionNotice::NoClip => {
            presenter.warn("No clip loaded. Record or import one first.");
        }
        SessionNotice::AlreadyPlaying => presenter.info("Already playing"),
        SessionNotice::NotPlaying => presenter.info("Nothing is playing"),
        SessionNotice::PlaybackStarted(name) => presenter.info(&format!("Playing {}", name)),
        SessionNotice::PlaybackResumed => presenter.info("Resumed"),
        SessionNotice::PlaybackPaused => presenter.info("Paused"),
        SessionNotice::PlaybackRewound => presenter.info("Rewound to the beginning"),
        SessionNotice::PlaybackFinished => presenter.info("Playback finished"),
        SessionNotice::PlaybackStopped => presenter.info("Playback stopped"),
        SessionNotice::RecordingStarted(RecordMode::Transient) => {
            presenter.info("Recording... type 'record' again to stop");
        }
        SessionNotice::RecordingStarted(RecordMode::Remembered) => {
            presenter.info("Recording... type 'remember' again to stop and keep");
        }
        SessionNotice::RecordingFinished { clip, remembered } => {
            let kept = if *remembered { " (remembered)" } else { "" };
            presenter.success(&format!(
                "Recorded {} ({}){}",
                clip.display_name(),
                Presenter::format_duration(clip.duration()),
                kept
            ));
        }
        SessionNotice::ClipLoaded(clip) => {
            presenter.success(&format!(
                "Loaded {} ({})",
                clip.display_name(),
                Presenter::format_duration(clip.duration())
            ));
        }
        SessionNotice::ClipDeleted(path) => {
            presenter.info(&format!("Deleted {}", path.display()));
        }
        SessionNotice::ClipKept(path) => {
            presenter.info(&format!("Kept {}", path.display()));
        }
        SessionNotice::NothingToClear => presenter.info("Nothing to clear"),
        SessionNotice::WorkerFailed(message) => presenter.warn(message),
        SessionNotice::Warning(message) => presenter.warn(message),
    }
}
