//! VoiceMatch CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voicematch::cli::{
    app::{run_compare, run_devices, run_session, SessionOptions, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    presenter::Presenter,
};
use voicematch::domain::language::LanguageTag;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    let language = match cli.language.as_deref() {
        Some(s) => match s.parse::<LanguageTag>() {
            Ok(tag) => tag,
            Err(e) => {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => LanguageTag::default(),
    };

    let options = SessionOptions {
        language,
        api_key: cli.api_key.filter(|key| !key.is_empty()),
    };

    match cli.command {
        Some(Commands::Devices) => run_devices().await,
        Some(Commands::Compare { clip_a, clip_b }) => {
            run_compare(&clip_a, &clip_b, options).await
        }
        None => run_session(options).await,
    }
}
