//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// VoiceMatch - record, play back, and compare short voice clips
#[derive(Parser, Debug)]
#[command(name = "voicematch")]
#[command(version)]
#[command(about = "Record, play back, and compare short voice clips")]
#[command(long_about = None)]
pub struct Cli {
    /// Language tag for speech recognition (e.g., en-US, ru-RU)
    #[arg(short = 'l', long, value_name = "TAG", env = "VOICEMATCH_LANGUAGE")]
    pub language: Option<String>,

    /// Speech-to-Text API key
    #[arg(long, value_name = "KEY", env = "GOOGLE_SPEECH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Subcommand; without one, an interactive session starts
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List audio input and output devices
    Devices,
    /// Compare the spoken phrase in two audio files
    Compare {
        /// First audio file
        clip_a: PathBuf,
        /// Second audio file
        clip_b: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["voicematch"]);
        assert!(cli.language.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_language() {
        let cli = Cli::parse_from(["voicematch", "-l", "ru-RU"]);
        assert_eq!(cli.language, Some("ru-RU".to_string()));
    }

    #[test]
    fn cli_parses_devices_subcommand() {
        let cli = Cli::parse_from(["voicematch", "devices"]);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn cli_parses_compare_subcommand() {
        let cli = Cli::parse_from(["voicematch", "compare", "a.wav", "b.wav"]);
        match cli.command {
            Some(Commands::Compare { clip_a, clip_b }) => {
                assert_eq!(clip_a, PathBuf::from("a.wav"));
                assert_eq!(clip_b, PathBuf::from("b.wav"));
            }
            other => panic!("expected Compare, got {:?}", other),
        }
    }

    #[test]
    fn cli_parses_api_key_flag() {
        let cli = Cli::parse_from(["voicematch", "--api-key", "secret"]);
        assert_eq!(cli.api_key, Some("secret".to_string()));
    }

    #[test]
    fn verify_cli() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }
}
