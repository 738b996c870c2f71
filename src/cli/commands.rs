//! Interactive session command parser

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Error for unrecognized or malformed session commands
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CommandParseError {
    pub message: String,
}

impl CommandParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One user action in the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Play,
    Pause,
    Rewind,
    Record,
    Remember,
    Clear,
    Status,
    Devices,
    /// 1-based index into the listed input devices
    SelectInput(usize),
    /// 1-based index into the listed output devices
    SelectOutput(usize),
    Import(PathBuf),
    Export(PathBuf),
    Compare(PathBuf),
    Help,
    Quit,
}

fn parse_index(keyword: &str, arg: Option<&str>) -> Result<usize, CommandParseError> {
    let raw = arg.ok_or_else(|| CommandParseError::new(format!("Usage: {} <number>", keyword)))?;
    let index: usize = raw
        .parse()
        .map_err(|_| CommandParseError::new(format!("Not a device number: {}", raw)))?;
    if index == 0 {
        return Err(CommandParseError::new("Device numbers start at 1"));
    }
    Ok(index)
}

fn parse_path(keyword: &str, rest: &str) -> Result<PathBuf, CommandParseError> {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::new(format!("Usage: {} <path>", keyword)));
    }
    Ok(PathBuf::from(trimmed))
}

impl FromStr for SessionCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r),
            None => (line, ""),
        };

        match keyword.to_ascii_lowercase().as_str() {
            "play" | "p" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "rewind" => Ok(Self::Rewind),
            "record" | "r" => Ok(Self::Record),
            "remember" => Ok(Self::Remember),
            "clear" => Ok(Self::Clear),
            "status" => Ok(Self::Status),
            "devices" => Ok(Self::Devices),
            "input" => parse_index("input", rest.split_whitespace().next()).map(Self::SelectInput),
            "output" => {
                parse_index("output", rest.split_whitespace().next()).map(Self::SelectOutput)
            }
            "import" => parse_path("import", rest).map(Self::Import),
            "export" => parse_path("export", rest).map(Self::Export),
            "compare" => parse_path("compare", rest).map(Self::Compare),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "" => Err(CommandParseError::new("Type 'help' for commands")),
            other => Err(CommandParseError::new(format!(
                "Unknown command: {} (type 'help')",
                other
            ))),
        }
    }
}
