//! Error types shared by the engine, the views and startup.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::core::config::ConfigError;

/// Failures produced while turning raw terminal bytes into key tokens.
///
/// The decoder resynchronises after reporting one of these, so they are
/// never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A multi-byte UTF-8 sequence was malformed or interrupted.
    InvalidUtf8 { bytes: Vec<u8> },
    /// An escape sequence was complete but not recognised.
    UnknownSequence { sequence: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidUtf8 { bytes } => {
                write!(f, "Invalid UTF-8 input sequence: {bytes:02x?}")
            }
            DecodeError::UnknownSequence { sequence } => {
                write!(f, "Unrecognised escape sequence: {sequence}")
            }
        }
    }
}

impl StdError for DecodeError {}

/// Top level error type for twig.
#[derive(Debug)]
pub enum TwigError {
    /// Terminal input could not be decoded.
    Decode(DecodeError),
    /// The terminal backend failed to initialise, draw or read.
    Terminal(io::Error),
    /// A git command failed or produced unusable output.
    Git { command: String, message: String },
    /// Configuration could not be read or contained invalid entries.
    Config(ConfigError),
    /// A key mapping could not be resolved, e.g. it recursed too deeply.
    KeyMapping(String),
    /// A view rejected an operation.
    View(String),
    /// Any other I/O failure.
    Io(io::Error),
}

impl TwigError {
    pub fn git(command: impl Into<String>, message: impl Into<String>) -> Self {
        TwigError::Git {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn view(message: impl Into<String>) -> Self {
        TwigError::View(message.into())
    }
}

impl fmt::Display for TwigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TwigError::Decode(err) => write!(f, "{err}"),
            TwigError::Terminal(err) => write!(f, "Terminal error: {err}"),
            TwigError::Git { command, message } => {
                write!(f, "git {command} failed: {message}")
            }
            TwigError::Config(err) => write!(f, "{err}"),
            TwigError::KeyMapping(msg) => write!(f, "Key mapping error: {msg}"),
            TwigError::View(msg) => write!(f, "{msg}"),
            TwigError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl StdError for TwigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TwigError::Decode(err) => Some(err),
            TwigError::Terminal(err) => Some(err),
            TwigError::Config(err) => Some(err),
            TwigError::Io(err) => Some(err),
            TwigError::Git { .. } | TwigError::KeyMapping(_) | TwigError::View(_) => None,
        }
    }
}

impl From<DecodeError> for TwigError {
    fn from(err: DecodeError) -> Self {
        TwigError::Decode(err)
    }
}

impl From<ConfigError> for TwigError {
    fn from(err: ConfigError) -> Self {
        TwigError::Config(err)
    }
}

impl From<io::Error> for TwigError {
    fn from(err: io::Error) -> Self {
        TwigError::Io(err)
    }
}
