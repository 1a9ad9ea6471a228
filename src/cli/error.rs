//! Error types for the command-line interpreter.
//!
//! Two kinds of failures exist and they are kept apart:
//!
//! - [`Error`] is returned as `Err` by registry and report operations, for
//!   mistakes made by the embedding code (bad names, unknown handles, short
//!   output buffers).
//! - [`ParseError`] describes why a line of user input could not be turned
//!   into a command. It is *data*: delivered to the error handler or kept in
//!   the error queue, never returned through `Result` from
//!   [`Cli::parse`](super::Cli::parse).

use alloc::string::String;
use core::fmt;
use serde::Serialize;

/// A common error type for registry and report operations.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A command or argument name was empty or contained an empty alias.
    InvalidName,
    /// The given [`CommandId`](super::CommandId) does not belong to this registry.
    UnknownCommand,
    /// Sub-commands can only be added to composite commands.
    NotComposite,
    /// The command already declares an argument with one of these names.
    DuplicateArgument,
    /// The output buffer was too small for the encoded report.
    BufferOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Error::InvalidName => "invalid name",
            Error::UnknownCommand => "unknown command handle",
            Error::NotComposite => "command is not composite",
            Error::DuplicateArgument => "duplicate argument name",
            Error::BufferOverflow => "buffer overflow",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::InvalidName => defmt::write!(f, "InvalidName"),
            Error::UnknownCommand => defmt::write!(f, "UnknownCommand"),
            Error::NotComposite => defmt::write!(f, "NotComposite"),
            Error::DuplicateArgument => defmt::write!(f, "DuplicateArgument"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
        }
    }
}

/// Why a line of input was rejected.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No registered command has the name given as the first word.
    NotFound,
    /// More words than the command can bind.
    TooManyArguments,
    /// A required argument was neither supplied nor has a default.
    MissingArgument,
    /// A named argument marker was the last word of the line.
    MissingValue,
    /// Reserved for a named-argument key mismatch; no parse path emits it.
    UnexpectedName,
    /// A handler reported failure while failures are treated as errors.
    CallbackFailure,
}

impl ErrorKind {
    /// Fixed human-readable text for this kind.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Command not found",
            ErrorKind::TooManyArguments => "Too many arguments",
            ErrorKind::MissingArgument => "Missing argument",
            ErrorKind::MissingValue => "Missing argument value",
            ErrorKind::UnexpectedName => "Unexpected argument name",
            ErrorKind::CallbackFailure => "Command failed",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorKind {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ErrorKind::NotFound => defmt::write!(f, "NotFound"),
            ErrorKind::TooManyArguments => defmt::write!(f, "TooManyArguments"),
            ErrorKind::MissingArgument => defmt::write!(f, "MissingArgument"),
            ErrorKind::MissingValue => defmt::write!(f, "MissingValue"),
            ErrorKind::UnexpectedName => defmt::write!(f, "UnexpectedName"),
            ErrorKind::CallbackFailure => defmt::write!(f, "CallbackFailure"),
        }
    }
}

/// A rejected line of input.
///
/// Holds owned copies of everything it refers to, so it stays valid after
/// the registry changes or the input buffer is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    command: Option<String>,
    argument: Option<String>,
    token: Option<String>,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            command: None,
            argument: None,
            token: None,
        }
    }

    pub(crate) fn with_command(mut self, command: &str) -> Self {
        self.command = Some(String::from(command));
        self
    }

    pub(crate) fn with_argument(mut self, argument: &str) -> Self {
        self.argument = Some(String::from(argument));
        self
    }

    pub(crate) fn with_token(mut self, token: &str) -> Self {
        self.token = Some(String::from(token));
        self
    }

    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Name of the command involved, if the failure got that far.
    ///
    /// For a `NotFound` inside a composite this is the composite's name.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Name of the argument involved, for `MissingArgument` and `MissingValue`.
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// The input word that caused the failure, if there is one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Human-readable text for the kind.
    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())?;
        if let Some(token) = &self.token {
            write!(f, " \"{}\"", token)?;
        }
        if let Some(argument) = &self.argument {
            write!(f, " -{}", argument)?;
        }
        if let Some(command) = &self.command {
            write!(f, " ({})", command)?;
        }
        Ok(())
    }
}
