//! Compact JSON reports of parse results.
//!
//! Useful for handing errors or queued commands to a host over a serial or
//! network link. Encoding goes straight into a caller-supplied buffer with
//! `serde-json-core`, no allocation involved.
//!
//! ```rust
//! use libcli::cli::{Cli, report};
//!
//! let mut cli = Cli::default();
//! cli.parse(b"reboot");
//!
//! let error = cli.pop_error().unwrap();
//! let mut buf = [0u8; 128];
//! let len = report::write_error(&error, &mut buf).unwrap();
//! assert_eq!(
//!     &buf[..len],
//!     br#"{"kind":"not_found","message":"Command not found","token":"reboot"}"#
//! );
//! ```

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use super::argument::{ArgKind, BoundArgument};
use super::command::ParsedCommand;
use super::error::{Error, ErrorKind, ParseError};
use alloc::string::String;

#[derive(Serialize)]
struct ErrorReport<'a> {
    kind: ErrorKind,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    argument: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

#[derive(Serialize)]
struct ArgumentReport<'a> {
    name: &'a str,
    kind: ArgKind,
    value: &'a str,
    set: bool,
}

struct Arguments<'a>(&'a [BoundArgument]);

impl Serialize for Arguments<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|arg| ArgumentReport {
            name: arg.definition().primary_name(),
            kind: arg.kind(),
            value: arg.value(),
            set: arg.is_set(),
        }))
    }
}

struct Words<'a>(&'a [String]);

impl Serialize for Words<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(String::as_str))
    }
}

struct CommandReport<'a>(&'a ParsedCommand);

impl Serialize for CommandReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let command = self.0;
        let sub = command.sub_command();

        let mut state = serializer.serialize_struct("Command", if sub.is_some() { 5 } else { 4 })?;
        state.serialize_field("name", command.name())?;
        state.serialize_field("mode", &command.mode())?;
        state.serialize_field("args", &Arguments(command.args()))?;
        state.serialize_field("rest", &Words(command.rest()))?;
        if let Some(sub) = sub {
            state.serialize_field("sub", &CommandReport(sub))?;
        }
        state.end()
    }
}

fn error_report(error: &ParseError) -> ErrorReport<'_> {
    ErrorReport {
        kind: error.kind(),
        message: error.message(),
        command: error.command(),
        argument: error.argument(),
        token: error.token(),
    }
}

/// Encode `error` as JSON into `buf`, returning the number of bytes written.
pub fn write_error(error: &ParseError, buf: &mut [u8]) -> Result<usize, Error> {
    serde_json_core::to_slice(&error_report(error), buf).map_err(|_| Error::BufferOverflow)
}

/// Encode `command` with its bound values as JSON into `buf`, returning the
/// number of bytes written.
pub fn write_command(command: &ParsedCommand, buf: &mut [u8]) -> Result<usize, Error> {
    serde_json_core::to_slice(&CommandReport(command), buf).map_err(|_| Error::BufferOverflow)
}

/// Like [`write_error`], but into a fixed-capacity string of `N` bytes.
///
/// # Examples
///
/// ```rust
/// use libcli::cli::{Cli, report};
///
/// let mut cli = Cli::default();
/// cli.parse(b"reboot");
///
/// let error = cli.pop_error().unwrap();
/// let json = report::error_string::<96>(&error).unwrap();
/// assert!(json.starts_with(r#"{"kind":"not_found""#));
/// ```
pub fn error_string<const N: usize>(error: &ParseError) -> Result<heapless::String<N>, Error> {
    serde_json_core::to_string::<_, N>(&error_report(error)).map_err(|_| Error::BufferOverflow)
}

/// Like [`write_command`], but into a fixed-capacity string of `N` bytes.
pub fn command_string<const N: usize>(
    command: &ParsedCommand,
) -> Result<heapless::String<N>, Error> {
    serde_json_core::to_string::<_, N>(&CommandReport(command)).map_err(|_| Error::BufferOverflow)
}
