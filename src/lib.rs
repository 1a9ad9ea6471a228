//! # libcli - command-line interpreter for embedded devices
//!
//! A small interpreter that turns text lines into typed command invocations.
//! It is meant for firmware and host tools that need a REPL-like command
//! surface (over UART, USB-CDC, a socket, ...) without a full shell. The
//! library is `no_std` and only needs `alloc`.
//!
//! ## Features
//!
//! - **Tokenizer**: lines split on newlines or `;`, quoted words, escapes
//! - **Typed arguments**: positional, named (`-key value`) and flag (`-key`)
//!   arguments with defaults and aliases (`n/number`)
//! - **Command modes**: exact, boundless (any number of trailing words) and
//!   single-argument commands
//! - **Composite commands**: nested sub-command trees (`net up eth0`)
//! - **Dispatch**: handlers run immediately, or parsed commands wait in a
//!   bounded queue; errors likewise go to an error handler or a queue
//! - **Pause/resume**: queue everything while paused, work it off on resume
//! - **Reports**: errors and parsed commands as compact JSON
//!
//! ## Usage
//!
//! ```rust
//! use libcli::cli::{ArgKind, Cli, CommandMode, ParsedCommand};
//!
//! let mut cli = Cli::default();
//! let ping = cli.add_command("ping", CommandMode::Default).unwrap();
//! cli.add_argument(ping, "c/count", ArgKind::Named, Some("4")).unwrap();
//! cli.set_handler(ping, |cmd: &ParsedCommand| cmd.value("count").is_some())
//!     .unwrap();
//!
//! assert!(cli.parse(b"ping -c 10\n"));
//! assert!(!cli.has_errors());
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Implement `std::error::Error` for the error types
//! - `defmt`: Enable defmt logging and `defmt::Format` for public enums

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![doc(html_root_url = "https://shishir-dey.github.io/libcli/")]

extern crate alloc;

#[macro_use]
mod fmt;

/// The interpreter: tokenizer, command registry, matcher and dispatch queues.
///
/// Everything needed to register commands and feed input lives here; the
/// most used types are re-exported at the module root.
pub mod cli;

pub use cli::{Cli, CommandId, CommandMode, ErrorKind, ParseError, ParsedCommand};
