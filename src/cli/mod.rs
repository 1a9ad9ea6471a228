//! Command-line interpreter engine.
//!
//! A [`Cli`] owns a registry of commands, two bounded queues and the dispatch
//! settings. Feeding it input with [`Cli::parse`] tokenizes the bytes, matches
//! each line against the registered commands and then either runs the
//! command's handler right away or queues the parsed command for later
//! retrieval.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Tokenizer     │───▶│    Matcher /    │───▶│    Dispatch     │
//! │ (lines, words)  │    │     Binder      │    │ (handler/queue) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!                                 │                       │
//!                                 ▼                       ▼
//!                        ┌─────────────────┐    ┌─────────────────┐
//!                        │    Command      │    │ Command / Error │
//!                        │    Registry     │    │     Queues      │
//!                        └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use libcli::cli::{ArgKind, Cli, CommandMode, ParsedCommand};
//!
//! let mut cli = Cli::default();
//!
//! let led = cli.add_command("led", CommandMode::Default).unwrap();
//! cli.add_argument(led, "state", ArgKind::Positional, None).unwrap();
//! cli.add_argument(led, "b/brightness", ArgKind::Named, Some("100")).unwrap();
//! cli.set_handler(led, |cmd: &ParsedCommand| {
//!     cmd.value("state") == Some("on") || cmd.value("state") == Some("off")
//! })
//! .unwrap();
//!
//! // No handler: parsed commands are queued.
//! let status = cli.add_command("status", CommandMode::Default).unwrap();
//!
//! assert!(cli.parse(b"led on -b 40; status"));
//! let queued = cli.pop_command().unwrap();
//! assert_eq!(queued.id(), status);
//!
//! assert!(!cli.parse(b"reboot"));
//! assert_eq!(cli.pop_error().unwrap().token(), Some("reboot"));
//! ```
//!
//! # Pausing
//!
//! While paused, every parsed command and every error is queued even when
//! handlers are registered. [`Cli::unpause`] first hands all queued errors to
//! the error handler, then runs each queued command that has a handler, in
//! the order they were queued.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write as _};

pub mod argument;
pub mod command;
pub mod error;
pub mod matcher;
pub mod queue;
pub mod report;
pub mod tokenizer;

pub use argument::{ALIAS_SEPARATOR, ARGUMENT_MARKER, ArgKind, Argument, BoundArgument, FLAG_SET_VALUE};
pub use command::{Command, CommandHandler, CommandId, CommandMode, ParsedCommand, Registry};
pub use error::{Error, ErrorKind, ParseError};
pub use matcher::Outcome;
pub use queue::{BoundedQueue, DEFAULT_QUEUE_SIZE};
pub use tokenizer::{Line, Word, tokenize};

/// Receives parse errors.
///
/// Implemented for every `FnMut(&ParseError)`.
pub trait ErrorHandler {
    /// Handle one error.
    fn call(&mut self, error: &ParseError);
}

impl<F> ErrorHandler for F
where
    F: FnMut(&ParseError),
{
    fn call(&mut self, error: &ParseError) {
        self(error)
    }
}

/// The interpreter: command registry, dispatch queues and settings.
pub struct Cli {
    registry: Registry,
    commands: BoundedQueue<ParsedCommand>,
    errors: BoundedQueue<ParseError>,
    error_handler: Option<Box<dyn ErrorHandler>>,
    paused: bool,
    callback_failure_as_error: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_SIZE, DEFAULT_QUEUE_SIZE)
    }
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("registry", &self.registry)
            .field("commands", &self.commands)
            .field("errors", &self.errors)
            .field("has_error_handler", &self.error_handler.is_some())
            .field("paused", &self.paused)
            .field("callback_failure_as_error", &self.callback_failure_as_error)
            .finish()
    }
}

impl Cli {
    /// Create an interpreter with the given queue capacities.
    ///
    /// Each queue holds exactly the requested number of entries before it
    /// starts evicting. The interpreter starts unpaused, case-insensitive, and with handler failures not treated as
    /// errors.
    pub fn new(command_queue_size: usize, error_queue_size: usize) -> Self {
        Self {
            registry: Registry::new(),
            commands: BoundedQueue::new(command_queue_size),
            errors: BoundedQueue::new(error_queue_size),
            error_handler: None,
            paused: false,
            callback_failure_as_error: false,
        }
    }

    /// Read access to the registered commands.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a top-level command.
    pub fn add_command(&mut self, name: &str, mode: CommandMode) -> Result<CommandId, Error> {
        self.registry.add(name, mode)
    }

    /// Register a top-level composite command.
    pub fn add_composite(&mut self, name: &str) -> Result<CommandId, Error> {
        self.registry.add_composite(name)
    }

    /// Register a sub-command of the composite `parent`.
    pub fn add_sub_command(
        &mut self,
        parent: CommandId,
        name: &str,
        mode: CommandMode,
    ) -> Result<CommandId, Error> {
        self.registry.add_child(parent, name, mode, false)
    }

    /// Register a nested composite inside the composite `parent`.
    pub fn add_sub_composite(&mut self, parent: CommandId, name: &str) -> Result<CommandId, Error> {
        self.registry.add_child(parent, name, CommandMode::Boundless, true)
    }

    /// Declare an argument on a command.
    pub fn add_argument(
        &mut self,
        id: CommandId,
        name: &str,
        kind: ArgKind,
        default: Option<&str>,
    ) -> Result<(), Error> {
        self.registry.add_argument(id, name, kind, default)
    }

    /// Install the handler run when `id` is parsed.
    pub fn set_handler<H>(&mut self, id: CommandId, handler: H) -> Result<(), Error>
    where
        H: CommandHandler + 'static,
    {
        self.registry.set_handler(id, Box::new(handler))
    }

    /// Remove the handler of `id`.
    pub fn clear_handler(&mut self, id: CommandId) -> Result<(), Error> {
        self.registry.clear_handler(id)
    }

    /// Set the help text of a command.
    pub fn set_description(&mut self, id: CommandId, description: &str) -> Result<(), Error> {
        self.registry.set_description(id, description)
    }

    /// Override case sensitivity of one command.
    pub fn set_command_case_sensitive(&mut self, id: CommandId, case_sensitive: bool) -> Result<(), Error> {
        self.registry.set_command_case_sensitive(id, case_sensitive)
    }

    /// Find a top-level command by name.
    pub fn find_command(&self, name: &str) -> Option<CommandId> {
        self.registry.find(name)
    }

    /// Look up a command by handle.
    pub fn command(&self, id: CommandId) -> Option<&Command> {
        self.registry.get(id)
    }

    /// Set case sensitivity for all registered commands and future ones.
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.registry.set_case_sensitive(case_sensitive);
    }

    /// Whether a handler returning `false` also produces a
    /// [`ErrorKind::CallbackFailure`] error.
    pub fn set_callback_failure_as_error(&mut self, enabled: bool) {
        self.callback_failure_as_error = enabled;
    }

    /// Install the handler that receives errors while not paused.
    pub fn set_error_handler<H>(&mut self, handler: H)
    where
        H: ErrorHandler + 'static,
    {
        self.error_handler = Some(Box::new(handler));
    }

    /// Remove the error handler; errors will be queued.
    pub fn clear_error_handler(&mut self) {
        self.error_handler = None;
    }

    /// Parse `input`, which may hold several lines.
    ///
    /// Lines are separated by `\n`, `\r` or `;`. Each line is matched against
    /// the top-level commands and then dispatched: a command with a handler
    /// runs at once, one without is queued for [`pop_command`](Self::pop_command).
    /// While paused everything is queued. Errors go to the error handler, or
    /// to the error queue when there is none.
    ///
    /// Every line is processed even if an earlier one failed.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw bytes, e.g. straight from a UART receive buffer
    ///
    /// # Returns
    ///
    /// `false` if any line produced an error or a handler reported failure
    /// (the latter only with
    /// [`set_callback_failure_as_error`](Self::set_callback_failure_as_error)).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use libcli::cli::{ArgKind, Cli, CommandMode, ErrorKind};
    ///
    /// let mut cli = Cli::default();
    /// let led = cli.add_command("led", CommandMode::Default).unwrap();
    /// cli.add_argument(led, "state", ArgKind::Positional, None).unwrap();
    ///
    /// assert!(cli.parse(b"led on; led off"));
    /// assert_eq!(cli.count_queued_commands(), 2);
    /// assert_eq!(cli.pop_command().unwrap().value("state"), Some("on"));
    ///
    /// assert!(!cli.parse(b"led\nblink"));
    /// assert_eq!(cli.pop_error().unwrap().kind(), ErrorKind::MissingArgument);
    /// assert_eq!(cli.pop_error().unwrap().kind(), ErrorKind::NotFound);
    /// ```
    pub fn parse(&mut self, input: &[u8]) -> bool {
        let mut success = true;

        for line in tokenize(input) {
            let outcome = matcher::match_line(
                &self.registry,
                self.registry.roots(),
                line.raw(),
                line.words(),
            );

            let line_ok = match outcome {
                Outcome::Success(parsed) => self.dispatch(parsed),
                Outcome::NameMismatch => {
                    let token = line.words().first().map(Word::as_str).unwrap_or_default();
                    debug!("command not found: {}", token);
                    self.report(ParseError::new(ErrorKind::NotFound).with_token(token));
                    false
                }
                Outcome::Failed(error) => {
                    debug!("line rejected: {}", error.message());
                    self.report(error);
                    false
                }
            };
            success &= line_ok;
        }

        success
    }

    /// Parse a string slice. See [`parse`](Self::parse).
    pub fn parse_str(&mut self, input: &str) -> bool {
        self.parse(input.as_bytes())
    }

    /// Queue all further commands and errors instead of dispatching them.
    pub fn pause(&mut self) {
        debug!("paused");
        self.paused = true;
    }

    /// Resume dispatching and work off what was queued meanwhile.
    ///
    /// Queued errors go to the error handler first; without one they stay
    /// queued. Then every queued command that has a handler runs once, in
    /// queue order, and leaves the queue. Commands without a handler stay
    /// queued. A handler reporting failure is treated as it is in
    /// [`parse`](Self::parse).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use libcli::cli::{Cli, CommandMode, ParsedCommand};
    ///
    /// let runs = Rc::new(Cell::new(0));
    /// let mut cli = Cli::default();
    /// let reboot = cli.add_command("reboot", CommandMode::Default).unwrap();
    /// let counter = Rc::clone(&runs);
    /// cli.set_handler(reboot, move |_: &ParsedCommand| {
    ///     counter.set(counter.get() + 1);
    ///     true
    /// })
    /// .unwrap();
    ///
    /// cli.pause();
    /// cli.parse(b"reboot; reboot");
    /// assert_eq!(runs.get(), 0);
    ///
    /// cli.unpause();
    /// assert_eq!(runs.get(), 2);
    /// assert!(!cli.available());
    /// ```
    pub fn unpause(&mut self) {
        self.paused = false;
        debug!(
            "unpaused with {} errors and {} commands queued",
            self.errors.len(),
            self.commands.len()
        );

        if let Some(handler) = self.error_handler.as_mut() {
            while let Some(error) = self.errors.pop() {
                handler.call(&error);
            }
        }

        let registry = &mut self.registry;
        let mut failed: Vec<String> = Vec::new();
        self.commands.drain_where(|parsed| match registry.run_handler(parsed) {
            Some(true) => true,
            Some(false) => {
                failed.push(String::from(parsed.name()));
                true
            }
            None => false,
        });

        for name in failed {
            self.handler_failed(&name);
        }
    }

    /// Whether the interpreter is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether parsed commands are waiting in the queue.
    pub fn available(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Number of queued commands.
    pub fn count_queued_commands(&self) -> usize {
        self.commands.len()
    }

    /// Take the oldest queued command.
    pub fn pop_command(&mut self) -> Option<ParsedCommand> {
        self.commands.pop()
    }

    /// Commands lost because the command queue was full.
    pub fn dropped_commands(&self) -> usize {
        self.commands.dropped()
    }

    /// Whether errors are waiting in the queue.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of queued errors.
    pub fn count_queued_errors(&self) -> usize {
        self.errors.len()
    }

    /// Take the oldest queued error.
    pub fn pop_error(&mut self) -> Option<ParseError> {
        self.errors.pop()
    }

    /// Errors lost because the error queue was full.
    pub fn dropped_errors(&self) -> usize {
        self.errors.dropped()
    }

    // Innermost first: a composite's sub-command runs before the composite.
    fn dispatch(&mut self, parsed: ParsedCommand) -> bool {
        let mut success = true;
        if let Some(sub) = parsed.sub_command().cloned() {
            success &= self.dispatch(sub);
        }

        if !self.paused {
            if let Some(ok) = self.registry.run_handler(&parsed) {
                if !ok {
                    self.handler_failed(parsed.name());
                }
                return success && ok;
            }
        }

        if let Some(evicted) = self.commands.push(parsed) {
            warn!("command queue full, dropped {}", evicted.name());
        }
        success
    }

    fn handler_failed(&mut self, name: &str) {
        warn!("handler of {} failed", name);
        if self.callback_failure_as_error {
            self.report(ParseError::new(ErrorKind::CallbackFailure).with_command(name));
        }
    }

    fn report(&mut self, error: ParseError) {
        if !self.paused {
            if let Some(handler) = self.error_handler.as_mut() {
                handler.call(&error);
                return;
            }
        }

        if let Some(evicted) = self.errors.push(error) {
            warn!("error queue full, dropped {}", evicted.message());
        }
    }

    fn write_command(&self, f: &mut fmt::Formatter<'_>, id: CommandId, depth: usize) -> fmt::Result {
        let Some(command) = self.registry.get(id) else {
            return Ok(());
        };

        for _ in 0..depth {
            f.write_str("  ")?;
        }
        f.write_str(command.name())?;

        for arg in command.arguments() {
            f.write_char(' ')?;
            match (arg.kind(), arg.default_value()) {
                (ArgKind::Positional, None) => write!(f, "<{}>", arg.name())?,
                (ArgKind::Positional, Some(_)) => write!(f, "[<{}>]", arg.name())?,
                (ArgKind::Named, None) => write!(f, "-{} <value>", arg.name())?,
                (ArgKind::Named, Some(default)) => write!(f, "[-{} <{}>]", arg.name(), default)?,
                (ArgKind::Flag, _) => write!(f, "[-{}]", arg.name())?,
            }
        }

        if command.is_composite() {
            f.write_str(" (composite)")?;
        } else {
            match command.mode() {
                CommandMode::Default => {}
                CommandMode::Boundless => f.write_str(" (boundless)")?,
                CommandMode::Single => f.write_str(" (single)")?,
            }
        }
        f.write_str("\r\n")?;

        if let Some(description) = command.description() {
            for _ in 0..=depth {
                f.write_str("  ")?;
            }
            f.write_str(description)?;
            f.write_str("\r\n")?;
        }

        for &child in command.children() {
            self.write_command(f, child, depth + 1)?;
        }
        Ok(())
    }
}

/// Lists every command with its arguments, one line per command.
///
/// ```text
/// cp <src> <dst> [-m/mode <copy>] [-v]
/// echo (boundless)
///   Print the arguments
/// net (composite)
///   up <iface>
/// ```
impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &id in self.registry.roots() {
            self.write_command(f, id, 0)?;
        }
        Ok(())
    }
}
