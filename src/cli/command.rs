//! Command definitions, the registry that owns them, and parse results.
//!
//! Commands live in an arena inside [`Registry`] and are addressed by
//! [`CommandId`]. The root list and each composite's children are ordered
//! lists of ids, so a command belongs to exactly one list and nothing has to
//! be unlinked or freed by hand.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::argument::{self, ArgKind, Argument, BoundArgument};
use super::error::Error;

/// How the words after the command name are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandMode {
    /// The words must fit the declared arguments exactly.
    Default,
    /// Words left over after binding are collected as trailing values.
    Boundless,
    /// The whole remainder of the line is one value.
    Single,
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            CommandMode::Default => defmt::write!(f, "Default"),
            CommandMode::Boundless => defmt::write!(f, "Boundless"),
            CommandMode::Single => defmt::write!(f, "Single"),
        }
    }
}

/// Handle to a command registered in a [`Cli`](super::Cli).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub(crate) usize);

/// Runs a parsed command.
///
/// Returns whether the command succeeded. Implemented for every
/// `FnMut(&ParsedCommand) -> bool`, so closures can be registered directly.
pub trait CommandHandler {
    /// Execute the command with its bound arguments.
    fn call(&mut self, command: &ParsedCommand) -> bool;
}

impl<F> CommandHandler for F
where
    F: FnMut(&ParsedCommand) -> bool,
{
    fn call(&mut self, command: &ParsedCommand) -> bool {
        self(command)
    }
}

/// A registered command.
pub struct Command {
    name: String,
    mode: CommandMode,
    case_sensitive: bool,
    composite: bool,
    description: Option<String>,
    arguments: Vec<Argument>,
    children: Vec<CommandId>,
    handler: Option<Box<dyn CommandHandler>>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("case_sensitive", &self.case_sensitive)
            .field("composite", &self.composite)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("children", &self.children)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl Command {
    /// The declared name, including any aliases.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first alias.
    pub fn primary_name(&self) -> &str {
        argument::primary_name(&self.name)
    }

    /// Binding mode.
    pub fn mode(&self) -> CommandMode {
        self.mode
    }

    /// Whether name and argument matching respect case.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Whether the rest of the line is matched against sub-commands.
    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// Optional help text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared arguments in declaration order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Sub-commands of a composite, in registration order.
    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    /// Whether a handler is registered.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Whether `word` names this command under its case rule.
    pub fn matches(&self, word: &str) -> bool {
        argument::names_match(&self.name, word, self.case_sensitive)
    }

    /// Find a declared argument by any of its aliases.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments
            .iter()
            .find(|arg| arg.matches(name, self.case_sensitive))
    }
}

/// Arena of every command known to a [`Cli`](super::Cli).
#[derive(Debug, Default)]
pub struct Registry {
    commands: Vec<Command>,
    roots: Vec<CommandId>,
    case_sensitive: bool,
}

impl Registry {
    /// Create an empty, case-insensitive registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level commands in registration order.
    pub fn roots(&self) -> &[CommandId] {
        &self.roots
    }

    /// Look up a command by handle.
    pub fn get(&self, id: CommandId) -> Option<&Command> {
        self.commands.get(id.0)
    }

    fn get_mut(&mut self, id: CommandId) -> Result<&mut Command, Error> {
        self.commands.get_mut(id.0).ok_or(Error::UnknownCommand)
    }

    /// Number of registered commands, sub-commands included.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Find a top-level command whose name matches `name`.
    pub fn find(&self, name: &str) -> Option<CommandId> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.get(*id).is_some_and(|cmd| cmd.matches(name)))
    }

    /// Register a top-level command.
    pub fn add(&mut self, name: &str, mode: CommandMode) -> Result<CommandId, Error> {
        let id = self.insert(name, mode, false)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Register a top-level composite command.
    pub fn add_composite(&mut self, name: &str) -> Result<CommandId, Error> {
        let id = self.insert(name, CommandMode::Boundless, true)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Register a command inside the composite `parent`.
    ///
    /// Pass `composite = true` to nest another level.
    pub fn add_child(
        &mut self,
        parent: CommandId,
        name: &str,
        mode: CommandMode,
        composite: bool,
    ) -> Result<CommandId, Error> {
        if !self.get_mut(parent)?.composite {
            return Err(Error::NotComposite);
        }
        let mode = if composite { CommandMode::Boundless } else { mode };
        let id = self.insert(name, mode, composite)?;
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    fn insert(&mut self, name: &str, mode: CommandMode, composite: bool) -> Result<CommandId, Error> {
        if !argument::valid_name(name) {
            return Err(Error::InvalidName);
        }
        let id = CommandId(self.commands.len());
        self.commands.push(Command {
            name: String::from(name),
            mode,
            case_sensitive: self.case_sensitive,
            composite,
            description: None,
            arguments: Vec::new(),
            children: Vec::new(),
            handler: None,
        });
        Ok(id)
    }

    /// Declare an argument on `id`.
    ///
    /// Names must be unique per command across all kinds, aliases included.
    pub fn add_argument(
        &mut self,
        id: CommandId,
        name: &str,
        kind: ArgKind,
        default: Option<&str>,
    ) -> Result<(), Error> {
        if !argument::valid_name(name) {
            return Err(Error::InvalidName);
        }
        let command = self.get_mut(id)?;
        let case_sensitive = command.case_sensitive;
        if command
            .arguments
            .iter()
            .any(|arg| arg.shares_alias_with(name, case_sensitive))
        {
            return Err(Error::DuplicateArgument);
        }
        command.arguments.push(Argument::new(name, kind, default));
        Ok(())
    }

    /// Install or replace the handler of `id`.
    pub fn set_handler(&mut self, id: CommandId, handler: Box<dyn CommandHandler>) -> Result<(), Error> {
        self.get_mut(id)?.handler = Some(handler);
        Ok(())
    }

    /// Remove the handler of `id`; its parses will be queued instead.
    pub fn clear_handler(&mut self, id: CommandId) -> Result<(), Error> {
        self.get_mut(id)?.handler = None;
        Ok(())
    }

    /// Set the help text of `id`.
    pub fn set_description(&mut self, id: CommandId, description: &str) -> Result<(), Error> {
        self.get_mut(id)?.description = Some(String::from(description));
        Ok(())
    }

    /// Override case sensitivity for a single command.
    pub fn set_command_case_sensitive(&mut self, id: CommandId, case_sensitive: bool) -> Result<(), Error> {
        self.get_mut(id)?.case_sensitive = case_sensitive;
        Ok(())
    }

    /// Set case sensitivity of every registered command and of commands
    /// registered from now on.
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
        for command in &mut self.commands {
            command.case_sensitive = case_sensitive;
        }
    }

    /// Current default for newly registered commands.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Run the handler of `parsed`'s command.
    ///
    /// Returns `None` when the command has no handler (or no longer exists).
    pub(crate) fn run_handler(&mut self, parsed: &ParsedCommand) -> Option<bool> {
        let handler = self.commands.get_mut(parsed.id.0)?.handler.as_mut()?;
        Some(handler.call(parsed))
    }
}

/// A command as bound by one successful parse.
///
/// Detached from the registry: it owns its values and can be queued,
/// popped and kept around independently of later parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub(crate) id: CommandId,
    pub(crate) name: String,
    pub(crate) mode: CommandMode,
    pub(crate) args: Vec<BoundArgument>,
    pub(crate) rest: Vec<String>,
    pub(crate) sub: Option<Box<ParsedCommand>>,
}

impl ParsedCommand {
    pub(crate) fn new(id: CommandId, command: &Command) -> Self {
        Self {
            id,
            name: String::from(command.primary_name()),
            mode: command.mode,
            args: command.arguments.iter().map(BoundArgument::unbound).collect(),
            rest: Vec::new(),
            sub: None,
        }
    }

    /// Handle of the registered command this was parsed for.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Primary name of the command.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binding mode of the command.
    pub fn mode(&self) -> CommandMode {
        self.mode
    }

    /// Declared arguments with their bound values, in declaration order.
    pub fn args(&self) -> &[BoundArgument] {
        &self.args
    }

    /// Declared argument by any alias, compared exactly.
    pub fn arg(&self, name: &str) -> Option<&BoundArgument> {
        self.args.iter().find(|arg| arg.definition().matches(name, true))
    }

    /// Declared argument by position.
    pub fn arg_at(&self, index: usize) -> Option<&BoundArgument> {
        self.args.get(index)
    }

    /// Shorthand for `arg(name).map(BoundArgument::value)`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.arg(name).map(BoundArgument::value)
    }

    /// Whether the named argument was supplied on the line.
    pub fn is_set(&self, name: &str) -> bool {
        self.arg(name).is_some_and(BoundArgument::is_set)
    }

    /// Trailing words not bound to a declared argument.
    ///
    /// Boundless commands collect their extra words here, a single-argument
    /// command without declared arguments stores its value here, and a
    /// composite keeps the words of its sub-line.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// Trailing words joined by single spaces.
    pub fn rest_joined(&self) -> String {
        self.rest.join(" ")
    }

    /// Declared plus trailing values.
    pub fn count_args(&self) -> usize {
        self.args.len() + self.rest.len()
    }

    /// The matched sub-command of a composite.
    pub fn sub_command(&self) -> Option<&ParsedCommand> {
        self.sub.as_deref()
    }
}
