//! Matches one tokenized line against a list of commands and binds its words.
//!
//! Matching only reads the registry. Each attempt builds a fresh
//! [`ParsedCommand`], so nothing left over from an earlier line can leak
//! into the next one.
//!
//! # Binding order
//!
//! 1. **Markers.** A word `-key` whose `key` names a declared argument of
//!    any kind is a marker. A flag marker sets the flag. Any other marker
//!    takes the following word as its value verbatim, even if that word
//!    starts with `-`. A repeated marker overwrites the earlier value. A
//!    `-word` naming no argument, or written in quotes, is an ordinary word.
//! 2. **Positionals.** Remaining words fill the positional arguments not set
//!    by a marker, in declaration order.
//! 3. **Leftovers.** `Default` commands reject them, `Boundless` commands
//!    collect them as trailing values.
//! 4. **Required check.** A required argument still unset fails the line.
//!
//! A composite command binds its own markers and positionals from the front
//! of the line until it reaches a word naming one of its sub-commands, then
//! matches the remaining words against those sub-commands.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::string::String;

use super::argument::{ARGUMENT_MARKER, ArgKind, FLAG_SET_VALUE};
use super::command::{Command, CommandId, CommandMode, ParsedCommand, Registry};
use super::error::{ErrorKind, ParseError};
use super::tokenizer::Word;

/// Result of matching one line against one command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A command matched by name and all its arguments bound.
    Success(ParsedCommand),
    /// No command in the list has the line's first word as name.
    NameMismatch,
    /// A command matched by name but binding failed.
    Failed(ParseError),
}

/// Match `words` against `candidates`.
///
/// `raw` is the line the words were taken from; word spans index into it.
/// The first candidate whose name matches decides the outcome, later
/// candidates are not tried even if binding fails.
pub fn match_line(
    registry: &Registry,
    candidates: &[CommandId],
    raw: &str,
    words: &[Word],
) -> Outcome {
    let Some((first, rest)) = words.split_first() else {
        return Outcome::NameMismatch;
    };

    for &id in candidates {
        let Some(command) = registry.get(id) else {
            continue;
        };
        if !command.matches(first.as_str()) {
            continue;
        }

        trace!("matched command {}", command.primary_name());
        return match bind(registry, id, command, raw, rest) {
            Ok(parsed) => Outcome::Success(parsed),
            Err(error) => Outcome::Failed(error),
        };
    }

    Outcome::NameMismatch
}

fn bind(
    registry: &Registry,
    id: CommandId,
    command: &Command,
    raw: &str,
    words: &[Word],
) -> Result<ParsedCommand, ParseError> {
    let mut parsed = ParsedCommand::new(id, command);

    if command.is_composite() {
        bind_composite(registry, command, &mut parsed, raw, words)?;
    } else {
        match command.mode() {
            CommandMode::Single => bind_single(command, &mut parsed, raw, words)?,
            CommandMode::Default | CommandMode::Boundless => {
                bind_words(command, &mut parsed, words)?
            }
        }
    }

    Ok(parsed)
}

fn bind_words(command: &Command, parsed: &mut ParsedCommand, words: &[Word]) -> Result<(), ParseError> {
    let mut claimed = alloc::vec![false; words.len()];

    let mut i = 0;
    while i < words.len() {
        match marker_target(command, &words[i]) {
            Some(index) => {
                let consumed = bind_marker(command, parsed, index, &words[i..])?;
                claimed[i..i + consumed].fill(true);
                i += consumed;
            }
            None => i += 1,
        }
    }

    for (word, _) in words.iter().zip(&claimed).filter(|(_, taken)| !**taken) {
        match next_positional(parsed) {
            Some(index) => parsed.args[index].bind(word.as_str()),
            None if command.mode() == CommandMode::Boundless => {
                parsed.rest.push(word.as_str().to_owned())
            }
            None => {
                return Err(ParseError::new(ErrorKind::TooManyArguments)
                    .with_command(command.primary_name())
                    .with_token(word.as_str()));
            }
        }
    }

    check_required(command, parsed, parsed.args.len())
}

fn bind_single(
    command: &Command,
    parsed: &mut ParsedCommand,
    raw: &str,
    words: &[Word],
) -> Result<(), ParseError> {
    if let (Some(first), Some(last)) = (words.first(), words.last()) {
        let value = if words.len() == 1 {
            first.as_str()
        } else {
            raw.get(first.start()..last.end()).unwrap_or_default()
        };

        match parsed.args.first_mut() {
            Some(arg) => arg.bind(value),
            None => parsed.rest.push(String::from(value)),
        }
    }

    check_required(command, parsed, 1)
}

fn bind_composite(
    registry: &Registry,
    command: &Command,
    parsed: &mut ParsedCommand,
    raw: &str,
    words: &[Word],
) -> Result<(), ParseError> {
    let mut i = 0;
    while i < words.len() {
        if let Some(index) = marker_target(command, &words[i]) {
            i += bind_marker(command, parsed, index, &words[i..])?;
        } else if names_child(registry, command, &words[i]) {
            break;
        } else if let Some(index) = next_positional(parsed) {
            parsed.args[index].bind(words[i].as_str());
            i += 1;
        } else {
            break;
        }
    }
    check_required(command, parsed, parsed.args.len())?;

    let sub_line = &words[i..];
    parsed.rest = sub_line.iter().map(|word| word.as_str().to_owned()).collect();

    let Some(first) = sub_line.first() else {
        return Ok(());
    };

    match match_line(registry, command.children(), raw, sub_line) {
        Outcome::Success(child) => {
            parsed.sub = Some(Box::new(child));
            Ok(())
        }
        Outcome::NameMismatch => Err(ParseError::new(ErrorKind::NotFound)
            .with_command(command.primary_name())
            .with_token(first.as_str())),
        Outcome::Failed(error) => Err(error),
    }
}

fn names_child(registry: &Registry, command: &Command, word: &Word) -> bool {
    command
        .children()
        .iter()
        .filter_map(|&id| registry.get(id))
        .any(|child| child.matches(word.as_str()))
}

/// Index of the declared argument a marker word refers to.
fn marker_target(command: &Command, word: &Word) -> Option<usize> {
    if word.is_quoted() {
        return None;
    }
    let key = word.as_str().strip_prefix(ARGUMENT_MARKER)?;
    if key.is_empty() {
        return None;
    }
    command
        .arguments()
        .iter()
        .position(|arg| arg.matches(key, command.is_case_sensitive()))
}

/// Bind the argument at `index` from the marker at `words[0]`.
///
/// Returns how many words were consumed.
fn bind_marker(
    command: &Command,
    parsed: &mut ParsedCommand,
    index: usize,
    words: &[Word],
) -> Result<usize, ParseError> {
    let arg = &mut parsed.args[index];
    if arg.kind() == ArgKind::Flag {
        arg.bind(FLAG_SET_VALUE);
        return Ok(1);
    }

    match words.get(1) {
        Some(value) => {
            arg.bind(value.as_str());
            Ok(2)
        }
        None => Err(ParseError::new(ErrorKind::MissingValue)
            .with_command(command.primary_name())
            .with_argument(arg.definition().primary_name())
            .with_token(words[0].as_str())),
    }
}

fn next_positional(parsed: &ParsedCommand) -> Option<usize> {
    parsed
        .args
        .iter()
        .position(|arg| arg.kind() == ArgKind::Positional && !arg.is_set())
}

/// Fail on the first of the leading `considered` arguments that is required
/// and still unset.
fn check_required(command: &Command, parsed: &ParsedCommand, considered: usize) -> Result<(), ParseError> {
    match parsed
        .args
        .iter()
        .take(considered)
        .find(|arg| arg.definition().is_required() && !arg.is_set())
    {
        Some(arg) => Err(ParseError::new(ErrorKind::MissingArgument)
            .with_command(command.primary_name())
            .with_argument(arg.definition().primary_name())),
        None => Ok(()),
    }
}
