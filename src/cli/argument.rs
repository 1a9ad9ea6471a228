//! Argument definitions and bound values.

use alloc::string::String;
use serde::Serialize;

/// Value a flag argument takes once it appears on a line.
pub const FLAG_SET_VALUE: &str = "true";

/// Prefix that marks a word as an argument name (`-key`).
pub const ARGUMENT_MARKER: char = '-';

/// Separates aliases inside a command or argument name (`"n/number"`).
pub const ALIAS_SEPARATOR: char = '/';

/// How an argument receives its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// Bound from unclaimed words in declaration order, or by `-name value`.
    Positional,
    /// Only bound by `-name value`.
    Named,
    /// Bound by a bare `-name`, never consumes a value word.
    Flag,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ArgKind {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ArgKind::Positional => defmt::write!(f, "Positional"),
            ArgKind::Named => defmt::write!(f, "Named"),
            ArgKind::Flag => defmt::write!(f, "Flag"),
        }
    }
}

/// A declared argument of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    name: String,
    kind: ArgKind,
    default: Option<String>,
}

impl Argument {
    pub(crate) fn new(name: &str, kind: ArgKind, default: Option<&str>) -> Self {
        Self {
            name: String::from(name),
            kind,
            default: default.map(String::from),
        }
    }

    /// The declared name, including any aliases.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first alias, used when reporting.
    pub fn primary_name(&self) -> &str {
        primary_name(&self.name)
    }

    /// How this argument is bound.
    pub fn kind(&self) -> ArgKind {
        self.kind
    }

    /// The declared default, if any.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Whether a line must supply this argument.
    ///
    /// Flags never are; positional and named arguments are unless they
    /// declare a default.
    pub fn is_required(&self) -> bool {
        self.kind != ArgKind::Flag && self.default.is_none()
    }

    /// Whether `candidate` equals one of the aliases.
    pub fn matches(&self, candidate: &str, case_sensitive: bool) -> bool {
        names_match(&self.name, candidate, case_sensitive)
    }

    pub(crate) fn shares_alias_with(&self, other: &str, case_sensitive: bool) -> bool {
        aliases(other).any(|alias| self.matches(alias, case_sensitive))
    }
}

/// An argument as bound by one successful parse.
///
/// Carries a copy of its definition so it can be read after it has left
/// the registry, for example from the command queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundArgument {
    definition: Argument,
    value: Option<String>,
}

impl BoundArgument {
    pub(crate) fn unbound(definition: &Argument) -> Self {
        Self {
            definition: definition.clone(),
            value: None,
        }
    }

    pub(crate) fn bind(&mut self, value: &str) {
        self.value = Some(String::from(value));
    }

    pub(crate) fn definition(&self) -> &Argument {
        &self.definition
    }

    /// The declared name, including any aliases.
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// How this argument is bound.
    pub fn kind(&self) -> ArgKind {
        self.definition.kind()
    }

    /// The bound value, else the default, else an empty string.
    pub fn value(&self) -> &str {
        self.value
            .as_deref()
            .or(self.definition.default_value())
            .unwrap_or("")
    }

    /// Whether the parsed line supplied this argument.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

pub(crate) fn aliases(name: &str) -> impl Iterator<Item = &str> {
    name.split(ALIAS_SEPARATOR)
}

pub(crate) fn primary_name(name: &str) -> &str {
    aliases(name).next().unwrap_or(name)
}

pub(crate) fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && aliases(name).all(|alias| {
            !alias.is_empty() && !alias.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'')
        })
}

pub(crate) fn names_match(declared: &str, candidate: &str, case_sensitive: bool) -> bool {
    aliases(declared).any(|alias| {
        if case_sensitive {
            alias == candidate
        } else {
            alias.eq_ignore_ascii_case(candidate)
        }
    })
}
