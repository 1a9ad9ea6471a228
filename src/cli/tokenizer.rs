//! Splits raw input into lines and words.
//!
//! # Rules
//!
//! - Lines end at `\n`, `\r` or `;` outside quotes. Lines without any word
//!   are dropped, so blank input produces no lines at all.
//! - Words are separated by spaces and tabs.
//! - `"..."` and `'...'` form a single word with the quotes removed. Inside
//!   quotes `\"`, `\'`, `\\`, `\n`, `\t` and `\r` are decoded; any other
//!   escaped character is kept as-is. A quote left open runs to the end of
//!   the line; a backslash right before the line terminator stays literal.
//! - A quote that starts in the middle of a word ends that word.
//!
//! ```text
//! echo hello world             -> ["echo", "hello", "world"]
//! config "device name" value   -> ["config", "device name", "value"]
//! echo "Line 1\nLine 2"        -> ["echo", "Line 1<LF>Line 2"]
//! led on; led off              -> two lines
//! ```
//!
//! Input is taken as bytes with an explicit length, so it may contain any
//! byte values. Invalid UTF-8 is replaced with `U+FFFD`.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

/// ASCII horizontal tab.
pub const ASCII_TAB: u8 = 0x09;
/// ASCII line feed.
pub const ASCII_LF: u8 = 0x0A;
/// ASCII carriage return.
pub const ASCII_CR: u8 = 0x0D;
/// ASCII space.
pub const ASCII_SPACE: u8 = 0x20;
/// Separates several commands on one physical line.
pub const COMMAND_SEPARATOR: u8 = b';';

/// One word of a line, with quotes stripped and escapes decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    text: String,
    start: usize,
    end: usize,
    quoted: bool,
}

impl Word {
    /// The decoded text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the word was written in quotes.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Byte offset of the word (including an opening quote) in its line.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the word (including a closing quote) in its line.
    pub fn end(&self) -> usize {
        self.end
    }
}

/// One line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    raw: String,
    words: Vec<Word>,
}

impl Line {
    /// The line as it appeared in the input, without its terminator.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The words of the line. Never empty.
    pub fn words(&self) -> &[Word] {
        &self.words
    }
}

/// Tokenize `input` into lines of words.
pub fn tokenize(input: &[u8]) -> Vec<Line> {
    let text = String::from_utf8_lossy(input);
    let bytes = text.as_bytes();
    let len = bytes.len();

    let mut lines = Vec::new();
    let mut words = Vec::new();
    let mut line_start = 0;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            ASCII_LF | ASCII_CR | COMMAND_SEPARATOR => {
                finish_line(&mut lines, &text[line_start..i], &mut words);
                i += 1;
                line_start = i;
            }
            ASCII_SPACE | ASCII_TAB => i += 1,
            quote @ (b'"' | b'\'') => {
                let start = i;
                i += 1;
                let mut buf = Vec::new();

                while i < len {
                    let byte = bytes[i];
                    if byte == ASCII_LF || byte == ASCII_CR {
                        break;
                    }
                    if byte == b'\\' && i + 1 < len && !matches!(bytes[i + 1], ASCII_LF | ASCII_CR) {
                        i += 1;
                        buf.push(match bytes[i] {
                            b'n' => b'\n',
                            b't' => b'\t',
                            b'r' => b'\r',
                            other => other,
                        });
                        i += 1;
                    } else if byte == quote {
                        i += 1;
                        break;
                    } else {
                        buf.push(byte);
                        i += 1;
                    }
                }

                words.push(Word {
                    text: into_text(buf),
                    start: start - line_start,
                    end: i - line_start,
                    quoted: true,
                });
            }
            _ => {
                let start = i;
                while i < len && !ends_unquoted_word(bytes[i]) {
                    i += 1;
                }
                words.push(Word {
                    text: text[start..i].to_owned(),
                    start: start - line_start,
                    end: i - line_start,
                    quoted: false,
                });
            }
        }
    }
    finish_line(&mut lines, &text[line_start..], &mut words);

    lines
}

fn ends_unquoted_word(byte: u8) -> bool {
    matches!(
        byte,
        ASCII_SPACE | ASCII_TAB | ASCII_LF | ASCII_CR | COMMAND_SEPARATOR | b'"' | b'\''
    )
}

fn finish_line(lines: &mut Vec<Line>, raw: &str, words: &mut Vec<Word>) {
    if words.is_empty() {
        return;
    }
    lines.push(Line {
        raw: raw.to_owned(),
        words: core::mem::take(words),
    });
}

// Escapes only ever split on ASCII bytes, but stay total anyway.
fn into_text(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
