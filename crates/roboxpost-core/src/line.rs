//! Line-level model of a G-code document.
//!
//! A [`CommandLine`] is one raw text line split into an ordered token
//! sequence plus the trailing comment. Tokens never contain the `;`
//! delimiter or newlines; rendering rejoins tokens with single spaces, so
//! the round trip is lossless apart from whitespace normalization.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::printhead::Tool;

/// Valve state in effect after a line executes.
///
/// `Undefined` is the start state. It behaves like `Closed` for transition
/// purposes, except that the first positive extrusion after `Undefined`
/// always forces an open sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValveState {
    /// Valve is open, filament path is dispensing.
    Opened,
    /// Valve is closed.
    Closed,
    /// No valve command has been seen yet.
    #[default]
    Undefined,
}

/// Pattern for the first signed decimal or scientific-notation numeral
/// inside a G-code word, e.g. `-5`, `0.3`, `.5`, `1.2e-3`.
fn numeral_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").unwrap())
}

/// One line of a G-code document.
///
/// Created once per input line at parse time. Tokens are mutated in place
/// during the sequencer passes (insertion, removal, in-place replacement);
/// the line is serialized once at the end via [`CommandLine::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLine {
    tokens: Vec<String>,
    comment: String,
    /// Extruder this line is attributed to; `None` until resolved.
    pub tool: Option<Tool>,
    /// Valve state after this line executes; diagnostic only.
    pub valve_tag: ValveState,
}

impl CommandLine {
    /// Parse one raw text line.
    ///
    /// Splits on the first `;`. If the text before the delimiter is empty
    /// or whitespace, the entire line is a comment (tokens empty); otherwise
    /// the command text is whitespace-split into tokens and the remainder
    /// becomes the comment.
    pub fn parse(raw: &str) -> Self {
        let (command, comment) = match raw.split_once(';') {
            Some((before, after)) if before.trim().is_empty() => ("", after),
            Some((before, after)) => (before, after),
            None => (raw, ""),
        };
        Self {
            tokens: command.split_whitespace().map(str::to_string).collect(),
            comment: comment.to_string(),
            tool: None,
            valve_tag: ValveState::Undefined,
        }
    }

    /// Build a comment-only line. `text` is rendered after the `;`.
    pub fn comment_only(text: &str) -> Self {
        Self {
            tokens: Vec::new(),
            comment: text.to_string(),
            tool: None,
            valve_tag: ValveState::Undefined,
        }
    }

    /// Final string representation of the line.
    pub fn render(&self) -> String {
        if self.tokens.is_empty() {
            format!(";{}", self.comment)
        } else if self.comment.is_empty() {
            self.tokens.join(" ")
        } else {
            format!("{};{}", self.tokens.join(" "), self.comment)
        }
    }

    /// The executable tokens of this line.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The comment text (without the `;` delimiter).
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// First token of the command, if any.
    pub fn command_type(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Position of the first token equal to `token`.
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }

    /// Position of the first token starting with `prefix`.
    pub fn index_of_prefix(&self, prefix: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t.starts_with(prefix))
    }

    /// Numeric value of the first token starting with `prefix`.
    ///
    /// Returns `None` when no such token exists or the token carries no
    /// numeral. Callers must treat `None` as "field not present", never as
    /// zero.
    pub fn numeric_value(&self, prefix: &str) -> Option<f64> {
        let index = self.index_of_prefix(prefix)?;
        let numeral = numeral_pattern().find(&self.tokens[index])?;
        numeral.as_str().parse().ok()
    }

    /// Remove the token at `index`. Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) {
        if index < self.tokens.len() {
            self.tokens.remove(index);
        }
    }

    /// Replace the token at `index`. Out-of-range indices are ignored.
    pub fn replace_at(&mut self, index: usize, token: impl Into<String>) {
        if index < self.tokens.len() {
            self.tokens[index] = token.into();
        }
    }

    /// Append a token at the end of the command.
    pub fn append_token(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// Append annotation text to the comment. The `;` delimiter is inserted
    /// only once, at render time.
    pub fn add_comment(&mut self, text: &str) {
        if !self.comment.is_empty() {
            self.comment.push(' ');
            self.comment.push_str(text);
        } else {
            self.comment = format!(" {}", text);
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
