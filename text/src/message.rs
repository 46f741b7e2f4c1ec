//! Multi-string messages.

use std::fmt;

use crate::string::{TerminalString, Wrapper};

/// An ordered list of [`TerminalString`]s rendered back to back.
///
/// Each string keeps its own indentation and alignment; they share the
/// output column and the style stack while rendering, so a string with an
/// indentation continues on the line left by its predecessor. This is what
/// column layouts are built from.
///
/// # Examples
///
/// ```
/// use option_schema_text::{StyledMessage, TerminalString};
///
/// let mut names = TerminalString::with_indent(2);
/// names.word("-f,").word("--flag");
/// let mut descr = TerminalString::with_indent(16);
/// descr.split("A boolean flag.").break_lines(1);
///
/// let mut message = StyledMessage::new();
/// message.push(names);
/// message.push(descr);
/// assert_eq!(message.wrap(None, true), "  -f, --flag    A boolean flag.\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledMessage {
    strings: Vec<TerminalString>,
}

impl StyledMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, string: TerminalString) {
        self.strings.push(string);
    }

    /// Moves every string of `other` to the end of this message.
    pub fn extend(&mut self, other: StyledMessage) {
        self.strings.extend(other.strings);
    }

    pub fn strings(&self) -> &[TerminalString] {
        &self.strings
    }

    pub fn is_empty(&self) -> bool {
        self.strings.iter().all(TerminalString::is_empty)
    }

    /// Total number of words across all strings.
    pub fn word_count(&self) -> usize {
        self.strings.iter().map(TerminalString::word_count).sum()
    }

    /// Number of physical lines the message occupies at `width`.
    pub fn line_count(&self, width: Option<usize>) -> usize {
        let text = self.wrap(width, true);
        if text.is_empty() {
            0
        } else {
            text.split('\n').count()
        }
    }

    /// Renders the message, wrapping at `width` when given.
    ///
    /// With `strip` set the output is plain text; otherwise style sequences
    /// are emitted and any style left open is reset at the end.
    pub fn wrap(&self, width: Option<usize>, strip: bool) -> String {
        let mut wrapper = Wrapper::new(width, strip);
        for string in &self.strings {
            string.wrap_into(&mut wrapper);
        }
        wrapper.finish()
    }
}

impl From<TerminalString> for StyledMessage {
    fn from(string: TerminalString) -> Self {
        Self {
            strings: vec![string],
        }
    }
}

impl fmt::Display for StyledMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wrap(None, false))
    }
}
