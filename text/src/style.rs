//! SGR (Select Graphic Rendition) styles.
//!
//! A [`Style`] is an ordered list of SGR parameters rendered as a single
//! `ESC [ … m` control sequence. The empty style renders as nothing, so
//! plain output never carries stray escape codes.

use std::fmt;

/// Sequence that clears every active attribute.
pub const RESET: &str = "\x1b[0m";

/// Terminal color for foreground or background attributes.
///
/// # Examples
///
/// ```
/// use option_schema_text::{Color, Style};
///
/// let style = Style::new().fg(Color::Indexed(208));
/// assert_eq!(style.sequence(), "\x1b[38;5;208m");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    /// The terminal's default color.
    Default,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Appends the SGR parameters for this color; `base` is 30 for
    /// foreground and 40 for background.
    fn push_codes(self, base: u8, codes: &mut Vec<u8>) {
        let simple = |offset: u8| base + offset;
        let bright = |offset: u8| base + 60 + offset;
        match self {
            Self::Black => codes.push(simple(0)),
            Self::Red => codes.push(simple(1)),
            Self::Green => codes.push(simple(2)),
            Self::Yellow => codes.push(simple(3)),
            Self::Blue => codes.push(simple(4)),
            Self::Magenta => codes.push(simple(5)),
            Self::Cyan => codes.push(simple(6)),
            Self::White => codes.push(simple(7)),
            Self::Default => codes.push(simple(9)),
            Self::BrightBlack => codes.push(bright(0)),
            Self::BrightRed => codes.push(bright(1)),
            Self::BrightGreen => codes.push(bright(2)),
            Self::BrightYellow => codes.push(bright(3)),
            Self::BrightBlue => codes.push(bright(4)),
            Self::BrightMagenta => codes.push(bright(5)),
            Self::BrightCyan => codes.push(bright(6)),
            Self::BrightWhite => codes.push(bright(7)),
            Self::Indexed(index) => codes.extend([base + 8, 5, index]),
            Self::Rgb(r, g, b) => codes.extend([base + 8, 2, r, g, b]),
        }
    }
}

/// A set of text attributes rendered as one SGR sequence.
///
/// Styles are built with chained methods and compare by their parameter
/// list, so two styles with the same attributes in the same order are
/// equal.
///
/// # Examples
///
/// ```
/// use option_schema_text::{Color, Style};
///
/// let heading = Style::new().bold().fg(Color::Green);
/// assert_eq!(heading.sequence(), "\x1b[1;32m");
/// assert!(Style::new().is_plain());
/// assert_eq!(Style::new().sequence(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Style {
    codes: Vec<u8>,
}

impl Style {
    /// Creates an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(self) -> Self {
        self.code(1)
    }

    pub fn faint(self) -> Self {
        self.code(2)
    }

    pub fn italic(self) -> Self {
        self.code(3)
    }

    pub fn underline(self) -> Self {
        self.code(4)
    }

    pub fn inverse(self) -> Self {
        self.code(7)
    }

    pub fn strike(self) -> Self {
        self.code(9)
    }

    /// Sets the foreground color.
    pub fn fg(mut self, color: Color) -> Self {
        color.push_codes(30, &mut self.codes);
        self
    }

    /// Sets the background color.
    pub fn bg(mut self, color: Color) -> Self {
        color.push_codes(40, &mut self.codes);
        self
    }

    /// Appends a raw SGR parameter.
    pub fn code(mut self, code: u8) -> Self {
        self.codes.push(code);
        self
    }

    /// Returns `true` when the style carries no attributes.
    pub fn is_plain(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the control sequence, or an empty string for a plain style.
    pub fn sequence(&self) -> String {
        if self.codes.is_empty() {
            return String::new();
        }
        let params: Vec<String> = self.codes.iter().map(u8::to_string).collect();
        format!("\x1b[{}m", params.join(";"))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sequence())
    }
}

/// Removes SGR control sequences (`ESC [ … final`) from `text`.
///
/// An escape character that does not start a complete sequence is kept as
/// is, so malformed input survives literally.
///
/// # Examples
///
/// ```
/// use option_schema_text::strip_styles;
///
/// assert_eq!(strip_styles("\x1b[1;31mred\x1b[0m text"), "red text");
/// assert_eq!(strip_styles("plain"), "plain");
/// ```
pub fn strip_styles(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        if ch != '\x1b' || chars.peek().map(|&(_, c)| c) != Some('[') {
            out.push(ch);
            continue;
        }
        chars.next();
        let mut terminated = false;
        for (_, c) in chars.by_ref() {
            if ('@'..='~').contains(&c) {
                terminated = true;
                break;
            }
        }
        if !terminated {
            out.push_str(&text[start..]);
            break;
        }
    }
    out
}
