//! Styled terminal text for command-line help output.
//!
//! This crate knows nothing about option schemas. It provides:
//!
//! - [`Style`]: an SGR attribute set rendered as one escape sequence.
//! - [`TerminalString`]: a word buffer that tracks word count, longest
//!   word, line count and line widths incrementally, supports fused
//!   delimiters, a push/pop style stack, and wraps to a width with
//!   indentation and left or right alignment.
//! - [`StyledMessage`]: a sequence of strings laid out together, used to
//!   build aligned columns.
//!
//! # Example
//!
//! ```
//! use option_schema_text::{Color, Style, TerminalString};
//!
//! let mut text = TerminalString::with_indent(4);
//! text.word("Defaults to")
//!     .styled(&Style::new().fg(Color::Yellow), "42")
//!     .close(".");
//! assert_eq!(text.wrap(None, true), "    Defaults to 42.");
//! assert_eq!(
//!     text.wrap(None, false),
//!     "    Defaults to \x1b[33m42\x1b[0m."
//! );
//! ```

mod message;
mod string;
mod style;

pub use message::StyledMessage;
pub use string::TerminalString;
pub use style::{Color, RESET, Style, strip_styles};
