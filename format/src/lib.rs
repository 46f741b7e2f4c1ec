//! Usage and help message formatting for option schemas.
//!
//! A help message is a list of [`HelpSection`]s rendered in order:
//!
//! - [`HelpSection::Text`]: a static block of text.
//! - [`HelpSection::Usage`]: an invocation synopsis synthesized from the
//!   options and the dependencies between them.
//! - [`HelpSection::Groups`]: an option reference table with aligned
//!   names, parameter and description columns.
//!
//! The result is a [`StyledMessage`] that callers wrap to the terminal
//! width, with or without ANSI styles. Formatting never fails; it assumes a
//! schema that passed [`option_schema_core::validate`].
//!
//! # Example
//!
//! ```
//! use option_schema_core::*;
//! use option_schema_format::*;
//!
//! let schema = Schema::new()
//!     .with_option("flag", OptionDef::flag().with_names(["-f"]).with_synopsis("A flag."))
//!     .with_option(
//!         "single",
//!         OptionDef::single()
//!             .with_names(["-s"])
//!             .with_requires("flag")
//!             .with_synopsis("A value."),
//!     );
//!
//! let flags = FormatFlags { program_name: Some("prog".into()), ..Default::default() };
//! let message = format(&schema, &[HelpSection::usage(), HelpSection::groups()], &flags);
//! assert_eq!(
//!     message.wrap(None, true),
//!     "Usage:\n  prog [-f] -s <param>\n\nOptions:\n  -f           A flag.\n  -s  <param>  A value. Requires -f.\n"
//! );
//! ```

mod config;
mod groups;
mod params;
mod phrase;
mod requirements;
mod section;
mod usage;
mod warnings;

use option_schema_core::Schema;
use tracing::debug;

pub use config::{
    Connectives, FormatFlags, FormatterConfig, HelpItem, HelpPhrases, HelpStyles, WarningPhrases,
};
pub use option_schema_text::{StyledMessage, TerminalString};
pub use phrase::{FormatArg, NumberArg, ValueArg, format_phrase};
pub use requirements::format_requirement;
pub use section::{
    Align, ColumnLayout, GroupLayout, GroupsSection, HelpSection, TextSection, UsageSection,
};
pub use warnings::format_warnings;

/// Renders help sections for one schema.
#[derive(Debug, Clone)]
pub struct HelpFormatter<'a> {
    schema: &'a Schema,
    config: FormatterConfig,
    flags: FormatFlags,
}

impl<'a> HelpFormatter<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            config: FormatterConfig::default(),
            flags: FormatFlags::default(),
        }
    }

    pub fn with_config(mut self, config: FormatterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_flags(mut self, flags: FormatFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Renders `sections` in order, separated by blank lines. Sections that
    /// produce nothing leave no gap.
    pub fn format(&self, sections: &[HelpSection]) -> StyledMessage {
        let mut message = StyledMessage::new();
        for section in sections {
            let rendered = self.format_section(section);
            if rendered.is_empty() {
                continue;
            }
            if !message.is_empty() {
                let mut gap = TerminalString::new();
                gap.break_lines(1);
                message.push(gap);
            }
            message.extend(rendered);
        }
        message
    }

    fn format_section(&self, section: &HelpSection) -> StyledMessage {
        let styles = &self.config.styles;
        match section {
            HelpSection::Text(text) => {
                debug!(heading = ?text.heading, "formatting text section");
                let mut message = StyledMessage::new();
                if let Some(heading) = &text.heading {
                    message.push(self.heading(heading));
                }
                let mut body = TerminalString::with_indent(text.indent);
                body.push_style(&styles.text).split(&text.text).pop_style();
                if !body.is_empty() {
                    body.break_lines(1);
                    message.push(body);
                }
                message
            }
            HelpSection::Usage(section) => {
                debug!(heading = ?section.heading, "formatting usage section");
                let mut statement = usage::format_usage(self.schema, section, &self.flags, styles);
                let mut message = StyledMessage::new();
                if statement.is_empty() {
                    return message;
                }
                if let Some(heading) = &section.heading {
                    message.push(self.heading(heading));
                }
                statement.break_lines(1);
                message.push(statement);
                message
            }
            HelpSection::Groups(section) => {
                debug!(title = ?section.title, "formatting groups section");
                groups::format_groups(self.schema, section, &self.flags, &self.config)
            }
        }
    }

    fn heading(&self, heading: &str) -> TerminalString {
        let mut text = TerminalString::new();
        text.push_style(&self.config.styles.heading)
            .split(heading)
            .pop_style()
            .break_lines(1);
        text
    }
}

/// Renders `sections` with the default configuration.
pub fn format(schema: &Schema, sections: &[HelpSection], flags: &FormatFlags) -> StyledMessage {
    HelpFormatter::new(schema)
        .with_flags(flags.clone())
        .format(sections)
}
