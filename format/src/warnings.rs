//! Validation warnings rendered for the terminal.

use option_schema_core::{ValidationReport, Warning};
use option_schema_text::{StyledMessage, TerminalString};

use crate::config::FormatterConfig;
use crate::phrase::{FormatArg, format_phrase};

/// Renders every warning of `report` on its own line, in discovery order.
///
/// # Examples
///
/// ```
/// use option_schema_core::*;
/// use option_schema_format::{FormatterConfig, HelpStyles, format_warnings};
///
/// let schema = Schema::new()
///     .with_option("a", OptionDef::flag().with_names(["--verbose"]))
///     .with_option("b", OptionDef::flag().with_names(["--verbos"]));
/// let report = validate(&schema, &ValidationFlags::default()).unwrap();
/// let config = FormatterConfig { styles: HelpStyles::plain(), ..Default::default() };
/// assert_eq!(
///     format_warnings(&report, &config).wrap(None, true),
///     "Warning: Option name --verbose has too similar names: --verbos.\n"
/// );
/// ```
pub fn format_warnings(report: &ValidationReport, config: &FormatterConfig) -> StyledMessage {
    let phrases = &config.warnings;
    let styles = &config.styles;
    let mut message = StyledMessage::new();
    for warning in &report.warnings {
        let mut line = TerminalString::new();
        line.styled(&styles.warning, &phrases.prefix);
        match warning {
            Warning::VariadicWithClusterLetter { key } => format_phrase(
                &mut line,
                &phrases.variadic_with_cluster_letter,
                &[FormatArg::symbol(key)],
                None,
                styles,
            ),
            Warning::TooSimilarNames {
                scope,
                name,
                similar,
            } => format_phrase(
                &mut line,
                &phrases.too_similar_names,
                &[
                    FormatArg::symbol(scope),
                    FormatArg::symbol(name),
                    FormatArg::List(similar.iter().map(|name| FormatArg::symbol(name)).collect()),
                ],
                Some(usize::from(!scope.is_empty())),
                styles,
            ),
            Warning::MixedNamingConvention {
                scope,
                slot,
                category,
                conventions,
            } => {
                let conventions = conventions
                    .iter()
                    .map(|(convention, name)| {
                        let mut item = TerminalString::new();
                        item.word(convention).open("(");
                        item.styled(&styles.symbol, name).close(")");
                        FormatArg::Styled(item)
                    })
                    .collect();
                format_phrase(
                    &mut line,
                    &phrases.mixed_naming_convention,
                    &[
                        FormatArg::symbol(scope),
                        FormatArg::number(*slot as f64),
                        FormatArg::Text(category.to_string()),
                        FormatArg::List(conventions),
                    ],
                    Some(usize::from(!scope.is_empty())),
                    styles,
                );
            }
        }
        line.break_lines(1);
        message.push(line);
    }
    message
}
