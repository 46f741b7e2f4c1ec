//! Formatter configuration: styles, phrases and connective words.
//!
//! Phrases use two bits of syntax. `#N` is replaced by the N-th argument,
//! and `(a|b|…)` is replaced by the alternative selected for the item, or
//! kept literally when the item selects none.

use option_schema_text::{Color, Style};

/// Items an option description can be built from, in default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpItem {
    Synopsis,
    Cluster,
    ParamCount,
    Separator,
    Positional,
    Append,
    Choices,
    Regex,
    Range,
    Unique,
    Limit,
    Sources,
    Stdin,
    Requires,
    Required,
    RequiredIf,
    Default,
    UseCommand,
    UseFilter,
    Deprecated,
    Link,
}

impl HelpItem {
    /// Every item, in default display order.
    pub const ALL: [HelpItem; 21] = [
        Self::Synopsis,
        Self::Cluster,
        Self::ParamCount,
        Self::Separator,
        Self::Positional,
        Self::Append,
        Self::Choices,
        Self::Regex,
        Self::Range,
        Self::Unique,
        Self::Limit,
        Self::Sources,
        Self::Stdin,
        Self::Requires,
        Self::Required,
        Self::RequiredIf,
        Self::Default,
        Self::UseCommand,
        Self::UseFilter,
        Self::Deprecated,
        Self::Link,
    ];
}

/// Styles applied to each kind of value in help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpStyles {
    /// Option names, environment variables and markers.
    pub symbol: Style,
    pub string: Style,
    pub number: Style,
    pub boolean: Style,
    pub regex: Style,
    pub url: Style,
    /// Opaque values such as unlabeled callbacks.
    pub value: Style,
    /// Parameter templates.
    pub param: Style,
    /// Plain description text.
    pub text: Style,
    pub heading: Style,
    pub program: Style,
    pub warning: Style,
}

impl Default for HelpStyles {
    fn default() -> Self {
        Self {
            symbol: Style::new().fg(Color::Magenta),
            string: Style::new().fg(Color::Green),
            number: Style::new().fg(Color::Yellow),
            boolean: Style::new().fg(Color::Yellow),
            regex: Style::new().fg(Color::Red),
            url: Style::new().fg(Color::Cyan).underline(),
            value: Style::new().fg(Color::BrightBlack),
            param: Style::new().fg(Color::Cyan),
            text: Style::new(),
            heading: Style::new().bold(),
            program: Style::new().bold(),
            warning: Style::new().fg(Color::Yellow).bold(),
        }
    }
}

impl HelpStyles {
    /// Styles that render as plain text.
    pub fn plain() -> Self {
        Self {
            symbol: Style::new(),
            string: Style::new(),
            number: Style::new(),
            boolean: Style::new(),
            regex: Style::new(),
            url: Style::new(),
            value: Style::new(),
            param: Style::new(),
            text: Style::new(),
            heading: Style::new(),
            program: Style::new(),
            warning: Style::new(),
        }
    }
}

/// One phrase per [`HelpItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPhrases {
    pub synopsis: String,
    pub cluster: String,
    /// Alternatives: any count, exact, at most, at least, between.
    pub param_count: String,
    /// Alternatives: literal separator, pattern.
    pub separator: String,
    /// Alternatives: plain, with marker.
    pub positional: String,
    pub append: String,
    pub choices: String,
    pub regex: String,
    pub range: String,
    pub unique: String,
    pub limit: String,
    /// Alternatives: one variable, several.
    pub sources: String,
    pub stdin: String,
    pub requires: String,
    pub required: String,
    pub required_if: String,
    pub default: String,
    pub use_command: String,
    pub use_filter: String,
    pub deprecated: String,
    pub link: String,
}

impl Default for HelpPhrases {
    fn default() -> Self {
        Self {
            synopsis: "#0".into(),
            cluster: "Can be clustered with #0.".into(),
            param_count: "Accepts (multiple|#0|at most #0|at least #0|between #0 and #1) parameters."
                .into(),
            separator: "Values are delimited by (#0|the regex #0).".into(),
            positional: "Accepts positional arguments(| that may be preceded by #0).".into(),
            append: "Can be specified multiple times.".into(),
            choices: "Values must be one of {#0}.".into(),
            regex: "Values must match the regex #0.".into(),
            range: "Values must be in the range [#0, #1].".into(),
            unique: "Duplicate values will be removed.".into(),
            limit: "Element count is limited to #0.".into(),
            sources: "If not supplied, will be read from the environment (variable|variables) #0."
                .into(),
            stdin: "Reads data from standard input.".into(),
            requires: "Requires #0.".into(),
            required: "Always required.".into(),
            required_if: "Required if #0.".into(),
            default: "Defaults to #0.".into(),
            use_command: "Uses the next argument as the name of a subcommand.".into(),
            use_filter: "Uses the remaining arguments as option filter.".into(),
            deprecated: "Deprecated for #0.".into(),
            link: "Refer to #0 for details.".into(),
        }
    }
}

impl HelpPhrases {
    pub fn get(&self, item: HelpItem) -> &str {
        match item {
            HelpItem::Synopsis => &self.synopsis,
            HelpItem::Cluster => &self.cluster,
            HelpItem::ParamCount => &self.param_count,
            HelpItem::Separator => &self.separator,
            HelpItem::Positional => &self.positional,
            HelpItem::Append => &self.append,
            HelpItem::Choices => &self.choices,
            HelpItem::Regex => &self.regex,
            HelpItem::Range => &self.range,
            HelpItem::Unique => &self.unique,
            HelpItem::Limit => &self.limit,
            HelpItem::Sources => &self.sources,
            HelpItem::Stdin => &self.stdin,
            HelpItem::Requires => &self.requires,
            HelpItem::Required => &self.required,
            HelpItem::RequiredIf => &self.required_if,
            HelpItem::Default => &self.default,
            HelpItem::UseCommand => &self.use_command,
            HelpItem::UseFilter => &self.use_filter,
            HelpItem::Deprecated => &self.deprecated,
            HelpItem::Link => &self.link,
        }
    }
}

/// Phrases for validation warnings. The `(|#0: )` prefix selects the
/// second alternative when the warning belongs to a nested command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningPhrases {
    pub prefix: String,
    pub variadic_with_cluster_letter: String,
    pub too_similar_names: String,
    pub mixed_naming_convention: String,
}

impl Default for WarningPhrases {
    fn default() -> Self {
        Self {
            prefix: "Warning:".into(),
            variadic_with_cluster_letter:
                "Variadic option #0 has cluster letters. It may only appear as the last option in a cluster."
                    .into(),
            too_similar_names: "(|#0: )Option name #1 has too similar names: #2.".into(),
            mixed_naming_convention: "(|#0: )Name slot #1 has mixed #2 conventions: #3.".into(),
        }
    }
}

/// Words joining requirement expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectives {
    pub and: String,
    pub or: String,
    /// Negates a key.
    pub no: String,
    /// Negates a callback.
    pub not: String,
    pub equals: String,
    pub not_equals: String,
    /// Placeholder for a callback without a label.
    pub callback: String,
}

impl Default for Connectives {
    fn default() -> Self {
        Self {
            and: "and".into(),
            or: "or".into(),
            no: "no".into(),
            not: "not".into(),
            equals: "==".into(),
            not_equals: "!=".into(),
            callback: "<()>".into(),
        }
    }
}

/// Everything that shapes the look of help output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatterConfig {
    pub styles: HelpStyles,
    pub phrases: HelpPhrases,
    pub warnings: WarningPhrases,
    pub connectives: Connectives,
}

/// Per-call formatting inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatFlags {
    /// Printed at the start of usage statements.
    pub program_name: Option<String>,
    /// Case-insensitive terms; group sections list only options whose
    /// names, group, synopsis or environment variables contain one.
    pub filter: Vec<String>,
}
