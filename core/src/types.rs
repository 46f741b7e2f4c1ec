//! Option definitions.
//!
//! An [`OptionDef`] is one configurable unit of a command line. Fields every
//! kind shares live on the struct; kind-specific data lives in the
//! [`OptionKind`] variants so it is only reachable after matching the tag.

use std::fmt;
use std::sync::{Arc, OnceLock};

use option_schema_text::Style;
use regex::Regex;

use crate::requirement::Requirement;
use crate::schema::Schema;
use crate::values::{Value, ValueSet};

/// Positional binding of a parameter-taking option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Positional {
    /// Bare arguments are routed to this option.
    Plain,
    /// Bare arguments are routed to this option, and everything after the
    /// marker (e.g. `--`) is treated as positional.
    Marker(String),
}

/// Whether a parameter may or must be attached to the option name
/// (`--opt=value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlinePolicy {
    /// The parameter must be a separate argument.
    Disallowed,
    /// The parameter must be attached to the name.
    Required,
}

/// Inclusive numeric range a single parameter must fall into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

/// Constraints and display hints shared by the parameter-taking kinds.
#[derive(Debug, Clone, Default)]
pub struct ParamSpec {
    pub positional: Option<Positional>,
    /// Name shown in parameter templates (`<name>`).
    pub param_name: Option<String>,
    /// Example value shown in place of the parameter name.
    pub example: Option<Value>,
    pub inline: Option<InlinePolicy>,
    pub choices: Vec<String>,
    pub regex: Option<Regex>,
    pub range: Option<NumericRange>,
}

/// How a single argument is split into array elements.
#[derive(Debug, Clone)]
pub enum Separator {
    Text(String),
    Pattern(Regex),
}

/// Array-specific behavior.
#[derive(Debug, Clone, Default)]
pub struct ArraySpec {
    pub separator: Option<Separator>,
    /// Remove duplicate elements, keeping the first occurrence.
    pub unique: bool,
    /// Repeated occurrences append to the previous value.
    pub append: bool,
    /// Maximum element count; zero or `None` means unlimited.
    pub limit: Option<usize>,
}

/// Explicit parameter count for function options.
///
/// Stored signed so that authoring mistakes can be reported rather than
/// being unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCount {
    Exact(i64),
    Range(i64, i64),
}

impl ParamCount {
    /// Returns `true` for a non-negative count or a non-negative, strictly
    /// increasing range.
    pub fn is_valid(self) -> bool {
        match self {
            Self::Exact(count) => count >= 0,
            Self::Range(min, max) => min >= 0 && min < max,
        }
    }
}

impl fmt::Display for ParamCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(count) => write!(f, "{count}"),
            Self::Range(min, max) => write!(f, "[{min}, {max}]"),
        }
    }
}

/// Inclusive parameter count bounds; `max` of `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamBounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl ParamBounds {
    pub const NONE: Self = Self {
        min: 0,
        max: Some(0),
    };
    pub const ONE: Self = Self {
        min: 1,
        max: Some(1),
    };
    pub const ANY: Self = Self { min: 0, max: None };

    pub fn is_niladic(self) -> bool {
        self.max == Some(0)
    }

    /// More than one parameter may follow the option.
    pub fn is_variadic(self) -> bool {
        self.max.is_none_or(|max| max > 1)
    }
}

/// Nested schema of a command option.
#[derive(Clone)]
pub enum NestedSchema {
    Eager(Arc<Schema>),
    /// Built on demand; returning `None` means the schema is unavailable.
    Lazy(Arc<dyn Fn() -> Option<Arc<Schema>> + Send + Sync>),
    /// Filled by an asynchronous loader outside this crate. An empty slot
    /// is treated as not yet resolved.
    Deferred(Arc<OnceLock<Arc<Schema>>>),
}

impl NestedSchema {
    pub fn lazy(resolve: impl Fn() -> Option<Arc<Schema>> + Send + Sync + 'static) -> Self {
        Self::Lazy(Arc::new(resolve))
    }

    /// Returns the nested schema if it is available without waiting.
    pub fn resolve(&self) -> Option<Arc<Schema>> {
        match self {
            Self::Eager(schema) => Some(Arc::clone(schema)),
            Self::Lazy(resolve) => resolve(),
            Self::Deferred(slot) => slot.get().cloned(),
        }
    }
}

impl fmt::Debug for NestedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager(schema) => f
                .debug_tuple("Eager")
                .field(&format_args!("{} options", schema.len()))
                .finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
            Self::Deferred(slot) => f
                .debug_tuple("Deferred")
                .field(&slot.get().is_some())
                .finish(),
        }
    }
}

/// A default computed from the other parsed values.
#[derive(Clone)]
pub struct DefaultCallback {
    label: Option<String>,
    compute: Arc<dyn Fn(&ValueSet) -> Value + Send + Sync>,
}

impl DefaultCallback {
    pub fn new(compute: impl Fn(&ValueSet) -> Value + Send + Sync + 'static) -> Self {
        Self {
            label: None,
            compute: Arc::new(compute),
        }
    }

    /// Sets the text shown in help output instead of a placeholder.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn compute(&self, values: &ValueSet) -> Value {
        (self.compute)(values)
    }
}

impl fmt::Debug for DefaultCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultCallback")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum DefaultValue {
    Value(Value),
    Computed(DefaultCallback),
}

/// Per-option style overrides for help output.
#[derive(Debug, Clone, Default)]
pub struct OptionStyles {
    pub names: Option<Style>,
    pub param: Option<Style>,
    pub description: Option<Style>,
}

/// Kind tag with the data only that kind carries.
#[derive(Debug, Clone)]
pub enum OptionKind {
    /// Takes no parameter.
    Flag,
    Single {
        param: ParamSpec,
    },
    Array {
        param: ParamSpec,
        array: ArraySpec,
    },
    /// Takes a number of parameters handed to a user callback.
    Function {
        param: ParamSpec,
        count: Option<ParamCount>,
    },
    /// Switches to a nested command; the remaining arguments belong to it.
    Command {
        nested: Option<NestedSchema>,
    },
    Help {
        /// The next argument selects a nested command whose help is shown.
        use_command: bool,
        /// The remaining arguments filter the options shown.
        use_filter: bool,
    },
    Version {
        version: Option<String>,
    },
}

/// One option definition.
///
/// # Examples
///
/// ```
/// use option_schema_core::*;
///
/// let output = OptionDef::single()
///     .with_names(["-o", "--output"])
///     .with_param_name("file")
///     .with_synopsis("Write results to a file.");
/// assert_eq!(output.option_names(), vec!["-o", "--output"]);
/// assert_eq!(output.param_bounds(), ParamBounds::ONE);
/// ```
#[derive(Debug, Clone)]
pub struct OptionDef {
    pub kind: OptionKind,
    /// Display names; `None` reserves a column slot in help output.
    pub names: Vec<Option<String>>,
    /// Letters usable in a cluster argument such as `-abc`.
    pub cluster: Option<String>,
    /// Environment variables the value may be read from.
    pub sources: Vec<String>,
    /// The value may be read from standard input.
    pub stdin: bool,
    pub required: bool,
    pub requires: Option<Requirement>,
    pub required_if: Option<Requirement>,
    pub default: Option<DefaultValue>,
    pub group: Option<String>,
    pub hidden: bool,
    pub synopsis: Option<String>,
    pub deprecated: Option<String>,
    pub link: Option<String>,
    pub styles: OptionStyles,
}

impl OptionDef {
    /// Creates an option of the given kind with no names.
    pub fn new(kind: OptionKind) -> Self {
        Self {
            kind,
            names: Vec::new(),
            cluster: None,
            sources: Vec::new(),
            stdin: false,
            required: false,
            requires: None,
            required_if: None,
            default: None,
            group: None,
            hidden: false,
            synopsis: None,
            deprecated: None,
            link: None,
            styles: OptionStyles::default(),
        }
    }

    pub fn flag() -> Self {
        Self::new(OptionKind::Flag)
    }

    pub fn single() -> Self {
        Self::new(OptionKind::Single {
            param: ParamSpec::default(),
        })
    }

    pub fn array(array: ArraySpec) -> Self {
        Self::new(OptionKind::Array {
            param: ParamSpec::default(),
            array,
        })
    }

    pub fn function(count: Option<ParamCount>) -> Self {
        Self::new(OptionKind::Function {
            param: ParamSpec::default(),
            count,
        })
    }

    pub fn command(nested: Option<NestedSchema>) -> Self {
        Self::new(OptionKind::Command { nested })
    }

    pub fn help() -> Self {
        Self::new(OptionKind::Help {
            use_command: false,
            use_filter: false,
        })
    }

    pub fn version(version: Option<&str>) -> Self {
        Self::new(OptionKind::Version {
            version: version.map(String::from),
        })
    }

    /// Replaces the display names.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(|name| Some(name.into())).collect();
        self
    }

    /// Replaces the display names, keeping `None` entries as reserved slots.
    pub fn with_name_slots<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(|name| name.map(Into::into)).collect();
        self
    }

    pub fn with_cluster(mut self, letters: &str) -> Self {
        self.cluster = Some(letters.to_string());
        self
    }

    pub fn with_source(mut self, variable: &str) -> Self {
        self.sources.push(variable.to_string());
        self
    }

    pub fn with_stdin(mut self) -> Self {
        self.stdin = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_requires(mut self, requirement: impl Into<Requirement>) -> Self {
        self.requires = Some(requirement.into());
        self
    }

    pub fn with_required_if(mut self, requirement: impl Into<Requirement>) -> Self {
        self.required_if = Some(requirement.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn with_default_callback(mut self, callback: DefaultCallback) -> Self {
        self.default = Some(DefaultValue::Computed(callback));
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_synopsis(mut self, synopsis: &str) -> Self {
        self.synopsis = Some(synopsis.to_string());
        self
    }

    pub fn with_deprecated(mut self, reason: &str) -> Self {
        self.deprecated = Some(reason.to_string());
        self
    }

    pub fn with_link(mut self, url: &str) -> Self {
        self.link = Some(url.to_string());
        self
    }

    /// Binds bare arguments to this option. Ignored for niladic kinds.
    pub fn with_positional(mut self, positional: Positional) -> Self {
        if let Some(param) = self.param_mut() {
            param.positional = Some(positional);
        }
        self
    }

    pub fn with_param_name(mut self, name: &str) -> Self {
        if let Some(param) = self.param_mut() {
            param.param_name = Some(name.to_string());
        }
        self
    }

    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        if let Some(param) = self.param_mut() {
            param.example = Some(example.into());
        }
        self
    }

    pub fn with_inline(mut self, inline: InlinePolicy) -> Self {
        if let Some(param) = self.param_mut() {
            param.inline = Some(inline);
        }
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(param) = self.param_mut() {
            param.choices = choices.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn with_regex(mut self, regex: Regex) -> Self {
        if let Some(param) = self.param_mut() {
            param.regex = Some(regex);
        }
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        if let Some(param) = self.param_mut() {
            param.range = Some(NumericRange { min, max });
        }
        self
    }

    /// Parameter spec of the parameter-taking kinds.
    pub fn param(&self) -> Option<&ParamSpec> {
        match &self.kind {
            OptionKind::Single { param }
            | OptionKind::Array { param, .. }
            | OptionKind::Function { param, .. } => Some(param),
            _ => None,
        }
    }

    fn param_mut(&mut self) -> Option<&mut ParamSpec> {
        match &mut self.kind {
            OptionKind::Single { param }
            | OptionKind::Array { param, .. }
            | OptionKind::Function { param, .. } => Some(param),
            _ => None,
        }
    }

    pub fn positional(&self) -> Option<&Positional> {
        self.param().and_then(|param| param.positional.as_ref())
    }

    /// The positional marker string, if the binding has one.
    pub fn positional_marker(&self) -> Option<&str> {
        match self.positional() {
            Some(Positional::Marker(marker)) => Some(marker),
            _ => None,
        }
    }

    /// Display names that are present, in slot order.
    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().filter_map(|name| name.as_deref())
    }

    /// Display names plus the positional marker; reserved slots are skipped.
    pub fn option_names(&self) -> Vec<&str> {
        self.display_names()
            .chain(self.positional_marker())
            .collect()
    }

    /// Whether a parameter can be attached to a name the user types.
    pub fn has_suppliable_name(&self) -> bool {
        self.display_names().next().is_some()
    }

    pub fn inline_policy(&self) -> Option<InlinePolicy> {
        self.param().and_then(|param| param.inline)
    }

    /// Inclusive parameter count bounds.
    ///
    /// An invalid explicit function count is clamped; reporting it is the
    /// validator's job.
    pub fn param_bounds(&self) -> ParamBounds {
        let clamp = |count: i64| usize::try_from(count).unwrap_or(0);
        match &self.kind {
            OptionKind::Flag
            | OptionKind::Command { .. }
            | OptionKind::Help { .. }
            | OptionKind::Version { .. } => ParamBounds::NONE,
            OptionKind::Single { .. } => ParamBounds::ONE,
            OptionKind::Array { .. } => ParamBounds::ANY,
            OptionKind::Function { count, .. } => match count {
                None => ParamBounds::ANY,
                Some(ParamCount::Exact(count)) => ParamBounds {
                    min: clamp(*count),
                    max: Some(clamp(*count)),
                },
                Some(ParamCount::Range(min, max)) => ParamBounds {
                    min: clamp(*min),
                    max: Some(clamp(*max)),
                },
            },
        }
    }

    /// Help and version options print a message instead of producing a value.
    pub fn is_message(&self) -> bool {
        matches!(
            self.kind,
            OptionKind::Help { .. } | OptionKind::Version { .. }
        )
    }

    /// Reachable from the command line through a name, a positional
    /// binding, or a cluster letter.
    pub fn is_addressable(&self) -> bool {
        self.has_suppliable_name()
            || self.positional().is_some()
            || self.cluster.as_deref().is_some_and(|letters| !letters.is_empty())
    }
}
