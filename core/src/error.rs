//! Fatal schema errors and validation warnings.
//!
//! Errors abort validation at the first occurrence. Warnings are collected
//! in discovery order and returned together.

use std::fmt;

use thiserror::Error;

use crate::types::ParamCount;

/// Which registry a duplicated or invalid identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameSlot {
    Name,
    ClusterLetter,
    EnvironmentVariable,
    Positional,
}

impl fmt::Display for NameSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "option name",
            Self::ClusterLetter => "cluster letter",
            Self::EnvironmentVariable => "environment variable",
            Self::Positional => "positional binding",
        })
    }
}

/// Fatal schema authoring errors.
///
/// Every variant names the offending option key. Keys of nested options are
/// prefixed with the command path, joined by dots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A display name contains `=`.
    #[error("option {key} has invalid name {name:?}")]
    InvalidName { key: String, name: String },
    #[error("option {key} has duplicate {slot} {name:?} (also used by {other})")]
    DuplicateName {
        key: String,
        other: String,
        slot: NameSlot,
        name: String,
    },
    #[error("option {key} has duplicate choice value {value:?}")]
    DuplicateChoiceValue { key: String, value: String },
    #[error("option {key} has invalid parameter count {count}")]
    InvalidParamCount { key: String, count: ParamCount },
    /// An inline-parameter constraint on an option without a name to attach
    /// the parameter to.
    #[error("option {key} has inline constraint but no name")]
    InvalidInlineConstraint { key: String },
    #[error("option {key} requires itself")]
    SelfReference { key: String },
    #[error("option {key} requires unknown option {target}")]
    UnknownRequiredOption { key: String, target: String },
    /// A requirement that targets a help or version option.
    #[error("option {key} requires invalid option {target}")]
    InvalidRequiredOption { key: String, target: String },
    /// A presence check against an option that always has a value.
    #[error("option {key} has invalid required value for option {target}")]
    InvalidRequiredValue { key: String, target: String },
    #[error("option {key} is unreachable: it has no names and no sources")]
    UnreachableOption { key: String },
    #[error("option {key} has too many values ({count}, limit {limit})")]
    LimitExceeded {
        key: String,
        count: usize,
        limit: usize,
    },
    #[error("option {key} nests commands deeper than {depth} levels")]
    NestingTooDeep { key: String, depth: usize },
}

/// Fieldless discriminant of [`SchemaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidName,
    DuplicateName,
    DuplicateChoiceValue,
    InvalidParamCount,
    InvalidInlineConstraint,
    SelfReference,
    UnknownRequiredOption,
    InvalidRequiredOption,
    InvalidRequiredValue,
    UnreachableOption,
    LimitExceeded,
    NestingTooDeep,
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::DuplicateName { .. } => ErrorKind::DuplicateName,
            Self::DuplicateChoiceValue { .. } => ErrorKind::DuplicateChoiceValue,
            Self::InvalidParamCount { .. } => ErrorKind::InvalidParamCount,
            Self::InvalidInlineConstraint { .. } => ErrorKind::InvalidInlineConstraint,
            Self::SelfReference { .. } => ErrorKind::SelfReference,
            Self::UnknownRequiredOption { .. } => ErrorKind::UnknownRequiredOption,
            Self::InvalidRequiredOption { .. } => ErrorKind::InvalidRequiredOption,
            Self::InvalidRequiredValue { .. } => ErrorKind::InvalidRequiredValue,
            Self::UnreachableOption { .. } => ErrorKind::UnreachableOption,
            Self::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Self::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
        }
    }

    /// The (possibly prefixed) key of the offending option.
    pub fn key(&self) -> &str {
        match self {
            Self::InvalidName { key, .. }
            | Self::DuplicateName { key, .. }
            | Self::DuplicateChoiceValue { key, .. }
            | Self::InvalidParamCount { key, .. }
            | Self::InvalidInlineConstraint { key }
            | Self::SelfReference { key }
            | Self::UnknownRequiredOption { key, .. }
            | Self::InvalidRequiredOption { key, .. }
            | Self::InvalidRequiredValue { key, .. }
            | Self::UnreachableOption { key }
            | Self::LimitExceeded { key, .. }
            | Self::NestingTooDeep { key, .. } => key,
        }
    }
}

/// Naming convention category checked per name slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConventionCategory {
    Case,
    Dash,
    Delimiter,
}

impl fmt::Display for ConventionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Case => "case",
            Self::Dash => "dash",
            Self::Delimiter => "delimiter",
        })
    }
}

/// Non-fatal authoring issues.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A cluster letter on an option that may consume several parameters.
    VariadicWithClusterLetter { key: String },
    /// Names within the similarity threshold of `name`.
    TooSimilarNames {
        scope: String,
        name: String,
        similar: Vec<String>,
    },
    /// Names in one slot follow more than one convention of a category.
    /// `conventions` maps each convention to one name using it.
    MixedNamingConvention {
        scope: String,
        slot: usize,
        category: ConventionCategory,
        conventions: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    VariadicWithClusterLetter,
    TooSimilarNames,
    MixedNamingConvention,
}

impl Warning {
    pub fn kind(&self) -> WarningKind {
        match self {
            Self::VariadicWithClusterLetter { .. } => WarningKind::VariadicWithClusterLetter,
            Self::TooSimilarNames { .. } => WarningKind::TooSimilarNames,
            Self::MixedNamingConvention { .. } => WarningKind::MixedNamingConvention,
        }
    }
}

fn scope_prefix(scope: &str) -> String {
    if scope.is_empty() {
        String::new()
    } else {
        format!("{scope}: ")
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VariadicWithClusterLetter { key } => write!(
                f,
                "variadic option {key} has cluster letters and may only appear last in a cluster"
            ),
            Self::TooSimilarNames {
                scope,
                name,
                similar,
            } => write!(
                f,
                "{}{name:?} has too similar option names: {}",
                scope_prefix(scope),
                similar.join(", ")
            ),
            Self::MixedNamingConvention {
                scope,
                slot,
                category,
                conventions,
            } => {
                let mixed: Vec<String> = conventions
                    .iter()
                    .map(|(convention, name)| format!("{convention} ({name})"))
                    .collect();
                write!(
                    f,
                    "{}name slot {slot} has mixed {category} conventions: {}",
                    scope_prefix(scope),
                    mixed.join(", ")
                )
            }
        }
    }
}
