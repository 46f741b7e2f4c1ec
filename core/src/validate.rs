//! Static schema validation.
//!
//! Catches authoring errors before any command line is parsed: duplicate
//! names, letters and environment variables, broken constraints, dangling
//! or self-referencing requirements and unreachable options. Errors abort
//! the pass at the first occurrence. Naming-style issues are collected as
//! warnings.
//!
//! # Examples
//!
//! ```
//! use option_schema_core::*;
//!
//! let schema = Schema::new()
//!     .with_option("flag", OptionDef::flag().with_names(["-f"]))
//!     .with_option("single", OptionDef::single().with_names(["-s"]).with_requires("flag"));
//! let report = validate(&schema, &ValidationFlags::default()).unwrap();
//! assert!(report.warnings.is_empty());
//!
//! let bad = Schema::new()
//!     .with_option("a", OptionDef::flag().with_names(["-x"]))
//!     .with_option("b", OptionDef::flag().with_names(["-x"]));
//! let err = validate(&bad, &ValidationFlags::default()).unwrap_err();
//! assert!(matches!(err, SchemaError::DuplicateName { ref key, ref other, .. } if key == "b" && other == "a"));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConventionCategory, NameSlot, SchemaError, Warning};
use crate::requirement::{RequiredValue, Requirement, RequirementCallback, RequirementVisitor};
use crate::schema::Schema;
use crate::types::{DefaultValue, OptionDef, OptionKind, Positional};
use crate::values::normalize_array_sequence;

/// Default similarity threshold for near-duplicate name warnings.
pub const DEFAULT_SIMILARITY: f64 = 0.8;

/// Deepest chain of nested commands followed before giving up.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Validation switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationFlags {
    pub no_warnings: bool,
    /// Do not descend into nested command schemas.
    pub no_recurse: bool,
    /// Minimum normalized similarity for two names to be reported; `0`
    /// disables the check.
    pub similarity: f64,
}

impl Default for ValidationFlags {
    fn default() -> Self {
        Self {
            no_warnings: false,
            no_recurse: false,
            similarity: DEFAULT_SIMILARITY,
        }
    }
}

/// Warnings collected by a successful [`validate`] call, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validates `schema` and, unless disabled, every nested command schema.
///
/// Nested schemas already visited in this pass are skipped, so a command
/// that nests its own schema is validated once.
pub fn validate(schema: &Schema, flags: &ValidationFlags) -> Result<ValidationReport, SchemaError> {
    let mut validator = Validator {
        flags,
        visited: HashSet::new(),
        resolved: Vec::new(),
        warnings: Vec::new(),
    };
    validator.visited.insert(identity(schema));
    validator.validate_level(schema, "", 0)?;
    Ok(ValidationReport {
        warnings: validator.warnings,
    })
}

fn identity(schema: &Schema) -> usize {
    std::ptr::from_ref(schema) as usize
}

struct Validator<'f> {
    flags: &'f ValidationFlags,
    visited: HashSet<usize>,
    /// Keeps resolved nested schemas alive so their addresses stay unique.
    resolved: Vec<Arc<Schema>>,
    warnings: Vec<Warning>,
}

impl Validator<'_> {
    fn validate_level(
        &mut self,
        schema: &Schema,
        prefix: &str,
        depth: usize,
    ) -> Result<(), SchemaError> {
        debug!(scope = prefix, options = schema.len(), depth, "validating schema level");
        register_names(schema, prefix)?;

        for (key, option) in schema.iter() {
            let full_key = format!("{prefix}{key}");
            self.check_constraints(&full_key, option)?;

            for requirement in [&option.requires, &option.required_if].into_iter().flatten() {
                requirement.visit(&mut RequirementChecker {
                    schema,
                    key,
                    full_key: &full_key,
                })?;
            }

            if let OptionKind::Command {
                nested: Some(nested),
            } = &option.kind
            {
                if !self.flags.no_recurse {
                    self.descend(&full_key, nested.resolve(), depth)?;
                }
            }

            if !option.is_addressable() && option.sources.is_empty() && !option.stdin {
                return Err(SchemaError::UnreachableOption { key: full_key });
            }
        }

        if !self.flags.no_warnings {
            let scope = prefix.trim_end_matches('.');
            if self.flags.similarity > 0.0 {
                self.check_similar_names(schema, scope);
            }
            self.check_naming_conventions(schema, scope);
        }
        Ok(())
    }

    fn descend(
        &mut self,
        full_key: &str,
        nested: Option<Arc<Schema>>,
        depth: usize,
    ) -> Result<(), SchemaError> {
        let Some(nested) = nested else {
            debug!(key = full_key, "nested schema not resolved, skipping");
            return Ok(());
        };
        if !self.visited.insert(identity(&nested)) {
            debug!(key = full_key, "nested schema already visited");
            return Ok(());
        }
        if depth + 1 > MAX_NESTING_DEPTH {
            return Err(SchemaError::NestingTooDeep {
                key: full_key.to_string(),
                depth: MAX_NESTING_DEPTH,
            });
        }
        self.resolved.push(Arc::clone(&nested));
        self.validate_level(&nested, &format!("{full_key}."), depth + 1)
    }

    fn check_constraints(&mut self, full_key: &str, option: &OptionDef) -> Result<(), SchemaError> {
        if let Some(param) = option.param() {
            let mut seen = HashSet::new();
            for choice in &param.choices {
                if !seen.insert(choice.as_str()) {
                    return Err(SchemaError::DuplicateChoiceValue {
                        key: full_key.to_string(),
                        value: choice.clone(),
                    });
                }
            }
            if param.inline.is_some() && !option.has_suppliable_name() {
                return Err(SchemaError::InvalidInlineConstraint {
                    key: full_key.to_string(),
                });
            }
        }

        if let OptionKind::Function {
            count: Some(count), ..
        } = &option.kind
        {
            if !count.is_valid() {
                return Err(SchemaError::InvalidParamCount {
                    key: full_key.to_string(),
                    count: *count,
                });
            }
        }

        let has_letters = option.cluster.as_deref().is_some_and(|letters| !letters.is_empty());
        if has_letters && option.param_bounds().is_variadic() && !self.flags.no_warnings {
            self.warnings.push(Warning::VariadicWithClusterLetter {
                key: full_key.to_string(),
            });
        }

        if let OptionKind::Array { param, .. } = &option.kind {
            if let Some(example) = &param.example {
                normalize_array_sequence(full_key, option, example.clone())?;
            }
            if let Some(DefaultValue::Value(default)) = &option.default {
                normalize_array_sequence(full_key, option, default.clone())?;
            }
        }
        Ok(())
    }

    fn check_similar_names(&mut self, schema: &Schema, scope: &str) {
        let names: Vec<&str> = schema
            .iter()
            .flat_map(|(_, option)| option.display_names())
            .collect();
        let normalized: Vec<String> = names.iter().map(|name| normalize_name(name)).collect();
        let mut clustered = vec![false; names.len()];

        for i in 0..names.len() {
            if clustered[i] {
                continue;
            }
            let similar: Vec<usize> = (0..names.len())
                .filter(|&j| j != i && !clustered[j] && names[j] != names[i])
                .filter(|&j| {
                    strsim::normalized_damerau_levenshtein(&normalized[i], &normalized[j])
                        >= self.flags.similarity
                })
                .collect();
            if similar.is_empty() {
                continue;
            }
            clustered[i] = true;
            for &j in &similar {
                clustered[j] = true;
            }
            self.warnings.push(Warning::TooSimilarNames {
                scope: scope.to_string(),
                name: names[i].to_string(),
                similar: similar.iter().map(|&j| names[j].to_string()).collect(),
            });
        }
    }

    fn check_naming_conventions(&mut self, schema: &Schema, scope: &str) {
        let slots = schema
            .iter()
            .map(|(_, option)| option.names.len())
            .max()
            .unwrap_or(0);
        for slot in 0..slots {
            let names: Vec<&str> = schema
                .iter()
                .filter_map(|(_, option)| option.names.get(slot)?.as_deref())
                .collect();
            for category in [
                ConventionCategory::Case,
                ConventionCategory::Dash,
                ConventionCategory::Delimiter,
            ] {
                let mut conventions: Vec<(String, String)> = Vec::new();
                for name in &names {
                    for convention in conventions_of(category, name) {
                        if !conventions.iter().any(|(seen, _)| seen == convention) {
                            conventions.push((convention.to_string(), name.to_string()));
                        }
                    }
                }
                if conventions.len() > 1 {
                    self.warnings.push(Warning::MixedNamingConvention {
                        scope: scope.to_string(),
                        slot,
                        category,
                        conventions,
                    });
                }
            }
        }
    }
}

/// Registers names, cluster letters, environment variables and the
/// positional binding of one level, failing on the first collision.
fn register_names(schema: &Schema, prefix: &str) -> Result<(), SchemaError> {
    let mut names: HashMap<&str, &str> = HashMap::new();
    let mut letters: HashMap<char, &str> = HashMap::new();
    let mut variables: HashMap<&str, &str> = HashMap::new();
    let mut positional: Option<&str> = None;

    let duplicate = |key: &str, other: &str, slot: NameSlot, name: String| {
        SchemaError::DuplicateName {
            key: format!("{prefix}{key}"),
            other: format!("{prefix}{other}"),
            slot,
            name,
        }
    };

    for (key, option) in schema.iter() {
        for name in option.option_names() {
            if name.contains('=') {
                return Err(SchemaError::InvalidName {
                    key: format!("{prefix}{key}"),
                    name: name.to_string(),
                });
            }
            if let Some(other) = names.insert(name, key) {
                return Err(duplicate(key, other, NameSlot::Name, name.to_string()));
            }
        }
        for letter in option.cluster.iter().flat_map(|letters| letters.chars()) {
            if let Some(other) = letters.insert(letter, key) {
                return Err(duplicate(key, other, NameSlot::ClusterLetter, letter.to_string()));
            }
        }
        for variable in &option.sources {
            if let Some(other) = variables.insert(variable, key) {
                return Err(duplicate(
                    key,
                    other,
                    NameSlot::EnvironmentVariable,
                    variable.clone(),
                ));
            }
        }
        if let Some(binding) = option.positional() {
            if let Some(other) = positional.replace(key) {
                let name = match binding {
                    Positional::Plain => String::new(),
                    Positional::Marker(marker) => marker.clone(),
                };
                return Err(duplicate(key, other, NameSlot::Positional, name));
            }
        }
    }
    Ok(())
}

struct RequirementChecker<'a> {
    schema: &'a Schema,
    key: &'a str,
    full_key: &'a str,
}

impl RequirementChecker<'_> {
    fn check_target(&self, target: &str) -> Result<&OptionDef, SchemaError> {
        if target == self.key {
            return Err(SchemaError::SelfReference {
                key: self.full_key.to_string(),
            });
        }
        let Some(option) = self.schema.get(target) else {
            return Err(SchemaError::UnknownRequiredOption {
                key: self.full_key.to_string(),
                target: target.to_string(),
            });
        };
        if option.is_message() {
            return Err(SchemaError::InvalidRequiredOption {
                key: self.full_key.to_string(),
                target: target.to_string(),
            });
        }
        Ok(option)
    }
}

impl RequirementVisitor for RequirementChecker<'_> {
    type Output = Result<(), SchemaError>;

    fn visit_key(&mut self, key: &str) -> Self::Output {
        self.check_target(key).map(|_| ())
    }

    fn visit_not(&mut self, inner: &Requirement) -> Self::Output {
        inner.visit(self)
    }

    fn visit_all_of(&mut self, items: &[Requirement]) -> Self::Output {
        items.iter().try_for_each(|item| item.visit(self))
    }

    fn visit_one_of(&mut self, items: &[Requirement]) -> Self::Output {
        items.iter().try_for_each(|item| item.visit(self))
    }

    fn visit_values(&mut self, entries: &[(String, RequiredValue)]) -> Self::Output {
        for (target, expected) in entries {
            let option = self.check_target(target)?;
            let sentinel = matches!(expected, RequiredValue::Absent | RequiredValue::Present);
            if sentinel && (option.required || option.default.is_some()) {
                return Err(SchemaError::InvalidRequiredValue {
                    key: self.full_key.to_string(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }

    fn visit_callback(&mut self, _callback: &RequirementCallback) -> Self::Output {
        Ok(())
    }
}

fn normalize_name(name: &str) -> String {
    name.trim_start_matches('-').to_lowercase()
}

fn conventions_of(category: ConventionCategory, name: &str) -> Vec<&'static str> {
    let bare = name.trim_start_matches('-');
    let mut matched = Vec::new();
    match category {
        ConventionCategory::Case => {
            let letters: Vec<char> = bare.chars().filter(|c| c.is_alphabetic()).collect();
            if letters.is_empty() {
                return matched;
            }
            if letters.iter().all(|c| c.is_lowercase()) {
                matched.push("lowercase");
            } else if letters.iter().all(|c| c.is_uppercase()) {
                matched.push("UPPERCASE");
            } else if letters[0].is_uppercase() {
                matched.push("Capitalized");
            }
        }
        ConventionCategory::Dash => {
            if name.starts_with("--") {
                matched.push("double-dash");
            } else if name.starts_with('-') {
                matched.push("single-dash");
            } else {
                matched.push("no-dash");
            }
        }
        ConventionCategory::Delimiter => {
            if bare.contains('-') {
                matched.push("kebab-case");
            }
            if bare.contains('_') {
                matched.push("snake_case");
            }
            if bare.contains(':') {
                matched.push("colon:case");
            }
        }
    }
    matched
}
