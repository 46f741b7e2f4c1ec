//! Schema documents: the JSON/YAML form of a schema accepted by the CLI.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use option_schema_core::{
    ArraySpec, InlinePolicy, NestedSchema, NumericRange, OptionDef, OptionKind, ParamCount,
    ParamSpec, Positional, RequiredValue, Requirement, Schema, Separator, Value,
};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a schema document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `regex` or `separator` pattern does not compile.
    #[error("option {key} has invalid regular expression: {source}")]
    Regex { key: String, source: regex::Error },

    #[error("option key {key} is defined more than once")]
    DuplicateKey { key: String },

    #[error(
        "unsupported document extension for '{}' (expected .json, .yaml or .yml)",
        path.display()
    )]
    UnsupportedExtension { path: PathBuf },
}

/// Top level of a schema document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Program name printed at the start of the usage statement.
    #[serde(default)]
    pub program: Option<String>,
    /// Introductory text printed before the usage section.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionDocument>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindDocument {
    #[default]
    Flag,
    Single,
    Array,
    Function,
    Command,
    Help,
    Version,
}

/// `true` for a plain positional binding, or the marker string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PositionalDocument {
    Plain(bool),
    Marker(String),
}

/// A literal separator, or `{ regex: pattern }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeparatorDocument {
    Text(String),
    Pattern { regex: String },
}

/// An exact count, or a `[min, max]` pair.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum CountDocument {
    Exact(i64),
    Range([i64; 2]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelDocument {
    Present,
    Absent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RequiredValueDocument {
    Sentinel(SentinelDocument),
    Equals { equals: Value },
}

/// A requirement expression: a bare option key, or one of the
/// single-field objects `not`, `all`, `one` and `values`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RequirementDocument {
    Key(String),
    Not {
        not: Box<RequirementDocument>,
    },
    All {
        all: Vec<RequirementDocument>,
    },
    One {
        one: Vec<RequirementDocument>,
    },
    Values {
        values: BTreeMap<String, RequiredValueDocument>,
    },
}

impl From<RequirementDocument> for Requirement {
    fn from(doc: RequirementDocument) -> Self {
        match doc {
            RequirementDocument::Key(key) => Requirement::Key(key),
            RequirementDocument::Not { not } => Requirement::not((*not).into()),
            RequirementDocument::All { all } => Requirement::all_of(all.into_iter().map(Into::into)),
            RequirementDocument::One { one } => Requirement::one_of(one.into_iter().map(Into::into)),
            RequirementDocument::Values { values } => {
                Requirement::values(values.into_iter().map(|(key, value)| {
                    let value = match value {
                        RequiredValueDocument::Sentinel(SentinelDocument::Present) => {
                            RequiredValue::Present
                        }
                        RequiredValueDocument::Sentinel(SentinelDocument::Absent) => {
                            RequiredValue::Absent
                        }
                        RequiredValueDocument::Equals { equals } => RequiredValue::Equals(equals),
                    };
                    (key, value)
                }))
            }
        }
    }
}

/// One option of a schema document. Fields that do not apply to the
/// option's kind are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionDocument {
    pub key: String,
    pub kind: KindDocument,
    /// Display names; `null` reserves a name slot.
    pub names: Vec<Option<String>>,
    pub cluster: Option<String>,
    /// Environment variables read when the option is not supplied.
    pub sources: Vec<String>,
    pub stdin: bool,
    pub required: bool,
    pub requires: Option<RequirementDocument>,
    pub required_if: Option<RequirementDocument>,
    pub default: Option<Value>,
    pub group: Option<String>,
    pub hidden: bool,
    pub synopsis: Option<String>,
    pub deprecated: Option<String>,
    pub link: Option<String>,

    pub positional: Option<PositionalDocument>,
    pub param_name: Option<String>,
    pub example: Option<Value>,
    pub inline: Option<bool>,
    pub choices: Vec<String>,
    pub regex: Option<String>,
    pub range: Option<[f64; 2]>,

    pub separator: Option<SeparatorDocument>,
    pub unique: bool,
    pub append: bool,
    pub limit: Option<usize>,

    pub count: Option<CountDocument>,
    pub use_command: bool,
    pub use_filter: bool,
    pub version: Option<String>,
    /// Options of the nested command.
    pub options: Option<Vec<OptionDocument>>,
}

impl SchemaDocument {
    /// Reads a document, choosing the parser by file extension.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let raw = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(serde_json::from_str(&raw)?),
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&raw)?),
            _ => Err(DocumentError::UnsupportedExtension {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn to_schema(&self) -> Result<Schema, DocumentError> {
        build_schema(&self.options, "")
    }
}

fn build_schema(options: &[OptionDocument], prefix: &str) -> Result<Schema, DocumentError> {
    let mut schema = Schema::new();
    let mut seen = HashSet::new();
    for doc in options {
        let key = format!("{prefix}{}", doc.key);
        if !seen.insert(doc.key.as_str()) {
            return Err(DocumentError::DuplicateKey { key });
        }
        schema.insert(&doc.key, doc.to_option(&key)?);
    }
    Ok(schema)
}

impl OptionDocument {
    /// Converts the document into an option; `path` is the dotted key used
    /// in error messages.
    fn to_option(&self, path: &str) -> Result<OptionDef, DocumentError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| DocumentError::Regex {
                key: path.to_string(),
                source,
            })
        };

        let kind = match self.kind {
            KindDocument::Flag => OptionKind::Flag,
            KindDocument::Single => OptionKind::Single {
                param: self.param_spec(&compile)?,
            },
            KindDocument::Array => {
                let separator = match &self.separator {
                    Some(SeparatorDocument::Text(text)) => Some(Separator::Text(text.clone())),
                    Some(SeparatorDocument::Pattern { regex }) => {
                        Some(Separator::Pattern(compile(regex.as_str())?))
                    }
                    None => None,
                };
                OptionKind::Array {
                    param: self.param_spec(&compile)?,
                    array: ArraySpec {
                        separator,
                        unique: self.unique,
                        append: self.append,
                        limit: self.limit,
                    },
                }
            }
            KindDocument::Function => OptionKind::Function {
                param: self.param_spec(&compile)?,
                count: self.count.map(|count| match count {
                    CountDocument::Exact(count) => ParamCount::Exact(count),
                    CountDocument::Range([min, max]) => ParamCount::Range(min, max),
                }),
            },
            KindDocument::Command => {
                let nested = match &self.options {
                    Some(options) => {
                        let prefix = format!("{path}.");
                        Some(NestedSchema::Eager(Arc::new(build_schema(options, &prefix)?)))
                    }
                    None => None,
                };
                OptionKind::Command { nested }
            }
            KindDocument::Help => OptionKind::Help {
                use_command: self.use_command,
                use_filter: self.use_filter,
            },
            KindDocument::Version => OptionKind::Version {
                version: self.version.clone(),
            },
        };

        let mut option = OptionDef::new(kind);
        option.names = self.names.clone();
        option.cluster = self.cluster.clone();
        option.sources = self.sources.clone();
        option.stdin = self.stdin;
        option.required = self.required;
        option.requires = self.requires.clone().map(Into::into);
        option.required_if = self.required_if.clone().map(Into::into);
        option.group = self.group.clone();
        option.hidden = self.hidden;
        option.synopsis = self.synopsis.clone();
        option.deprecated = self.deprecated.clone();
        option.link = self.link.clone();
        if let Some(default) = &self.default {
            option = option.with_default(default.clone());
        }
        Ok(option)
    }

    fn param_spec(
        &self,
        compile: &impl Fn(&str) -> Result<Regex, DocumentError>,
    ) -> Result<ParamSpec, DocumentError> {
        let positional = match &self.positional {
            Some(PositionalDocument::Plain(true)) => Some(Positional::Plain),
            Some(PositionalDocument::Marker(marker)) => Some(Positional::Marker(marker.clone())),
            Some(PositionalDocument::Plain(false)) | None => None,
        };
        let inline = self.inline.map(|required| {
            if required {
                InlinePolicy::Required
            } else {
                InlinePolicy::Disallowed
            }
        });
        Ok(ParamSpec {
            positional,
            param_name: self.param_name.clone(),
            example: self.example.clone(),
            inline,
            choices: self.choices.clone(),
            regex: self.regex.as_deref().map(compile).transpose()?,
            range: self.range.map(|[min, max]| NumericRange { min, max }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_json(raw: &str) -> SchemaDocument {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_options_keep_document_order() {
        let doc = parse_json(
            r#"{"options": [
                {"key": "zeta", "names": ["-z"]},
                {"key": "alpha", "kind": "single", "names": ["-a", null, "--alpha"]}
            ]}"#,
        );
        let schema = doc.to_schema().unwrap();
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        let alpha = schema.get("alpha").unwrap();
        assert_eq!(
            alpha.names,
            vec![Some("-a".to_string()), None, Some("--alpha".to_string())]
        );
        assert!(matches!(alpha.kind, OptionKind::Single { .. }));
    }

    #[test]
    fn test_requirement_forms() {
        let doc = parse_json(
            r#"{"options": [{"key": "a", "requires": {"all": [
                "b",
                {"not": "c"},
                {"one": ["d", "e"]},
                {"values": {"f": "present", "g": "absent", "h": {"equals": 3}}}
            ]}}]}"#,
        );
        let schema = doc.to_schema().unwrap();
        let Some(Requirement::AllOf(items)) = &schema.get("a").unwrap().requires else {
            panic!("expected all-of");
        };
        assert!(matches!(&items[0], Requirement::Key(key) if key == "b"));
        assert!(matches!(&items[1], Requirement::Not(inner) if matches!(**inner, Requirement::Key(_))));
        assert!(matches!(&items[2], Requirement::OneOf(inner) if inner.len() == 2));
        let Requirement::Values(entries) = &items[3] else {
            panic!("expected value map");
        };
        assert_eq!(entries[0], ("f".to_string(), RequiredValue::Present));
        assert_eq!(entries[1], ("g".to_string(), RequiredValue::Absent));
        assert_eq!(
            entries[2],
            ("h".to_string(), RequiredValue::Equals(Value::from(3)))
        );
    }

    #[test]
    fn test_nested_commands_and_parameters() {
        let doc: SchemaDocument = serde_yaml::from_str(
            r#"
options:
  - key: list
    kind: array
    names: [-l]
    separator: { regex: "[,;]" }
    positional: "--"
    unique: true
  - key: run
    kind: command
    names: [run]
    options:
      - key: count
        kind: function
        names: [-c]
        count: [1, 2]
"#,
        )
        .unwrap();
        let schema = doc.to_schema().unwrap();
        let OptionKind::Array { param, array } = &schema.get("list").unwrap().kind else {
            panic!("expected array");
        };
        assert_eq!(param.positional, Some(Positional::Marker("--".into())));
        assert!(array.unique);
        assert!(matches!(&array.separator, Some(Separator::Pattern(regex)) if regex.as_str() == "[,;]"));

        let OptionKind::Command { nested: Some(nested) } = &schema.get("run").unwrap().kind else {
            panic!("expected nested command");
        };
        let nested = nested.resolve().unwrap();
        let OptionKind::Function { count, .. } = &nested.get("count").unwrap().kind else {
            panic!("expected function");
        };
        assert_eq!(*count, Some(ParamCount::Range(1, 2)));
    }

    #[test]
    fn test_invalid_regex_names_nested_key() {
        let doc = parse_json(
            r#"{"options": [{"key": "run", "kind": "command", "options": [
                {"key": "pattern", "kind": "single", "regex": "("}
            ]}]}"#,
        );
        let err = doc.to_schema().unwrap_err();
        assert!(matches!(&err, DocumentError::Regex { key, .. } if key == "run.pattern"));
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let doc = parse_json(r#"{"options": [{"key": "a"}, {"key": "a"}]}"#);
        assert!(matches!(
            doc.to_schema(),
            Err(DocumentError::DuplicateKey { key }) if key == "a"
        ));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<SchemaDocument, _> =
            serde_json::from_str(r#"{"options": [{"key": "a", "nmaes": ["-a"]}]}"#);
        assert!(result.is_err());
    }
}
