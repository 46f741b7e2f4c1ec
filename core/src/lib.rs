//! Typed option schemas, requirement algebra and static validation.
//!
//! This crate defines the data model shared by command-line parsers and help
//! formatters:
//!
//! - [`OptionDef`]: one option, a kind tag with kind-specific data
//!   ([`OptionKind`]) plus names, sources, requirements and display metadata.
//! - [`Schema`]: an ordered key → option map for one command level.
//!   Command options nest further schemas ([`NestedSchema`]).
//! - [`Requirement`]: a boolean expression over the options of a schema,
//!   walked through [`RequirementVisitor`] and evaluated at runtime with
//!   [`Requirement::evaluate`].
//!
//! [`validate`] rejects malformed schemas before any parsing happens and
//! returns naming-style warnings in a [`ValidationReport`].
//!
//! # Example
//!
//! ```
//! use option_schema_core::*;
//!
//! let schema = Schema::new()
//!     .with_option("help", OptionDef::help().with_names(["-h", "--help"]))
//!     .with_option(
//!         "output",
//!         OptionDef::single()
//!             .with_names(["-o", "--output"])
//!             .with_param_name("file"),
//!     )
//!     .with_option(
//!         "format",
//!         OptionDef::single()
//!             .with_names(["-f", "--format"])
//!             .with_choices(["json", "yaml"])
//!             .with_requires("output"),
//!     );
//!
//! let report = validate(&schema, &ValidationFlags::default()).unwrap();
//! assert!(report.is_clean());
//!
//! let format = schema.get("format").unwrap();
//! let mut values = ValueSet::new();
//! assert!(!format.requires.as_ref().unwrap().evaluate(&values));
//! values.insert("output".into(), Value::from("out.json"));
//! assert!(format.requires.as_ref().unwrap().evaluate(&values));
//! ```

mod error;
mod requirement;
mod schema;
mod types;
mod validate;
mod values;

pub use error::{ConventionCategory, ErrorKind, NameSlot, SchemaError, Warning, WarningKind};
pub use requirement::{RequiredValue, Requirement, RequirementCallback, RequirementVisitor};
pub use schema::Schema;
pub use types::*;
pub use validate::{
    DEFAULT_SIMILARITY, MAX_NESTING_DEPTH, ValidationFlags, ValidationReport, validate,
};
pub use values::{Value, ValueSet, format_number, normalize_array_sequence};
