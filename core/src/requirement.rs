//! Requirement expressions.
//!
//! A [`Requirement`] is a closed boolean algebra over the options of one
//! schema. Expressions keep the structure they were authored with; nothing
//! is simplified. Consumers dispatch over the six shapes through
//! [`RequirementVisitor`], which the validator, the runtime evaluator and
//! the help formatter all share.

use std::fmt;
use std::ops;
use std::sync::Arc;

use crate::values::{Value, ValueSet};

/// Expected state of one target in a value-map requirement.
#[derive(Debug, Clone, PartialEq)]
pub enum RequiredValue {
    /// The target must not have a value.
    Absent,
    /// The target must have some value.
    Present,
    /// The target must have exactly this value.
    Equals(Value),
}

/// Opaque predicate over the full value set.
///
/// Only the runtime evaluator calls it. Validation skips it and help output
/// shows its label, if any.
#[derive(Clone)]
pub struct RequirementCallback {
    label: Option<String>,
    predicate: Arc<dyn Fn(&ValueSet) -> bool + Send + Sync>,
}

impl RequirementCallback {
    pub fn new(predicate: impl Fn(&ValueSet) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label: None,
            predicate: Arc::new(predicate),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn call(&self, values: &ValueSet) -> bool {
        (self.predicate)(values)
    }
}

impl fmt::Debug for RequirementCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequirementCallback")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A requirement expression.
///
/// # Examples
///
/// ```
/// use option_schema_core::*;
///
/// let needs_output = Requirement::all_of(["output".into(), !Requirement::from("dry_run")]);
///
/// let mut values = ValueSet::new();
/// values.insert("output".into(), Value::from("out.txt"));
/// assert!(needs_output.evaluate(&values));
///
/// values.insert("dry_run".into(), Value::from(true));
/// assert!(!needs_output.evaluate(&values));
/// ```
#[derive(Debug, Clone)]
pub enum Requirement {
    /// The referenced option has a value.
    Key(String),
    Not(Box<Requirement>),
    /// Every item holds; empty is true.
    AllOf(Vec<Requirement>),
    /// At least one item holds; empty is false.
    OneOf(Vec<Requirement>),
    /// Every target is in the expected state.
    Values(Vec<(String, RequiredValue)>),
    Callback(RequirementCallback),
}

impl Requirement {
    pub fn key(key: &str) -> Self {
        Self::Key(key.to_string())
    }

    pub fn all_of(items: impl IntoIterator<Item = Requirement>) -> Self {
        Self::AllOf(items.into_iter().collect())
    }

    pub fn one_of(items: impl IntoIterator<Item = Requirement>) -> Self {
        Self::OneOf(items.into_iter().collect())
    }

    /// Wraps `inner` in a negation. Double negations are kept as written.
    pub fn not(inner: Requirement) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn values<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, RequiredValue)>,
        S: Into<String>,
    {
        Self::Values(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    pub fn callback(callback: RequirementCallback) -> Self {
        Self::Callback(callback)
    }

    /// Dispatches to the visitor method matching this expression's shape.
    pub fn visit<V: RequirementVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Key(key) => visitor.visit_key(key),
            Self::Not(inner) => visitor.visit_not(inner),
            Self::AllOf(items) => visitor.visit_all_of(items),
            Self::OneOf(items) => visitor.visit_one_of(items),
            Self::Values(entries) => visitor.visit_values(entries),
            Self::Callback(callback) => visitor.visit_callback(callback),
        }
    }

    /// Evaluates the expression against parsed values.
    pub fn evaluate(&self, values: &ValueSet) -> bool {
        self.visit(&mut Evaluator { values })
    }
}

impl ops::Not for Requirement {
    type Output = Requirement;

    fn not(self) -> Requirement {
        Requirement::not(self)
    }
}

impl From<&str> for Requirement {
    fn from(key: &str) -> Self {
        Self::key(key)
    }
}

impl From<String> for Requirement {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

/// One handler per requirement shape.
///
/// Handlers receive the shape's payload and recurse through
/// [`Requirement::visit`] as they see fit.
pub trait RequirementVisitor {
    type Output;

    fn visit_key(&mut self, key: &str) -> Self::Output;
    fn visit_not(&mut self, inner: &Requirement) -> Self::Output;
    fn visit_all_of(&mut self, items: &[Requirement]) -> Self::Output;
    fn visit_one_of(&mut self, items: &[Requirement]) -> Self::Output;
    fn visit_values(&mut self, entries: &[(String, RequiredValue)]) -> Self::Output;
    fn visit_callback(&mut self, callback: &RequirementCallback) -> Self::Output;
}

struct Evaluator<'a> {
    values: &'a ValueSet,
}

impl RequirementVisitor for Evaluator<'_> {
    type Output = bool;

    fn visit_key(&mut self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn visit_not(&mut self, inner: &Requirement) -> bool {
        !inner.visit(self)
    }

    fn visit_all_of(&mut self, items: &[Requirement]) -> bool {
        items.iter().all(|item| item.visit(self))
    }

    fn visit_one_of(&mut self, items: &[Requirement]) -> bool {
        items.iter().any(|item| item.visit(self))
    }

    fn visit_values(&mut self, entries: &[(String, RequiredValue)]) -> bool {
        entries.iter().all(|(key, expected)| {
            let actual = self.values.get(key);
            match expected {
                RequiredValue::Absent => actual.is_none(),
                RequiredValue::Present => actual.is_some(),
                RequiredValue::Equals(value) => actual == Some(value),
            }
        })
    }

    fn visit_callback(&mut self, callback: &RequirementCallback) -> bool {
        callback.call(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(keys: &[&str]) -> ValueSet {
        keys.iter()
            .map(|key| (key.to_string(), Value::from(true)))
            .collect()
    }

    #[test]
    fn test_double_negation_is_identity() {
        let cases = [values(&[]), values(&["a"]), values(&["a", "b"])];
        let expr = Requirement::all_of(["a".into(), "b".into()]);
        let double = !!expr.clone();
        for set in &cases {
            assert_eq!(double.evaluate(set), expr.evaluate(set));
        }
        assert!(matches!(double, Requirement::Not(ref inner) if matches!(**inner, Requirement::Not(_))));
    }

    #[test]
    fn test_empty_lists() {
        let set = values(&["a"]);
        assert!(Requirement::all_of([]).evaluate(&set));
        assert!(!Requirement::one_of([]).evaluate(&set));
    }

    #[test]
    fn test_all_of_needs_both() {
        let expr = Requirement::all_of(["a".into(), "b".into()]);
        assert!(!expr.evaluate(&values(&["a"])));
        assert!(!expr.evaluate(&values(&["b"])));
        assert!(expr.evaluate(&values(&["a", "b"])));
    }

    #[test]
    fn test_one_of_needs_any() {
        let expr = Requirement::one_of(["a".into(), "b".into()]);
        assert!(!expr.evaluate(&values(&[])));
        assert!(expr.evaluate(&values(&["b"])));
    }

    #[test]
    fn test_value_map_sentinels_and_equality() {
        let expr = Requirement::values([
            ("mode", RequiredValue::Equals(Value::from("fast"))),
            ("quiet", RequiredValue::Absent),
            ("level", RequiredValue::Present),
        ]);
        let mut set = ValueSet::new();
        set.insert("mode".into(), Value::from("fast"));
        set.insert("level".into(), Value::from(3));
        assert!(expr.evaluate(&set));

        set.insert("quiet".into(), Value::from(true));
        assert!(!expr.evaluate(&set));

        set.remove("quiet");
        set.insert("mode".into(), Value::from("slow"));
        assert!(!expr.evaluate(&set));
    }

    #[test]
    fn test_callback_receives_value_set() {
        let callback = RequirementCallback::new(|values| values.len() == 2).with_label("two values");
        let expr = Requirement::callback(callback);
        assert!(expr.evaluate(&values(&["a", "b"])));
        assert!(!expr.evaluate(&values(&["a"])));
        let Requirement::Callback(callback) = &expr else {
            unreachable!()
        };
        assert_eq!(callback.label(), Some("two values"));
    }
}
