//! Requirement expressions rendered as text.
//!
//! Negation is pushed down to the leaves: a negated all-of joins its items
//! with "or", a negated one-of with "and", a negated key reads "no -x" and a
//! negated callback "not <label>". A negated equality uses the not-equals
//! connective.

use option_schema_core::{
    RequiredValue, Requirement, RequirementCallback, RequirementVisitor, Schema,
};
use option_schema_text::TerminalString;

use crate::config::{Connectives, HelpStyles};
use crate::phrase::{FormatArg, render_arg};

/// Renders `requirement` into a fresh buffer, naming options by their
/// preferred name in `schema`.
///
/// # Examples
///
/// ```
/// use option_schema_core::*;
/// use option_schema_format::{Connectives, HelpStyles, format_requirement};
///
/// let schema = Schema::new()
///     .with_option("a", OptionDef::flag().with_names(["-a"]))
///     .with_option("b", OptionDef::flag().with_names(["-b"]));
/// let expr = !Requirement::all_of(["a".into(), "b".into()]);
/// let text = format_requirement(&expr, &schema, &HelpStyles::plain(), &Connectives::default());
/// assert_eq!(text.wrap(None, true), "no -a or no -b");
/// ```
pub fn format_requirement(
    requirement: &Requirement,
    schema: &Schema,
    styles: &HelpStyles,
    connectives: &Connectives,
) -> TerminalString {
    let mut renderer = RequirementRenderer {
        schema,
        styles,
        connectives,
        out: TerminalString::new(),
        negate: false,
        depth: 0,
    };
    requirement.visit(&mut renderer);
    renderer.out
}

struct RequirementRenderer<'a> {
    schema: &'a Schema,
    styles: &'a HelpStyles,
    connectives: &'a Connectives,
    out: TerminalString,
    negate: bool,
    depth: usize,
}

impl RequirementRenderer<'_> {
    fn name(&mut self, key: &str) {
        let name = self.schema.preferred_name(key).unwrap_or(key);
        render_arg(&mut self.out, &FormatArg::symbol(name), self.styles);
    }

    fn presence(&mut self, key: &str, negate: bool) {
        if negate {
            self.out.word(&self.connectives.no);
        }
        self.name(key);
    }

    /// Renders `count` items joined by `connective`, parenthesized when
    /// nested and holding more than one item.
    fn list(&mut self, count: usize, and: bool, mut item: impl FnMut(&mut Self, usize)) {
        let connective = if and != self.negate {
            self.connectives.and.clone()
        } else {
            self.connectives.or.clone()
        };
        let wrap = self.depth > 0 && count > 1;
        if wrap {
            self.out.open("(");
        }
        self.depth += 1;
        for index in 0..count {
            if index > 0 {
                self.out.word(&connective);
            }
            item(self, index);
        }
        self.depth -= 1;
        if wrap {
            self.out.close(")");
        }
    }
}

impl RequirementVisitor for RequirementRenderer<'_> {
    type Output = ();

    fn visit_key(&mut self, key: &str) {
        self.presence(key, self.negate);
    }

    fn visit_not(&mut self, inner: &Requirement) {
        self.negate = !self.negate;
        inner.visit(self);
        self.negate = !self.negate;
    }

    fn visit_all_of(&mut self, items: &[Requirement]) {
        self.list(items.len(), true, |this, index| items[index].visit(this));
    }

    fn visit_one_of(&mut self, items: &[Requirement]) {
        self.list(items.len(), false, |this, index| items[index].visit(this));
    }

    fn visit_values(&mut self, entries: &[(String, RequiredValue)]) {
        self.list(entries.len(), true, |this, index| {
            let (key, expected) = &entries[index];
            match expected {
                RequiredValue::Present => this.presence(key, this.negate),
                RequiredValue::Absent => this.presence(key, !this.negate),
                RequiredValue::Equals(value) => {
                    this.name(key);
                    let operator = if this.negate {
                        this.connectives.not_equals.clone()
                    } else {
                        this.connectives.equals.clone()
                    };
                    this.out.word(&operator);
                    render_arg(&mut this.out, &FormatArg::value(value), this.styles);
                }
            }
        });
    }

    fn visit_callback(&mut self, callback: &RequirementCallback) {
        if self.negate {
            self.out.word(&self.connectives.not);
        }
        match callback.label() {
            Some(label) => {
                self.out.split(label);
            }
            None => {
                self.out.styled(&self.styles.value, &self.connectives.callback);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use option_schema_core::{OptionDef, RequirementCallback, Value};

    use super::*;

    fn schema() -> Schema {
        Schema::new()
            .with_option("a", OptionDef::flag().with_names(["-a", "--all"]))
            .with_option("b", OptionDef::single().with_names(["-b"]))
            .with_option("c", OptionDef::single().with_source("C_VAR"))
    }

    fn render(requirement: &Requirement) -> String {
        format_requirement(
            requirement,
            &schema(),
            &HelpStyles::plain(),
            &Connectives::default(),
        )
        .wrap(None, true)
    }

    #[test]
    fn test_keys_use_preferred_names() {
        assert_eq!(render(&"a".into()), "-a");
        assert_eq!(render(&"c".into()), "C_VAR");
        assert_eq!(render(&!Requirement::key("b")), "no -b");
    }

    #[test]
    fn test_de_morgan() {
        let one = Requirement::one_of(["a".into(), "b".into()]);
        assert_eq!(render(&one), "-a or -b");
        assert_eq!(render(&!one), "no -a and no -b");
        let double = !!Requirement::key("a");
        assert_eq!(render(&double), "-a");
    }

    #[test]
    fn test_nested_lists_are_parenthesized() {
        let expr = Requirement::all_of([
            "a".into(),
            Requirement::one_of(["b".into(), "c".into()]),
            Requirement::one_of(["b".into()]),
        ]);
        assert_eq!(render(&expr), "-a and (-b or C_VAR) and -b");
    }

    #[test]
    fn test_value_map() {
        let expr = Requirement::values([
            ("b", RequiredValue::Equals(Value::from("x"))),
            ("a", RequiredValue::Absent),
        ]);
        assert_eq!(render(&expr), "-b == 'x' and no -a");
        assert_eq!(render(&!expr), "-b != 'x' or -a");
    }

    #[test]
    fn test_callbacks() {
        let unlabeled = Requirement::callback(RequirementCallback::new(|_| true));
        assert_eq!(render(&unlabeled), "<()>");
        let labeled =
            Requirement::callback(RequirementCallback::new(|_| true).with_label("a custom check"));
        assert_eq!(render(&!labeled), "not a custom check");
        assert_eq!(render(&!unlabeled), "not <()>");
    }
}
