//! Parameter templates shared by usage statements and help entries.

use option_schema_core::{InlinePolicy, OptionDef, Value};
use option_schema_text::TerminalString;

use crate::config::HelpStyles;
use crate::phrase::{FormatArg, render_arg};

const DEFAULT_PARAM_NAME: &str = "param";

/// Renders the parameter template of `option`, or an empty buffer for
/// niladic options.
///
/// An example value takes the place of the `<name>` placeholder. Variadic
/// options get a trailing ellipsis and optional parameters are bracketed.
/// With an inline-required policy the template starts with `=` and fuses
/// with whatever precedes it.
pub(crate) fn param_template(option: &OptionDef, styles: &HelpStyles) -> TerminalString {
    let mut out = TerminalString::new();
    let Some(param) = option.param() else {
        return out;
    };
    let bounds = option.param_bounds();
    if bounds.is_niladic() {
        return out;
    }
    let style = option.styles.param.as_ref().unwrap_or(&styles.param);
    let optional = bounds.min == 0;
    let inline = option.inline_policy() == Some(InlinePolicy::Required);

    if inline {
        out.set_merge_first(true);
        out.open("=");
    }
    if optional {
        out.open("[");
    }
    match &param.example {
        Some(Value::Array(items)) => {
            for item in items {
                render_arg(&mut out, &FormatArg::value(item), styles);
            }
        }
        Some(example) => render_arg(&mut out, &FormatArg::value(example), styles),
        None => {
            let name = param.param_name.as_deref().unwrap_or(DEFAULT_PARAM_NAME);
            out.styled(style, &format!("<{name}>"));
        }
    }
    if bounds.is_variadic() {
        out.close("...");
    }
    if optional {
        out.close("]");
    }
    out
}

#[cfg(test)]
mod tests {
    use option_schema_core::{ArraySpec, ParamCount};

    use super::*;

    fn render(option: &OptionDef) -> String {
        param_template(option, &HelpStyles::plain()).wrap(None, true)
    }

    #[test]
    fn test_templates_per_kind() {
        assert_eq!(render(&OptionDef::flag()), "");
        assert_eq!(render(&OptionDef::single()), "<param>");
        assert_eq!(
            render(&OptionDef::single().with_param_name("file")),
            "<file>"
        );
        assert_eq!(
            render(&OptionDef::array(ArraySpec::default()).with_param_name("item")),
            "[<item>...]"
        );
        assert_eq!(
            render(&OptionDef::function(Some(ParamCount::Range(1, 3)))),
            "<param>..."
        );
        assert_eq!(
            render(&OptionDef::function(Some(ParamCount::Exact(0)))),
            ""
        );
    }

    #[test]
    fn test_example_replaces_name() {
        assert_eq!(
            render(&OptionDef::single().with_example("out.txt")),
            "'out.txt'"
        );
        assert_eq!(
            render(&OptionDef::array(ArraySpec::default()).with_example(vec![1, 2])),
            "[1 2...]"
        );
    }

    #[test]
    fn test_inline_template_fuses_with_name() {
        let option = OptionDef::single()
            .with_names(["--level"])
            .with_inline(InlinePolicy::Required);
        let mut names = TerminalString::new();
        names.word("--level");
        names.append(&param_template(&option, &HelpStyles::plain()));
        assert_eq!(names.wrap(None, true), "--level=<param>");
    }
}
