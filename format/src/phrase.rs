//! Phrase interpolation.

use option_schema_core::{Value, format_number};
use option_schema_text::TerminalString;

use crate::config::HelpStyles;

/// An argument interpolated into a phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatArg {
    /// Free text, split into words.
    Text(String),
    /// A quoted string.
    Str(String),
    Number(NumberArg),
    Bool(bool),
    Regex(String),
    Url(String),
    /// An option name, marker or environment variable.
    Symbol(String),
    Value(ValueArg),
    /// Items joined with commas.
    List(Vec<FormatArg>),
    /// Already rendered text.
    Styled(TerminalString),
}

/// Wrapper that lets [`FormatArg`] stay `Eq` while carrying an `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberArg(pub f64);

impl Eq for NumberArg {}

/// Wrapper that lets [`FormatArg`] stay `Eq` while carrying a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueArg(pub Value);

impl Eq for ValueArg {}

impl FormatArg {
    pub fn number(number: f64) -> Self {
        Self::Number(NumberArg(number))
    }

    pub fn value(value: &Value) -> Self {
        Self::Value(ValueArg(value.clone()))
    }

    pub fn symbol(text: &str) -> Self {
        Self::Symbol(text.to_string())
    }
}

/// Appends `phrase` to `out`, replacing `#N` with `args[N]`.
///
/// `alternative` selects one branch of every `(a|b|…)` group; with `None`
/// the groups are kept literally. A placeholder without a matching argument
/// is kept literally too.
pub fn format_phrase(
    out: &mut TerminalString,
    phrase: &str,
    args: &[FormatArg],
    alternative: Option<usize>,
    styles: &HelpStyles,
) {
    let resolved = select_alternative(phrase, alternative);
    for word in resolved.split_whitespace() {
        let mut attach = false;
        for segment in segments(word) {
            if attach {
                out.set_merge(true);
            }
            match segment {
                Segment::Literal(text) => {
                    out.word(text);
                }
                Segment::Arg(index) => match args.get(index) {
                    Some(arg) => render_arg(out, arg, styles),
                    None => {
                        out.word(&format!("#{index}"));
                    }
                },
            }
            attach = true;
        }
    }
}

/// Appends one argument to `out`.
pub fn render_arg(out: &mut TerminalString, arg: &FormatArg, styles: &HelpStyles) {
    match arg {
        FormatArg::Text(text) => {
            out.split(text);
        }
        FormatArg::Str(text) => {
            out.styled(&styles.string, &format!("'{text}'"));
        }
        FormatArg::Number(NumberArg(number)) => {
            out.styled(&styles.number, &format_number(*number));
        }
        FormatArg::Bool(value) => {
            out.styled(&styles.boolean, &value.to_string());
        }
        FormatArg::Regex(pattern) => {
            out.styled(&styles.regex, &format!("/{pattern}/"));
        }
        FormatArg::Url(url) => {
            out.styled(&styles.url, url);
        }
        FormatArg::Symbol(text) => {
            out.styled(&styles.symbol, text);
        }
        FormatArg::Value(ValueArg(value)) => render_value(out, value, styles),
        FormatArg::List(items) => {
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.close(",");
                }
                render_arg(out, item, styles);
            }
        }
        FormatArg::Styled(text) => {
            out.append(text);
        }
    }
}

fn render_value(out: &mut TerminalString, value: &Value, styles: &HelpStyles) {
    match value {
        Value::Bool(value) => render_arg(out, &FormatArg::Bool(*value), styles),
        Value::Number(number) => render_arg(out, &FormatArg::number(*number), styles),
        Value::String(text) => render_arg(out, &FormatArg::Str(text.clone()), styles),
        Value::Array(items) => {
            out.open("[");
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.close(",");
                }
                render_value(out, item, styles);
            }
            out.close("]");
        }
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Arg(usize),
}

/// Splits a word into literal text and `#N` placeholders.
fn segments(word: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let bytes = word.as_bytes();
    let mut start = 0;
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'#' {
            let digits = bytes[index + 1..]
                .iter()
                .take_while(|byte| byte.is_ascii_digit())
                .count();
            if digits > 0 {
                if start < index {
                    segments.push(Segment::Literal(&word[start..index]));
                }
                let end = index + 1 + digits;
                match word[index + 1..end].parse() {
                    Ok(arg) => segments.push(Segment::Arg(arg)),
                    Err(_) => segments.push(Segment::Literal(&word[index..end])),
                }
                start = end;
                index = end;
                continue;
            }
        }
        index += 1;
    }
    if start < word.len() {
        segments.push(Segment::Literal(&word[start..]));
    }
    segments
}

/// Replaces every `(a|b|…)` group with its `alternative`-th branch.
///
/// Groups without a `|` and unbalanced parentheses are kept as written.
fn select_alternative(phrase: &str, alternative: Option<usize>) -> String {
    let Some(alternative) = alternative else {
        return phrase.to_string();
    };
    let mut out = String::with_capacity(phrase.len());
    let mut rest = phrase;
    while let Some(open) = rest.find('(') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(')') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let group = &after[..close];
        if group.contains('|') {
            out.push_str(group.split('|').nth(alternative).unwrap_or(""));
        } else {
            out.push('(');
            out.push_str(group);
            out.push(')');
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}
