//! Option reference tables.
//!
//! Every entry has three columns: names, parameter template and
//! description. Entries are built and measured in a first pass; the second
//! pass positions every entry using the widest cell of each column across
//! the whole section, so all entries line up.

use option_schema_core::{
    DefaultValue, OptionDef, OptionKind, ParamBounds, Positional, Schema, Separator,
};
use option_schema_text::{StyledMessage, TerminalString};
use tracing::debug;

use crate::config::{FormatFlags, FormatterConfig, HelpItem};
use crate::params::param_template;
use crate::phrase::{FormatArg, format_phrase};
use crate::requirements::format_requirement;
use crate::section::{Align, ColumnLayout, GroupLayout, GroupsSection, passes};

/// The cells of one entry before positioning.
struct Entry {
    /// One cell per name slot, or a single cell unless slot-aligned.
    names: Vec<TerminalString>,
    param: TerminalString,
    descr: TerminalString,
}

/// Column start offsets and widths shared by every entry of a section.
#[derive(Debug, Default)]
struct Columns {
    slot_starts: Vec<usize>,
    slot_widths: Vec<usize>,
    param_start: usize,
    param_width: usize,
    descr_start: usize,
}

/// Renders the option groups of `schema`.
pub(crate) fn format_groups(
    schema: &Schema,
    section: &GroupsSection,
    flags: &FormatFlags,
    config: &FormatterConfig,
) -> StyledMessage {
    let terms: Vec<String> = flags.filter.iter().map(|term| term.to_lowercase()).collect();
    let mut groups: Vec<(&str, Vec<(&str, &OptionDef)>)> = Vec::new();
    for (key, option) in schema.iter() {
        if option.hidden || !matches_filter(option, &terms) {
            continue;
        }
        let group = option.group.as_deref().unwrap_or("");
        if !passes(&section.filter, section.exclude, group) {
            continue;
        }
        match groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, members)) => members.push((key, option)),
            None => groups.push((group, vec![(key, option)])),
        }
    }

    let layout = &section.layout;
    let built: Vec<Vec<Entry>> = groups
        .iter()
        .map(|(_, members)| {
            members
                .iter()
                .map(|(_, option)| build_entry(option, schema, section, config))
                .collect()
        })
        .collect();
    let columns = measure(built.iter().flatten(), section);
    debug!(
        groups = groups.len(),
        entries = built.iter().map(Vec::len).sum::<usize>(),
        param_start = columns.param_start,
        descr_start = columns.descr_start,
        "formatting option groups"
    );

    let mut message = StyledMessage::new();
    for (index, ((group, _), entries)) in groups.iter().zip(built).enumerate() {
        if index > 0 {
            let mut gap = TerminalString::new();
            gap.break_lines(1);
            message.push(gap);
        }
        let heading = if group.is_empty() {
            section.title.as_deref()
        } else {
            Some(*group)
        };
        if let Some(heading) = heading {
            let mut text = TerminalString::new();
            text.push_style(&config.styles.heading)
                .split(heading)
                .pop_style()
                .break_lines(1);
            message.push(text);
        }
        for entry in entries {
            position_entry(&mut message, entry, &columns, layout);
        }
    }
    message
}

fn matches_filter(option: &OptionDef, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let mut haystack: Vec<String> = option
        .option_names()
        .into_iter()
        .chain(option.group.as_deref())
        .chain(option.synopsis.as_deref())
        .map(str::to_lowercase)
        .collect();
    haystack.extend(option.sources.iter().map(|source| source.to_lowercase()));
    terms
        .iter()
        .any(|term| haystack.iter().any(|text| text.contains(term.as_str())))
}

fn build_entry(
    option: &OptionDef,
    schema: &Schema,
    section: &GroupsSection,
    config: &FormatterConfig,
) -> Entry {
    let layout = &section.layout;
    let styles = &config.styles;
    let name_style = option.styles.names.as_ref().unwrap_or(&styles.symbol);

    let mut names = Vec::new();
    if !layout.names.hidden {
        if layout.names.align == Align::Slot {
            for (slot, name) in option.names.iter().enumerate() {
                let mut cell = TerminalString::new();
                if let Some(name) = name {
                    cell.styled(name_style, name);
                    if option.names[slot + 1..].iter().any(Option::is_some) {
                        cell.close(",");
                    }
                }
                names.push(cell);
            }
        } else {
            let mut cell = TerminalString::new();
            let present: Vec<&str> = option.display_names().collect();
            for (index, name) in present.iter().enumerate() {
                if index > 0 {
                    cell.close(",");
                }
                cell.styled(name_style, name);
            }
            names.push(cell);
        }
    }

    let mut param = TerminalString::new();
    if !layout.param.hidden {
        let template = param_template(option, styles);
        if layout.param.align == Align::Merge && !names.is_empty() {
            if let Some(last) = names.iter_mut().rev().find(|cell| !cell.is_empty()) {
                last.append(&template);
            } else if let Some(first) = names.first_mut() {
                first.append(&template);
            }
        } else {
            param = template;
        }
    }

    let mut descr = TerminalString::new();
    if !layout.descr.hidden {
        let style = option.styles.description.as_ref().unwrap_or(&styles.text);
        descr.push_style(style);
        for &item in &layout.items {
            describe(&mut descr, option, item, schema, config);
        }
        descr.pop_style();
        if layout.descr.align == Align::Merge {
            let target = if !param.is_empty() || layout.param.align != Align::Merge {
                Some(&mut param)
            } else {
                names.iter_mut().rev().find(|cell| !cell.is_empty())
            };
            if let Some(target) = target {
                target.append(&descr);
                descr = TerminalString::new();
            }
        }
    }

    Entry {
        names,
        param,
        descr,
    }
}

fn start_of(column: &ColumnLayout, end: usize) -> usize {
    if column.absolute {
        column.indent
    } else {
        end + column.indent
    }
}

/// First pass: column widths are the widest cell across every entry.
fn measure<'e>(entries: impl Iterator<Item = &'e Entry>, section: &GroupsSection) -> Columns {
    let layout = &section.layout;
    let mut columns = Columns::default();
    for entry in entries {
        if columns.slot_widths.len() < entry.names.len() {
            columns.slot_widths.resize(entry.names.len(), 0);
        }
        for (slot, cell) in entry.names.iter().enumerate() {
            columns.slot_widths[slot] = columns.slot_widths[slot].max(cell.max_line_width());
        }
        columns.param_width = columns.param_width.max(entry.param.max_line_width());
    }

    let mut end = 0;
    if !layout.names.hidden {
        let mut start = start_of(&layout.names, 0);
        for &width in &columns.slot_widths {
            columns.slot_starts.push(start);
            end = start + width;
            start = end + usize::from(width > 0);
        }
        if columns.slot_widths.is_empty() {
            end = start;
        }
    }
    columns.param_start = end;
    if !layout.param.hidden && layout.param.align != Align::Merge {
        columns.param_start = start_of(&layout.param, end);
        end = columns.param_start + columns.param_width;
    }
    columns.descr_start = start_of(&layout.descr, end);
    columns
}

/// Second pass: pushes the cells of one entry at their final offsets.
fn position_entry(
    message: &mut StyledMessage,
    entry: Entry,
    columns: &Columns,
    layout: &GroupLayout,
) {
    let right = |align: Align, start: usize, width: usize, cell: &TerminalString| {
        if align == Align::Right {
            start + width.saturating_sub(cell.max_line_width())
        } else {
            start
        }
    };
    let names_width = columns
        .slot_starts
        .last()
        .zip(columns.slot_widths.last())
        .map(|(start, width)| start + width)
        .unwrap_or(0)
        .saturating_sub(columns.slot_starts.first().copied().unwrap_or(0));

    for (slot, mut cell) in entry.names.into_iter().enumerate() {
        let start = columns.slot_starts[slot];
        let indent = if layout.names.align == Align::Slot {
            start
        } else {
            right(layout.names.align, start, names_width, &cell)
        };
        cell.set_indent(indent);
        message.push(cell);
    }

    let mut param = entry.param;
    param.set_indent(right(
        layout.param.align,
        columns.param_start,
        columns.param_width,
        &param,
    ));
    message.push(param);

    let mut descr = if layout.descr.align == Align::Right {
        entry.descr.right_aligned()
    } else {
        entry.descr
    };
    descr.set_indent(columns.descr_start);
    descr.break_lines(1);
    message.push(descr);
}

fn describe(
    out: &mut TerminalString,
    option: &OptionDef,
    item: HelpItem,
    schema: &Schema,
    config: &FormatterConfig,
) {
    let phrase = config.phrases.get(item);
    let styles = &config.styles;
    let mut emit = |args: &[FormatArg], alternative: Option<usize>| {
        format_phrase(out, phrase, args, alternative, styles);
    };
    let param = option.param();
    let array = match &option.kind {
        OptionKind::Array { array, .. } => Some(array),
        _ => None,
    };

    match item {
        HelpItem::Synopsis => {
            if let Some(synopsis) = &option.synopsis {
                emit(&[FormatArg::Text(synopsis.clone())], None);
            }
        }
        HelpItem::Cluster => {
            if let Some(letters) = option.cluster.as_deref().filter(|l| !l.is_empty()) {
                emit(&[FormatArg::Str(letters.to_string())], None);
            }
        }
        HelpItem::ParamCount => {
            let bounds = option.param_bounds();
            if bounds == ParamBounds::NONE || bounds == ParamBounds::ONE {
                return;
            }
            let count = |value: usize| FormatArg::number(value as f64);
            match (bounds.min, bounds.max) {
                (0, None) => emit(&[], Some(0)),
                (min, Some(max)) if min == max => emit(&[count(min)], Some(1)),
                (0, Some(max)) => emit(&[count(max)], Some(2)),
                (min, None) => emit(&[count(min)], Some(3)),
                (min, Some(max)) => emit(&[count(min), count(max)], Some(4)),
            }
        }
        HelpItem::Separator => match array.and_then(|array| array.separator.as_ref()) {
            Some(Separator::Text(text)) => emit(&[FormatArg::Str(text.clone())], Some(0)),
            Some(Separator::Pattern(regex)) => {
                emit(&[FormatArg::Regex(regex.as_str().to_string())], Some(1));
            }
            None => {}
        },
        HelpItem::Positional => match option.positional() {
            Some(Positional::Plain) => emit(&[], Some(0)),
            Some(Positional::Marker(marker)) => emit(&[FormatArg::symbol(marker)], Some(1)),
            None => {}
        },
        HelpItem::Append => {
            if array.is_some_and(|array| array.append) {
                emit(&[], None);
            }
        }
        HelpItem::Choices => {
            if let Some(param) = param.filter(|param| !param.choices.is_empty()) {
                let choices = param
                    .choices
                    .iter()
                    .map(|choice| FormatArg::Str(choice.clone()))
                    .collect();
                emit(&[FormatArg::List(choices)], None);
            }
        }
        HelpItem::Regex => {
            if let Some(regex) = param.and_then(|param| param.regex.as_ref()) {
                emit(&[FormatArg::Regex(regex.as_str().to_string())], None);
            }
        }
        HelpItem::Range => {
            if let Some(range) = param.and_then(|param| param.range) {
                emit(&[FormatArg::number(range.min), FormatArg::number(range.max)], None);
            }
        }
        HelpItem::Unique => {
            if array.is_some_and(|array| array.unique) {
                emit(&[], None);
            }
        }
        HelpItem::Limit => {
            if let Some(limit) = array.and_then(|array| array.limit).filter(|&limit| limit > 0) {
                emit(&[FormatArg::number(limit as f64)], None);
            }
        }
        HelpItem::Sources => {
            if !option.sources.is_empty() {
                let sources = option
                    .sources
                    .iter()
                    .map(|source| FormatArg::symbol(source))
                    .collect();
                let alternative = usize::from(option.sources.len() > 1);
                emit(&[FormatArg::List(sources)], Some(alternative));
            }
        }
        HelpItem::Stdin => {
            if option.stdin {
                emit(&[], None);
            }
        }
        HelpItem::Requires | HelpItem::RequiredIf => {
            let requirement = if item == HelpItem::Requires {
                &option.requires
            } else {
                &option.required_if
            };
            if let Some(requirement) = requirement {
                let text = format_requirement(requirement, schema, styles, &config.connectives);
                emit(&[FormatArg::Styled(text)], None);
            }
        }
        HelpItem::Required => {
            if option.required {
                emit(&[], None);
            }
        }
        HelpItem::Default => match &option.default {
            Some(DefaultValue::Value(value)) => emit(&[FormatArg::value(value)], None),
            Some(DefaultValue::Computed(callback)) => {
                let arg = match callback.label() {
                    Some(label) => FormatArg::Text(label.to_string()),
                    None => {
                        let mut placeholder = TerminalString::new();
                        placeholder.styled(&styles.value, &config.connectives.callback);
                        FormatArg::Styled(placeholder)
                    }
                };
                emit(&[arg], None);
            }
            None => {}
        },
        HelpItem::UseCommand | HelpItem::UseFilter => {
            if let OptionKind::Help {
                use_command,
                use_filter,
            } = option.kind
            {
                let enabled = if item == HelpItem::UseCommand {
                    use_command
                } else {
                    use_filter
                };
                if enabled {
                    emit(&[], None);
                }
            }
        }
        HelpItem::Deprecated => {
            if let Some(reason) = &option.deprecated {
                emit(&[FormatArg::Text(reason.clone())], None);
            }
        }
        HelpItem::Link => {
            if let Some(link) = &option.link {
                emit(&[FormatArg::Url(link.clone())], None);
            }
        }
    }
}
