//! Help sections.

use crate::config::HelpItem;

/// One block of a help message. Sections render in order, separated by a
/// blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpSection {
    Text(TextSection),
    Usage(UsageSection),
    Groups(GroupsSection),
}

impl HelpSection {
    /// A usage section headed "Usage:".
    pub fn usage() -> Self {
        Self::Usage(UsageSection {
            heading: Some("Usage:".into()),
            indent: 2,
            ..Default::default()
        })
    }

    /// A groups section listing ungrouped options under "Options:".
    pub fn groups() -> Self {
        Self::Groups(GroupsSection {
            title: Some("Options:".into()),
            ..Default::default()
        })
    }

    pub fn text(text: &str) -> Self {
        Self::Text(TextSection {
            text: text.to_string(),
            ..Default::default()
        })
    }
}

/// Static text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSection {
    pub heading: Option<String>,
    pub text: String,
    pub indent: usize,
}

/// A synthesized invocation synopsis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageSection {
    pub heading: Option<String>,
    pub indent: usize,
    /// Option keys to include, or to exclude when `exclude` is set. Empty
    /// means every option.
    pub filter: Vec<String>,
    pub exclude: bool,
    /// Keys rendered as required in this statement even if the options
    /// themselves are not.
    pub required: Vec<String>,
}

/// An option reference table, one block per option group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupsSection {
    /// Heading of the block of options without a group. Named groups are
    /// headed by their name.
    pub title: Option<String>,
    /// Group names to include, or to exclude when `exclude` is set. The
    /// empty string stands for the default group.
    pub filter: Vec<String>,
    pub exclude: bool,
    pub layout: GroupLayout,
}

/// How a column's entries line up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Right,
    /// Names only: every name slot gets its own sub-column.
    Slot,
    /// The column continues the previous visible column.
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub align: Align,
    /// Gap before the column, or its start column when `absolute` is set.
    pub indent: usize,
    pub absolute: bool,
    pub hidden: bool,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            align: Align::Left,
            indent: 2,
            absolute: false,
            hidden: false,
        }
    }
}

/// Column layout and description items of a groups section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    pub names: ColumnLayout,
    pub param: ColumnLayout,
    pub descr: ColumnLayout,
    pub items: Vec<HelpItem>,
}

impl Default for GroupLayout {
    fn default() -> Self {
        Self {
            names: ColumnLayout::default(),
            param: ColumnLayout::default(),
            descr: ColumnLayout::default(),
            items: HelpItem::ALL.to_vec(),
        }
    }
}

/// Whether `key` passes an include/exclude filter list.
pub(crate) fn passes(filter: &[String], exclude: bool, key: &str) -> bool {
    filter.is_empty() || filter.iter().any(|item| item == key) != exclude
}
