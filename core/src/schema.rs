//! Ordered option maps.

use std::collections::HashMap;

use crate::types::OptionDef;

/// Ordered key → option map for one command level.
///
/// Order is display and usage order. Each option's preferred name is
/// computed once on insertion and kept in a side table, so lookups never
/// mutate the options.
///
/// # Examples
///
/// ```
/// use option_schema_core::*;
///
/// let schema = Schema::new()
///     .with_option("verbose", OptionDef::flag().with_names(["-v", "--verbose"]))
///     .with_option("token", OptionDef::single().with_source("API_TOKEN"));
///
/// assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["verbose", "token"]);
/// assert_eq!(schema.preferred_name("verbose"), Some("-v"));
/// assert_eq!(schema.preferred_name("token"), Some("API_TOKEN"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<(String, OptionDef)>,
    index: HashMap<String, usize>,
    preferred: Vec<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::insert`].
    pub fn with_option(mut self, key: &str, option: OptionDef) -> Self {
        self.insert(key, option);
        self
    }

    /// Inserts or replaces an option. A replaced option keeps its position.
    pub fn insert(&mut self, key: &str, option: OptionDef) {
        let preferred = preferred_name_of(key, &option);
        match self.index.get(key) {
            Some(&position) => {
                self.entries[position].1 = option;
                self.preferred[position] = preferred;
            }
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), option));
                self.preferred.push(preferred);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionDef> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Position of `key` in schema order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionDef)> {
        self.entries
            .iter()
            .map(|(key, option)| (key.as_str(), option))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name used when referring to the option in messages.
    pub fn preferred_name(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&position| self.preferred[position].as_str())
    }
}

fn preferred_name_of(key: &str, option: &OptionDef) -> String {
    option
        .display_names()
        .next()
        .or_else(|| option.positional_marker())
        .or_else(|| option.sources.first().map(String::as_str))
        .unwrap_or(key)
        .to_string()
}
