use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TabParseError;

// ===== TABS =====

/// The three rule collections. They are never unioned: every operation
/// names the collection it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Library,
    Expressions,
    Sections,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Library, Tab::Expressions, Tab::Sections];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Library => "library",
            Tab::Expressions => "expressions",
            Tab::Sections => "sections",
        }
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            Tab::Library => 0,
            Tab::Expressions => 1,
            Tab::Sections => 2,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = TabParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "library" => Ok(Tab::Library),
            "expressions" => Ok(Tab::Expressions),
            "sections" => Ok(Tab::Sections),
            other => Err(TabParseError(other.to_string())),
        }
    }
}

// ===== COLOR TAGS =====

/// Visual tag carried by every entry (a CSS-style color string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== PATTERN SOURCES =====

/// Marker that turns an expression's raw pattern into a library reference.
pub const ALIAS_SIGIL: char = '#';

/// Where an expression's pattern comes from.
///
/// Raw text starting with [`ALIAS_SIGIL`] is always read as an alias; there
/// is no escape for literal patterns that begin with `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternSource {
    Literal(String),
    Alias(String),
}

impl PatternSource {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(ALIAS_SIGIL) {
            Some(name) => PatternSource::Alias(name.to_string()),
            None => PatternSource::Literal(raw.to_string()),
        }
    }

    /// The text form used by the exchange document and the editor.
    pub fn to_raw(&self) -> String {
        match self {
            PatternSource::Literal(pattern) => pattern.clone(),
            PatternSource::Alias(name) => format!("{ALIAS_SIGIL}{name}"),
        }
    }

    pub fn alias_name(&self) -> Option<&str> {
        match self {
            PatternSource::Alias(name) => Some(name),
            PatternSource::Literal(_) => None,
        }
    }
}

impl fmt::Display for PatternSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSource::Literal(pattern) => f.write_str(pattern),
            PatternSource::Alias(name) => write!(f, "{ALIAS_SIGIL}{name}"),
        }
    }
}

// ===== ENTRIES =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub name: String,
    pub pattern: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionEntry {
    pub name: String,
    pub source: PatternSource,
    /// Library pattern at the last resolution; empty when the alias dangles.
    pub resolved_pattern: String,
    pub color: Color,
}

impl ExpressionEntry {
    pub fn raw_pattern(&self) -> String {
        self.source.to_raw()
    }

    pub fn is_unresolved_alias(&self) -> bool {
        matches!(self.source, PatternSource::Alias(_)) && self.resolved_pattern.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub name: String,
    pub pattern: String,
    pub ignore: bool,
    pub color: Color,
}

/// Collection-level section options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSettings {
    pub section_break: String,
    pub ignore_header: bool,
    pub ignore_unnamed_sections: bool,
}

impl SectionSettings {
    /// Sections are usable only once a break pattern has been set.
    pub fn is_usable(&self) -> bool {
        !self.section_break.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionCollection {
    pub settings: SectionSettings,
    pub entries: Vec<SectionEntry>,
}

/// One whole collection, tagged by the tab it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    Library(Vec<LibraryEntry>),
    Expressions(Vec<ExpressionEntry>),
    Sections(SectionCollection),
}

impl Collection {
    pub fn tab(&self) -> Tab {
        match self {
            Collection::Library(_) => Tab::Library,
            Collection::Expressions(_) => Tab::Expressions,
            Collection::Sections(_) => Tab::Sections,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Library(entries) => entries.len(),
            Collection::Expressions(entries) => entries.len(),
            Collection::Sections(sections) => sections.entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ===== EDITING =====

/// Target of an upsert: replace the entry at an index, or append a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryIndex {
    At(usize),
    Append,
}

impl From<Option<usize>> for EntryIndex {
    fn from(index: Option<usize>) -> Self {
        index.map_or(EntryIndex::Append, EntryIndex::At)
    }
}

/// User-editable fields of any entry. `ignore` only matters for sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub name: String,
    pub raw_pattern: String,
    pub ignore: bool,
}

impl EntryFields {
    pub fn new(name: impl Into<String>, raw_pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_pattern: raw_pattern.into(),
            ignore: false,
        }
    }

    pub fn ignored(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }
}

/// An entry being created or edited. Owns copies of the fields so the
/// stored collection is never touched until the draft is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    /// `None` while creating a new entry.
    pub target_index: Option<usize>,
    pub name: String,
    pub raw_pattern: String,
    /// Pattern the draft would resolve to right now (aliases on the
    /// expressions tab, the raw pattern elsewhere).
    pub resolved_preview: String,
    pub ignore: bool,
}

impl EditDraft {
    pub fn fields(&self) -> EntryFields {
        EntryFields {
            name: self.name.clone(),
            raw_pattern: self.raw_pattern.clone(),
            ignore: self.ignore,
        }
    }
}

// ===== ACTIVE RULES =====

/// A rule that is ready to use: named, with a compilable effective pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRule {
    pub name: String,
    #[serde(rename = "regex")]
    pub pattern: String,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<bool>,
}
