// RuleStore - owns the library, expression and section collections.
//
// Every mutation runs to completion and recomputes what it invalidates
// before returning: library/expression changes re-resolve aliases, and the
// active set of each touched tab is refreshed inline. Collections are
// replaced copy-on-write, so a failed operation never leaves partial state.

use crate::color::ColorAssigner;
use crate::config::EngineConfig;
use crate::error::{ImportError, StoreError};
use crate::exchange::{parse_exchange_bytes, to_exchange_format, ExchangeDocument};
use crate::pattern::PatternCompiler;
use crate::resolver::{resolve, resolve_source, unresolved_aliases};
use crate::types::*;
use crate::validator::{compute_active_set, compute_section_active_set, Candidate, RuleEntry};
use tracing::{debug, info, warn};

/// Exclusive right to finish one import into a tab.
///
/// Handed out by [`RuleStore::begin_import`]; while it is alive no second
/// import into the same tab can start.
#[derive(Debug)]
#[must_use = "an import ticket must be completed or abandoned"]
pub struct ImportTicket {
    tab: Tab,
}

impl ImportTicket {
    pub fn tab(&self) -> Tab {
        self.tab
    }
}

/// What a successful import swapped in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub tab: Tab,
    pub entries: usize,
    /// Library names referenced by imported expressions that do not exist.
    pub unresolved_aliases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RuleStore {
    library: Vec<LibraryEntry>,
    expressions: Vec<ExpressionEntry>,
    sections: SectionCollection,
    active_tab: Tab,
    drafts: [Option<EditDraft>; 3],
    pending_imports: [bool; 3],
    active: [Vec<ActiveRule>; 3],
    compiler: PatternCompiler,
    colors: ColorAssigner,
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl RuleStore {
    /// Empty collections, library tab selected.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            library: Vec::new(),
            expressions: Vec::new(),
            sections: SectionCollection::default(),
            active_tab: Tab::Library,
            drafts: [None, None, None],
            pending_imports: [false; 3],
            active: [Vec::new(), Vec::new(), Vec::new()],
            compiler: config.pattern_compiler(),
            colors: config.color_assigner(),
        }
    }

    // ===== READ ACCESS =====

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn library(&self) -> &[LibraryEntry] {
        &self.library
    }

    pub fn expressions(&self) -> &[ExpressionEntry] {
        &self.expressions
    }

    pub fn sections(&self) -> &SectionCollection {
        &self.sections
    }

    pub fn compiler(&self) -> &PatternCompiler {
        &self.compiler
    }

    pub fn color_assigner(&self) -> &ColorAssigner {
        &self.colors
    }

    /// Snapshot of one collection.
    pub fn collection(&self, tab: Tab) -> Collection {
        match tab {
            Tab::Library => Collection::Library(self.library.clone()),
            Tab::Expressions => Collection::Expressions(self.expressions.clone()),
            Tab::Sections => Collection::Sections(self.sections.clone()),
        }
    }

    pub fn len(&self, tab: Tab) -> usize {
        match tab {
            Tab::Library => self.library.len(),
            Tab::Expressions => self.expressions.len(),
            Tab::Sections => self.sections.entries.len(),
        }
    }

    /// Active set of `tab`, reflecting any open draft on that tab.
    pub fn active_set(&self, tab: Tab) -> &[ActiveRule] {
        &self.active[tab.slot()]
    }

    pub fn draft(&self, tab: Tab) -> Option<&EditDraft> {
        self.drafts[tab.slot()].as_ref()
    }

    pub fn is_import_pending(&self, tab: Tab) -> bool {
        self.pending_imports[tab.slot()]
    }

    /// Number of expression and section entries.
    pub fn rule_count(&self) -> usize {
        self.expressions.len() + self.sections.entries.len()
    }

    pub fn export_collection(&self, tab: Tab) -> ExchangeDocument {
        to_exchange_format(&self.collection(tab))
    }

    // ===== TABS =====

    pub fn select_tab(&mut self, tab: Tab) {
        debug!(from = %self.active_tab, to = %tab, "selecting tab");
        self.active_tab = tab;
        if tab == Tab::Expressions {
            self.resolve_expressions();
        }
        self.refresh(tab);
    }

    // ===== ENTRY MUTATIONS =====

    /// Insert (`Append`) or replace (`At`) an entry. Returns the index the
    /// entry now occupies. A replaced entry keeps its color.
    ///
    /// Refused while the tab has an open draft; commit it with
    /// [`RuleStore::save_draft`] instead.
    pub fn upsert_entry(
        &mut self,
        tab: Tab,
        index: EntryIndex,
        fields: EntryFields,
    ) -> Result<usize, StoreError> {
        if self.drafts[tab.slot()].is_some() {
            return Err(StoreError::DraftPending(tab));
        }
        self.write_entry(tab, index, fields)
    }

    fn write_entry(
        &mut self,
        tab: Tab,
        index: EntryIndex,
        fields: EntryFields,
    ) -> Result<usize, StoreError> {
        let position = match tab {
            Tab::Library => {
                check_slot(tab, &self.library, index, &fields.name)?;
                let entry = LibraryEntry {
                    color: self.color_for(&self.library, index),
                    name: fields.name,
                    pattern: fields.raw_pattern,
                };
                let (next, position) = placed(&self.library, index, entry);
                self.library = next;
                self.resolve_expressions();
                self.refresh(Tab::Expressions);
                position
            }
            Tab::Expressions => {
                check_slot(tab, &self.expressions, index, &fields.name)?;
                let source = PatternSource::parse(&fields.raw_pattern);
                let entry = ExpressionEntry {
                    color: self.color_for(&self.expressions, index),
                    name: fields.name,
                    resolved_pattern: resolve_source(&self.library, &source),
                    source,
                };
                let (next, position) = placed(&self.expressions, index, entry);
                self.expressions = next;
                position
            }
            Tab::Sections => {
                check_slot(tab, &self.sections.entries, index, &fields.name)?;
                let entry = SectionEntry {
                    color: self.color_for(&self.sections.entries, index),
                    name: fields.name,
                    pattern: fields.raw_pattern,
                    ignore: fields.ignore,
                };
                let (next, position) = placed(&self.sections.entries, index, entry);
                self.sections.entries = next;
                position
            }
        };
        debug!(%tab, position, "entry saved");
        self.refresh(tab);
        Ok(position)
    }

    /// Delete the entry at `index`, returning its name. Its color becomes
    /// free for the next new entry.
    pub fn remove_entry(&mut self, tab: Tab, index: usize) -> Result<String, StoreError> {
        if self.drafts[tab.slot()].is_some() {
            return Err(StoreError::DraftPending(tab));
        }
        let len = self.len(tab);
        if index >= len {
            return Err(StoreError::IndexOutOfRange { tab, index, len });
        }
        let name = match tab {
            Tab::Library => {
                let (next, removed) = without(&self.library, index);
                self.library = next;
                self.resolve_expressions();
                self.refresh(Tab::Expressions);
                removed.name
            }
            Tab::Expressions => {
                let (next, removed) = without(&self.expressions, index);
                self.expressions = next;
                removed.name
            }
            Tab::Sections => {
                let (next, removed) = without(&self.sections.entries, index);
                self.sections.entries = next;
                removed.name
            }
        };
        debug!(%tab, index, name = %name, "entry removed");
        self.refresh(tab);
        Ok(name)
    }

    /// Swap a whole collection in. Used by import and session restore;
    /// refused while an edit is open on the target tab.
    pub fn replace_collection(&mut self, collection: Collection) -> Result<(), StoreError> {
        let tab = collection.tab();
        if self.drafts[tab.slot()].is_some() {
            return Err(StoreError::DraftPending(tab));
        }
        match collection {
            Collection::Library(entries) => {
                self.library = entries;
                self.resolve_expressions();
                self.refresh(Tab::Expressions);
            }
            Collection::Expressions(entries) => {
                self.expressions = resolve(&self.library, &entries);
            }
            Collection::Sections(sections) => {
                self.sections = sections;
            }
        }
        info!(%tab, entries = self.len(tab), "collection replaced");
        self.refresh(tab);
        Ok(())
    }

    // ===== SECTION SETTINGS =====

    pub fn set_section_settings(&mut self, settings: SectionSettings) {
        self.sections.settings = settings;
        self.refresh(Tab::Sections);
    }

    pub fn set_section_break(&mut self, section_break: impl Into<String>) {
        self.sections.settings.section_break = section_break.into();
        self.refresh(Tab::Sections);
    }

    pub fn set_ignore_header(&mut self, ignore_header: bool) {
        self.sections.settings.ignore_header = ignore_header;
    }

    pub fn set_ignore_unnamed_sections(&mut self, ignore_unnamed_sections: bool) {
        self.sections.settings.ignore_unnamed_sections = ignore_unnamed_sections;
    }

    // ===== EDIT DRAFTS =====

    /// Start editing the entry at `index`, or a new entry when `None`.
    /// Only one draft may be open per tab.
    pub fn open_draft(&mut self, tab: Tab, index: Option<usize>) -> Result<&EditDraft, StoreError> {
        if self.drafts[tab.slot()].is_some() {
            return Err(StoreError::DraftPending(tab));
        }
        let fields = match index {
            None => EntryFields::default(),
            Some(i) => self.fields_at(tab, i)?,
        };
        let resolved_preview = self.preview(tab, &fields.raw_pattern);
        self.drafts[tab.slot()] = Some(EditDraft {
            target_index: index,
            name: fields.name,
            raw_pattern: fields.raw_pattern,
            resolved_preview,
            ignore: fields.ignore,
        });
        self.refresh(tab);
        self.drafts[tab.slot()]
            .as_ref()
            .ok_or(StoreError::NoDraft(tab))
    }

    pub fn update_draft_name(&mut self, tab: Tab, name: impl Into<String>) -> Result<(), StoreError> {
        self.draft_mut(tab)?.name = name.into();
        self.refresh(tab);
        Ok(())
    }

    /// Change the draft's raw pattern; aliases on the expressions tab are
    /// previewed against the current library right away.
    pub fn update_draft_pattern(
        &mut self,
        tab: Tab,
        raw_pattern: impl Into<String>,
    ) -> Result<(), StoreError> {
        let raw_pattern = raw_pattern.into();
        let resolved_preview = self.preview(tab, &raw_pattern);
        let draft = self.draft_mut(tab)?;
        draft.raw_pattern = raw_pattern;
        draft.resolved_preview = resolved_preview;
        self.refresh(tab);
        Ok(())
    }

    pub fn update_draft_ignore(&mut self, tab: Tab, ignore: bool) -> Result<(), StoreError> {
        self.draft_mut(tab)?.ignore = ignore;
        self.refresh(tab);
        Ok(())
    }

    /// Commit the draft. On a name collision the draft stays open and the
    /// collection is untouched.
    pub fn save_draft(&mut self, tab: Tab) -> Result<usize, StoreError> {
        let draft = self.drafts[tab.slot()]
            .take()
            .ok_or(StoreError::NoDraft(tab))?;
        let index = EntryIndex::from(draft.target_index);
        match self.write_entry(tab, index, draft.fields()) {
            Ok(position) => Ok(position),
            Err(e) => {
                self.drafts[tab.slot()] = Some(draft);
                self.refresh(tab);
                Err(e)
            }
        }
    }

    /// Discard the draft, if any. The store is exactly as before it opened.
    pub fn cancel_draft(&mut self, tab: Tab) -> Option<EditDraft> {
        let discarded = self.drafts[tab.slot()].take();
        if discarded.is_some() {
            self.refresh(tab);
        }
        discarded
    }

    // ===== IMPORTS =====

    pub fn begin_import(&mut self, tab: Tab) -> Result<ImportTicket, StoreError> {
        if self.pending_imports[tab.slot()] {
            return Err(StoreError::ImportPending(tab));
        }
        self.pending_imports[tab.slot()] = true;
        Ok(ImportTicket { tab })
    }

    /// Validate `bytes` as an exchange document for the ticket's tab and
    /// swap it in. Any failure leaves the collection untouched.
    pub fn complete_import(
        &mut self,
        ticket: ImportTicket,
        bytes: &[u8],
    ) -> Result<ImportSummary, ImportError> {
        let tab = ticket.tab;
        self.pending_imports[tab.slot()] = false;

        let collection = parse_exchange_bytes(tab, bytes, &self.colors).map_err(|e| {
            warn!(%tab, error = %e, "import rejected");
            e
        })?;
        self.replace_collection(collection)?;

        let unresolved = if tab == Tab::Expressions {
            unresolved_aliases(&self.expressions)
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        Ok(ImportSummary {
            tab,
            entries: self.len(tab),
            unresolved_aliases: unresolved,
        })
    }

    /// Give up on an import (dialog cancelled, read failed).
    pub fn abandon_import(&mut self, ticket: ImportTicket) {
        self.pending_imports[ticket.tab.slot()] = false;
    }

    // ===== INTERNALS =====

    fn draft_mut(&mut self, tab: Tab) -> Result<&mut EditDraft, StoreError> {
        self.drafts[tab.slot()]
            .as_mut()
            .ok_or(StoreError::NoDraft(tab))
    }

    fn fields_at(&self, tab: Tab, index: usize) -> Result<EntryFields, StoreError> {
        let len = self.len(tab);
        let fields = match tab {
            Tab::Library => self
                .library
                .get(index)
                .map(|e| EntryFields::new(e.name.clone(), e.pattern.clone())),
            Tab::Expressions => self
                .expressions
                .get(index)
                .map(|e| EntryFields::new(e.name.clone(), e.raw_pattern())),
            Tab::Sections => self
                .sections
                .entries
                .get(index)
                .map(|e| EntryFields::new(e.name.clone(), e.pattern.clone()).ignored(e.ignore)),
        };
        fields.ok_or(StoreError::IndexOutOfRange { tab, index, len })
    }

    fn preview(&self, tab: Tab, raw_pattern: &str) -> String {
        match tab {
            Tab::Expressions => resolve_source(&self.library, &PatternSource::parse(raw_pattern)),
            Tab::Library | Tab::Sections => raw_pattern.to_string(),
        }
    }

    fn color_for<E: RuleEntry>(&self, entries: &[E], index: EntryIndex) -> Color {
        match index {
            EntryIndex::At(i) if i < entries.len() => entries[i].color().clone(),
            _ => self.colors.assign(entries.iter().map(RuleEntry::color)),
        }
    }

    fn draft_color<E: RuleEntry>(&self, entries: &[E], draft: &EditDraft) -> Color {
        self.color_for(entries, EntryIndex::from(draft.target_index))
    }

    /// Re-resolve the whole expression collection and any expression draft.
    fn resolve_expressions(&mut self) {
        self.expressions = resolve(&self.library, &self.expressions);
        let library = &self.library;
        if let Some(draft) = self.drafts[Tab::Expressions.slot()].as_mut() {
            draft.resolved_preview =
                resolve_source(library, &PatternSource::parse(&draft.raw_pattern));
        }
        let dangling = unresolved_aliases(&self.expressions);
        if !dangling.is_empty() {
            debug!(aliases = ?dangling, "expressions reference missing library entries");
        }
    }

    /// Recompute the active set of `tab`, previewing its draft if one is open.
    fn refresh(&mut self, tab: Tab) {
        let draft = self.drafts[tab.slot()].as_ref();
        let active: Vec<ActiveRule> = match tab {
            Tab::Library => {
                let candidate = draft.map(|d| Candidate {
                    target_index: d.target_index,
                    entry: LibraryEntry {
                        name: d.name.clone(),
                        pattern: d.resolved_preview.clone(),
                        color: self.draft_color(&self.library, d),
                    },
                });
                compute_active_set(&self.library, candidate.as_ref(), &self.compiler)
                    .iter()
                    .map(RuleEntry::to_active)
                    .collect()
            }
            Tab::Expressions => {
                let candidate = draft.map(|d| Candidate {
                    target_index: d.target_index,
                    entry: ExpressionEntry {
                        name: d.name.clone(),
                        source: PatternSource::parse(&d.raw_pattern),
                        resolved_pattern: d.resolved_preview.clone(),
                        color: self.draft_color(&self.expressions, d),
                    },
                });
                compute_active_set(&self.expressions, candidate.as_ref(), &self.compiler)
                    .iter()
                    .map(RuleEntry::to_active)
                    .collect()
            }
            Tab::Sections => {
                let candidate = draft.map(|d| Candidate {
                    target_index: d.target_index,
                    entry: SectionEntry {
                        name: d.name.clone(),
                        pattern: d.resolved_preview.clone(),
                        ignore: d.ignore,
                        color: self.draft_color(&self.sections.entries, d),
                    },
                });
                compute_section_active_set(&self.sections, candidate.as_ref(), &self.compiler)
                    .iter()
                    .map(RuleEntry::to_active)
                    .collect()
            }
        };
        debug!(%tab, active = active.len(), "active set refreshed");
        self.active[tab.slot()] = active;
    }
}

/// Reject out-of-range targets and names already held by another index.
fn check_slot<E: RuleEntry>(
    tab: Tab,
    entries: &[E],
    index: EntryIndex,
    name: &str,
) -> Result<(), StoreError> {
    let target = match index {
        EntryIndex::At(i) if i >= entries.len() => {
            return Err(StoreError::IndexOutOfRange {
                tab,
                index: i,
                len: entries.len(),
            })
        }
        EntryIndex::At(i) => Some(i),
        EntryIndex::Append => None,
    };
    let taken = entries
        .iter()
        .enumerate()
        .any(|(i, entry)| Some(i) != target && entry.name() == name);
    if taken {
        return Err(StoreError::DuplicateName {
            tab,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Copy of `entries` with `entry` written at `index`, and where it landed.
fn placed<E: Clone>(entries: &[E], index: EntryIndex, entry: E) -> (Vec<E>, usize) {
    let mut next = entries.to_vec();
    match index {
        EntryIndex::At(i) => {
            next[i] = entry;
            (next, i)
        }
        EntryIndex::Append => {
            next.push(entry);
            let position = next.len() - 1;
            (next, position)
        }
    }
}

/// Copy of `entries` without the entry at `index`, plus the removed entry.
fn without<E: Clone>(entries: &[E], index: usize) -> (Vec<E>, E) {
    let mut next = entries.to_vec();
    let removed = next.remove(index);
    (next, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RuleStore {
        RuleStore::default()
    }

    #[test]
    fn test_upsert_appends_and_replaces() {
        let mut store = store();
        let first = store
            .upsert_entry(Tab::Library, EntryIndex::Append, EntryFields::new("num", r"\d+"))
            .unwrap();
        assert_eq!(first, 0);
        let color = store.library()[0].color.clone();

        store
            .upsert_entry(Tab::Library, EntryIndex::At(0), EntryFields::new("number", r"\d+\.?\d*"))
            .unwrap();
        assert_eq!(store.library().len(), 1);
        assert_eq!(store.library()[0].name, "number");
        assert_eq!(store.library()[0].color, color);
    }

    #[test]
    fn test_upsert_out_of_range() {
        let mut store = store();
        let err = store
            .upsert_entry(Tab::Sections, EntryIndex::At(3), EntryFields::new("hpi", "x"))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::IndexOutOfRange {
                tab: Tab::Sections,
                index: 3,
                len: 0
            }
        );
    }

    #[test]
    fn test_entry_may_keep_its_own_name() {
        let mut store = store();
        store
            .upsert_entry(Tab::Expressions, EntryIndex::Append, EntryFields::new("bp", "x"))
            .unwrap();
        assert!(store
            .upsert_entry(Tab::Expressions, EntryIndex::At(0), EntryFields::new("bp", "y"))
            .is_ok());
    }

    #[test]
    fn test_library_change_re_resolves_expressions() {
        let mut store = store();
        store
            .upsert_entry(Tab::Expressions, EntryIndex::Append, EntryFields::new("visit", "#date"))
            .unwrap();
        assert_eq!(store.expressions()[0].resolved_pattern, "");
        assert!(store.active_set(Tab::Expressions).is_empty());

        store
            .upsert_entry(Tab::Library, EntryIndex::Append, EntryFields::new("date", r"\d{4}"))
            .unwrap();
        assert_eq!(store.expressions()[0].resolved_pattern, r"\d{4}");
        assert_eq!(store.active_set(Tab::Expressions).len(), 1);

        store.remove_entry(Tab::Library, 0).unwrap();
        assert_eq!(store.expressions()[0].resolved_pattern, "");
        assert!(store.active_set(Tab::Expressions).is_empty());
    }

    #[test]
    fn test_draft_previews_without_mutating() {
        let mut store = store();
        store.set_section_break(r"\n\n");
        store
            .upsert_entry(Tab::Sections, EntryIndex::Append, EntryFields::new("hpi", "(?i)history"))
            .unwrap();
        let before = store.collection(Tab::Sections);

        store.open_draft(Tab::Sections, Some(0)).unwrap();
        store.update_draft_pattern(Tab::Sections, "(broken").unwrap();
        assert!(store.active_set(Tab::Sections).is_empty());
        assert_eq!(store.collection(Tab::Sections), before);

        store.cancel_draft(Tab::Sections);
        assert_eq!(store.collection(Tab::Sections), before);
        assert_eq!(store.active_set(Tab::Sections).len(), 1);
    }

    #[test]
    fn test_second_draft_is_refused() {
        let mut store = store();
        store.open_draft(Tab::Library, None).unwrap();
        assert_eq!(
            store.open_draft(Tab::Library, None).unwrap_err(),
            StoreError::DraftPending(Tab::Library)
        );
        // other tabs have their own draft slot
        assert!(store.open_draft(Tab::Expressions, None).is_ok());
    }

    #[test]
    fn test_expression_draft_previews_alias() {
        let mut store = store();
        store
            .upsert_entry(Tab::Library, EntryIndex::Append, EntryFields::new("num", r"\d+"))
            .unwrap();
        store.open_draft(Tab::Expressions, None).unwrap();
        store.update_draft_name(Tab::Expressions, "count").unwrap();
        store.update_draft_pattern(Tab::Expressions, "#num").unwrap();
        assert_eq!(store.draft(Tab::Expressions).unwrap().resolved_preview, r"\d+");
        assert_eq!(store.active_set(Tab::Expressions).len(), 1);

        let position = store.save_draft(Tab::Expressions).unwrap();
        assert_eq!(position, 0);
        assert!(store.draft(Tab::Expressions).is_none());
        assert_eq!(store.expressions()[0].resolved_pattern, r"\d+");
    }

    #[test]
    fn test_duplicate_save_keeps_draft_open() {
        let mut store = store();
        store
            .upsert_entry(Tab::Library, EntryIndex::Append, EntryFields::new("num", r"\d+"))
            .unwrap();
        store.open_draft(Tab::Library, None).unwrap();
        store.update_draft_name(Tab::Library, "num").unwrap();
        store.update_draft_pattern(Tab::Library, r"\w+").unwrap();

        let err = store.save_draft(Tab::Library).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { .. }));
        assert!(store.draft(Tab::Library).is_some());
        assert_eq!(store.library().len(), 1);
    }

    #[test]
    fn test_remove_refused_while_editing() {
        let mut store = store();
        store
            .upsert_entry(Tab::Library, EntryIndex::Append, EntryFields::new("num", r"\d+"))
            .unwrap();
        store.open_draft(Tab::Library, Some(0)).unwrap();
        assert_eq!(
            store.remove_entry(Tab::Library, 0).unwrap_err(),
            StoreError::DraftPending(Tab::Library)
        );
    }

    #[test]
    fn test_direct_upsert_refused_while_editing() {
        let mut store = store();
        store
            .upsert_entry(Tab::Library, EntryIndex::Append, EntryFields::new("num", r"\d+"))
            .unwrap();
        store.open_draft(Tab::Library, Some(0)).unwrap();
        assert_eq!(
            store
                .upsert_entry(Tab::Library, EntryIndex::At(0), EntryFields::new("num", "x"))
                .unwrap_err(),
            StoreError::DraftPending(Tab::Library)
        );
        // other tabs are unaffected
        assert!(store
            .upsert_entry(Tab::Sections, EntryIndex::Append, EntryFields::new("hpi", "x"))
            .is_ok());

        store.update_draft_pattern(Tab::Library, r"\d{2}").unwrap();
        store.save_draft(Tab::Library).unwrap();
        assert_eq!(store.library()[0].pattern, r"\d{2}");
    }

    #[test]
    fn test_second_import_is_refused_until_finished() {
        let mut store = store();
        let ticket = store.begin_import(Tab::Library).unwrap();
        assert_eq!(
            store.begin_import(Tab::Library).unwrap_err(),
            StoreError::ImportPending(Tab::Library)
        );
        store.abandon_import(ticket);
        assert!(!store.is_import_pending(Tab::Library));
        let ticket = store.begin_import(Tab::Library).unwrap();
        store.complete_import(ticket, b"[]").unwrap();
    }

    #[test]
    fn test_rule_count_ignores_library() {
        let mut store = store();
        store
            .upsert_entry(Tab::Library, EntryIndex::Append, EntryFields::new("a", "a"))
            .unwrap();
        store
            .upsert_entry(Tab::Expressions, EntryIndex::Append, EntryFields::new("b", "b"))
            .unwrap();
        store
            .upsert_entry(Tab::Sections, EntryIndex::Append, EntryFields::new("c", "c"))
            .unwrap();
        assert_eq!(store.rule_count(), 2);
    }
}
