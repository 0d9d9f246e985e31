use crate::pattern::PatternCompiler;
use crate::types::{
    ActiveRule, Color, ExpressionEntry, LibraryEntry, SectionCollection, SectionEntry,
};

/// Common view over the three entry kinds for validity checks.
pub trait RuleEntry: Clone {
    fn name(&self) -> &str;
    /// Resolved pattern for expressions, the stored pattern otherwise.
    fn effective_pattern(&self) -> &str;
    fn color(&self) -> &Color;
    fn to_active(&self) -> ActiveRule;
}

impl RuleEntry for LibraryEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn effective_pattern(&self) -> &str {
        &self.pattern
    }

    fn color(&self) -> &Color {
        &self.color
    }

    fn to_active(&self) -> ActiveRule {
        ActiveRule {
            name: self.name.clone(),
            pattern: self.pattern.clone(),
            color: self.color.clone(),
            ignore: None,
        }
    }
}

impl RuleEntry for ExpressionEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn effective_pattern(&self) -> &str {
        &self.resolved_pattern
    }

    fn color(&self) -> &Color {
        &self.color
    }

    fn to_active(&self) -> ActiveRule {
        ActiveRule {
            name: self.name.clone(),
            pattern: self.resolved_pattern.clone(),
            color: self.color.clone(),
            ignore: None,
        }
    }
}

impl RuleEntry for SectionEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn effective_pattern(&self) -> &str {
        &self.pattern
    }

    fn color(&self) -> &Color {
        &self.color
    }

    fn to_active(&self) -> ActiveRule {
        ActiveRule {
            name: self.name.clone(),
            pattern: self.pattern.clone(),
            color: self.color.clone(),
            ignore: Some(self.ignore),
        }
    }
}

/// An unsaved edit to preview. `target_index: None` (or an index past the
/// end) previews a new entry appended to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<E> {
    pub target_index: Option<usize>,
    pub entry: E,
}

pub fn is_active<E: RuleEntry>(entry: &E, compiler: &PatternCompiler) -> bool {
    !entry.name().is_empty() && compiler.is_valid(entry.effective_pattern())
}

/// Entries that are named and carry a compilable pattern, in collection
/// order. A candidate replaces the entry at its target index first.
pub fn compute_active_set<E: RuleEntry>(
    entries: &[E],
    candidate: Option<&Candidate<E>>,
    compiler: &PatternCompiler,
) -> Vec<E> {
    let mut view: Vec<E> = entries.to_vec();
    if let Some(candidate) = candidate {
        match candidate.target_index {
            Some(index) if index < view.len() => view[index] = candidate.entry.clone(),
            _ => view.push(candidate.entry.clone()),
        }
    }
    view.into_iter()
        .filter(|entry| is_active(entry, compiler))
        .collect()
}

/// Like [`compute_active_set`], but empty until a section break is set.
pub fn compute_section_active_set(
    sections: &SectionCollection,
    candidate: Option<&Candidate<SectionEntry>>,
    compiler: &PatternCompiler,
) -> Vec<SectionEntry> {
    if !sections.settings.is_usable() {
        return Vec::new();
    }
    compute_active_set(&sections.entries, candidate, compiler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SectionSettings;

    fn section(name: &str, pattern: &str) -> SectionEntry {
        SectionEntry {
            name: name.to_string(),
            pattern: pattern.to_string(),
            ignore: false,
            color: Color::new("red"),
        }
    }

    fn usable(entries: Vec<SectionEntry>) -> SectionCollection {
        SectionCollection {
            settings: SectionSettings {
                section_break: r"\n\n".to_string(),
                ..SectionSettings::default()
            },
            entries,
        }
    }

    #[test]
    fn test_filters_unnamed_and_invalid() {
        let compiler = PatternCompiler::default();
        let entries = vec![
            section("hpi", "(?i)history"),
            section("", "plan"),
            section("broken", "(unclosed"),
            section("meds", "(?i)medications"),
        ];
        let active = compute_active_set(&entries, None, &compiler);
        let names: Vec<&str> = active.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["hpi", "meds"]);
    }

    #[test]
    fn test_candidate_substitutes_target() {
        let compiler = PatternCompiler::default();
        let entries = vec![section("hpi", "(?i)history"), section("plan", "(?i)plan")];
        let candidate = Candidate {
            target_index: Some(0),
            entry: section("hpi", "(broken"),
        };
        let active = compute_active_set(&entries, Some(&candidate), &compiler);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "plan");
        // stored entries untouched
        assert_eq!(entries[0].pattern, "(?i)history");
    }

    #[test]
    fn test_new_candidate_is_appended() {
        let compiler = PatternCompiler::default();
        let entries = vec![section("hpi", "(?i)history")];
        let candidate = Candidate {
            target_index: None,
            entry: section("assessment", "(?i)assessment"),
        };
        let active = compute_active_set(&entries, Some(&candidate), &compiler);
        assert_eq!(active.last().map(|e| e.name.as_str()), Some("assessment"));
    }

    #[test]
    fn test_sections_need_a_break_pattern() {
        let compiler = PatternCompiler::default();
        let mut sections = usable(vec![section("hpi", "(?i)history")]);
        assert_eq!(compute_section_active_set(&sections, None, &compiler).len(), 1);

        sections.settings.section_break.clear();
        assert!(compute_section_active_set(&sections, None, &compiler).is_empty());
    }

    #[test]
    fn test_active_rule_carries_ignore_for_sections() {
        let mut entry = section("header", "^HEADER");
        entry.ignore = true;
        assert_eq!(entry.to_active().ignore, Some(true));
    }
}
