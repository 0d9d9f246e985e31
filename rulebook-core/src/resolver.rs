use crate::types::{ExpressionEntry, LibraryEntry, PatternSource};

/// Pattern a source resolves to against the current library. A dangling
/// alias resolves to the empty string.
pub fn resolve_source(library: &[LibraryEntry], source: &PatternSource) -> String {
    match source {
        PatternSource::Literal(pattern) => pattern.clone(),
        PatternSource::Alias(name) => library
            .iter()
            .find(|entry| &entry.name == name)
            .map(|entry| entry.pattern.clone())
            .unwrap_or_default(),
    }
}

/// Re-resolve every expression against `library`, returning a new
/// collection. Idempotent; the inputs are not modified.
pub fn resolve(library: &[LibraryEntry], expressions: &[ExpressionEntry]) -> Vec<ExpressionEntry> {
    expressions
        .iter()
        .map(|expression| ExpressionEntry {
            resolved_pattern: resolve_source(library, &expression.source),
            ..expression.clone()
        })
        .collect()
}

/// Names of aliases that currently point at nothing.
pub fn unresolved_aliases(expressions: &[ExpressionEntry]) -> Vec<&str> {
    expressions
        .iter()
        .filter(|expression| expression.is_unresolved_alias())
        .filter_map(|expression| expression.source.alias_name())
        .collect()
}
