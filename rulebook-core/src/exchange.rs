// Exchange document mapping.
//
// The on-disk format names patterns `regex`; the in-memory model calls them
// `pattern`. Colors never leave the process and are regenerated on import.

use crate::color::ColorAssigner;
use crate::error::SchemaError;
use crate::resolver::resolve_source;
use crate::types::*;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRule {
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSection {
    pub name: String,
    pub regex: String,
    pub ignore: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionsDocument {
    pub section_break: String,
    pub ignore_header: bool,
    pub ignore_unnamed_sections: bool,
    pub named_sections: Vec<ExchangeSection>,
}

/// A document in the exchange schema for one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExchangeDocument {
    /// `library` and `expressions`
    Rules(Vec<ExchangeRule>),
    Sections(SectionsDocument),
}

impl ExchangeDocument {
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Project a collection into the exchange schema.
pub fn to_exchange_format(collection: &Collection) -> ExchangeDocument {
    match collection {
        Collection::Library(entries) => ExchangeDocument::Rules(
            entries
                .iter()
                .map(|entry| ExchangeRule {
                    name: entry.name.clone(),
                    regex: entry.pattern.clone(),
                })
                .collect(),
        ),
        Collection::Expressions(entries) => ExchangeDocument::Rules(
            entries
                .iter()
                .map(|entry| ExchangeRule {
                    name: entry.name.clone(),
                    regex: entry.raw_pattern(),
                })
                .collect(),
        ),
        Collection::Sections(sections) => ExchangeDocument::Sections(SectionsDocument {
            section_break: sections.settings.section_break.clone(),
            ignore_header: sections.settings.ignore_header,
            ignore_unnamed_sections: sections.settings.ignore_unnamed_sections,
            named_sections: sections
                .entries
                .iter()
                .map(|entry| ExchangeSection {
                    name: entry.name.clone(),
                    regex: entry.pattern.clone(),
                    ignore: entry.ignore,
                })
                .collect(),
        }),
    }
}

/// Validate `document` against the schema for `tab` and build a fresh
/// collection from it. Nothing is returned unless every field checks out.
///
/// Expression aliases are left unresolved; the store resolves them against
/// its library when the collection is swapped in.
pub fn from_exchange_format(
    tab: Tab,
    document: &Value,
    colors: &ColorAssigner,
) -> Result<Collection, SchemaError> {
    match tab {
        Tab::Library => {
            let rules = read_rules(tab, document)?;
            let palette = colors.assign_sequence(rules.len());
            Ok(Collection::Library(
                rules
                    .into_iter()
                    .zip(palette)
                    .map(|(rule, color)| LibraryEntry {
                        name: rule.name,
                        pattern: rule.regex,
                        color,
                    })
                    .collect(),
            ))
        }
        Tab::Expressions => {
            let rules = read_rules(tab, document)?;
            let palette = colors.assign_sequence(rules.len());
            Ok(Collection::Expressions(
                rules
                    .into_iter()
                    .zip(palette)
                    .map(|(rule, color)| {
                        let source = PatternSource::parse(&rule.regex);
                        ExpressionEntry {
                            name: rule.name,
                            resolved_pattern: resolve_source(&[], &source),
                            source,
                            color,
                        }
                    })
                    .collect(),
            ))
        }
        Tab::Sections => {
            let parsed = read_sections(document)?;
            let palette = colors.assign_sequence(parsed.named_sections.len());
            Ok(Collection::Sections(SectionCollection {
                settings: SectionSettings {
                    section_break: parsed.section_break,
                    ignore_header: parsed.ignore_header,
                    ignore_unnamed_sections: parsed.ignore_unnamed_sections,
                },
                entries: parsed
                    .named_sections
                    .into_iter()
                    .zip(palette)
                    .map(|(section, color)| SectionEntry {
                        name: section.name,
                        pattern: section.regex,
                        ignore: section.ignore,
                        color,
                    })
                    .collect(),
            }))
        }
    }
}

/// Parse raw bytes (a file's contents) as an exchange document for `tab`.
pub fn parse_exchange_bytes(
    tab: Tab,
    bytes: &[u8],
    colors: &ColorAssigner,
) -> Result<Collection, crate::error::ImportError> {
    let document: Value = serde_json::from_slice(bytes)?;
    Ok(from_exchange_format(tab, &document, colors)?)
}

fn read_rules(tab: Tab, document: &Value) -> Result<Vec<ExchangeRule>, SchemaError> {
    let items = document
        .as_array()
        .ok_or_else(|| SchemaError::wrong_type(tab, "$", "an array"))?;
    let rules = items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<ExchangeRule, SchemaError> {
            let path = format!("[{i}]");
            let object = as_object(tab, item, &path)?;
            Ok(ExchangeRule {
                name: required_str(tab, object, &path, "name")?,
                regex: required_str(tab, object, &path, "regex")?,
            })
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;
    check_unique_names(tab, "", rules.iter().map(|rule| rule.name.as_str()))?;
    Ok(rules)
}

fn read_sections(document: &Value) -> Result<SectionsDocument, SchemaError> {
    let tab = Tab::Sections;
    let object = as_object(tab, document, "$")?;
    let section_break = required_str(tab, object, "", "section_break")?;
    let ignore_header = required_bool(tab, object, "", "ignore_header")?;
    let ignore_unnamed_sections = required_bool(tab, object, "", "ignore_unnamed_sections")?;
    let items = object
        .get("named_sections")
        .ok_or_else(|| SchemaError::missing(tab, "named_sections"))?
        .as_array()
        .ok_or_else(|| SchemaError::wrong_type(tab, "named_sections", "an array"))?;

    let named_sections = items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<ExchangeSection, SchemaError> {
            let path = format!("named_sections[{i}]");
            let section = as_object(tab, item, &path)?;
            Ok(ExchangeSection {
                name: required_str(tab, section, &path, "name")?,
                regex: required_str(tab, section, &path, "regex")?,
                ignore: required_bool(tab, section, &path, "ignore")?,
            })
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;
    check_unique_names(
        tab,
        "named_sections",
        named_sections.iter().map(|section| section.name.as_str()),
    )?;

    Ok(SectionsDocument {
        section_break,
        ignore_header,
        ignore_unnamed_sections,
        named_sections,
    })
}

/// Names must be unique within a collection; the first repeat is reported.
fn check_unique_names<'a>(
    tab: Tab,
    list_path: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for (i, name) in names.enumerate() {
        if !seen.insert(name) {
            let item = format!("{list_path}[{i}]");
            return Err(SchemaError::duplicate(tab, field_path(&item, "name")));
        }
    }
    Ok(())
}

fn as_object<'a>(tab: Tab, value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::wrong_type(tab, path, "an object"))
}

fn field_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn required_str(
    tab: Tab,
    object: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<String, SchemaError> {
    match object.get(key) {
        None => Err(SchemaError::missing(tab, field_path(parent, key))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SchemaError::wrong_type(tab, field_path(parent, key), "a string")),
    }
}

fn required_bool(
    tab: Tab,
    object: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<bool, SchemaError> {
    match object.get(key) {
        None => Err(SchemaError::missing(tab, field_path(parent, key))),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(SchemaError::wrong_type(tab, field_path(parent, key), "a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaProblem;
    use serde_json::json;

    #[test]
    fn test_library_uses_regex_field_name() {
        let collection = Collection::Library(vec![LibraryEntry {
            name: "date".to_string(),
            pattern: r"\d+".to_string(),
            color: Color::new("red"),
        }]);
        let value = to_exchange_format(&collection).to_value().unwrap();
        assert_eq!(value, json!([{ "name": "date", "regex": "\\d+" }]));
    }

    #[test]
    fn test_expression_alias_round_trips_as_raw_text() {
        let document = json!([{ "name": "visit", "regex": "#date" }]);
        let collection =
            from_exchange_format(Tab::Expressions, &document, &ColorAssigner::default()).unwrap();
        let Collection::Expressions(entries) = &collection else {
            panic!("expected expressions");
        };
        assert_eq!(entries[0].source, PatternSource::Alias("date".to_string()));
        assert_eq!(entries[0].resolved_pattern, "");
        assert_eq!(to_exchange_format(&collection).to_value().unwrap(), document);
    }

    #[test]
    fn test_missing_rule_field_names_the_item() {
        let document = json!([{ "name": "a", "regex": "x" }, { "name": "b" }]);
        let err = from_exchange_format(Tab::Library, &document, &ColorAssigner::default())
            .unwrap_err();
        assert_eq!(err.field, "[1].regex");
        assert_eq!(err.tab, Tab::Library);
        assert_eq!(err.problem, SchemaProblem::Missing);
    }

    #[test]
    fn test_rules_document_must_be_array() {
        let err = from_exchange_format(
            Tab::Expressions,
            &json!({ "name": "a", "regex": "x" }),
            &ColorAssigner::default(),
        )
        .unwrap_err();
        assert_eq!(err.field, "$");
    }

    #[test]
    fn test_section_ignore_must_be_bool() {
        let document = json!({
            "section_break": "\\n\\n",
            "ignore_header": false,
            "ignore_unnamed_sections": true,
            "named_sections": [{ "name": "hpi", "regex": "history", "ignore": "no" }]
        });
        let err = from_exchange_format(Tab::Sections, &document, &ColorAssigner::default())
            .unwrap_err();
        assert_eq!(err.field, "named_sections[0].ignore");
        assert_eq!(err.problem, SchemaProblem::WrongType { expected: "a boolean" });
    }

    #[test]
    fn test_repeated_section_name_is_rejected() {
        let document = json!({
            "section_break": "\\n\\n",
            "ignore_header": false,
            "ignore_unnamed_sections": false,
            "named_sections": [
                { "name": "hpi", "regex": "history", "ignore": false },
                { "name": "plan", "regex": "plan", "ignore": false },
                { "name": "hpi", "regex": "present illness", "ignore": true }
            ]
        });
        let err = from_exchange_format(Tab::Sections, &document, &ColorAssigner::default())
            .unwrap_err();
        assert_eq!(err.field, "named_sections[2].name");
        assert_eq!(err.problem, SchemaProblem::Duplicate);
    }

    #[test]
    fn test_invalid_json_bytes() {
        let result = parse_exchange_bytes(Tab::Library, b"{not json", &ColorAssigner::default());
        assert!(matches!(result, Err(crate::error::ImportError::Json(_))));
    }
}
