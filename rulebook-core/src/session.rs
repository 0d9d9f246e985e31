use crate::error::{SessionError, StoreError};
use crate::exchange::from_exchange_format;
use crate::store::RuleStore;
use crate::types::*;
use crate::validator::{compute_active_set, compute_section_active_set, RuleEntry};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::info;

/// Bump when the session file shape changes.
pub const SESSION_VERSION: &str = "1";

/// Saved state of all three collections, each in its exchange shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub library: Value,
    pub expressions: Value,
    pub sections: Value,
}

impl SessionDocument {
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| anyhow!("Failed to serialize session: {}", e))
    }

    fn document(&self, tab: Tab) -> &Value {
        match tab {
            Tab::Library => &self.library,
            Tab::Expressions => &self.expressions,
            Tab::Sections => &self.sections,
        }
    }
}

/// Active sections in the shape the downstream pipeline expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSections {
    pub section_break: String,
    pub ignore_header: bool,
    pub ignore_unnamed_sections: bool,
    pub named_sections: Vec<ActiveRule>,
}

/// Ready-to-use rules handed to request building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleExport {
    pub expressions: Vec<ActiveRule>,
    pub sections: ActiveSections,
    /// SHA-256 over the two rule sets, for downstream cache keys
    pub fingerprint: String,
}

impl RuleStore {
    /// Resolved, active expressions and sections. Open drafts are ignored:
    /// only saved entries are exported.
    pub fn export_rules(&self) -> Result<RuleExport> {
        let expressions: Vec<ActiveRule> =
            compute_active_set(self.expressions(), None, self.compiler())
                .iter()
                .map(RuleEntry::to_active)
                .collect();
        let settings = &self.sections().settings;
        let sections = ActiveSections {
            section_break: settings.section_break.clone(),
            ignore_header: settings.ignore_header,
            ignore_unnamed_sections: settings.ignore_unnamed_sections,
            named_sections: compute_section_active_set(self.sections(), None, self.compiler())
                .iter()
                .map(RuleEntry::to_active)
                .collect(),
        };
        let fingerprint = calculate_rules_fingerprint(&(&expressions, &sections))?;
        Ok(RuleExport {
            expressions,
            sections,
            fingerprint,
        })
    }

    pub fn export_session(&self) -> Result<SessionDocument> {
        Ok(SessionDocument {
            version: SESSION_VERSION.to_string(),
            saved_at: Utc::now(),
            library: self.export_collection(Tab::Library).to_value()?,
            expressions: self.export_collection(Tab::Expressions).to_value()?,
            sections: self.export_collection(Tab::Sections).to_value()?,
        })
    }

    /// Restore all three collections from a session. Every document is
    /// validated before anything is swapped, so a bad session changes nothing.
    pub fn load(&mut self, session: &SessionDocument) -> Result<(), SessionError> {
        if session.version != SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: session.version.clone(),
                expected: SESSION_VERSION,
            });
        }
        for tab in Tab::ALL {
            if self.draft(tab).is_some() {
                return Err(StoreError::DraftPending(tab).into());
            }
            if self.is_import_pending(tab) {
                return Err(StoreError::ImportPending(tab).into());
            }
        }
        let colors = self.color_assigner().clone();
        let library = from_exchange_format(Tab::Library, session.document(Tab::Library), &colors)?;
        let expressions =
            from_exchange_format(Tab::Expressions, session.document(Tab::Expressions), &colors)?;
        let sections =
            from_exchange_format(Tab::Sections, session.document(Tab::Sections), &colors)?;

        // Library first so expressions resolve against the restored entries.
        self.replace_collection(library)?;
        self.replace_collection(expressions)?;
        self.replace_collection(sections)?;
        info!(
            saved_at = %session.saved_at,
            rules = self.rule_count(),
            "session restored"
        );
        Ok(())
    }
}

/// Calculate a stable hash of any serializable rule payload
pub fn calculate_rules_fingerprint<T: Serialize>(rules: &T) -> Result<String> {
    let rules_json = serde_json::to_string(rules)
        .map_err(|e| anyhow!("Failed to serialize rules for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(rules_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> RuleStore {
        let mut store = RuleStore::default();
        store
            .upsert_entry(Tab::Library, EntryIndex::Append, EntryFields::new("num", r"\d+"))
            .unwrap();
        store
            .upsert_entry(Tab::Expressions, EntryIndex::Append, EntryFields::new("count", "#num"))
            .unwrap();
        store
            .upsert_entry(Tab::Expressions, EntryIndex::Append, EntryFields::new("lost", "#gone"))
            .unwrap();
        store.set_section_break(r"\n\n");
        store
            .upsert_entry(
                Tab::Sections,
                EntryIndex::Append,
                EntryFields::new("header", "^HEADER").ignored(true),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_export_rules_uses_resolved_patterns() {
        let export = populated().export_rules().unwrap();
        assert_eq!(export.expressions.len(), 1);
        assert_eq!(export.expressions[0].name, "count");
        assert_eq!(export.expressions[0].pattern, r"\d+");
        assert_eq!(export.sections.named_sections[0].ignore, Some(true));
        assert_eq!(export.fingerprint.len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let store = populated();
        let mut changed = populated();
        changed.set_section_break("---");
        assert_eq!(
            store.export_rules().unwrap().fingerprint,
            populated().export_rules().unwrap().fingerprint
        );
        assert_ne!(
            store.export_rules().unwrap().fingerprint,
            changed.export_rules().unwrap().fingerprint
        );
    }

    #[test]
    fn test_session_restores_every_tab() {
        let original = populated();
        let json = original.export_session().unwrap().to_json_pretty().unwrap();

        let mut restored = RuleStore::default();
        restored.load(&SessionDocument::from_json(&json).unwrap()).unwrap();
        for tab in Tab::ALL {
            assert_eq!(restored.collection(tab), original.collection(tab));
        }
    }

    #[test]
    fn test_load_refused_while_import_pending() {
        let mut store = RuleStore::default();
        let session = populated().export_session().unwrap();
        let ticket = store.begin_import(Tab::Library).unwrap();

        assert!(matches!(
            store.load(&session),
            Err(SessionError::Store(StoreError::ImportPending(Tab::Library)))
        ));
        assert!(store.library().is_empty());

        store.abandon_import(ticket);
        store.load(&session).unwrap();
        assert_eq!(store.library().len(), 1);
    }

    #[test]
    fn test_unknown_session_version_is_rejected() {
        let mut store = populated();
        let before = store.collection(Tab::Library);
        let mut session = RuleStore::default().export_session().unwrap();
        session.version = "99".to_string();

        assert!(matches!(
            store.load(&session),
            Err(SessionError::UnsupportedVersion { .. })
        ));
        assert_eq!(store.collection(Tab::Library), before);
    }

    #[test]
    fn test_bad_session_changes_nothing() {
        let mut store = populated();
        let before: Vec<Collection> = Tab::ALL.iter().map(|t| store.collection(*t)).collect();

        let mut session = RuleStore::default().export_session().unwrap();
        session.sections = serde_json::json!({ "named_sections": [] });
        assert!(matches!(store.load(&session), Err(SessionError::Schema(_))));

        let after: Vec<Collection> = Tab::ALL.iter().map(|t| store.collection(*t)).collect();
        assert_eq!(before, after);
    }
}
