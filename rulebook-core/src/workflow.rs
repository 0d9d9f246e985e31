// File import/export workflows and the collaborators they talk to.
//
// The store never touches the filesystem itself. Dialogs, file access and
// operator-facing error reporting are injected so the workflows can run
// against in-memory fakes.

use crate::config::EngineConfig;
use crate::error::{ImportError, StoreError};
use crate::store::{ImportSummary, RuleStore};
use crate::types::Tab;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Asks the operator for a path. `None` means the dialog was cancelled.
pub trait FileDialog {
    fn open_path(&mut self) -> Option<PathBuf>;
    fn save_path(&mut self, suggested_name: &str) -> Option<PathBuf>;
}

pub trait FileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Receives failures and warnings meant for the operator.
pub trait ErrorSink {
    fn report(&mut self, error: ErrorDescriptor);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAction {
    pub text: String,
    pub auto_focus: bool,
}

impl ErrorAction {
    pub fn close() -> Self {
        Self {
            text: "Close".to_string(),
            auto_focus: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// What the operator sees when something goes wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub severity: Severity,
    pub header: String,
    pub text: String,
    pub actions: Vec<ErrorAction>,
}

impl ErrorDescriptor {
    pub fn error(header: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            header: header.into(),
            text: text.into(),
            actions: vec![ErrorAction::close()],
        }
    }

    pub fn warning(header: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(header, text)
        }
    }
}

/// Collecting sink, handy for batch tools and tests.
impl ErrorSink for Vec<ErrorDescriptor> {
    fn report(&mut self, error: ErrorDescriptor) {
        self.push(error);
    }
}

/// Plain `std::fs` access.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(path, bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Cancelled,
    Imported(ImportSummary),
    /// Already reported to the sink; the store is unchanged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Cancelled,
    Saved(PathBuf),
    /// Already reported to the sink.
    Failed,
}

/// Ask for a file, read it and swap it into `tab`. Failures are reported
/// once and never retried.
pub fn import_collection(
    store: &mut RuleStore,
    tab: Tab,
    dialog: &mut dyn FileDialog,
    fs: &dyn FileSystem,
    sink: &mut dyn ErrorSink,
    config: &EngineConfig,
) -> ImportOutcome {
    let ticket = match store.begin_import(tab) {
        Ok(ticket) => ticket,
        Err(e) => {
            sink.report(ErrorDescriptor::error("Import already running", e.to_string()));
            return ImportOutcome::Failed;
        }
    };

    let Some(path) = dialog.open_path() else {
        store.abandon_import(ticket);
        return ImportOutcome::Cancelled;
    };

    let bytes = match fs.read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            store.abandon_import(ticket);
            warn!(path = %path.display(), error = %e, "import read failed");
            sink.report(import_error_descriptor(tab, &ImportError::Io(e)));
            return ImportOutcome::Failed;
        }
    };

    match store.complete_import(ticket, &bytes) {
        Ok(summary) => {
            info!(%tab, path = %path.display(), entries = summary.entries, "imported");
            if config.warn_unresolved_aliases && !summary.unresolved_aliases.is_empty() {
                sink.report(ErrorDescriptor::warning(
                    "Unresolved library references",
                    format!(
                        "These expressions point at library entries that do not exist: {}",
                        summary
                            .unresolved_aliases
                            .iter()
                            .map(|name| format!("#{name}"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ));
            }
            ImportOutcome::Imported(summary)
        }
        Err(e) => {
            sink.report(import_error_descriptor(tab, &e));
            ImportOutcome::Failed
        }
    }
}

/// Ask where to save `tab` and write its exchange document there.
pub fn export_collection(
    store: &RuleStore,
    tab: Tab,
    dialog: &mut dyn FileDialog,
    fs: &dyn FileSystem,
    sink: &mut dyn ErrorSink,
    config: &EngineConfig,
) -> ExportOutcome {
    let Some(path) = dialog.save_path(&config.suggested_file_name(tab)) else {
        return ExportOutcome::Cancelled;
    };

    let json = match store.export_collection(tab).to_json_pretty() {
        Ok(json) => json,
        Err(e) => {
            sink.report(ErrorDescriptor::error("Could not export rules", e.to_string()));
            return ExportOutcome::Failed;
        }
    };

    match fs.write(&path, json.as_bytes()) {
        Ok(()) => {
            info!(%tab, path = %path.display(), "exported");
            ExportOutcome::Saved(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "export write failed");
            sink.report(ErrorDescriptor::error(
                "Could not save file",
                format!("{}: {}", path.display(), e),
            ));
            ExportOutcome::Failed
        }
    }
}

fn import_error_descriptor(tab: Tab, error: &ImportError) -> ErrorDescriptor {
    let header = match error {
        ImportError::Io(_) => "Could not read file",
        ImportError::Json(_) | ImportError::Schema(_) => "The file uploaded is malformed",
        ImportError::Store(StoreError::DraftPending(_)) => "Finish editing first",
        ImportError::Store(_) => "Import failed",
    };
    ErrorDescriptor::error(header, format!("{tab}: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cancelling;

    impl FileDialog for Cancelling {
        fn open_path(&mut self) -> Option<PathBuf> {
            None
        }

        fn save_path(&mut self, _suggested_name: &str) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn test_cancelled_dialog_is_silent() {
        let mut store = RuleStore::default();
        let mut sink: Vec<ErrorDescriptor> = Vec::new();
        let config = EngineConfig::default();

        let outcome = import_collection(
            &mut store,
            Tab::Library,
            &mut Cancelling,
            &StdFileSystem,
            &mut sink,
            &config,
        );
        assert_eq!(outcome, ImportOutcome::Cancelled);
        assert!(sink.is_empty());
        assert!(!store.is_import_pending(Tab::Library));

        let outcome = export_collection(
            &store,
            Tab::Library,
            &mut Cancelling,
            &StdFileSystem,
            &mut sink,
            &config,
        );
        assert_eq!(outcome, ExportOutcome::Cancelled);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_warning_descriptor_keeps_close_action() {
        let warning = ErrorDescriptor::warning("h", "t");
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.actions, vec![ErrorAction::close()]);
    }
}
