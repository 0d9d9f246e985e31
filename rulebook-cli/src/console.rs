// Terminal stand-ins for the editor's dialogs and error popups.

use rulebook_core::workflow::{ErrorDescriptor, ErrorSink, FileDialog, Severity};
use std::path::PathBuf;

/// "Dialog" answered up front by a command-line argument. Without one, saves
/// go to the suggested name in the working directory and opens are cancelled.
#[derive(Debug, Clone, Default)]
pub struct ArgDialog {
    path: Option<PathBuf>,
}

impl ArgDialog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl FileDialog for ArgDialog {
    fn open_path(&mut self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn save_path(&mut self, suggested_name: &str) -> Option<PathBuf> {
        Some(
            self.path
                .clone()
                .unwrap_or_else(|| PathBuf::from(suggested_name)),
        )
    }
}

/// Prints operator-facing errors to stderr and remembers whether any were fatal.
#[derive(Debug, Default)]
pub struct ConsoleErrorSink {
    errors: usize,
    warnings: usize,
}

impl ConsoleErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }
}

impl ErrorSink for ConsoleErrorSink {
    fn report(&mut self, error: ErrorDescriptor) {
        match error.severity {
            Severity::Error => {
                self.errors += 1;
                eprintln!("❌ {}", error.header);
            }
            Severity::Warning => {
                self.warnings += 1;
                eprintln!("⚠️  {}", error.header);
            }
        }
        eprintln!("   {}", error.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_falls_back_to_suggested_name() {
        let mut dialog = ArgDialog::new(None);
        assert_eq!(dialog.open_path(), None);
        assert_eq!(
            dialog.save_path("rulebook_library.json"),
            Some(PathBuf::from("rulebook_library.json"))
        );
    }

    #[test]
    fn test_sink_counts_by_severity() {
        let mut sink = ConsoleErrorSink::new();
        sink.report(ErrorDescriptor::warning("w", "text"));
        assert!(!sink.has_errors());
        sink.report(ErrorDescriptor::error("e", "text"));
        assert!(sink.has_errors());
        assert_eq!(sink.warnings(), 1);
    }
}
