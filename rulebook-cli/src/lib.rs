// All rule handling is in rulebook-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod console;
pub mod logging;

// Re-export core types for convenience
pub use rulebook_core::*;

// Re-export CLI utilities
pub use console::{ArgDialog, ConsoleErrorSink};
