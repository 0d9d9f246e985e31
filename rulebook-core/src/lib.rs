// Rulebook Core Library
//
// Maintains a library of reusable regex patterns and composes it into
// expression and section rule sets, resolving library references, tracking
// which rules are currently usable, and reading/writing the exchange format.

pub mod types;
pub mod error;
pub mod pattern;
pub mod color;
pub mod resolver;
pub mod validator;
pub mod exchange;
pub mod config;
pub mod store;
pub mod session;
pub mod workflow;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::{ImportError, SchemaError, SchemaProblem, SessionError, StoreError};
pub use config::EngineConfig;
pub use store::{ImportSummary, ImportTicket, RuleStore};
pub use session::{RuleExport, SessionDocument};
pub use exchange::{from_exchange_format, to_exchange_format, ExchangeDocument};
pub use workflow::{ErrorDescriptor, ErrorSink, FileDialog, FileSystem, StdFileSystem};
