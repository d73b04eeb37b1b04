// Domain-driven module structure for the ufwlog parsing agent.

// Core engine
pub mod hasher;
pub mod parser;
pub mod resolve;

// Ambient layer
pub mod config;
pub mod runtime;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use parser::model::{FirewallEvent, ParseError};
pub use parser::session::{ParseSession, SessionState, SessionStats};
pub use source::{LogSource, SourceError};
