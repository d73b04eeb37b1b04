/// UFW log parsing module
///
/// Converts raw packet-filter log lines into structured, enriched
/// firewall events.
///
/// # Architecture
///
/// - `extract.rs`: Field extraction against the fixed log-line grammar
/// - `month.rs`: Month abbreviation table
/// - `model.rs`: Record type and error taxonomy
/// - `session.rs`: Per-file parse session orchestrating extraction,
///   enrichment (hostname / service-name resolution) and identity hashing
///
/// # Failure model
///
/// A line that does not fit the grammar is a recoverable per-line failure,
/// never a fatal one: `parse_all` skips it, `parse_one` reports it. Only a
/// source that cannot be read at all aborts a run (see `crate::source`).
pub mod extract;
pub mod model;
pub mod month;
pub mod session;

// Re-export commonly used types
pub use model::{FirewallEvent, ParseError};
pub use session::{ParseSession, SessionState, SessionStats};
