//! Enrichment resolvers — reverse-DNS hostnames and registered service
//! names, memoized for the lifetime of a parse session.
//!
//! Both resolvers follow the same policy: the expensive lookup runs at
//! most once per distinct key, failures are normalized to the
//! [`UNKNOWN_NAME`] placeholder rather than surfaced as errors, and
//! negative results are cached exactly like positive ones (no retry
//! within a session).

pub mod host;
pub mod service;

// Re-export commonly used types
pub use host::{HostLookup, HostResolver, ReverseDns};
pub use service::{ServiceLookup, ServiceResolver, ServicesFile};

/// Placeholder returned (and cached) for every failed resolution.
pub const UNKNOWN_NAME: &str = "unknown";
