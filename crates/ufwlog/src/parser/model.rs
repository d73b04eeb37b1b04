use serde::Serialize;
use thiserror::Error;

/// Per-line parse failures. All variants are recoverable: `parse_all`
/// skips the line, `parse_one` returns the error to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {index} does not match the firewall log grammar")]
    LineMismatch { index: usize },

    #[error("unknown month abbreviation: {0}")]
    UnknownMonth(String),

    #[error("line index {index} is out of range for a {len}-line source")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One enriched firewall event, assembled from a single matched log line.
///
/// Created fresh per matched line and never mutated after assembly. The
/// `year` is not carried by the log format; it comes from the source
/// file's modification time (see [`ParseSession`](super::ParseSession)).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirewallEvent {
    /// Original line position within the source.
    pub line: usize,

    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Unix timestamp assembled from the fields above at the session's
    /// UTC offset. `None` when they do not form a real date-time (the
    /// grammar admits e.g. `99:99:99`).
    pub timestamp: Option<i64>,

    /// Host that emitted the log line.
    pub hostname: String,
    /// Action tag, e.g. `UFW BLOCK`.
    pub action: String,

    pub interface_in: String,
    /// May be empty: outbound traffic has no input interface and vice versa.
    pub interface_out: String,
    pub mac_address: String,

    pub source_ip: String,
    /// Reverse-resolved name for `source_ip`, or `"unknown"`.
    pub source_name: String,
    pub destination_ip: String,
    /// Reverse-resolved name for `destination_ip`, or `"unknown"`.
    pub destination_name: String,

    pub protocol: String,
    pub source_port: u16,
    /// Registered service name for (source_port, protocol), or `"unknown"`.
    pub source_port_name: String,
    pub destination_port: u16,
    /// Registered service name for (destination_port, protocol), or `"unknown"`.
    pub destination_port_name: String,

    /// Identity hash of the matched text, for downstream storage and
    /// deduplication.
    pub hash: String,
}
