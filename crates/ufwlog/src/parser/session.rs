//! Parse session — drives extraction and enrichment over a log source.

use chrono::{Datelike, FixedOffset, TimeZone};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::hasher::RecordHasher;
use crate::resolve::{HostResolver, ReverseDns, ServiceResolver, ServicesFile};
use crate::source::LogSource;

use super::extract::extract;
use super::model::{FirewallEvent, ParseError};
use super::month::month_number;

/// Session lifecycle. `parse_one` moves an idle session to `Parsing`;
/// only a completed `parse_all` reaches `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Parsing,
    Done,
}

/// Snapshot of a session's line counters and cache sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub lines: u64,
    pub matched: u64,
    pub mismatched: u64,
    pub unknown_month: u64,
    pub hosts_cached: usize,
    pub services_cached: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    lines: u64,
    matched: u64,
    mismatched: u64,
    unknown_month: u64,
}

/// One parsing run over a log source, owning its enrichment caches.
///
/// The record year is derived once from the source file's modification
/// time at the configured UTC offset — the log grammar carries no year.
/// Every record in a session therefore shares that year, even when the
/// file actually spans a year boundary; that approximation is inherited
/// from the log format, not something the parser can recover from the
/// lines themselves.
///
/// Caches live as long as the session: re-running `parse_all` resets the
/// counters but keeps every resolved hostname and service name.
pub struct ParseSession {
    source: LogSource,
    year: i32,
    offset: FixedOffset,
    hosts: HostResolver,
    services: ServiceResolver,
    hasher: RecordHasher,
    state: SessionState,
    counters: Counters,
}

impl ParseSession {
    /// Session with production resolvers built from the configuration.
    pub fn new(source: LogSource, config: &Config) -> Self {
        let hosts = if config.resolver.reverse_dns {
            HostResolver::new(Box::new(ReverseDns))
        } else {
            HostResolver::disabled()
        };
        let services =
            ServiceResolver::new(Box::new(ServicesFile::new(&config.resolver.services_path)));
        Self::with_resolvers(source, config, hosts, services)
    }

    /// Session with caller-supplied resolvers (fakes in tests, custom
    /// lookups in embedders).
    pub fn with_resolvers(
        source: LogSource,
        config: &Config,
        hosts: HostResolver,
        services: ServiceResolver,
    ) -> Self {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is always valid"));
        let year = source.modified().with_timezone(&offset).year();
        let hasher = RecordHasher::new(config.hasher.algorithm, config.hasher.salt_policy());

        Self {
            source,
            year,
            offset,
            hosts,
            services,
            hasher,
            state: SessionState::Idle,
            counters: Counters::default(),
        }
    }

    /// Parse every line in order and return the successful records,
    /// ascending by original line position.
    ///
    /// Lines that fail stay out of the output and are logged at debug
    /// level. After all results are collected, the record belonging to
    /// the final input line is unconditionally discarded: a source split
    /// on `\n` ends in a trailing artifact line (usually empty), and the
    /// truncation applies whether or not that line happened to parse.
    pub fn parse_all(&mut self) -> Vec<FirewallEvent> {
        self.state = SessionState::Parsing;
        self.counters = Counters::default();

        let total = self.source.len();
        let mut events = Vec::new();

        for index in 0..total {
            let result = match self.source.line(index) {
                Some(line) => self.parse_line(index, line),
                None => break,
            };
            match result {
                Ok(event) => {
                    self.counters.lines += 1;
                    self.counters.matched += 1;
                    events.push(event);
                }
                Err(err) => {
                    self.record_failure(&err);
                    debug!("skipping line {}: {}", index, err);
                }
            }
        }

        let last_is_trailing = events
            .last()
            .map_or(false, |last| total > 0 && last.line == total - 1);
        if last_is_trailing {
            events.pop();
        }

        self.state = SessionState::Done;
        events
    }

    /// Parse a single line by original position. No trailing-line
    /// discard applies here; the last line of the source is reachable.
    pub fn parse_one(&mut self, index: usize) -> Result<FirewallEvent, ParseError> {
        if self.state == SessionState::Idle {
            self.state = SessionState::Parsing;
        }

        let result = match self.source.line(index) {
            Some(line) => self.parse_line(index, line),
            None => Err(ParseError::IndexOutOfRange {
                index,
                len: self.source.len(),
            }),
        };
        match &result {
            Ok(_) => {
                self.counters.lines += 1;
                self.counters.matched += 1;
            }
            Err(err) => self.record_failure(err),
        }
        result
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Year applied to every record in this session.
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            lines: self.counters.lines,
            matched: self.counters.matched,
            mismatched: self.counters.mismatched,
            unknown_month: self.counters.unknown_month,
            hosts_cached: self.hosts.len(),
            services_cached: self.services.len(),
        }
    }

    fn record_failure(&mut self, err: &ParseError) {
        self.counters.lines += 1;
        match err {
            ParseError::UnknownMonth(_) => self.counters.unknown_month += 1,
            _ => self.counters.mismatched += 1,
        }
    }

    /// Extraction + enrichment pipeline for one line.
    fn parse_line(&self, index: usize, line: &str) -> Result<FirewallEvent, ParseError> {
        let caps = extract(line).ok_or(ParseError::LineMismatch { index })?;

        let month = month_number(caps.month)
            .ok_or_else(|| ParseError::UnknownMonth(caps.month.to_string()))?;
        let day = number(caps.day, index)?;
        let (hour, minute, second) = clock(caps.time, index)?;
        let source_port: u16 = number(caps.src_port, index)?;
        let destination_port: u16 = number(caps.dst_port, index)?;

        // The clock fields are stored as captured; only the derived Unix
        // timestamp goes absent when they form no real date-time.
        let timestamp = self
            .offset
            .with_ymd_and_hms(self.year, month, day, hour, minute, second)
            .single()
            .map(|dt| dt.timestamp());

        Ok(FirewallEvent {
            line: index,
            year: self.year,
            month,
            day,
            hour,
            minute,
            second,
            timestamp,
            hostname: caps.hostname.to_string(),
            action: caps.action.to_string(),
            interface_in: caps.iface_in.to_string(),
            interface_out: caps.iface_out.to_string(),
            mac_address: caps.mac.to_string(),
            source_ip: caps.src_ip.to_string(),
            source_name: self.hosts.resolve(caps.src_ip),
            destination_ip: caps.dst_ip.to_string(),
            destination_name: self.hosts.resolve(caps.dst_ip),
            protocol: caps.protocol.to_string(),
            source_port,
            source_port_name: self.services.resolve(source_port, caps.protocol),
            destination_port,
            destination_port_name: self.services.resolve(destination_port, caps.protocol),
            hash: self.hasher.hash(caps.matched),
        })
    }
}

/// Parse a validated numeric capture. Values the target type cannot hold
/// (a five-digit port above 65535) degrade to a line mismatch.
fn number<T: std::str::FromStr>(field: &str, index: usize) -> Result<T, ParseError> {
    field
        .parse()
        .map_err(|_| ParseError::LineMismatch { index })
}

fn clock(time: &str, index: usize) -> Result<(u32, u32, u32), ParseError> {
    let mut parts = time.split(':');
    let hour = number(parts.next().unwrap_or(""), index)?;
    let minute = number(parts.next().unwrap_or(""), index)?;
    let second = number(parts.next().unwrap_or(""), index)?;
    Ok((hour, minute, second))
}
