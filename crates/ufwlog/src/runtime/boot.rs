//! Boot — logging init, config load, parse run, record output.

use std::io::Write;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::parser::ParseSession;
use crate::source::LogSource;

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ufwlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config, open the log file named on the command line, run a parse
/// session over it, and emit one JSON object per record on stdout.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: ufwlog <logfile>")?;

    let config = Config::load()?;
    config.validate()?;
    info!(
        "Parsing {} (hash={}, reverse_dns={})",
        path,
        config.hasher.algorithm.as_str(),
        config.resolver.reverse_dns
    );

    let source = LogSource::open(&path)?;
    let mut session = ParseSession::new(source, &config);
    let events = session.parse_all();

    let stats = session.stats();
    info!(
        "Parsed {} records from {} lines ({} mismatched, {} unknown month)",
        events.len(),
        stats.lines,
        stats.mismatched,
        stats.unknown_month
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in &events {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }

    Ok(())
}
