//! Field extraction against the fixed UFW log-line grammar.
//!
//! A line looks like:
//!
//! ```text
//! Mar 14 08:21:05 myhost kernel: [UFW BLOCK] IN=eth0 OUT= MAC=00:11:22:33:44:55
//! SRC=10.0.0.5 DST=10.0.0.1 LEN=60 ... PROTO=TCP SPT=51515 DPT=22 ...
//! ```
//!
//! Extraction is all-or-nothing: either every field is present with its
//! expected shape, or the line yields no captures at all. Each field has
//! its own shape helper so malformed lines can be diagnosed (and tested)
//! per field rather than against one monolithic pattern.

/// The 13 raw field captures of one matched line, borrowed from the line,
/// plus the full matched text used for identity hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCaptures<'a> {
    pub month: &'a str,
    pub day: &'a str,
    pub time: &'a str,
    pub hostname: &'a str,
    pub action: &'a str,
    pub iface_in: &'a str,
    pub iface_out: &'a str,
    pub mac: &'a str,
    pub src_ip: &'a str,
    pub dst_ip: &'a str,
    pub protocol: &'a str,
    pub src_port: &'a str,
    pub dst_port: &'a str,
    /// The full matched text (the whole line).
    pub matched: &'a str,
}

/// Attempt to extract the firewall event fields from one raw line.
///
/// Returns `None` when the line does not fit the grammar; the caller
/// treats that as a recoverable per-line failure. The month token and the
/// bracketed action tag match case-insensitively; everything else is
/// literal.
pub fn extract(line: &str) -> Option<LineCaptures<'_>> {
    // Header: "<Month> <Day> <HH:MM:SS> <hostname> "
    let (month, rest) = line.split_once(' ')?;
    if !is_month_token(month) {
        return None;
    }
    let (day, rest) = rest.split_once(' ')?;
    if !is_day(day) {
        return None;
    }
    let (time, rest) = rest.split_once(' ')?;
    if !is_clock(time) {
        return None;
    }
    let (hostname, rest) = rest.split_once(' ')?;
    if !is_hostname(hostname) {
        return None;
    }

    // Bracketed action tag. Kernel lines may carry an uptime stamp like
    // "[ 839.4402]" first; skip brackets until one opens with "UFW".
    let (action, rest) = action_tag(rest)?;

    // Keyed fields, in grammar order. Unrecognised keys between them
    // (LEN=, TTL=, ...) are skipped over.
    let (iface_in, rest) = keyed_value(rest, "IN=")?;
    if !is_interface(iface_in, 2) {
        return None;
    }
    let (iface_out, rest) = keyed_value(rest, "OUT=")?;
    if !is_interface(iface_out, 0) {
        return None;
    }
    let (mac, rest) = keyed_value(rest, "MAC=")?;
    if !is_mac(mac) {
        return None;
    }
    let (src_ip, rest) = keyed_value(rest, "SRC=")?;
    if !is_ip(src_ip) {
        return None;
    }
    let (dst_ip, rest) = keyed_value(rest, "DST=")?;
    if !is_ip(dst_ip) {
        return None;
    }
    let (protocol, rest) = keyed_value(rest, "PROTO=")?;
    if !is_protocol(protocol) {
        return None;
    }
    let (src_port, rest) = keyed_value(rest, "SPT=")?;
    if !is_port(src_port) {
        return None;
    }
    let (dst_port, _rest) = keyed_value(rest, "DPT=")?;
    if !is_port(dst_port) {
        return None;
    }

    Some(LineCaptures {
        month,
        day,
        time,
        hostname,
        action,
        iface_in,
        iface_out,
        mac,
        src_ip,
        dst_ip,
        protocol,
        src_port,
        dst_port,
        matched: line,
    })
}

/// Find the bracketed action tag: the first `[...]` whose content starts
/// with `UFW` (case-insensitive). Returns the tag content and the text
/// after the closing bracket.
fn action_tag(text: &str) -> Option<(&str, &str)> {
    let mut from = 0;
    while let Some(open) = text[from..].find('[').map(|i| i + from) {
        let close = text[open..].find(']').map(|i| i + open)?;
        let tag = &text[open + 1..close];
        if tag.len() >= 3 && tag.as_bytes()[..3].eq_ignore_ascii_case(b"UFW") {
            return Some((tag, &text[close + 1..]));
        }
        from = open + 1;
    }
    None
}

/// Find `key` at a token boundary in `text` and return its value (which
/// runs to the next ASCII whitespace and may be empty) together with the
/// text after the value. Searching from a boundary keeps `IN=` from
/// matching inside another token.
fn keyed_value<'a>(text: &'a str, key: &str) -> Option<(&'a str, &'a str)> {
    let mut from = 0;
    loop {
        let at = text[from..].find(key)? + from;
        if at == 0 || text.as_bytes()[at - 1].is_ascii_whitespace() {
            let val_start = at + key.len();
            let val_end = text[val_start..]
                .find(|c: char| c.is_ascii_whitespace())
                .map(|i| val_start + i)
                .unwrap_or(text.len());
            return Some((&text[val_start..val_end], &text[val_end..]));
        }
        from = at + 1;
    }
}

// ── Field shape helpers ─────────────────────────────────────

fn is_month_token(s: &str) -> bool {
    s.len() == 3 && s.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_day(s: &str) -> bool {
    (1..=2).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_clock(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 8
        && b[2] == b':'
        && b[5] == b':'
        && [0, 1, 3, 4, 6, 7].iter().all(|&i| b[i].is_ascii_digit())
}

fn is_hostname(s: &str) -> bool {
    s.len() >= 3 && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn is_interface(s: &str, min: usize) -> bool {
    (min..=9).contains(&s.len())
        && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn is_mac(s: &str) -> bool {
    s.len() >= 4
        && s.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b':')
}

fn is_ip(s: &str) -> bool {
    s.len() >= 4 && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

fn is_protocol(s: &str) -> bool {
    s.len() == 3 && s.bytes().all(|b| b.is_ascii_uppercase())
}

fn is_port(s: &str) -> bool {
    (1..=5).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}
