use std::path::{Path, PathBuf};

use dashmap::DashMap;

use super::UNKNOWN_NAME;

/// Service-name lookup seam, `getservbyport` semantics. The production
/// implementation scans a services(5) database file; tests substitute
/// counting fakes.
pub trait ServiceLookup: Send + Sync {
    /// Resolve (port, protocol) to a registered service name. `protocol`
    /// arrives already lowercased. `None` means no registration found.
    fn lookup(&self, port: u16, protocol: &str) -> Option<String>;
}

/// Lookup backed by a services(5) file, `/etc/services` by default.
///
/// The file is re-read on every call, like the libc routine it mirrors;
/// the session cache in [`ServiceResolver`] keeps that to at most one
/// read per distinct (port, protocol).
pub struct ServicesFile {
    path: PathBuf,
}

impl ServicesFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ServiceLookup for ServicesFile {
    fn lookup(&self, port: u16, protocol: &str) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let needle = format!("{}/{}", port, protocol);

        for line in content.lines() {
            // Strip comments, then expect "name  port/proto [aliases...]".
            let line = line.split('#').next().unwrap_or(line);
            let mut tokens = line.split_whitespace();
            let name = match tokens.next() {
                Some(n) => n,
                None => continue,
            };
            let port_proto = match tokens.next() {
                Some(p) => p,
                None => continue,
            };
            if port_proto.eq_ignore_ascii_case(&needle) {
                return Some(name.to_string());
            }
        }

        None
    }
}

/// Memoizing service-name resolver, keyed by (port, lowercased protocol).
///
/// The protocol is part of the key: the same port number may be
/// registered to different services on tcp and udp, and the two must be
/// resolved and cached independently.
pub struct ServiceResolver {
    lookup: Box<dyn ServiceLookup>,
    cache: DashMap<(u16, String), String>,
}

impl ServiceResolver {
    pub fn new(lookup: Box<dyn ServiceLookup>) -> Self {
        Self {
            lookup,
            cache: DashMap::new(),
        }
    }

    /// Resolve (port, protocol) to a service name, or `"unknown"`.
    ///
    /// Failed lookups and empty or whitespace-only names are normalized
    /// to `"unknown"` and cached like any other result.
    pub fn resolve(&self, port: u16, protocol: &str) -> String {
        let key = (port, protocol.to_ascii_lowercase());
        if let Some(hit) = self.cache.get(&key) {
            return hit.value().clone();
        }
        let name = match self.lookup.lookup(port, &key.1) {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNKNOWN_NAME.to_string(),
        };
        self.cache.insert(key, name.clone());
        name
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counting fake with a tiny fixed registry.
    struct FakeLookup {
        calls: AtomicUsize,
    }

    impl FakeLookup {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ServiceLookup for Arc<FakeLookup> {
        fn lookup(&self, port: u16, protocol: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match (port, protocol) {
                (22, "tcp") => Some("ssh".to_string()),
                (53, "udp") => Some("domain".to_string()),
                (53, "tcp") => Some("domain-tcp".to_string()),
                (99, "tcp") => Some("   ".to_string()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_resolve_returns_registered_name() {
        let resolver = ServiceResolver::new(Box::new(FakeLookup::new()));
        assert_eq!(resolver.resolve(22, "tcp"), "ssh");
    }

    #[test]
    fn test_lookup_runs_once_per_key() {
        let fake = FakeLookup::new();
        let resolver = ServiceResolver::new(Box::new(fake.clone()));

        assert_eq!(resolver.resolve(22, "tcp"), "ssh");
        assert_eq!(resolver.resolve(22, "tcp"), "ssh");
        assert_eq!(fake.calls(), 1);
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_protocols_cached_independently() {
        let fake = FakeLookup::new();
        let resolver = ServiceResolver::new(Box::new(fake.clone()));

        assert_eq!(resolver.resolve(53, "udp"), "domain");
        assert_eq!(resolver.resolve(53, "tcp"), "domain-tcp");
        assert_eq!(fake.calls(), 2);
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn test_protocol_case_folded_into_key() {
        let fake = FakeLookup::new();
        let resolver = ServiceResolver::new(Box::new(fake.clone()));

        assert_eq!(resolver.resolve(22, "TCP"), "ssh");
        assert_eq!(resolver.resolve(22, "tcp"), "ssh");
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn test_unregistered_port_cached_as_unknown() {
        let fake = FakeLookup::new();
        let resolver = ServiceResolver::new(Box::new(fake.clone()));

        assert_eq!(resolver.resolve(51515, "tcp"), UNKNOWN_NAME);
        assert_eq!(resolver.resolve(51515, "tcp"), UNKNOWN_NAME);
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn test_whitespace_only_name_normalized_to_unknown() {
        let resolver = ServiceResolver::new(Box::new(FakeLookup::new()));
        assert_eq!(resolver.resolve(99, "tcp"), UNKNOWN_NAME);
    }

    // ── ServicesFile ────────────────────────────────────────────

    fn services_fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp services file");
        writeln!(file, "# Network services, Internet style").unwrap();
        writeln!(file, "ssh             22/tcp").unwrap();
        writeln!(file, "domain          53/tcp").unwrap();
        writeln!(file, "domain          53/udp").unwrap();
        writeln!(file, "http            80/tcp          www      # WorldWideWeb").unwrap();
        writeln!(file).unwrap();
        file
    }

    #[test]
    fn test_services_file_lookup_hit() {
        let file = services_fixture();
        let lookup = ServicesFile::new(file.path());
        assert_eq!(lookup.lookup(22, "tcp"), Some("ssh".to_string()));
        assert_eq!(lookup.lookup(53, "udp"), Some("domain".to_string()));
    }

    #[test]
    fn test_services_file_ignores_comments_and_aliases() {
        let file = services_fixture();
        let lookup = ServicesFile::new(file.path());
        assert_eq!(lookup.lookup(80, "tcp"), Some("http".to_string()));
    }

    #[test]
    fn test_services_file_miss() {
        let file = services_fixture();
        let lookup = ServicesFile::new(file.path());
        assert_eq!(lookup.lookup(22, "udp"), None);
        assert_eq!(lookup.lookup(51515, "tcp"), None);
    }

    #[test]
    fn test_services_file_unreadable_is_a_miss() {
        let lookup = ServicesFile::new("/nonexistent/services");
        assert_eq!(lookup.lookup(22, "tcp"), None);
    }
}
