use std::net::IpAddr;

use dashmap::DashMap;

use super::UNKNOWN_NAME;

/// Reverse hostname lookup seam. The production implementation performs
/// reverse DNS; tests substitute counting fakes.
pub trait HostLookup: Send + Sync {
    /// Resolve an address to a hostname. `None` means the lookup failed
    /// or timed out.
    fn lookup(&self, addr: IpAddr) -> Option<String>;
}

/// Reverse DNS via the system resolver (the `gethostbyaddr` equivalent).
pub struct ReverseDns;

impl HostLookup for ReverseDns {
    fn lookup(&self, addr: IpAddr) -> Option<String> {
        dns_lookup::lookup_addr(&addr).ok()
    }
}

/// Lookup that never resolves. Used when reverse DNS is disabled in the
/// configuration; every address then enriches to `"unknown"`.
struct Disabled;

impl HostLookup for Disabled {
    fn lookup(&self, _addr: IpAddr) -> Option<String> {
        None
    }
}

/// Memoizing reverse-hostname resolver, keyed by the raw IP capture.
///
/// Keying by the raw string (rather than a parsed `IpAddr`) means even
/// syntactically invalid captures are memoized: the grammar admits
/// digit-and-dot sequences like `10.0.0.999` that are not addresses, and
/// those still must not re-run the lookup per line.
pub struct HostResolver {
    lookup: Box<dyn HostLookup>,
    cache: DashMap<String, String>,
}

impl HostResolver {
    pub fn new(lookup: Box<dyn HostLookup>) -> Self {
        Self {
            lookup,
            cache: DashMap::new(),
        }
    }

    /// Resolver with reverse DNS switched off.
    pub fn disabled() -> Self {
        Self::new(Box::new(Disabled))
    }

    /// Resolve an IP capture to a hostname, or `"unknown"`.
    ///
    /// The first call per distinct capture pays the lookup cost; every
    /// later call is served from the session cache, including negative
    /// results.
    pub fn resolve(&self, ip: &str) -> String {
        if let Some(hit) = self.cache.get(ip) {
            return hit.value().clone();
        }
        let name = self.lookup_name(ip);
        self.cache.insert(ip.to_string(), name.clone());
        name
    }

    fn lookup_name(&self, ip: &str) -> String {
        let addr: IpAddr = match ip.parse() {
            Ok(a) => a,
            Err(_) => return UNKNOWN_NAME.to_string(),
        };
        match self.lookup.lookup(addr) {
            // A resolver that answers with an address has effectively
            // failed; normalize that the same way as an error.
            Some(name) if !name.trim().is_empty() && name.parse::<IpAddr>().is_err() => name,
            _ => UNKNOWN_NAME.to_string(),
        }
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
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counting fake: answers from a fixed value and records every call.
    struct FakeLookup {
        calls: AtomicUsize,
        answer: Option<String>,
    }

    impl FakeLookup {
        fn answering(answer: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                answer: answer.map(str::to_string),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HostLookup for Arc<FakeLookup> {
        fn lookup(&self, _addr: IpAddr) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[test]
    fn test_resolve_returns_lookup_result() {
        let fake = FakeLookup::answering(Some("gw.example.net"));
        let resolver = HostResolver::new(Box::new(fake));
        assert_eq!(resolver.resolve("10.0.0.1"), "gw.example.net");
    }

    #[test]
    fn test_lookup_runs_once_per_address() {
        let fake = FakeLookup::answering(Some("gw.example.net"));
        let resolver = HostResolver::new(Box::new(fake.clone()));

        assert_eq!(resolver.resolve("10.0.0.1"), "gw.example.net");
        assert_eq!(resolver.resolve("10.0.0.1"), "gw.example.net");
        assert_eq!(resolver.resolve("10.0.0.1"), "gw.example.net");
        assert_eq!(fake.calls(), 1);
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_distinct_addresses_each_pay_one_lookup() {
        let fake = FakeLookup::answering(Some("gw.example.net"));
        let resolver = HostResolver::new(Box::new(fake.clone()));

        resolver.resolve("10.0.0.1");
        resolver.resolve("10.0.0.2");
        resolver.resolve("10.0.0.1");
        assert_eq!(fake.calls(), 2);
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn test_failed_lookup_cached_as_unknown() {
        let fake = FakeLookup::answering(None);
        let resolver = HostResolver::new(Box::new(fake.clone()));

        assert_eq!(resolver.resolve("10.0.0.1"), UNKNOWN_NAME);
        // Negative result is cached: no retry.
        assert_eq!(resolver.resolve("10.0.0.1"), UNKNOWN_NAME);
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn test_ip_shaped_answer_normalized_to_unknown() {
        // A resolver with no PTR record hands the address straight back.
        let fake = FakeLookup::answering(Some("10.0.0.1"));
        let resolver = HostResolver::new(Box::new(fake));
        assert_eq!(resolver.resolve("10.0.0.1"), UNKNOWN_NAME);
    }

    #[test]
    fn test_unparseable_capture_is_unknown_without_lookup() {
        let fake = FakeLookup::answering(Some("gw.example.net"));
        let resolver = HostResolver::new(Box::new(fake.clone()));

        assert_eq!(resolver.resolve("10.0.0.999"), UNKNOWN_NAME);
        assert_eq!(fake.calls(), 0);
        // Still memoized.
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_disabled_resolver_always_unknown() {
        let resolver = HostResolver::disabled();
        assert_eq!(resolver.resolve("10.0.0.1"), UNKNOWN_NAME);
        assert!(!resolver.is_empty());
    }
}
