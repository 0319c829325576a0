//! The decision pipeline.
//!
//! Checks run in a fixed order and stop at the first definitive answer:
//!
//! 1. parse the address (invalid → deny)
//! 2. loopback/link-local → allow, unspecified/multicast → deny
//! 3. static IP or CIDR whitelist → allow, never cached
//! 4. decision cache → cached value verbatim
//! 5. geo lookup → policy table → allow/deny, cached for the TTL
//!
//! Steps 1-3 never touch the cache or the network.

use crate::flight::{FlightGuard, InFlight, Join};
use arc_swap::ArcSwap;
use geowl_cache::{CacheResult, DecisionCache, MemoryCache};
use geowl_core::{
    classify, is_bypass, is_reject, AccessPolicy, Address, GeoLookup, Reason, StaticMatch,
    Verdict,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Default lifetime of a cached decision (3 hours)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 180);

/// Default bound on a single geo lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on a single cache round trip
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(1);

/// Decides whether client addresses may pass
///
/// Cheap to clone; clones share policy, cache, resolver and in-flight
/// lookups.
#[derive(Clone)]
pub struct Gatekeeper {
    inner: Arc<GateInner>,
}

struct GateInner {
    policy: ArcSwap<AccessPolicy>,
    cache: Arc<dyn DecisionCache>,
    resolver: Arc<dyn GeoLookup>,
    ttl: Duration,
    lookup_timeout: Duration,
    cache_timeout: Duration,
    flights: InFlight,
}

impl std::fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gatekeeper")
            .field("cache", &self.inner.cache.backend())
            .field("resolver", &self.inner.resolver.name())
            .field("ttl", &self.inner.ttl)
            .field("lookup_timeout", &self.inner.lookup_timeout)
            .finish_non_exhaustive()
    }
}

impl Gatekeeper {
    /// Create a builder for the given policy and geo resolver
    #[must_use]
    pub fn builder(policy: AccessPolicy, resolver: Arc<dyn GeoLookup>) -> GatekeeperBuilder {
        GatekeeperBuilder::new(policy, resolver)
    }

    /// Returns true if the client at `raw` may pass
    pub async fn decide(&self, raw: &str) -> bool {
        self.evaluate(raw).await.allowed
    }

    /// Decide for `raw` and report why
    #[instrument(skip(self))]
    pub async fn evaluate(&self, raw: &str) -> Verdict {
        let addr = match classify(raw) {
            Ok(addr) => addr,
            Err(e) => {
                warn!(error = %e, "BLOCK - not an IP address");
                return Verdict::deny(Reason::InvalidAddress);
            }
        };

        if is_bypass(&addr) {
            info!(addr = %addr, "OK - loopback or link-local");
            return Verdict::allow(Reason::Bypass);
        }
        if is_reject(&addr) {
            info!(addr = %addr, "BLOCK - unspecified or multicast");
            return Verdict::deny(Reason::Rejected);
        }

        let policy = self.inner.policy.load_full();
        match policy.whitelist.matches(&addr) {
            Some(StaticMatch::Exact) => {
                info!(addr = %addr, "OK - in IP whitelist");
                return Verdict::allow(Reason::StaticAddress);
            }
            Some(StaticMatch::Range(range)) => {
                info!(addr = %addr, range = %range, "OK - in CIDR whitelist");
                return Verdict::allow(Reason::StaticRange);
            }
            None => debug!(addr = %addr, "not in static whitelists"),
        }

        match self.bounded(self.inner.cache.get(addr.canonical())).await {
            Ok(Some(decision)) => {
                debug!(addr = %addr, decision, "cache hit");
                return Verdict::cached(decision);
            }
            Ok(None) => debug!(addr = %addr, "cache miss"),
            Err(e) => warn!(addr = %addr, error = %e, "cache unavailable, deciding afresh"),
        }

        if policy.geo.is_empty() {
            info!(addr = %addr, "BLOCK - not in IP whitelists and no geo whitelist");
            return Verdict::deny(Reason::NoGeoPolicy);
        }

        self.resolve_shared(addr).await
    }

    /// Swap in a new policy snapshot
    ///
    /// Requests already past the whitelist check finish against the old
    /// snapshot. Cached geo decisions are kept until they expire.
    pub fn replace_policy(&self, policy: AccessPolicy) {
        self.inner.policy.store(Arc::new(policy));
        info!("access policy replaced");
    }

    /// The current policy snapshot
    #[must_use]
    pub fn policy(&self) -> Arc<AccessPolicy> {
        self.inner.policy.load_full()
    }

    /// Name of the cache backend in use
    #[must_use]
    pub fn cache_backend(&self) -> &'static str {
        self.inner.cache.backend()
    }

    /// Lifetime of cached decisions
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Number of geo lookups currently running
    #[must_use]
    pub fn lookups_in_flight(&self) -> usize {
        self.inner.flights.len()
    }

    /// Run or join the geo lookup for `addr`
    ///
    /// The lookup and its cache write run on a spawned task, so they finish
    /// even if every caller has gone away.
    async fn resolve_shared(&self, addr: Address) -> Verdict {
        let mut rx = match self.inner.flights.join(addr.canonical()) {
            Join::Follower(rx) => {
                debug!(addr = %addr, "joining in-flight geo lookup");
                rx
            }
            Join::Leader(rx) => {
                let gate = self.clone();
                tokio::spawn(async move {
                    let key = addr.canonical().to_string();
                    let guard = FlightGuard::new(&gate.inner.flights, &key);
                    let verdict = gate.resolve_and_cache(&addr).await;
                    guard.complete(verdict);
                });
                rx
            }
        };

        rx.recv().await.unwrap_or_else(|_| {
            error!("geo lookup task ended without a verdict");
            Verdict::deny(Reason::LookupFailed)
        })
    }

    async fn resolve_and_cache(&self, addr: &Address) -> Verdict {
        let verdict = self.resolve(addr).await;

        let put = self
            .inner
            .cache
            .put(addr.canonical(), verdict.allowed, self.inner.ttl);
        match self.bounded(put).await {
            Ok(()) => debug!(
                addr = %addr,
                decision = verdict.allowed,
                backend = self.inner.cache.backend(),
                "decision cached"
            ),
            Err(e) => warn!(addr = %addr, error = %e, "failed to cache decision"),
        }

        verdict
    }

    async fn resolve(&self, addr: &Address) -> Verdict {
        let lookup = tokio::time::timeout(
            self.inner.lookup_timeout,
            self.inner.resolver.resolve(addr),
        )
        .await;

        let geo = match lookup {
            Ok(Ok(geo)) => geo,
            Ok(Err(e)) => {
                error!(addr = %addr, error = %e, "BLOCK - unable to get geo info");
                return Verdict::deny(Reason::LookupFailed);
            }
            Err(_) => {
                error!(
                    addr = %addr,
                    timeout = ?self.inner.lookup_timeout,
                    "BLOCK - geo lookup timed out"
                );
                return Verdict::deny(Reason::LookupFailed);
            }
        };

        let Some(country) = geo.country_code() else {
            warn!(addr = %addr, "BLOCK - geo info has no country code");
            return Verdict::deny(Reason::LookupFailed);
        };

        let region = geo.region();
        let verdict = Verdict::from(self.inner.policy.load().geo.evaluate(country, region));
        if verdict.allowed {
            info!(addr = %addr, country, region, "OK - location whitelisted");
        } else {
            info!(
                addr = %addr,
                country,
                region,
                reason = %verdict.reason,
                "BLOCK - location not whitelisted"
            );
        }
        verdict
    }

    /// Bound a cache round trip; a slow backend counts as unavailable
    async fn bounded<T>(&self, op: impl Future<Output = CacheResult<T>>) -> CacheResult<T> {
        tokio::time::timeout(self.inner.cache_timeout, op)
            .await
            .unwrap_or(Err(geowl_cache::CacheError::Timeout(self.inner.cache_timeout)))
    }
}

/// Builder for configuring a [`Gatekeeper`]
pub struct GatekeeperBuilder {
    policy: AccessPolicy,
    resolver: Arc<dyn GeoLookup>,
    cache: Option<Arc<dyn DecisionCache>>,
    ttl: Duration,
    lookup_timeout: Duration,
    cache_timeout: Duration,
}

impl GatekeeperBuilder {
    /// Create a new builder with default settings and an in-process cache
    #[must_use]
    pub fn new(policy: AccessPolicy, resolver: Arc<dyn GeoLookup>) -> Self {
        Self {
            policy,
            resolver,
            cache: None,
            ttl: DEFAULT_CACHE_TTL,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    /// Set the decision cache backend
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn DecisionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set how long decisions stay cached
    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the bound on a single geo lookup
    #[must_use]
    pub const fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Set the bound on a single cache round trip
    #[must_use]
    pub const fn cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    /// Build the gatekeeper
    #[must_use]
    pub fn build(self) -> Gatekeeper {
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::new()) as Arc<dyn DecisionCache>);

        Gatekeeper {
            inner: Arc::new(GateInner {
                policy: ArcSwap::from_pointee(self.policy),
                cache,
                resolver: self.resolver,
                ttl: self.ttl,
                lookup_timeout: self.lookup_timeout,
                cache_timeout: self.cache_timeout,
                flights: InFlight::default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geowl_cache::{CacheError, MockClock};
    use geowl_core::{
        AddressRange, GeoLookupResult, GeoPolicyTable, GeoRule, GeoWlError, StaticWhitelist,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// Resolver answering from a fixed table, counting calls
    #[derive(Default)]
    struct FakeResolver {
        answers: HashMap<String, GeoLookupResult>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FakeResolver {
        fn with(mut self, addr: &str, country: &str, region: Option<&str>) -> Self {
            self.answers
                .insert(addr.to_string(), GeoLookupResult::new(country, region));
            self
        }

        /// Answer for `addr` with a region but no usable country code
        fn without_country(mut self, addr: &str) -> Self {
            let answer = GeoLookupResult {
                region: Some("California".into()),
                ..GeoLookupResult::default()
            };
            self.answers.insert(addr.to_string(), answer);
            self
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GeoLookup for FakeResolver {
        async fn resolve(&self, addr: &Address) -> geowl_core::Result<GeoLookupResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.answers
                .get(addr.canonical())
                .cloned()
                .ok_or_else(|| GeoWlError::Status { code: 404 })
        }
    }

    /// Cache wrapper counting calls, optionally failing every call
    struct RecordingCache {
        inner: MemoryCache,
        gets: AtomicUsize,
        puts: AtomicUsize,
        broken: bool,
    }

    impl RecordingCache {
        fn new(clock: &MockClock) -> Self {
            Self {
                inner: MemoryCache::with_clock(Arc::new(clock.clone())),
                gets: AtomicUsize::new(0),
                puts: AtomicUsize::new(0),
                broken: false,
            }
        }

        fn broken(clock: &MockClock) -> Self {
            Self {
                broken: true,
                ..Self::new(clock)
            }
        }

        fn touched(&self) -> bool {
            self.gets.load(Ordering::SeqCst) + self.puts.load(Ordering::SeqCst) > 0
        }
    }

    #[async_trait]
    impl DecisionCache for RecordingCache {
        async fn get(&self, key: &str) -> CacheResult<Option<bool>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(CacheError::Timeout(Duration::ZERO));
            }
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, decision: bool, ttl: Duration) -> CacheResult<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(CacheError::Timeout(Duration::ZERO));
            }
            self.inner.put(key, decision, ttl).await
        }

        fn backend(&self) -> &'static str {
            "recording"
        }
    }

    struct Harness {
        gate: Gatekeeper,
        resolver: Arc<FakeResolver>,
        cache: Arc<RecordingCache>,
        clock: MockClock,
    }

    fn harness(policy: AccessPolicy, resolver: FakeResolver) -> Harness {
        let clock = MockClock::new(Instant::now());
        let cache = Arc::new(RecordingCache::new(&clock));
        harness_with_cache(policy, resolver, cache, clock)
    }

    fn harness_with_cache(
        policy: AccessPolicy,
        resolver: FakeResolver,
        cache: Arc<RecordingCache>,
        clock: MockClock,
    ) -> Harness {
        let resolver = Arc::new(resolver);
        let gate = Gatekeeper::builder(policy, resolver.clone())
            .cache(cache.clone())
            .ttl(Duration::from_secs(600))
            .lookup_timeout(Duration::from_millis(200))
            .build();
        Harness {
            gate,
            resolver,
            cache,
            clock,
        }
    }

    fn geo_policy(rules: &[&str]) -> AccessPolicy {
        let geo: GeoPolicyTable = rules.iter().map(|r| GeoRule::parse(r).unwrap()).collect();
        AccessPolicy::new(StaticWhitelist::new(), geo)
    }

    #[tokio::test]
    async fn test_fast_path_allows_without_io() {
        let h = harness(geo_policy(&["US"]), FakeResolver::default());

        for raw in ["127.0.0.1", "::1", "169.254.1.1", "fe80::1"] {
            assert_eq!(h.gate.evaluate(raw).await, Verdict::allow(Reason::Bypass));
        }
        assert!(!h.cache.touched());
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_fast_path_denies_without_io() {
        let h = harness(geo_policy(&["US"]), FakeResolver::default());

        for raw in ["0.0.0.0", "::", "224.0.0.251", "ff02::1"] {
            assert_eq!(h.gate.evaluate(raw).await, Verdict::deny(Reason::Rejected));
        }
        assert!(!h.cache.touched());
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_input_denied() {
        let h = harness(geo_policy(&["US"]), FakeResolver::default());

        for raw in ["", "not an IP", "1.2.3.256", "1.2.3.4, 5.6.7.8", "12345"] {
            assert!(!h.gate.decide(raw).await, "{raw:?} should be denied");
        }
        assert!(!h.cache.touched());
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_static_whitelist_beats_geo_and_skips_cache() {
        let whitelist = StaticWhitelist::new()
            .with_address(classify("198.51.100.7").unwrap())
            .with_range(AddressRange::parse("203.0.113.0/24").unwrap());
        let geo: GeoPolicyTable = [GeoRule::country("US")].into_iter().collect();
        let resolver = FakeResolver::default()
            .with("198.51.100.7", "CN", None)
            .with("203.0.113.9", "CN", None);
        let h = harness(AccessPolicy::new(whitelist, geo), resolver);

        assert_eq!(
            h.gate.evaluate("198.51.100.7").await,
            Verdict::allow(Reason::StaticAddress)
        );
        assert_eq!(
            h.gate.evaluate("203.0.113.9").await,
            Verdict::allow(Reason::StaticRange)
        );
        assert!(!h.cache.touched());
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_private_addresses_are_not_bypassed() {
        let h = harness(geo_policy(&["US"]), FakeResolver::default());

        assert_eq!(
            h.gate.evaluate("10.0.0.1").await,
            Verdict::deny(Reason::LookupFailed)
        );
        assert_eq!(h.resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_call_hits_cache() {
        let resolver = FakeResolver::default().with("8.8.8.8", "US", Some("California"));
        let h = harness(geo_policy(&["US"]), resolver);

        assert_eq!(
            h.gate.evaluate("8.8.8.8").await,
            Verdict::allow(Reason::GeoAllowed)
        );
        assert_eq!(h.gate.evaluate("8.8.8.8").await, Verdict::cached(true));
        assert_eq!(h.resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_key_is_canonical() {
        let resolver = FakeResolver::default().with("2001:db8::1", "US", None);
        let policy = geo_policy(&["US"]);
        let h = harness(policy, resolver);

        assert!(h.gate.decide("2001:db8::1").await);
        assert!(h.gate.decide("2001:0db8:0000:0000:0000:0000:0000:0001").await);
        assert_eq!(h.resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_new_lookup() {
        let resolver = FakeResolver::default().with("8.8.8.8", "US", None);
        let h = harness(geo_policy(&["US"]), resolver);

        assert!(h.gate.decide("8.8.8.8").await);
        h.clock.advance(Duration::from_secs(599));
        assert_eq!(h.gate.evaluate("8.8.8.8").await, Verdict::cached(true));
        assert_eq!(h.resolver.calls(), 1);

        h.clock.advance(Duration::from_secs(1));
        assert_eq!(
            h.gate.evaluate("8.8.8.8").await,
            Verdict::allow(Reason::GeoAllowed)
        );
        assert_eq!(h.resolver.calls(), 2);
    }

    #[tokio::test]
    async fn test_whole_country_rule() {
        let resolver = FakeResolver::default()
            .with("8.8.8.8", "US", Some("Oregon"))
            .with("8.8.4.4", "US", None)
            .with("1.1.1.1", "CA", Some("Ontario"));
        let h = harness(geo_policy(&["US"]), resolver);

        assert!(h.gate.decide("8.8.8.8").await);
        assert!(h.gate.decide("8.8.4.4").await);
        assert_eq!(
            h.gate.evaluate("1.1.1.1").await,
            Verdict::deny(Reason::CountryDenied)
        );
    }

    #[tokio::test]
    async fn test_region_restricted_country() {
        let resolver = FakeResolver::default()
            .with("8.8.8.8", "US", Some("Texas"))
            .with("8.8.4.4", "US", Some("Oregon"))
            .with("9.9.9.9", "US", None)
            .with("1.1.1.1", "FR", Some("Oregon"));
        let h = harness(geo_policy(&["US/California", "US/Oregon"]), resolver);

        assert_eq!(
            h.gate.evaluate("8.8.8.8").await,
            Verdict::deny(Reason::RegionDenied)
        );
        assert_eq!(
            h.gate.evaluate("8.8.4.4").await,
            Verdict::allow(Reason::GeoAllowed)
        );
        assert_eq!(
            h.gate.evaluate("9.9.9.9").await,
            Verdict::deny(Reason::RegionUnknown)
        );
        assert_eq!(
            h.gate.evaluate("1.1.1.1").await,
            Verdict::deny(Reason::CountryDenied)
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_denies_and_is_cached() {
        let h = harness(geo_policy(&["US"]), FakeResolver::default());

        assert_eq!(
            h.gate.evaluate("5.5.5.5").await,
            Verdict::deny(Reason::LookupFailed)
        );
        assert_eq!(h.gate.evaluate("5.5.5.5").await, Verdict::cached(false));
        assert_eq!(h.resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_answer_without_country_denies_and_is_cached() {
        let resolver = FakeResolver::default().without_country("8.8.8.8");
        let h = harness(geo_policy(&["US"]), resolver);

        assert_eq!(
            h.gate.evaluate("8.8.8.8").await,
            Verdict::deny(Reason::LookupFailed)
        );
        assert_eq!(h.gate.evaluate("8.8.8.8").await, Verdict::cached(false));
        assert_eq!(h.resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_timeout_denies_and_is_cached() {
        let resolver = FakeResolver::default()
            .with("8.8.8.8", "US", None)
            .delayed(Duration::from_secs(5));
        let h = harness(geo_policy(&["US"]), resolver);

        assert_eq!(
            h.gate.evaluate("8.8.8.8").await,
            Verdict::deny(Reason::LookupFailed)
        );
        assert_eq!(h.gate.evaluate("8.8.8.8").await, Verdict::cached(false));
    }

    #[tokio::test]
    async fn test_cache_outage_still_decides() {
        let clock = MockClock::new(Instant::now());
        let cache = Arc::new(RecordingCache::broken(&clock));
        let resolver = FakeResolver::default().with("8.8.8.8", "US", None);
        let h = harness_with_cache(geo_policy(&["US"]), resolver, cache, clock);

        assert!(h.gate.decide("8.8.8.8").await);
        assert!(h.gate.decide("8.8.8.8").await);
        // Nothing could be cached, so every call resolves again
        assert_eq!(h.resolver.calls(), 2);
    }

    #[tokio::test]
    async fn test_no_geo_rules_denies_without_lookup() {
        let whitelist = StaticWhitelist::new().with_address(classify("198.51.100.7").unwrap());
        let policy = AccessPolicy::new(whitelist, GeoPolicyTable::new());
        let h = harness(policy, FakeResolver::default().with("8.8.8.8", "US", None));

        assert_eq!(
            h.gate.evaluate("8.8.8.8").await,
            Verdict::deny(Reason::NoGeoPolicy)
        );
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_share_one_lookup() {
        let resolver = FakeResolver::default()
            .with("8.8.8.8", "US", None)
            .delayed(Duration::from_millis(50));
        let h = harness(geo_policy(&["US"]), resolver);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = h.gate.clone();
                tokio::spawn(async move { gate.decide("8.8.8.8").await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(h.resolver.calls(), 1);
        assert_eq!(h.gate.lookups_in_flight(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_caller_still_caches() {
        let resolver = FakeResolver::default()
            .with("8.8.8.8", "US", None)
            .delayed(Duration::from_millis(50));
        let h = harness(geo_policy(&["US"]), resolver);

        let gate = h.gate.clone();
        let caller = tokio::spawn(async move { gate.decide("8.8.8.8").await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        caller.abort();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(h.gate.evaluate("8.8.8.8").await, Verdict::cached(true));
        assert_eq!(h.resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_replace_policy_takes_effect() {
        let h = harness(geo_policy(&["US"]), FakeResolver::default());
        assert!(!h.gate.decide("198.51.100.7").await);

        let whitelist = StaticWhitelist::new().with_address(classify("198.51.100.7").unwrap());
        h.gate
            .replace_policy(AccessPolicy::new(whitelist, GeoPolicyTable::new()));

        assert_eq!(
            h.gate.evaluate("198.51.100.7").await,
            Verdict::allow(Reason::StaticAddress)
        );
        assert!(h.gate.policy().geo.is_empty());
    }

    #[test]
    fn test_builder_defaults() {
        let gate = Gatekeeper::builder(geo_policy(&["US"]), Arc::new(FakeResolver::default()))
            .build();
        assert_eq!(gate.ttl(), DEFAULT_CACHE_TTL);
        assert_eq!(gate.cache_backend(), "memory");
        assert!(format!("{gate:?}").contains("memory"));
    }
}
