use lru::LruCache;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;
use vigil_dns_application::HostCache;
use vigil_dns_domain::CacheConfig;

/// Upper bound on expired entries swept from the recency tail per lookup.
/// The probed key itself is always expired when stale, so correctness does
/// not depend on the sweep reaching every entry.
const EXPIRE_SCAN_CAP: usize = 8;

struct CacheEntry {
    addresses: Vec<IpAddr>,
    expires_at: Instant,
}

/// Bounded hostname cache: one `lru::LruCache` provides both the map and
/// the recency sequence, guarded by a single mutex. Hit and miss counters
/// are relaxed atomics so `hit_rate` never takes the lock.
pub struct LruHostCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LruHostCache {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_size.max(1)).unwrap();
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_millis(config.ttl_ms),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn sweep_expired(entries: &mut LruCache<String, CacheEntry>, now: Instant) {
        for _ in 0..EXPIRE_SCAN_CAP {
            let expired = match entries.peek_lru() {
                Some((hostname, entry)) if entry.expires_at <= now => hostname.clone(),
                _ => break,
            };
            entries.pop(&expired);
            debug!(hostname = %expired, "expired cache entry swept");
        }
    }
}

impl HostCache for LruHostCache {
    fn get(&self, hostname: &str) -> Option<Vec<IpAddr>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        Self::sweep_expired(&mut entries, now);

        let live = match entries.get(hostname) {
            Some(entry) if entry.expires_at > now => Some(entry.addresses.clone()),
            Some(_) => None,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        match live {
            Some(addresses) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(addresses)
            }
            None => {
                // Present but expired: evict the probed key.
                entries.pop(hostname);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn update(&self, hostname: &str, addresses: Vec<IpAddr>) {
        let entry = CacheEntry {
            addresses,
            expires_at: Instant::now() + self.ttl,
        };
        let mut entries = self.entries.lock().unwrap();
        entries.put(hostname.to_string(), entry);
    }

    fn remove(&self, hostname: &str) {
        self.entries.lock().unwrap().pop(hostname);
    }

    fn clear(&self) {
        let mut entries = self.entries.lock().unwrap();
        entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        }
    }
}
