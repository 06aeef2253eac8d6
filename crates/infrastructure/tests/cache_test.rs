use std::net::IpAddr;
use std::thread::sleep;
use std::time::Duration;
use vigil_dns_application::HostCache;
use vigil_dns_domain::CacheConfig;
use vigil_dns_infrastructure::LruHostCache;

fn addrs(list: &[&str]) -> Vec<IpAddr> {
    list.iter().map(|a| a.parse().unwrap()).collect()
}

fn cache_with(max_size: usize, ttl_ms: u64) -> LruHostCache {
    LruHostCache::new(&CacheConfig {
        max_size,
        ttl_ms,
        ..CacheConfig::default()
    })
}

#[test]
fn round_trip_within_ttl() {
    let cache = cache_with(16, 60_000);
    let list = addrs(&["93.184.216.34"]);

    cache.update("example.com", list.clone());
    assert_eq!(cache.get("example.com"), Some(list));
    assert_eq!(cache.len(), 1);
}

#[test]
fn miss_on_absent_host() {
    let cache = cache_with(16, 60_000);
    assert_eq!(cache.get("nowhere.example"), None);
    assert_eq!(cache.hit_rate(), 0.0);
}

#[test]
fn expired_entries_are_invisible() {
    let cache = cache_with(16, 20);
    cache.update("short.example", addrs(&["10.0.0.1"]));

    sleep(Duration::from_millis(40));
    assert_eq!(cache.get("short.example"), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn update_refreshes_expiry() {
    let cache = cache_with(16, 80);
    cache.update("host.example", addrs(&["10.0.0.1"]));

    sleep(Duration::from_millis(50));
    cache.update("host.example", addrs(&["10.0.0.2"]));

    sleep(Duration::from_millis(50));
    // Original expiry passed, refreshed expiry has not.
    assert_eq!(cache.get("host.example"), Some(addrs(&["10.0.0.2"])));
}

#[test]
fn capacity_evicts_least_recently_used() {
    let cache = cache_with(2, 60_000);
    cache.update("a.example", addrs(&["10.0.0.1"]));
    cache.update("b.example", addrs(&["10.0.0.2"]));

    // Touch a so that b becomes the eviction victim.
    assert!(cache.get("a.example").is_some());
    cache.update("c.example", addrs(&["10.0.0.3"]));

    assert_eq!(cache.len(), 2);
    assert!(cache.get("a.example").is_some());
    assert!(cache.get("b.example").is_none());
    assert!(cache.get("c.example").is_some());
}

#[test]
fn size_never_exceeds_capacity() {
    let cache = cache_with(8, 60_000);
    for i in 0..50 {
        cache.update(&format!("host{i}.example"), addrs(&["10.0.0.1"]));
        assert!(cache.len() <= 8);
    }
}

#[test]
fn hit_rate_accounting() {
    let cache = cache_with(16, 60_000);
    cache.update("host.example", addrs(&["10.0.0.1"]));

    assert!(cache.get("host.example").is_some());
    assert!(cache.get("host.example").is_some());
    assert!(cache.get("missing.example").is_none());
    assert!(cache.get("also-missing.example").is_none());

    assert!((cache.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn remove_and_clear() {
    let cache = cache_with(16, 60_000);
    cache.update("a.example", addrs(&["10.0.0.1"]));
    cache.update("b.example", addrs(&["10.0.0.2"]));

    cache.remove("a.example");
    assert!(cache.get("a.example").is_none());
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.hit_rate(), 0.0);
}
