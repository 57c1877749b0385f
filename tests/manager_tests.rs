//! Resource Manager Tests
//!
//! Tests for:
//! - Registration: duplicate keys, unregistering cached resources
//! - Reference counting: single load per acquisition cycle, eviction at zero
//! - Negative counts: over-release never re-triggers release hooks, and
//!   caching climbs back one step at a time
//! - Load failures: count rollback and retry
//! - recache / fetch / cleanup
//! - Thread safety: concurrent cache calls load once

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use larder::errors::Namespace;
use larder::{Error, LoadError, Resource, ResourceManager};

#[derive(Default)]
struct Counters {
    loads: AtomicUsize,
    releases: AtomicUsize,
}

impl Counters {
    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// A resource whose value is a fresh `String` token per load.
fn token_resource(counters: &Arc<Counters>) -> Resource {
    let on_load = Arc::clone(counters);
    let on_release = Arc::clone(counters);
    Resource::with_release(
        move || {
            let n = on_load.loads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{n}"))
        },
        move |_: &String| {
            on_release.releases.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    )
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn register_rejects_duplicate_key() {
    let manager = ResourceManager::new();
    manager.register("A", Resource::from_fn(|| Ok(1_u8))).unwrap();

    let err = manager
        .register("A", Resource::from_fn(|| Ok(2_u8)))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::DuplicateKey { namespace: Namespace::Resource, ref key } if key == "A"
    ));
}

#[test]
fn unregister_unknown_key_fails() {
    let manager = ResourceManager::new();
    assert!(matches!(
        manager.unregister("Missing"),
        Err(Error::UnknownKey { namespace: Namespace::Resource, .. })
    ));
}

#[test]
fn unregister_with_positive_count_removes_resource() {
    let counters = Arc::new(Counters::default());
    let manager = ResourceManager::new();
    manager.register("A", token_resource(&counters)).unwrap();
    manager.cache("A").unwrap();

    manager.unregister("A").unwrap();
    assert!(!manager.has_resource("A"));
    assert_eq!(counters.releases(), 1, "cached value released on removal");
    assert!(matches!(
        manager.cache("A"),
        Err(Error::UnknownKey { .. })
    ));
}

#[test]
fn keys_can_be_reused_after_unregister() {
    let manager = ResourceManager::new();
    manager.register("A", Resource::from_fn(|| Ok(1_u8))).unwrap();
    manager.unregister("A").unwrap();
    manager.register("A", Resource::from_fn(|| Ok(2_u8))).unwrap();

    manager.cache("A").unwrap();
    assert_eq!(*manager.get_as::<u8>("A").unwrap(), 2);
}

#[test]
fn registering_a_loaded_resource_lets_its_hook_reach_the_manager() {
    let manager = Arc::new(ResourceManager::new());
    let weak = Arc::downgrade(&manager);
    let seen = Arc::new(AtomicUsize::new(0));
    let on_release = Arc::clone(&seen);

    let mut resource = Resource::with_release(
        || Ok(9_u8),
        move |_: &u8| {
            if let Some(manager) = weak.upgrade() {
                on_release.store(manager.len() + 1, Ordering::SeqCst);
            }
            Ok(())
        },
    );
    resource.load().unwrap();

    manager.register("Preloaded", resource).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1, "hook ran before the entry was inserted");
    assert_eq!(manager.ref_count("Preloaded").unwrap(), 0);
    assert!(!manager.is_cached("Preloaded").unwrap());
}

// ============================================================================
// Reference counting
// ============================================================================

#[test]
fn hello_scenario() {
    init_logger();
    let counters = Arc::new(Counters::default());
    let manager = ResourceManager::new();
    manager.register("Hello", token_resource(&counters)).unwrap();

    let first = manager.cache("Hello").unwrap();
    assert_eq!(counters.loads(), 1);

    let second = manager.cache("Hello").unwrap();
    assert!(Arc::ptr_eq(&first, &second), "re-acquisition returns the same value");
    assert_eq!(counters.loads(), 1);

    assert_eq!(manager.uncache("Hello").unwrap(), 1);
    assert_eq!(counters.releases(), 0);
    assert_eq!(manager.uncache("Hello").unwrap(), 0);
    assert_eq!(counters.releases(), 1);
    assert_eq!(manager.uncache("Hello").unwrap(), -1);
    assert_eq!(counters.releases(), 1, "no second release below zero");
}

#[test]
fn n_caches_then_n_uncaches_load_and_release_once() {
    let counters = Arc::new(Counters::default());
    let manager = ResourceManager::new();
    manager.register("A", token_resource(&counters)).unwrap();

    for n in 1..=5 {
        manager.cache("A").unwrap();
        assert_eq!(manager.ref_count("A").unwrap(), n);
    }
    for _ in 0..5 {
        manager.uncache("A").unwrap();
    }

    assert_eq!(manager.ref_count("A").unwrap(), 0);
    assert_eq!(counters.loads(), 1);
    assert_eq!(counters.releases(), 1);
}

#[test]
fn get_requires_live_reference() {
    let counters = Arc::new(Counters::default());
    let manager = ResourceManager::new();
    manager.register("A", token_resource(&counters)).unwrap();

    assert!(matches!(manager.get("A"), Err(Error::NotCached(ref k)) if k == "A"));
    assert_eq!(counters.loads(), 0, "get never loads");

    manager.cache("A").unwrap();
    let value = manager.get("A").unwrap();
    assert_eq!(value.downcast_ref::<String>().unwrap(), "token-0");

    manager.uncache("A").unwrap();
    assert!(matches!(manager.get("A"), Err(Error::NotCached(_))));
}

#[test]
fn uncache_unknown_key_fails() {
    let manager = ResourceManager::new();
    assert!(matches!(
        manager.uncache("Nope"),
        Err(Error::UnknownKey { .. })
    ));
}

#[test]
fn over_released_count_climbs_back_one_step_at_a_time() {
    let counters = Arc::new(Counters::default());
    let manager = ResourceManager::new();
    manager.register("A", token_resource(&counters)).unwrap();

    manager.uncache("A").unwrap();
    manager.uncache("A").unwrap();
    assert_eq!(manager.ref_count("A").unwrap(), -2);
    assert_eq!(counters.releases(), 0, "nothing was cached to release");

    let value = manager.cache("A").unwrap();
    assert_eq!(value.downcast_ref::<String>().unwrap(), "token-0");
    assert_eq!(manager.ref_count("A").unwrap(), -1);
    assert!(!manager.is_cached("A").unwrap());
    assert!(matches!(manager.get("A"), Err(Error::NotCached(_))));

    manager.cache("A").unwrap();
    assert_eq!(manager.ref_count("A").unwrap(), 0);
    assert!(!manager.is_cached("A").unwrap());

    manager.cache("A").unwrap();
    assert_eq!(manager.ref_count("A").unwrap(), 1);
    assert!(manager.get("A").is_ok());
    assert_eq!(counters.loads(), 3);

    assert_eq!(manager.uncache("A").unwrap(), 0);
    assert_eq!(counters.releases(), 1);
}

#[test]
fn cache_after_double_uncache_moves_count_up_by_one() {
    let manager = ResourceManager::new();
    manager
        .register("Hello", Resource::from_fn(|| Ok(String::from("Hello, World!"))))
        .unwrap();

    manager.cache("Hello").unwrap();
    manager.uncache("Hello").unwrap();
    manager.uncache("Hello").unwrap();
    let before = manager.ref_count("Hello").unwrap();
    assert_eq!(before, -1);

    manager.cache("Hello").unwrap();
    assert_eq!(manager.ref_count("Hello").unwrap(), before + 1);
    assert!(!manager.is_cached("Hello").unwrap());
}

// ============================================================================
// Load failures
// ============================================================================

#[test]
fn failed_load_rolls_back_and_can_retry() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let manager = ResourceManager::new();
    manager
        .register(
            "Flaky",
            Resource::from_fn(move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(LoadError::Other("network down".into()))
                } else {
                    Ok(42_u32)
                }
            }),
        )
        .unwrap();

    let err = manager.cache("Flaky").unwrap_err();
    assert!(matches!(err, Error::Load { ref key, .. } if key == "Flaky"));
    assert_eq!(manager.ref_count("Flaky").unwrap(), 0);
    assert!(!manager.is_cached("Flaky").unwrap());

    manager.cache("Flaky").unwrap();
    assert_eq!(manager.ref_count("Flaky").unwrap(), 1);
    assert_eq!(*manager.get_as::<u32>("Flaky").unwrap(), 42);
}

#[test]
fn release_hook_failure_is_swallowed() {
    let manager = ResourceManager::new();
    manager
        .register(
            "A",
            Resource::with_release(
                || Ok(1_i32),
                |_: &i32| Err(LoadError::Other("close failed".into())),
            ),
        )
        .unwrap();

    manager.cache("A").unwrap();
    assert_eq!(manager.uncache("A").unwrap(), 0);
    assert!(!manager.is_cached("A").unwrap());
}

// ============================================================================
// recache / fetch / cleanup
// ============================================================================

#[test]
fn recache_forces_reload() {
    let counters = Arc::new(Counters::default());
    let manager = ResourceManager::new();
    manager.register("A", token_resource(&counters)).unwrap();

    manager.cache("A").unwrap();
    let fresh = manager.recache("A").unwrap();
    assert_eq!(fresh.downcast_ref::<String>().unwrap(), "token-1");
    assert_eq!(counters.loads(), 2);
    assert_eq!(counters.releases(), 1, "replaced value was released");
    assert_eq!(manager.ref_count("A").unwrap(), 2);
}

#[test]
fn fetch_leaves_count_alone() {
    let counters = Arc::new(Counters::default());
    let manager = ResourceManager::new();
    manager.register("A", token_resource(&counters)).unwrap();

    manager.fetch("A").unwrap();
    manager.fetch("A").unwrap();
    assert_eq!(counters.loads(), 2, "uncached fetches load every time");
    assert_eq!(manager.ref_count("A").unwrap(), 0);

    let cached = manager.cache("A").unwrap();
    let fetched = manager.fetch("A").unwrap();
    assert!(Arc::ptr_eq(&cached, &fetched));
    assert_eq!(counters.loads(), 3);
}

#[test]
fn cleanup_releases_everything() {
    let counters = Arc::new(Counters::default());
    let manager = ResourceManager::new();
    manager.register("A", token_resource(&counters)).unwrap();
    manager.register("B", token_resource(&counters)).unwrap();
    manager.cache("A").unwrap();
    manager.cache("B").unwrap();
    manager
        .add_group("G", larder::CacheGroup::new("G", ["A", "B"]))
        .unwrap();

    manager.cleanup();
    assert!(manager.is_empty());
    assert!(!manager.has_group("G"));
    assert_eq!(counters.releases(), 2);
}

// ============================================================================
// Thread Safety
// ============================================================================

#[test]
fn concurrent_cache_loads_once() {
    let counters = Arc::new(Counters::default());
    let manager = Arc::new(ResourceManager::new());
    manager.register("Shared", token_resource(&counters)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let m = Arc::clone(&manager);
            thread::spawn(move || {
                m.cache("Shared").unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(counters.loads(), 1);
    assert_eq!(manager.ref_count("Shared").unwrap(), 8);
}
