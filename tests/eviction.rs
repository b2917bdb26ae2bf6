#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end eviction scenarios across the cache core and both managers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use session_cache::{
    AsyncSessionManager, AsyncTeardown, BoundedCache, Result, SessionManager, Teardown,
};
use url::Url;

fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

// ============================================================================
// CACHE CORE
// ============================================================================

#[test]
fn capacity_two_insert_sequence_evicts_fifo() {
    let mut cache = BoundedCache::new(2);
    cache.insert("a", "s1");
    cache.insert("b", "s2");

    let evicted = cache.insert("c", "s3");
    assert_eq!(evicted, vec![("a".to_string(), "s1")]);
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));

    let evicted = cache.insert("d", "s4");
    assert_eq!(evicted, vec![("b".to_string(), "s2")]);
    assert!(cache.contains("c"));
    assert!(cache.contains("d"));
    assert_eq!(cache.len(), 2);
}

#[test]
fn long_insert_sequence_keeps_most_recent_keys() {
    let capacity = 8;
    let mut cache = BoundedCache::new(capacity);
    for i in 0..50 {
        cache.insert(format!("key-{i}"), i);
    }

    assert_eq!(cache.len(), capacity);
    for i in 42..50 {
        assert_eq!(*cache.get(&format!("key-{i}")).unwrap(), i);
    }
    assert!(cache.get("key-41").is_err());
}

// ============================================================================
// BLOCKING MANAGER
// ============================================================================

struct CountingSession {
    closes: Arc<AtomicUsize>,
}

impl Teardown for CountingSession {
    fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn blocking_manager_evicts_and_closes_beyond_capacity() {
    let closes = Arc::new(AtomicUsize::new(0));
    let factory = {
        let closes = Arc::clone(&closes);
        move |_: &Url| -> Result<CountingSession> {
            Ok(CountingSession {
                closes: Arc::clone(&closes),
            })
        }
    };
    let manager = SessionManager::with_capacity(8, factory);

    for i in 0..12 {
        manager
            .session(&url(&format!("http://node-{i}.example")))
            .unwrap();
    }

    assert_eq!(manager.len().unwrap(), 8);
    assert_eq!(closes.load(Ordering::SeqCst), 4);
    // The four oldest endpoints were dropped, the eight newest remain.
    for i in 0..4 {
        assert!(!manager
            .contains(&url(&format!("http://node-{i}.example")))
            .unwrap());
    }
    for i in 4..12 {
        assert!(manager
            .contains(&url(&format!("http://node-{i}.example")))
            .unwrap());
    }
}

// ============================================================================
// ASYNC MANAGER
// ============================================================================

struct CountingAsyncSession {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl AsyncTeardown for CountingAsyncSession {
    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct CountingAsyncFactory {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl session_cache::AsyncSessionFactory<CountingAsyncSession> for CountingAsyncFactory {
    async fn connect(&self, _endpoint: &Url) -> Result<CountingAsyncSession> {
        Ok(CountingAsyncSession {
            closes: Arc::clone(&self.closes),
        })
    }
}

#[tokio::test]
async fn capacity_one_async_cache_closes_displaced_session_once() {
    let closes = Arc::new(AtomicUsize::new(0));
    let manager = AsyncSessionManager::with_capacity(
        1,
        CountingAsyncFactory {
            closes: Arc::clone(&closes),
        },
    );

    let a = url("http://a.example");
    let b = url("http://b.example");

    manager
        .cache_session(
            &a,
            CountingAsyncSession {
                closes: Arc::clone(&closes),
            },
        )
        .await
        .unwrap();
    manager
        .cache_session(
            &b,
            CountingAsyncSession {
                closes: Arc::clone(&closes),
            },
        )
        .await
        .unwrap();

    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert!(!manager.contains(&a).await);
    assert!(manager.contains(&b).await);

    // The resident handle for "b" is the second session, untouched by the
    // eviction of the first.
    let resident = manager.session(&b).await.unwrap();
    resident.close().await.unwrap();
    assert_eq!(closes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reinserting_resident_endpoint_never_evicts() {
    let closes = Arc::new(AtomicUsize::new(0));
    let manager = AsyncSessionManager::with_capacity(
        2,
        CountingAsyncFactory {
            closes: Arc::clone(&closes),
        },
    );

    let a = url("http://a.example");
    let b = url("http://b.example");

    manager.session(&a).await.unwrap();
    manager.session(&b).await.unwrap();

    // Overwrite "a" in place while the cache is full: no eviction, and "a"
    // keeps its original (oldest) position.
    manager
        .cache_session(
            &a,
            CountingAsyncSession {
                closes: Arc::clone(&closes),
            },
        )
        .await
        .unwrap();
    assert_eq!(manager.len().await, 2);
    assert_eq!(closes.load(Ordering::SeqCst), 0);

    manager.session(&url("http://c.example")).await.unwrap();
    assert!(!manager.contains(&a).await);
    assert!(manager.contains(&b).await);
}
