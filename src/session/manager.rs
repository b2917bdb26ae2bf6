//! Async session manager.
//!
//! One async mutex guards the cache structure and is held only across the
//! structural mutation, never across session construction or teardown, so
//! provisioning one endpoint is never serialized behind another endpoint's
//! slow connect or close. Misses on the same key are single-flight: a
//! per-key provisioning lock guarantees exactly one construction per key
//! even under concurrent misses, so no losing session is ever built and
//! leaked.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use super::key::cache_key;
use super::{AsyncSessionFactory, AsyncTeardown};
use crate::cache::BoundedCache;
use crate::config::DEFAULT_ASYNC_CAPACITY;
use crate::error::Result;

/// Bounded cache of async sessions keyed by normalized endpoint.
///
/// Sessions are owned by the cache and handed to callers as `Arc` clones;
/// eviction awaits the session's [`AsyncTeardown`] close. Eviction is
/// linearizable with respect to concurrent provisioning: an evicted entry
/// leaves the structure inside the locked insert, before its close is
/// awaited.
pub struct AsyncSessionManager<S, F> {
    cache: Mutex<BoundedCache<Arc<S>>>,
    /// Per-key provisioning locks for single-flight construction
    provisioning: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    factory: F,
}

impl<S, F> AsyncSessionManager<S, F>
where
    S: AsyncTeardown,
    F: AsyncSessionFactory<S>,
{
    /// Manager with the default async capacity.
    pub fn new(factory: F) -> Self {
        Self::with_capacity(DEFAULT_ASYNC_CAPACITY, factory)
    }

    /// Manager holding at most `capacity` sessions.
    pub fn with_capacity(capacity: usize, factory: F) -> Self {
        Self {
            cache: Mutex::new(BoundedCache::new(capacity)),
            provisioning: Mutex::new(HashMap::new()),
            factory,
        }
    }

    /// Fetch the cached session for `endpoint`, constructing one on a miss.
    ///
    /// Construction failures propagate and leave the cache unchanged.
    /// Eviction-close failures are logged and do not fail provisioning; the
    /// evicted entry is already out of the cache when its close runs.
    pub async fn session(&self, endpoint: &Url) -> Result<Arc<S>> {
        let key = cache_key(endpoint);
        loop {
            if let Some(session) = self.lookup(&key).await {
                trace!(%key, "session cache hit");
                return Ok(session);
            }

            let slot = {
                let mut pending = self.provisioning.lock().await;
                Arc::clone(pending.entry(key.clone()).or_default())
            };
            let _guard = slot.lock().await;

            // A finished owner retires its slot, so a lock acquired on a
            // stale slot grants no provisioning rights. Start over on
            // whatever slot is current; without this check a waiter queued
            // behind a failed construction could race a fresh caller and
            // build a second session for the key.
            if !self.slot_is_current(&key, &slot).await {
                continue;
            }

            // A racing caller may have provisioned while we waited on the
            // per-key lock.
            if let Some(session) = self.lookup(&key).await {
                trace!(%key, "session provisioned by concurrent caller");
                self.retire_slot(&key, &slot).await;
                return Ok(session);
            }

            let outcome = match self.factory.connect(endpoint).await {
                Ok(session) => {
                    let session = Arc::new(session);
                    let evicted = {
                        let mut cache = self.cache.lock().await;
                        cache.insert(key.clone(), Arc::clone(&session))
                    };
                    for (old_key, old) in evicted {
                        debug!(key = %old_key, "closing evicted session");
                        if let Err(e) = old.close().await {
                            warn!(key = %old_key, error = %e, "failed to close evicted session");
                        }
                    }
                    Ok(session)
                }
                Err(e) => Err(e),
            };

            self.retire_slot(&key, &slot).await;
            return outcome;
        }
    }

    /// Insert a caller-constructed session for `endpoint`.
    ///
    /// Evicted sessions are closed before returning; the first close failure
    /// propagates, with the cache already consistent (the evicted entries
    /// are out of the structure regardless of close outcome).
    pub async fn cache_session(&self, endpoint: &Url, session: S) -> Result<()> {
        let key = cache_key(endpoint);
        let evicted = {
            let mut cache = self.cache.lock().await;
            cache.insert(key, Arc::new(session))
        };
        self.close_entries(evicted).await
    }

    /// Whether a session is resident for `endpoint`.
    pub async fn contains(&self, endpoint: &Url) -> bool {
        self.cache.lock().await.contains(&cache_key(endpoint))
    }

    /// Number of resident sessions.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Whether the cache holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }

    /// Close every resident session and empty the cache.
    ///
    /// Explicit teardown for the end of the owning scope. The first close
    /// failure propagates after all sessions have been removed and every
    /// close has been attempted.
    pub async fn close_all(&self) -> Result<()> {
        let drained = {
            let mut cache = self.cache.lock().await;
            cache.drain()
        };
        self.close_entries(drained).await
    }

    async fn lookup(&self, key: &str) -> Option<Arc<S>> {
        self.cache.lock().await.peek(key).map(Arc::clone)
    }

    /// Whether `slot` is still the provisioning slot the map hands out for
    /// `key`. Only the holder of the current slot's lock may construct.
    async fn slot_is_current(&self, key: &str, slot: &Arc<Mutex<()>>) -> bool {
        self.provisioning
            .lock()
            .await
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Retire `slot` once its provisioning round is over, win or lose.
    /// Called with the slot's lock held, so the map entry can only still be
    /// this slot or already gone.
    async fn retire_slot(&self, key: &str, slot: &Arc<Mutex<()>>) {
        let mut pending = self.provisioning.lock().await;
        if pending
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            pending.remove(key);
        }
    }

    async fn close_entries(&self, entries: Vec<(String, Arc<S>)>) -> Result<()> {
        let results =
            futures::future::join_all(entries.iter().map(|(_, session)| session.close())).await;

        let mut first_err = None;
        for ((key, _), result) in entries.iter().zip(results) {
            if let Err(e) = result {
                if first_err.is_none() {
                    first_err = Some(e);
                } else {
                    warn!(%key, error = %e, "failed to close evicted session");
                }
            } else {
                debug!(%key, "closed evicted session");
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
