//! Blocking session manager.
//!
//! Mirrors the async manager with a std mutex and immediate teardown. All
//! mutating operations go through the mutex, but the critical section covers
//! only the structural mutation: sessions are constructed with the lock
//! released, so a factory that does network I/O never serializes
//! provisioning of other endpoints. Concurrent misses on one endpoint may
//! therefore both construct; the loser's session never reaches the cache and
//! is closed on the spot.

use std::sync::{Arc, Mutex};

use tracing::{debug, trace, warn};
use url::Url;

use super::key::cache_key;
use super::{SessionFactory, Teardown};
use crate::cache::BoundedCache;
use crate::config::DEFAULT_BLOCKING_CAPACITY;
use crate::error::{CacheError, Result};

/// Bounded cache of blocking sessions keyed by normalized endpoint.
///
/// Constructed explicitly and injected where needed; capacity and factory
/// are fixed per instance. Sessions are owned by the cache and handed to
/// callers as `Arc` clones; eviction closes the session through its
/// [`Teardown`] implementation.
pub struct SessionManager<S, F> {
    cache: Mutex<BoundedCache<Arc<S>>>,
    factory: F,
}

impl<S, F> SessionManager<S, F>
where
    S: Teardown,
    F: SessionFactory<S>,
{
    /// Manager with the default blocking capacity.
    pub fn new(factory: F) -> Self {
        Self::with_capacity(DEFAULT_BLOCKING_CAPACITY, factory)
    }

    /// Manager holding at most `capacity` sessions.
    pub fn with_capacity(capacity: usize, factory: F) -> Self {
        Self {
            cache: Mutex::new(BoundedCache::new(capacity)),
            factory,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BoundedCache<Arc<S>>>> {
        self.cache.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Fetch the cached session for `endpoint`, constructing one on a miss.
    ///
    /// Construction failures propagate and leave the cache unchanged.
    /// Eviction-close failures are logged and do not fail provisioning.
    pub fn session(&self, endpoint: &Url) -> Result<Arc<S>> {
        let key = cache_key(endpoint);

        if let Some(session) = self.lock()?.peek(&key).map(Arc::clone) {
            trace!(%key, "session cache hit");
            return Ok(session);
        }

        // Construct with the lock released; only the insert below holds it.
        let session = Arc::new(self.factory.connect(endpoint)?);

        let mut cache = self.lock()?;
        if let Some(existing) = cache.peek(&key).map(Arc::clone) {
            drop(cache);
            // Lost a provisioning race. The duplicate never reached the
            // cache, so it is closed here rather than leaked.
            trace!(%key, "session provisioned by concurrent caller");
            if let Err(e) = session.close() {
                warn!(%key, error = %e, "failed to close duplicate session");
            }
            return Ok(existing);
        }
        let evicted = cache.insert(key, Arc::clone(&session));
        drop(cache);

        for (old_key, old) in evicted {
            debug!(key = %old_key, "closing evicted session");
            if let Err(e) = old.close() {
                warn!(key = %old_key, error = %e, "failed to close evicted session");
            }
        }
        Ok(session)
    }

    /// Insert a caller-constructed session for `endpoint`.
    ///
    /// Evicted sessions are closed before returning; the first close failure
    /// propagates, with the cache already consistent (the evicted entries
    /// are out of the structure regardless of close outcome).
    pub fn cache_session(&self, endpoint: &Url, session: S) -> Result<()> {
        let key = cache_key(endpoint);
        let evicted = self.lock()?.insert(key, Arc::new(session));
        self.close_entries(evicted)
    }

    /// Whether a session is resident for `endpoint`.
    pub fn contains(&self, endpoint: &Url) -> Result<bool> {
        Ok(self.lock()?.contains(&cache_key(endpoint)))
    }

    /// Number of resident sessions.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether the cache holds no sessions.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Close every resident session and empty the cache.
    ///
    /// Explicit teardown for the end of the owning scope. The first close
    /// failure propagates after all sessions have been removed and every
    /// close has been attempted.
    pub fn close_all(&self) -> Result<()> {
        let drained = self.lock()?.drain();
        self.close_entries(drained)
    }

    fn close_entries(&self, entries: Vec<(String, Arc<S>)>) -> Result<()> {
        let mut first_err = None;
        for (key, session) in entries {
            debug!(%key, "closing evicted session");
            if let Err(e) = session.close() {
                if first_err.is_none() {
                    first_err = Some(e);
                } else {
                    warn!(%key, error = %e, "failed to close evicted session");
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
