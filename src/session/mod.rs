//! # Session Management
//!
//! Provisioning and lifecycle of cached HTTP client sessions.
//!
//! Two managers share one eviction policy ([`crate::cache::BoundedCache`])
//! and differ only in concurrency discipline and teardown shape:
//! - **Blocking**: [`blocking::SessionManager`], mutex-guarded, immediate
//!   close on eviction.
//! - **Async**: [`manager::AsyncSessionManager`], async-mutex-guarded,
//!   awaited close on eviction, single-flight provisioning per key.
//!
//! ## Components
//! - **Key derivation**: credential-stripping endpoint normalization
//! - **Teardown traits**: the close capability each manager requires
//! - **Factory traits**: session construction on cache miss
//! - **HTTP glue**: reqwest-backed factories and request helpers

pub mod blocking;
pub mod http;
pub mod key;
pub mod manager;

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

pub use blocking::SessionManager;
pub use http::{AsyncHttpConnector, AsyncHttpSessionManager, HttpConnector, HttpSessionManager};
pub use key::cache_key;
pub use manager::AsyncSessionManager;

/// Teardown capability of a blocking session.
///
/// Invoked once for every entry the cache evicts, and again never: an
/// evicted session is already unreachable through the cache when its close
/// runs, so a failure here is a resource-leak concern, not a consistency
/// one.
pub trait Teardown {
    /// Release the underlying connection resources immediately.
    fn close(&self) -> Result<()>;
}

/// Teardown capability of an async session.
#[async_trait]
pub trait AsyncTeardown: Send + Sync {
    /// Release the underlying connection resources, suspending until done.
    async fn close(&self) -> Result<()>;
}

/// Constructs a new blocking session for an endpoint on a cache miss.
///
/// Implemented for any `Fn(&Url) -> Result<S>`, so plain closures work as
/// factories. Construction failures propagate unchanged and leave the cache
/// untouched.
pub trait SessionFactory<S> {
    /// Build a fresh session for `endpoint`.
    fn connect(&self, endpoint: &Url) -> Result<S>;
}

impl<S, F> SessionFactory<S> for F
where
    F: Fn(&Url) -> Result<S>,
{
    fn connect(&self, endpoint: &Url) -> Result<S> {
        (self)(endpoint)
    }
}

/// Constructs a new async session for an endpoint on a cache miss.
///
/// Async sessions are expected to surface non-success HTTP statuses as
/// errors; for clients that cannot be configured that way at construction
/// time, the request helpers enforce the convention instead.
#[async_trait]
pub trait AsyncSessionFactory<S>: Send + Sync {
    /// Build a fresh session for `endpoint`.
    async fn connect(&self, endpoint: &Url) -> Result<S>;
}
