//! # session-cache
//!
//! Bounded, thread-safe caching of persistent HTTP client sessions, keyed
//! by destination endpoint, with oldest-first eviction and graceful
//! teardown of evicted connection resources.
//!
//! Repeated requests to a small set of endpoints pay TCP/TLS setup once per
//! endpoint instead of once per request, while total resident connection
//! pools stay bounded by the cache capacity.
//!
//! ## Components
//! - **Cache core**: [`cache::BoundedCache`], the shared eviction policy
//! - **Blocking manager**: [`session::SessionManager`], mutex-guarded with
//!   immediate close on eviction
//! - **Async manager**: [`session::AsyncSessionManager`], async-mutex
//!   guarded with awaited close and single-flight provisioning
//! - **HTTP glue**: reqwest-backed factories and thin request helpers
//!
//! ## Example
//! ```no_run
//! use session_cache::{config::default_http_endpoint, AsyncHttpSessionManager};
//!
//! #[tokio::main]
//! async fn main() -> session_cache::Result<()> {
//!     let sessions = AsyncHttpSessionManager::pooled();
//!     let endpoint = default_http_endpoint()?;
//!
//!     let response = sessions.get(&endpoint, None).await?;
//!     println!("{}", response.status());
//!
//!     sessions.close_all().await
//! }
//! ```
//!
//! ## Concurrency
//! Managers guard the cache structure with a mutex held only across the
//! structural mutation. Session construction and teardown happen outside
//! that critical section, so slow network work on one endpoint never
//! serializes provisioning of another.

pub mod cache;
pub mod config;
pub mod error;
pub mod session;

pub use cache::BoundedCache;
pub use error::{CacheError, Result};
pub use session::{
    cache_key, AsyncHttpConnector, AsyncHttpSessionManager, AsyncSessionFactory,
    AsyncSessionManager, AsyncTeardown, HttpConnector, HttpSessionManager, SessionFactory,
    SessionManager, Teardown,
};
