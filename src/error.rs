//! # Error Types
//!
//! Error handling for session caching and provisioning.
//!
//! This module defines all error variants that can occur while managing
//! cached HTTP sessions, from cache lookups to session construction and
//! teardown.
//!
//! ## Error Categories
//! - **Cache Errors**: Lookups on absent keys, poisoned cache locks
//! - **Session Errors**: Construction and teardown failures
//! - **HTTP Errors**: Request failures surfaced by the underlying client
//! - **Configuration Errors**: Invalid endpoints, invalid capacities
//!
//! All errors implement `std::error::Error` for interoperability.

use thiserror::Error;

/// CacheError is the primary error type for all session-cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Lookup on a key that is absent from the cache. Callers are expected
    /// to guard with `contains` or use the non-failing `peek` accessor, so
    /// hitting this variant usually indicates a programming error.
    #[error("no cached session for key: {0}")]
    KeyNotFound(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Session construction failed. The cache is left unchanged: no entry
    /// is inserted for the endpoint that failed to provision.
    #[error("session construction failed: {0}")]
    Session(String),

    /// Teardown of an evicted session failed. The entry is already removed
    /// from the cache when this is raised, so cache state stays consistent.
    #[error("session close failed: {0}")]
    Close(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session cache lock poisoned")]
    LockPoisoned,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Type alias for Results using CacheError
pub type Result<T> = std::result::Result<T, CacheError>;
