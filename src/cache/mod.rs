//! # Cache Core
//!
//! The bounded, recency-ordered map underlying both session caches.
//!
//! This module provides the single eviction-policy implementation shared by
//! the blocking and async session managers; only the teardown shape differs
//! between the two, and that lives with the managers.
//!
//! ## Components
//! - **BoundedCache**: fixed-capacity map with oldest-first eviction

pub mod bounded;

pub use bounded::BoundedCache;
